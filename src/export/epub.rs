//! EPUB exporter.
//!
//! Packages an assembled report as an EPUB 3 container with an NCX table of
//! contents for EPUB 2 reading systems.

use std::io::{self, Seek, Write};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::model::TocEntry;
use crate::util::escape_xml;

use super::html_synth::{self, StyleRef};
use super::{Exporter, Report, io_error};

/// Characters escaped in manifest and navigation hrefs.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const REPORT_HREF: &str = "report.xhtml";

/// Configuration for EPUB export.
#[derive(Debug, Clone)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    /// `dc:language` of the package.
    pub language: String,
    /// `dcterms:modified` timestamp. A fixed timestamp is used when unset so
    /// that identical input produces an identical package.
    pub modified: Option<String>,
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            compression_level: None,
            language: "en".to_string(),
            modified: None,
        }
    }
}

/// EPUB format exporter.
///
/// # Example
///
/// ```no_run
/// use dossier::export::{EpubExporter, Exporter, Report};
/// use dossier::model::{AssembledDocument, Metadata};
/// use std::fs::File;
///
/// let report = Report::new(Metadata::new("Annual Review"), AssembledDocument::default());
/// let mut file = File::create("review.epub")?;
/// EpubExporter::new().export(&report, &mut file)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EpubExporter {
    config: EpubConfig,
}

impl EpubExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: EpubConfig::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for EpubExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for EpubExporter {
    fn export<W: Write + Seek>(&self, report: &Report, writer: &mut W) -> io::Result<()> {
        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));

        // 1. Write mimetype (must be first, uncompressed)
        zip.start_file("mimetype", stored).map_err(io_error)?;
        zip.write_all(b"application/epub+zip")?;

        // 2. Write container.xml
        zip.start_file("META-INF/container.xml", deflated)
            .map_err(io_error)?;
        zip.write_all(CONTAINER_XML)?;

        // 3. Build manifest
        let document = &report.document;
        let report_xhtml = synthesize_report(report);

        let mut manifest = vec![
            ManifestItem {
                id: "nav".to_string(),
                href: "nav.xhtml".to_string(),
                media_type: "application/xhtml+xml".to_string(),
                properties: Some("nav"),
            },
            ManifestItem {
                id: "stylesheet".to_string(),
                href: "style.css".to_string(),
                media_type: "text/css".to_string(),
                properties: None,
            },
            ManifestItem {
                id: "report".to_string(),
                href: REPORT_HREF.to_string(),
                media_type: "application/xhtml+xml".to_string(),
                properties: report_xhtml.contains("<svg").then_some("svg"),
            },
        ];
        for (i, asset) in document.assets.iter().enumerate() {
            manifest.push(ManifestItem {
                id: format!("image_{}", i + 1),
                href: asset.href.clone(),
                media_type: asset.media_type.clone(),
                properties: None,
            });
        }

        // 4. Write content.opf
        let opf = generate_opf(report, &self.config, &manifest);
        zip.start_file("OEBPS/content.opf", deflated)
            .map_err(io_error)?;
        zip.write_all(opf.as_bytes())?;

        // 5. Write navigation documents
        zip.start_file("OEBPS/nav.xhtml", deflated).map_err(io_error)?;
        zip.write_all(generate_nav(report).as_bytes())?;

        zip.start_file("OEBPS/toc.ncx", deflated).map_err(io_error)?;
        zip.write_all(generate_ncx(report).as_bytes())?;

        // 6. Write stylesheet and report
        zip.start_file("OEBPS/style.css", deflated).map_err(io_error)?;
        zip.write_all(report.stylesheet.as_bytes())?;

        zip.start_file(format!("OEBPS/{REPORT_HREF}"), deflated)
            .map_err(io_error)?;
        zip.write_all(report_xhtml.as_bytes())?;

        // 7. Write bundled images
        for asset in &document.assets {
            let data = std::fs::read(&asset.path).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("failed to read image {}: {e}", asset.path.display()),
                )
            })?;
            zip.start_file(format!("OEBPS/{}", sanitize_path(&asset.href)), stored)
                .map_err(io_error)?;
            zip.write_all(&data)?;
        }

        zip.finish().map_err(io_error)?;
        tracing::debug!(assets = document.assets.len(), "wrote EPUB package");
        Ok(())
    }
}

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: Option<&'static str>,
}

/// The report body document: cover, contents, registry lists, sections.
fn synthesize_report(report: &Report) -> String {
    let mut body = html_synth::cover(report);
    if let Some(toc) = html_synth::contents(&report.document.toc, "") {
        body.push_str(&toc);
    }
    body.push_str(&html_synth::registry_lists(report, ""));
    body.push_str("<main class=\"report-body\">\n");
    body.push_str(&report.document.body_html());
    body.push_str("</main>\n");
    html_synth::xhtml_document(report.title(), Some(StyleRef::Link("style.css")), &body)
}

/// Deterministic package identifier derived from the cover metadata.
fn package_identifier(report: &Report) -> String {
    let meta = &report.metadata;
    let key = [
        meta.title.as_str(),
        meta.subtitle.as_str(),
        meta.date.as_str(),
        meta.summary.as_str(),
    ]
    .join("\n");
    format!("urn:sha1:{}", sha1_smol::Sha1::from(key).digest())
}

/// Generate content.opf from metadata and manifest.
fn generate_opf(report: &Report, config: &EpubConfig, manifest: &[ManifestItem]) -> String {
    let meta = &report.metadata;
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );

    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape_xml(&package_identifier(report))
    ));
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_xml(report.title())
    ));
    let language = if config.language.trim().is_empty() {
        "en"
    } else {
        config.language.trim()
    };
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape_xml(language)
    ));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape_xml(
            config
                .modified
                .as_deref()
                .unwrap_or("2024-01-01T00:00:00Z")
        )
    ));
    if !meta.date.trim().is_empty() {
        opf.push_str(&format!(
            "    <dc:date>{}</dc:date>\n",
            escape_xml(meta.date.trim())
        ));
    }
    if !meta.summary.trim().is_empty() {
        opf.push_str(&format!(
            "    <dc:description>{}</dc:description>\n",
            escape_xml(meta.summary.trim())
        ));
    }
    opf.push_str("  </metadata>\n");

    // Manifest
    opf.push_str("  <manifest>\n");
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    for item in manifest {
        let properties = item
            .properties
            .map(|p| format!(" properties=\"{p}\""))
            .unwrap_or_default();
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{}/>\n",
            escape_xml(&item.id),
            escape_xml(&encode_href(&item.href)),
            escape_xml(&item.media_type),
            properties
        ));
    }
    opf.push_str("  </manifest>\n");

    // Spine
    opf.push_str("  <spine toc=\"ncx\">\n");
    opf.push_str("    <itemref idref=\"report\"/>\n");
    opf.push_str("  </spine>\n");
    opf.push_str("</package>\n");
    opf
}

/// Navigation entries, falling back to the report itself when the document
/// has no structural sections.
fn nav_entries(report: &Report) -> Vec<(String, String)> {
    let toc: &[TocEntry] = &report.document.toc;
    if toc.is_empty() {
        return vec![(report.title().to_string(), REPORT_HREF.to_string())];
    }
    toc.iter()
        .map(|entry| {
            (
                entry.label(),
                format!("{REPORT_HREF}#{}", encode_href(&entry.anchor)),
            )
        })
        .collect()
}

/// Generate the EPUB 3 navigation document.
fn generate_nav(report: &Report) -> String {
    let mut body = String::from("<nav epub:type=\"toc\" id=\"toc\">\n<h1>Contents</h1>\n<ol>\n");
    for (label, href) in nav_entries(report) {
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_xml(&href),
            escape_xml(&label)
        ));
    }
    body.push_str("</ol>\n</nav>\n");

    html_synth::xhtml_document(report.title(), None, &body)
}

/// Generate toc.ncx from TOC entries.
fn generate_ncx(report: &Report) -> String {
    let mut ncx = String::new();
    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content=""#,
    );
    ncx.push_str(&escape_xml(&package_identifier(report)));
    ncx.push_str(
        r#""/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>"#,
    );
    ncx.push_str(&escape_xml(report.title()));
    ncx.push_str(
        r#"</text>
  </docTitle>
  <navMap>
"#,
    );

    for (i, (label, href)) in nav_entries(report).into_iter().enumerate() {
        let order = i + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navPoint-{order}\" playOrder=\"{order}\">\n"
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            escape_xml(&label)
        ));
        ncx.push_str(&format!("      <content src=\"{}\"/>\n", escape_xml(&href)));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn encode_href(href: &str) -> String {
    utf8_percent_encode(href, HREF).to_string()
}

/// Sanitize a path for use in ZIP (remove leading slashes, normalize).
fn sanitize_path(path: &str) -> String {
    path.trim_start_matches('/')
        .replace('\\', "/")
        .replace("//", "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssembledDocument, Layout, Metadata};

    fn report(toc: Vec<TocEntry>) -> Report {
        let document = AssembledDocument {
            toc,
            ..AssembledDocument::default()
        };
        Report::new(Metadata::new("Review").with_date("2025"), document)
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let a = package_identifier(&report(Vec::new()));
        let b = package_identifier(&report(Vec::new()));
        assert_eq!(a, b);
        assert!(a.starts_with("urn:sha1:"));
        assert_eq!(a.len(), "urn:sha1:".len() + 40);

        let other = Report::new(Metadata::new("Other"), AssembledDocument::default());
        assert_ne!(a, package_identifier(&other));
    }

    #[test]
    fn test_nav_falls_back_to_report() {
        let nav = generate_nav(&report(Vec::new()));
        assert!(nav.contains("<a href=\"report.xhtml\">Review</a>"));
        assert!(nav.contains("epub:type=\"toc\""));
    }

    #[test]
    fn test_ncx_lists_toc_entries() {
        let toc = vec![TocEntry {
            title: "Scope".into(),
            anchor: "section-1".into(),
            layout: Layout::Chapter,
            numeral: Some("I".into()),
        }];
        let ncx = generate_ncx(&report(toc));
        assert!(ncx.contains("<text>I. Scope</text>"));
        assert!(ncx.contains("<content src=\"report.xhtml#section-1\"/>"));
    }

    #[test]
    fn test_encode_href() {
        assert_eq!(encode_href("images/1-map.png"), "images/1-map.png");
        assert_eq!(encode_href("a b"), "a%20b");
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/images/1-a.png"), "images/1-a.png");
        assert_eq!(sanitize_path("images\\1-a.png"), "images/1-a.png");
    }
}
