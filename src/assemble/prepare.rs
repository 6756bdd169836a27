//! Preparation phase: per-section work that does not depend on numbering.
//!
//! Markup conversion, chart rasterizing and image loading are independent
//! per section, so they run ahead of the numbering fold, optionally on the
//! rayon pool. Results always come back in input order.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rayon::prelude::*;

use crate::chart::ChartRasterizer;
use crate::error::{Error, Result};
use crate::markdown::{Converted, MarkupConverter};
use crate::model::{ImageRef, Section};
use crate::util::guess_media_type;

use super::config::{AssemblyConfig, ImageLinking};

/// A section with everything numbering-independent already computed.
#[derive(Debug)]
pub(crate) struct Prepared {
    pub index: usize,
    pub anchor: String,
    pub section: Section,
    pub main: Converted,
    pub side: Converted,
    /// Rasterized chart markup, if the section has a chart with data.
    pub chart: Option<String>,
    /// The section's image, if it resolved to a file.
    pub image: Option<ResolvedImage>,
}

#[derive(Debug)]
pub(crate) struct ResolvedImage {
    pub path: PathBuf,
    pub caption: Option<String>,
    pub media_type: &'static str,
    /// `data:` URI when images are embedded.
    pub data_uri: Option<String>,
}

/// Anchor of the section at `index`.
pub(crate) fn section_anchor(index: usize) -> String {
    format!("section-{index}")
}

pub(crate) fn prepare_all<M, C>(
    sections: Vec<Section>,
    converter: &M,
    rasterizer: &C,
    config: &AssemblyConfig,
) -> Result<Vec<Prepared>>
where
    M: MarkupConverter,
    C: ChartRasterizer,
{
    let work = |(index, section): (usize, Section)| {
        prepare(index, section, converter, rasterizer, config)
    };

    let results: Vec<Result<Prepared>> = if config.parallel {
        sections.into_par_iter().enumerate().map(work).collect()
    } else {
        sections.into_iter().enumerate().map(work).collect()
    };

    // Sequential collect so the reported error is always the lowest index.
    results.into_iter().collect()
}

fn prepare<M, C>(
    index: usize,
    section: Section,
    converter: &M,
    rasterizer: &C,
    config: &AssemblyConfig,
) -> Result<Prepared>
where
    M: MarkupConverter,
    C: ChartRasterizer,
{
    let anchor = section_anchor(index);

    let main = section
        .body()
        .map(|body| converter.convert(&body.text, &anchor))
        .unwrap_or_default();
    let side = section
        .side()
        .map(|text| converter.convert(text, &format!("{anchor}-side")))
        .unwrap_or_default();

    let chart = match section.chart() {
        Some(spec) => {
            let rendered = rasterizer
                .render(spec)
                .map_err(|source| Error::Chart {
                    section: index,
                    source,
                })?;
            if rendered.is_none() {
                tracing::debug!(
                    section = index,
                    title = %spec.title,
                    "skipping chart without data"
                );
            }
            rendered
        }
        None => None,
    };

    let image = match section.image() {
        Some(image) => resolve_image(index, image, config)?,
        None => None,
    };

    Ok(Prepared {
        index,
        anchor,
        section,
        main,
        side,
        chart,
        image,
    })
}

fn resolve_image(
    index: usize,
    image: &ImageRef,
    config: &AssemblyConfig,
) -> Result<Option<ResolvedImage>> {
    let Some(raw) = image.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
        tracing::debug!(section = index, "skipping image without a path");
        return Ok(None);
    };

    let path = resolve_path(Path::new(raw), config.asset_root.as_deref());
    if !path.is_file() {
        tracing::debug!(
            section = index,
            path = %path.display(),
            "skipping image that does not resolve"
        );
        return Ok(None);
    }

    let media_type = guess_media_type(&path);
    let data_uri = match config.image_linking {
        ImageLinking::Bundle => None,
        ImageLinking::Embed => {
            let bytes = std::fs::read(&path).map_err(|source| Error::Asset {
                section: index,
                path: path.clone(),
                source,
            })?;
            Some(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
        }
    };

    Ok(Some(ResolvedImage {
        path,
        caption: image.caption.clone(),
        media_type,
        data_uri,
    }))
}

fn resolve_path(path: &Path, root: Option<&Path>) -> PathBuf {
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}
