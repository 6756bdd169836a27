//! dossier - Assemble planned report sections into HTML or EPUB

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use dossier::assemble::{BoxNumbering, NumeralPolicy};
use dossier::model::RegistryEntry;
use dossier::{
    AssembledDocument, AssemblyConfig, Assembler, Format, ImageLinking, Report, ReportPlan,
};

#[derive(Parser)]
#[command(name = "dossier")]
#[command(version, about = "Assemble planned report sections into HTML or EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    dossier plan.json report.html       Render a self-contained HTML report
    dossier plan.json report.epub       Package the report as EPUB
    dossier plan.json --info            Show the contents and registries")]
struct Cli {
    /// Report plan (JSON with `meta` and `sections`)
    #[arg(value_name = "PLAN")]
    plan: PathBuf,

    /// Output file (HTML or EPUB)
    #[arg(value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<PathBuf>,

    /// Output format, inferred from the OUTPUT extension when omitted
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Replace the bundled stylesheet
    #[arg(long, value_name = "FILE")]
    stylesheet: Option<PathBuf>,

    /// Directory that relative image paths resolve against
    /// [default: the directory of PLAN]
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Number boxes chapter-relative, like figures and tables
    #[arg(long)]
    numbered_boxes: bool,

    /// Only number chapters I to X
    #[arg(long)]
    classic_numerals: bool,

    /// Prepare sections on the current thread
    #[arg(long)]
    sequential: bool,

    /// Show the contents and registries without exporting
    #[arg(short, long)]
    info: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Report progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Html,
    Epub,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Format {
        match format {
            OutputFormat::Html => Format::Html,
            OutputFormat::Epub => Format::Epub,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = if cli.info {
        show_info(&cli)
    } else {
        convert(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn assemble(cli: &Cli, linking: ImageLinking) -> Result<(ReportPlan, AssembledDocument), String> {
    let bytes = std::fs::read(&cli.plan)
        .map_err(|e| format!("failed to read {}: {e}", cli.plan.display()))?;
    let plan = ReportPlan::from_slice(&bytes).map_err(|e| e.to_string())?;

    let asset_root = cli.assets.clone().unwrap_or_else(|| {
        cli.plan
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let config = AssemblyConfig::default()
        .with_asset_root(asset_root)
        .with_image_linking(linking)
        .with_parallel(!cli.sequential)
        .with_box_numbering(if cli.numbered_boxes {
            BoxNumbering::ChapterRelative
        } else {
            BoxNumbering::Unnumbered
        })
        .with_numerals(if cli.classic_numerals {
            NumeralPolicy::Classic
        } else {
            NumeralPolicy::Extended
        });

    let document = Assembler::new()
        .with_config(config)
        .assemble(&plan.sections)
        .map_err(|e| e.to_string())?;
    Ok((plan, document))
}

fn show_info(cli: &Cli) -> Result<(), String> {
    let (plan, doc) = assemble(cli, ImageLinking::Bundle)?;

    println!("File: {}", cli.plan.display());
    if !plan.meta.title.is_empty() {
        println!("Title: {}", plan.meta.title);
    }
    println!("Sections: {}", doc.body.len());

    println!("Contents:");
    for entry in &doc.toc {
        println!("  {:<14} {}", entry.anchor, entry.label());
    }
    print_registry("Figures", &doc.figures);
    print_registry("Tables", &doc.tables);
    print_registry("Boxes", &doc.boxes);
    if !doc.assets.is_empty() {
        println!("Images: {}", doc.assets.len());
    }
    Ok(())
}

fn print_registry(name: &str, entries: &[RegistryEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("{name}:");
    for entry in entries {
        println!("  {:<14} {}", entry.anchor, entry.label);
    }
}

fn convert(cli: &Cli) -> Result<(), String> {
    let output = cli
        .output
        .as_deref()
        .ok_or_else(|| "no output file given".to_string())?;
    let format = match cli.format {
        Some(format) => Format::from(format),
        None => Format::from_path(output).ok_or_else(|| {
            format!(
                "cannot infer format of {}; use --format html|epub",
                output.display()
            )
        })?,
    };
    let linking = match format {
        Format::Html => ImageLinking::Embed,
        Format::Epub => ImageLinking::Bundle,
    };

    let (plan, document) = assemble(cli, linking)?;
    let mut report = Report::new(plan.meta, document);
    if let Some(path) = &cli.stylesheet {
        let css = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        report = report.with_stylesheet(css);
    }

    // The output file is only written once the export has succeeded.
    let bytes = dossier::export_report(&report, format).map_err(|e| e.to_string())?;
    std::fs::write(output, &bytes)
        .map_err(|e| format!("failed to write {}: {e}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        bytes = bytes.len(),
        figures = report.document.figures.len(),
        tables = report.document.tables.len(),
        "wrote report"
    );
    Ok(())
}
