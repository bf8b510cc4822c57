//! CLI binary for the icon extractor.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use icon_extractor::{
    ExtractionReport, ExtractorConfig, GridUnit, ImageCodec, NameSourceKind, ProgressCallback,
    ProgressEvent, resolve_names,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Slice a DDS icon sheet into individually named icon files.
#[derive(Parser)]
#[command(name = "icon-extractor", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Extract every icon listed in the manifest.
    Extract(ExtractArgs),

    /// Print the icon name map built from the configured name source.
    Names {
        /// Emit JSON instead of `icon<TAB>id` lines.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write a default configuration file.
    InitConfig {
        /// Destination (defaults to the per-user config path).
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Icon sheet image (DDS, or any raster format `image` reads).
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Manifest listing grid geometry and icon names.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Existing directory receiving the icons.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Unit of the manifest's sheet values.
    #[arg(long, value_enum)]
    grid_unit: Option<GridUnitArg>,

    /// Skip the full-sheet PNG snapshot.
    #[arg(long)]
    no_snapshot: bool,

    /// Write the run report as JSON to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(flatten)]
    source: SourceArgs,
}

/// Name source overrides shared by `extract` and `names`.
#[derive(Args)]
struct SourceArgs {
    /// Resolve names from `skill<ID>.h` files in this directory.
    #[arg(long, conflicts_with = "native_lib")]
    headers_dir: Option<PathBuf>,

    /// Resolve names through this native skill table library.
    #[arg(long)]
    native_lib: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum GridUnitArg {
    Pixels,
    Cells,
}

impl From<GridUnitArg> for GridUnit {
    fn from(arg: GridUnitArg) -> Self {
        match arg {
            GridUnitArg::Pixels => Self::Pixels,
            GridUnitArg::Cells => Self::Cells,
        }
    }
}

impl SourceArgs {
    fn apply(&self, config: &mut ExtractorConfig) {
        if let Some(dir) = &self.headers_dir {
            config.names.source = NameSourceKind::StaticHeaders;
            config.names.headers.dir = Some(dir.clone());
        }
        if let Some(lib) = &self.native_lib {
            config.names.source = NameSourceKind::Native;
            config.names.native.library = Some(lib.clone());
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("icon_extractor=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig { path } => init_config(path),
        Command::Names { json, source } => {
            let mut config = load_config(cli.config.as_deref())?;
            source.apply(&mut config);
            dump_names(&config, json)
        }
        Command::Extract(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            run_extract(&config, args.report.as_deref())
        }
    }
}

impl ExtractArgs {
    fn apply(&self, config: &mut ExtractorConfig) {
        if let Some(sheet) = &self.sheet {
            config.input.sheet = Some(sheet.clone());
        }
        if let Some(manifest) = &self.manifest {
            config.input.manifest = Some(manifest.clone());
        }
        if let Some(output) = &self.output {
            config.output.dir = Some(output.clone());
        }
        if let Some(unit) = self.grid_unit {
            config.grid.unit = unit.into();
        }
        if self.no_snapshot {
            config.output.snapshot = false;
        }
        self.source.apply(config);
    }
}

/// Explicit `--config`, else the default path if it exists, else built-in defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<ExtractorConfig> {
    if let Some(path) = path {
        return Ok(ExtractorConfig::from_file(path)?);
    }
    let default_path = ExtractorConfig::default_config_path();
    if default_path.is_file() {
        tracing::debug!(path = %default_path.display(), "using default config");
        return Ok(ExtractorConfig::from_file(&default_path)?);
    }
    Ok(ExtractorConfig::default())
}

fn init_config(path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let path = path.unwrap_or_else(ExtractorConfig::default_config_path);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    ExtractorConfig::default().save_to_file(&path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn dump_names(config: &ExtractorConfig, json: bool) -> anyhow::Result<ExitCode> {
    let request = config.to_request()?;
    let build = resolve_names(&request.names, request.decoder);
    for issue in &build.issues {
        eprintln!("warning: {issue}");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&build.map)?);
    } else {
        for (icon, id) in build.map.iter() {
            println!("{icon}\t{id}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_extract(config: &ExtractorConfig, report_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let request = config.to_request()?;

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("  {msg} [{bar:30}] {pos}/{len}") {
        pb.set_style(style);
    }
    let bar = pb.clone();
    let progress: ProgressCallback = Box::new(move |event| match event {
        ProgressEvent::ExtractionStarted { total } => {
            bar.set_length(total as u64);
            bar.set_message("icons");
        }
        ProgressEvent::IconWritten { .. } | ProgressEvent::IconFailed { .. } => bar.inc(1),
        ProgressEvent::ExtractionFinished { .. } => bar.finish_and_clear(),
        ProgressEvent::SheetDecoded { .. } | ProgressEvent::NamesResolved { .. } => {}
    });

    let result = icon_extractor::run(&request, &ImageCodec, Some(progress));
    pb.finish_and_clear();
    let report = result?;

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    print_summary(&report);

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn print_summary(report: &ExtractionReport) {
    println!(
        "{} icons: {} written, {} failed ({} per row)",
        report.total(),
        report.succeeded,
        report.failed,
        report.per_row
    );
    if report.overwritten > 0 {
        println!("  {} outputs were overwritten by later icons", report.overwritten);
    }
    for (record, error) in report.failures() {
        println!("  #{} {:?}: {error}", record.index, record.filename);
    }
    if !report.name_issues.is_empty() {
        println!("  {} name metadata problems skipped", report.name_issues.len());
    }
}
