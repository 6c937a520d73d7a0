//! Media Classifier - sort videos by date and round-trip audio tags
//!
//! A CLI tool that moves date-named videos into `YYYY/MM/DD` folders and
//! exports, edits and re-imports audio tags through CSV/JSON files.

use anyhow::{Result, bail};
use clap::Parser;
use media_classifier::classify::{FileResult, MoveStatus};
use media_classifier::cli::{Command, ExportArgs, OverwriteArgs, SortVideosArgs, TreeArgs};
use media_classifier::metadata::{RowResult, RowStatus};
use media_classifier::{
    Cli, Config, LoftyTagStore, LogSettings, MetadataExtractor, MetadataOverwriter,
    VideoClassifier,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

// CLI Output Module
mod cli_output {
    //! Colored summary output for the command line

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let _ = stdout().execute(Print(format!("  {}\n", title.bold())));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: usize, color: Color) {
        let _ = stdout().execute(Print(format!(
            "  {}: {}\n",
            style(key).with(CliTheme::HINT),
            style(value).with(color).bold()
        )));
    }

    /// One result line: status icon, source, destination or message
    pub fn print_result(icon: &str, color: Color, source: &str, detail: &str) {
        let _ = stdout().execute(Print(format!(
            "  {} {} {}\n",
            style(icon).with(color).bold(),
            style(source).italic(),
            style(detail).with(CliTheme::HINT)
        )));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        Config::write_sample_config(path)?;
        println!("Sample configuration written to {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let _log_guard = LogSettings::from_config(&config, cli.command.label()).install_scoped()?;

    info!(version = env!("CARGO_PKG_VERSION"), command = cli.command.label(), "Media classifier starting");
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    match &cli.command {
        Command::SortVideos(args) => run_sort_videos(&config, args),
        Command::ExportMetadata(args) => run_export(&config, args),
        Command::OverwriteMetadata(args) => run_overwrite(&config, args),
        Command::InitConfig { .. } => Ok(()),
    }
}

/// Resolve config path - `name` also finds `name.toml`
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }
    config_path.with_extension("toml")
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref config_path) => {
            let file_config = Config::load_from_file(resolve_config_path(config_path))?;
            cli.merge_with_config(file_config)
        }
        None => cli.to_config(),
    };
    Ok(config)
}

/// Check that the root directory of a tree command exists
fn validate_root(tree: &TreeArgs) -> Result<()> {
    if !tree.directory.is_dir() {
        error!(directory = %tree.directory.display(), "Root directory does not exist");
        bail!("Root directory does not exist: {}", tree.directory.display());
    }
    Ok(())
}

fn run_sort_videos(config: &Config, args: &SortVideosArgs) -> Result<()> {
    use cli_output::*;

    validate_root(&args.tree)?;
    let traversal = config.traversal(&args.tree.directory, args.tree.pattern.clone());
    let mut classifier = VideoClassifier::new(traversal, config)?;
    let results = classifier.run();
    let stats = classifier.stats();

    print_separator();
    print_title("Video sorting complete");
    print_separator();
    print_stat("Moved", stats.moved, CliTheme::SUCCESS);
    print_stat("Dry run", stats.dry_run, CliTheme::ACCENT);
    print_stat("Already in place", stats.in_place, CliTheme::WARNING);
    print_stat("Failed", stats.failed, CliTheme::ERROR);

    if config.verbose || stats.failed > 0 {
        print_separator();
        for result in &results {
            print_move(result, config.verbose);
        }
    }

    if config.dry_run {
        print_separator();
        print_warning("Dry run: no files were moved");
    }
    Ok(())
}

fn print_move(result: &FileResult, verbose: bool) {
    use cli_output::*;

    let source = result.source.display().to_string();
    let destination = format!("→ {}", result.destination.display());
    match result.status {
        MoveStatus::Moved if verbose => print_result("✓", CliTheme::SUCCESS, &source, &destination),
        MoveStatus::DryRun if verbose => print_result("~", CliTheme::ACCENT, &source, &destination),
        MoveStatus::AlreadyInPlace if verbose => {
            print_result("=", CliTheme::WARNING, &source, "already in place")
        }
        MoveStatus::Failed => print_result(
            "✗",
            CliTheme::ERROR,
            &source,
            result.error.as_deref().unwrap_or("unknown error"),
        ),
        _ => {}
    }
}

fn run_export(config: &Config, args: &ExportArgs) -> Result<()> {
    use cli_output::*;

    validate_root(&args.tree)?;
    let traversal = config.traversal(&args.tree.directory, args.tree.pattern.clone());
    let store = LoftyTagStore::new();
    let table = MetadataExtractor::new(&store, config).collect(&traversal);

    let path = match table.export(config.export_format, args.output.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            error!(error = %e, records = table.len(), "Failed to write exchange file");
            bail!("Failed to write exchange file: {}", e);
        }
    };

    print_separator();
    print_title("Metadata export complete");
    print_separator();
    print_stat("Records", table.len(), CliTheme::SUCCESS);
    print_result("✓", CliTheme::SUCCESS, "written to", &path.display().to_string());
    Ok(())
}

fn run_overwrite(config: &Config, args: &OverwriteArgs) -> Result<()> {
    use cli_output::*;

    let store = LoftyTagStore::new();
    let mut overwriter = MetadataOverwriter::new(&store, config.dry_run);
    let results = match overwriter.overwrite(&args.input) {
        Ok(results) => results,
        Err(e) => {
            error!(input = %args.input.display(), error = %e, "Cannot read exchange file");
            bail!("Cannot read exchange file {}: {}", args.input.display(), e);
        }
    };
    let stats = overwriter.stats();

    print_separator();
    print_title("Metadata overwrite complete");
    print_separator();
    print_stat("Written", stats.written, CliTheme::SUCCESS);
    print_stat("Dry run", stats.dry_run, CliTheme::ACCENT);
    print_stat("Skipped", stats.skipped, CliTheme::WARNING);
    print_stat("Failed", stats.failed, CliTheme::ERROR);

    if config.verbose || config.dry_run || stats.failed > 0 {
        print_separator();
        for result in &results {
            print_row(result, config.verbose || config.dry_run);
        }
    }

    if config.dry_run {
        print_separator();
        print_warning("Dry run: no tags were saved");
    }
    Ok(())
}

fn print_row(result: &RowResult, verbose: bool) {
    use cli_output::*;

    let source = match &result.file {
        Some(file) => file.display().to_string(),
        None => format!("line {}", result.line),
    };
    let values = result
        .tags
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ");

    match result.status {
        RowStatus::Written if verbose => print_result("✓", CliTheme::SUCCESS, &source, &values),
        RowStatus::DryRun => print_result("~", CliTheme::ACCENT, &source, &values),
        RowStatus::Skipped if verbose => print_result(
            "⊘",
            CliTheme::WARNING,
            &source,
            result.message.as_deref().unwrap_or("skipped"),
        ),
        RowStatus::Failed => print_result(
            "✗",
            CliTheme::ERROR,
            &source,
            result.message.as_deref().unwrap_or("unknown error"),
        ),
        _ => {}
    }
}
