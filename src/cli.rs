//! CLI argument parsing with clap

use crate::config::{Config, ExportFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Media Classifier - sort videos by date and round-trip audio tags
///
/// Moves videos named `YYYYMMDD_HHMMSS.<ext>` into `YYYY/MM/DD` folders,
/// exports audio tags to CSV or JSON, and writes edited CSV values back.
#[derive(Parser, Debug)]
#[command(name = "media-classifier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI arguments override them.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose (debug) output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log records as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    /// Write timestamped log files into this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move videos into date folders (or the fallback folder)
    SortVideos(SortVideosArgs),
    /// Export audio tags to an exchange file
    ExportMetadata(ExportArgs),
    /// Apply an edited CSV exchange file back onto audio files
    OverwriteMetadata(OverwriteArgs),
    /// Write a sample configuration file
    InitConfig {
        /// Where to write the sample configuration
        path: PathBuf,
    },
}

/// Options shared by commands that walk a directory tree
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// Root directory to process
    #[arg(short, long)]
    pub directory: PathBuf,

    /// Only consider files whose name contains this text
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Comma separated folder names to skip
    #[arg(long, value_delimiter = ',')]
    pub ignore_folders: Option<Vec<String>>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SortVideosArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Exchange format
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output file (default: music_metadata.<format>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct OverwriteArgs {
    /// CSV exchange file to apply
    #[arg(short, long)]
    pub input: PathBuf,

    /// Dry run mode - show the values that would be written
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Command {
    /// Short name used for log file naming
    pub fn label(&self) -> &'static str {
        match self {
            Command::SortVideos(_) => "sort-videos",
            Command::ExportMetadata(_) => "export-metadata",
            Command::OverwriteMetadata(_) => "overwrite-metadata",
            Command::InitConfig { .. } => "init-config",
        }
    }

    fn tree(&self) -> Option<&TreeArgs> {
        match self {
            Command::SortVideos(args) => Some(&args.tree),
            Command::ExportMetadata(args) => Some(&args.tree),
            _ => None,
        }
    }
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if self.verbose {
            config.verbose = true;
        }
        if self.json_log {
            config.json_log = true;
        }
        if let Some(ref log_dir) = self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }

        if let Some(tree) = self.command.tree() {
            if let Some(ref folders) = tree.ignore_folders {
                config.ignore_folders = folders
                    .iter()
                    .map(|f| f.trim())
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            if tree.recursive {
                config.recursive = true;
            }
        }

        match &self.command {
            Command::SortVideos(args) if args.dry_run => config.dry_run = true,
            Command::OverwriteMetadata(args) if args.dry_run => config.dry_run = true,
            Command::ExportMetadata(args) => {
                if let Some(format) = args.format {
                    config.export_format = format;
                }
            }
            _ => {}
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
