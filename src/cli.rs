use clap::{Parser, Subcommand};
use importforged_common::ImportSource;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "importforged")]
#[command(author, version, about = "Post-import tasks for Radarr/Sonarr imports")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all post-import tasks (import read from the environment by default)
    Run {
        /// Download manager that imported the file
        #[arg(long, requires = "file")]
        source: Option<ImportSource>,

        /// Absolute path of the imported video
        #[arg(long, requires = "source")]
        file: Option<PathBuf>,

        /// Video path relative to --root
        #[arg(long)]
        relative: Option<String>,

        /// Movie or series folder
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Trigger one Jellyfin scheduled task by key
    TriggerTask {
        /// Task key, e.g. RefreshChapterImages
        #[arg(required = true)]
        key: String,
    },

    /// Wait until Jellyfin lists an item with this path
    WaitSync {
        #[arg(required = true)]
        path: String,
    },

    /// Run only the subtitle pipeline for a video
    Subtitles {
        /// Imported video file
        #[arg(required = true)]
        video: PathBuf,
    },

    /// Detect the language and encoding of a subtitle file
    Detect {
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
