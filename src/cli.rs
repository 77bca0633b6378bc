use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::batch::TranslatorKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every image under a folder, one tool invocation per image
    Batch {
        /// Folder containing the chapters to process
        #[arg(short, long)]
        root: PathBuf,

        /// Subfolder of the root to start from (optional)
        #[arg(short, long)]
        start: Option<PathBuf>,

        /// Translator used by the per-image tool
        #[arg(short, long, value_enum)]
        translator: Option<TranslatorKind>,

        /// Target language tag
        #[arg(short, long)]
        language: Option<String>,

        /// Bounding box threshold (raise to include more boxes)
        #[arg(long)]
        box_threshold: Option<String>,

        /// Text threshold (lower to include more text regions)
        #[arg(long)]
        text_threshold: Option<String>,

        /// Center-align rendered text
        #[arg(long)]
        align_center: bool,
    },

    /// Print the processing queue without running anything
    Scan {
        /// Folder containing the chapters to process
        #[arg(short, long)]
        root: PathBuf,

        /// Subfolder of the root to start from (optional)
        #[arg(short, long)]
        start: Option<PathBuf>,
    },

    /// Translate only the latin-script runs of the given strings
    Translate {
        /// Source language tag (e.g. ENG, or auto)
        #[arg(long = "from")]
        source_lang: Option<String>,

        /// Target language tag (e.g. FRA)
        #[arg(long = "to")]
        target_lang: Option<String>,

        /// Read one query per line from this file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Strings to translate
        queries: Vec<String>,
    },

    /// List supported language tags and their backend codes
    Languages,

    /// Write the default configuration file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "manga-batch.toml")]
        output: PathBuf,
    },
}
