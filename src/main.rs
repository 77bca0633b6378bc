//! manga-batch - Batch Manga Page Translation
//!
//! Command-line entry point: queues the pages of a manga folder for the
//! external translation tool, shows progress, and exposes the selective
//! text translation pass.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use manga_batch::batch::{
    CommandTemplate, ImageFilter, JobOptions, Orchestrator, ProcessRunner, enumerate_work_items,
};
use manga_batch::cli::{Args, Commands};
use manga_batch::config::Config;
use manga_batch::error::MangaBatchError;
use manga_batch::translate::{BackendFactory, SelectiveConfig, SelectiveTranslator, supported_languages};

const DEFAULT_CONFIG_FILE: &str = "manga-batch.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    let _guard = setup_logging(args.verbose)?;
    info!("Starting manga-batch");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Batch { root, start, translator, language, box_threshold, text_threshold, align_center } => {
            let mut options = JobOptions::from_config(&config.job)?;
            if let Some(translator) = translator {
                options.translator = translator;
            }
            if let Some(language) = language {
                options.language = language;
            }
            if let Some(value) = box_threshold {
                options.box_threshold = value;
            }
            if let Some(value) = text_threshold {
                options.text_threshold = value;
            }
            options.align_center |= align_center;

            run_batch_command(&config, &root, start.as_deref(), &options).await?;
        }
        Commands::Scan { root, start } => {
            let queue = enumerate_work_items(&root, start.as_deref(), &ImageFilter::from(&config.scan))?;
            let base = std::path::absolute(&root)?;

            println!("\n{} files queued under {}:", queue.len(), base.display());
            for item in &queue {
                let shown = pathdiff::diff_paths(&item.path, &base).unwrap_or_else(|| item.path.clone());
                println!("{:>5}  {}", item.index + 1, shown.display());
            }
        }
        Commands::Translate { source_lang, target_lang, file, queries } => {
            let selective = SelectiveConfig::new(
                source_lang.unwrap_or_else(|| config.translate.source_lang.clone()),
                target_lang.unwrap_or_else(|| config.translate.target_lang.clone()),
            );

            let mut all_queries = Vec::new();
            if let Some(file) = &file {
                let content = tokio::fs::read_to_string(file).await?;
                all_queries.extend(content.lines().map(str::to_string));
            }
            all_queries.extend(queries);
            if all_queries.is_empty() {
                return Err(MangaBatchError::Config("No text to translate".to_string()).into());
            }

            info!("Translating {} strings from {} to {}", all_queries.len(), selective.source_lang, selective.target_lang);
            let translator = SelectiveTranslator::new(BackendFactory::create_backend(config.translate.clone())?);
            for translated in translator.translate_all(&selective, &all_queries).await? {
                println!("{}", translated);
            }
        }
        Commands::Languages => {
            println!("\nSupported Languages:");
            println!("{:<6} {:<8}", "Tag", "Code");
            println!("{}", "-".repeat(15));
            for (tag, code) in supported_languages() {
                println!("{:<6} {:<8}", tag, code);
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    info!("manga-batch completed successfully");
    Ok(())
}

async fn run_batch_command(config: &Config, root: &Path, start: Option<&Path>, options: &JobOptions) -> Result<()> {
    info!("Processing folder: {}", root.display());

    // Validation happens before anything is spawned
    let template = CommandTemplate::build(&config.tool, options)?;
    let poll_interval = config.supervisor.poll_interval()?;
    let queue = enumerate_work_items(root, start, &ImageFilter::from(&config.scan))?;

    let orchestrator = Orchestrator::new(template, Arc::new(ProcessRunner::new()), poll_interval);
    let handle = orchestrator.start(queue);
    info!("Batch {} started with {} files", handle.run_id(), handle.total());

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current file");
            cancel.cancel();
        }
    });

    let pb = ProgressBar::new(handle.total() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")?
        .progress_chars("#>-"));

    let result = handle.supervise(|completed, _total| pb.set_position(completed as u64)).await;

    match result {
        Ok(summary) => {
            pb.finish();
            println!("All {} files were processed successfully!", summary.processed);
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".manga-batch").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "manga-batch.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_names(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("manga-batch.log").display());

    Ok(guard)
}
