mod cli;

use importforged::{
    config,
    import::ImportContext,
    jellyfin::{trigger_task, SyncPoller},
    processor::PostImportProcessor,
    subtitles::{self, SubtitleClassifier, SubtitlePolicy, TextClassifier},
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "importforged=debug,importforged_common=debug".to_string()
        } else {
            "importforged=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            source,
            file,
            relative,
            root,
        } => {
            let ctx = match (source, file) {
                (Some(source), Some(file)) => {
                    let mut ctx = ImportContext::new(source, file);
                    ctx.relative_path = relative;
                    ctx.root_path = root;
                    ctx
                }
                _ => ImportContext::from_env()?,
            };
            block_on(run_import(config_path, ctx))
        }
        Commands::TriggerTask { key } => block_on(run_trigger_task(config_path, &key)),
        Commands::WaitSync { path } => block_on(run_wait_sync(config_path, &path)),
        Commands::Subtitles { video } => block_on(run_subtitles(config_path, video)),
        Commands::Detect { file, json } => detect_file(&file, json),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or_else(|| cli.config.clone());
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("importforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    // Everything runs sequentially; one thread is enough.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(future)
}

async fn run_import(config_path: Option<&Path>, ctx: ImportContext) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let processor = PostImportProcessor::new(config);
    let report = processor.run(&ctx).await;

    tracing::debug!("Post import report: {:?}", report);
    Ok(())
}

async fn run_trigger_task(config_path: Option<&Path>, key: &str) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let processor = PostImportProcessor::new(config);

    let outcome = trigger_task(processor.library(), key).await;
    println!("{}: {:?}", key, outcome);
    Ok(())
}

async fn run_wait_sync(config_path: Option<&Path>, path: &str) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let processor = PostImportProcessor::new(config);

    let outcome = SyncPoller::from_config(processor.library(), &processor.config().sync)
        .wait_for_sync(path)
        .await;
    println!("{}: {:?}", path, outcome);
    Ok(())
}

async fn run_subtitles(config_path: Option<&Path>, video: PathBuf) -> Result<()> {
    if !video.is_file() {
        anyhow::bail!("Video file does not exist: {:?}", video);
    }

    let config = config::load_config_or_default(config_path)?;
    let processor = PostImportProcessor::new(config);
    let policy = SubtitlePolicy::from(&processor.config().subtitles);

    let report = subtitles::run_subtitle_tasks(
        &video,
        &policy,
        processor.classifier(),
        processor.extractor(),
    )
    .await;

    if let Some((path, outcome)) = &report.external {
        println!("External: {} -> {:?}", path.display(), outcome);
    }
    for (path, outcome) in &report.extracted {
        println!("Extracted: {} -> {:?}", path.display(), outcome);
    }
    if !report.has_accepted() {
        println!("No {} subtitle secured", policy.target_language);
    }
    Ok(())
}

fn detect_file(file: &Path, json: bool) -> Result<()> {
    let Some(report) = TextClassifier.detect(file) else {
        anyhow::bail!("Could not read {:?}", file);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File: {}", file.display());
        println!("Language: {} ({:.2})", report.language, report.language_confidence);
        println!("Encoding: {} ({:.2})", report.encoding, report.encoding_confidence);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Jellyfin configured: {}", config.jellyfin.is_configured());
    println!("  Bazarr configured: {}", config.bazarr.is_configured());
    println!(
        "  Target subtitle language: {} ({})",
        config.subtitles.target_language, config.subtitles.language_tag
    );
    println!(
        "  Sync: {} attempts every {} ms",
        config.sync.max_attempts, config.sync.interval_ms
    );
    Ok(())
}
