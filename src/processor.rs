use crate::bazarr::{BazarrClient, TaskRunner};
use crate::config::Config;
use crate::import::ImportContext;
use crate::jellyfin::{run_library_tasks, JellyfinClient, LibraryApi, LibraryReport};
use crate::subtitles::{
    run_subtitle_tasks, SubtitleClassifier, SubtitleExtractor, SubtitlePolicy, SubtitleReport,
    TextClassifier,
};
use std::path::{Path, PathBuf};

/// Name of the marker that keeps the library scanner out of the folder.
pub const IGNORE_MARKER: &str = ".ignore";

/// Everything done for one import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostImportReport {
    pub subtitles: Option<SubtitleReport>,
    pub library: Option<LibraryReport>,
}

/// Runs the post-import steps for one imported video, start to finish.
///
/// Every step isolates its own failures; `run` always completes.
pub struct PostImportProcessor {
    config: Config,
    library: Box<dyn LibraryApi>,
    tasks: Box<dyn TaskRunner>,
    classifier: Box<dyn SubtitleClassifier>,
    extractor: Option<SubtitleExtractor>,
}

impl PostImportProcessor {
    pub fn new(config: Config) -> Self {
        let library = Box::new(JellyfinClient::new(&config.jellyfin, &config.http));
        let tasks = Box::new(BazarrClient::new(&config.bazarr, &config.http));

        let extractor = if config.subtitles.extract_embedded {
            match SubtitleExtractor::discover(&config.tools) {
                Ok(extractor) => Some(extractor),
                Err(e) => {
                    tracing::warn!("Embedded subtitle extraction disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            library,
            tasks,
            classifier: Box::new(TextClassifier),
            extractor,
        }
    }

    /// Build a processor from explicit collaborators.
    pub fn with_parts(
        config: Config,
        library: Box<dyn LibraryApi>,
        tasks: Box<dyn TaskRunner>,
        classifier: Box<dyn SubtitleClassifier>,
        extractor: Option<SubtitleExtractor>,
    ) -> Self {
        Self {
            config,
            library,
            tasks,
            classifier,
            extractor,
        }
    }

    pub fn library(&self) -> &dyn LibraryApi {
        self.library.as_ref()
    }

    pub fn classifier(&self) -> &dyn SubtitleClassifier {
        self.classifier.as_ref()
    }

    pub fn extractor(&self) -> Option<&SubtitleExtractor> {
        self.extractor.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, ctx: &ImportContext) -> PostImportReport {
        if ctx.is_test_event() {
            tracing::info!("{} test event received, nothing to do", ctx.source);
            return PostImportReport::default();
        }

        tracing::info!("Starting post import tasks for {:?}", ctx.video_path);
        let marker = ctx.video_dir().map(IgnoreMarker::place);

        let subtitles = if self.config.subtitles.enabled {
            let policy = SubtitlePolicy::from(&self.config.subtitles);
            Some(
                run_subtitle_tasks(
                    &ctx.video_path,
                    &policy,
                    self.classifier.as_ref(),
                    self.extractor.as_ref(),
                )
                .await,
            )
        } else {
            None
        };

        self.tasks.run_tasks(ctx.source).await;

        // Marked folders are skipped by the library scanner.
        drop(marker);

        let library = run_library_tasks(
            self.library.as_ref(),
            &self.config,
            ctx.source,
            &ctx.library_path(),
        )
        .await;

        tracing::info!("Finished post import tasks");
        PostImportReport { subtitles, library }
    }
}

/// `.ignore` marker removed on drop.
///
/// A marker that already existed belongs to the user and is left alone.
#[derive(Debug)]
pub struct IgnoreMarker {
    path: Option<PathBuf>,
}

impl IgnoreMarker {
    pub fn place(dir: &Path) -> Self {
        let path = dir.join(IGNORE_MARKER);
        if path.exists() {
            return Self { path: None };
        }

        match std::fs::write(&path, b"") {
            Ok(()) => {
                tracing::debug!("Created {:?}", path);
                Self { path: Some(path) }
            }
            Err(e) => {
                tracing::warn!("Failed to create {:?}: {}", path, e);
                Self { path: None }
            }
        }
    }

    pub fn is_owned(&self) -> bool {
        self.path.is_some()
    }
}

impl Drop for IgnoreMarker {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!("Removed {:?}", path),
                Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
            }
        }
    }
}
