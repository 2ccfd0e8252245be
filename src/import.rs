//! The imported file, as described by the download manager.
//!
//! Radarr and Sonarr run custom scripts with the import described in
//! lowercase, source-prefixed environment variables.

use importforged_common::{Error, ImportSource, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportContext {
    pub source: ImportSource,
    pub event_type: String,
    /// Absolute path of the imported video.
    pub video_path: PathBuf,
    /// Video path relative to `root_path`.
    pub relative_path: Option<String>,
    /// Movie folder (Radarr) or series folder (Sonarr).
    pub root_path: Option<PathBuf>,
}

struct EnvNames {
    event_type: &'static str,
    file_path: &'static str,
    relative_path: &'static str,
    root_path: &'static str,
}

fn env_names(source: ImportSource) -> EnvNames {
    match source {
        ImportSource::Radarr => EnvNames {
            event_type: "radarr_eventtype",
            file_path: "radarr_moviefile_path",
            relative_path: "radarr_moviefile_relativepath",
            root_path: "radarr_movie_path",
        },
        ImportSource::Sonarr => EnvNames {
            event_type: "sonarr_eventtype",
            file_path: "sonarr_episodefile_path",
            relative_path: "sonarr_episodefile_relativepath",
            root_path: "sonarr_series_path",
        },
    }
}

impl ImportContext {
    pub fn new(source: ImportSource, video_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            event_type: "Download".to_string(),
            video_path: video_path.into(),
            relative_path: None,
            root_path: None,
        }
    }

    /// Read the context from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the context through `lookup`, trying Radarr then Sonarr names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for source in [ImportSource::Radarr, ImportSource::Sonarr] {
            let names = env_names(source);
            let Some(event_type) = get(names.event_type) else {
                continue;
            };

            let relative_path = get(names.relative_path);
            let root_path = get(names.root_path).map(PathBuf::from);
            let video_path = match (get(names.file_path), &root_path, &relative_path) {
                (Some(path), _, _) => PathBuf::from(path),
                (None, Some(root), Some(rel)) => root.join(rel),
                _ if event_type.eq_ignore_ascii_case("test") => PathBuf::new(),
                _ => {
                    return Err(Error::invalid_input(format!(
                        "{} is not set",
                        names.file_path
                    )))
                }
            };

            return Ok(Self {
                source,
                event_type,
                video_path,
                relative_path,
                root_path,
            });
        }

        Err(Error::invalid_input(
            "no Radarr or Sonarr import found in the environment",
        ))
    }

    /// Connection tests from the download manager carry no file.
    pub fn is_test_event(&self) -> bool {
        self.event_type.eq_ignore_ascii_case("test")
    }

    pub fn video_dir(&self) -> Option<&Path> {
        self.video_path.parent()
    }

    /// The video path as the library service reports it.
    pub fn library_path(&self) -> String {
        self.video_path.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn radarr_import() {
        let ctx = ImportContext::from_lookup(lookup(&[
            ("radarr_eventtype", "Download"),
            ("radarr_moviefile_path", "/movies/Film (2020)/Film.mkv"),
            ("radarr_moviefile_relativepath", "Film.mkv"),
            ("radarr_movie_path", "/movies/Film (2020)"),
        ]))
        .unwrap();

        assert_eq!(ctx.source, ImportSource::Radarr);
        assert_eq!(ctx.video_path, PathBuf::from("/movies/Film (2020)/Film.mkv"));
        assert_eq!(ctx.video_dir(), Some(Path::new("/movies/Film (2020)")));
        assert!(!ctx.is_test_event());
    }

    #[test]
    fn sonarr_path_from_root_and_relative() {
        let ctx = ImportContext::from_lookup(lookup(&[
            ("sonarr_eventtype", "Download"),
            ("sonarr_episodefile_relativepath", "Season 01/Show.S01E01.mkv"),
            ("sonarr_series_path", "/tv/Show"),
        ]))
        .unwrap();

        assert_eq!(ctx.source, ImportSource::Sonarr);
        assert_eq!(
            ctx.library_path(),
            "/tv/Show/Season 01/Show.S01E01.mkv".to_string()
        );
    }

    #[test]
    fn test_event_needs_no_file() {
        let ctx = ImportContext::from_lookup(lookup(&[("sonarr_eventtype", "Test")])).unwrap();
        assert!(ctx.is_test_event());
    }

    #[test]
    fn missing_file_is_invalid() {
        let err =
            ImportContext::from_lookup(lookup(&[("radarr_eventtype", "Download")])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn empty_environment_is_invalid() {
        assert!(ImportContext::from_lookup(lookup(&[])).is_err());
    }
}
