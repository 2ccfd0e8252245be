//! Extraction of text subtitle streams from the video container.

use crate::config::ToolsConfig;
use importforged_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Codecs ffmpeg can turn into SubRip.
const TEXT_CODECS: &[&str] = &["subrip", "srt", "ass", "ssa", "mov_text", "webvtt", "text"];

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_name: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// A subtitle stream of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStream {
    /// Absolute stream index inside the container.
    pub index: u32,
    pub codec: String,
    pub language: Option<String>,
}

impl SubtitleStream {
    pub fn is_text(&self) -> bool {
        TEXT_CODECS.contains(&self.codec.as_str())
    }
}

/// Runs ffprobe/ffmpeg to demux subtitles next to the video.
#[derive(Debug, Clone)]
pub struct SubtitleExtractor {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl SubtitleExtractor {
    pub fn new(ffprobe: PathBuf, ffmpeg: PathBuf) -> Self {
        Self { ffprobe, ffmpeg }
    }

    /// Find both tools, preferring configured paths over PATH lookup.
    pub fn discover(tools: &ToolsConfig) -> Result<Self> {
        Ok(Self {
            ffprobe: tool_path("ffprobe", tools.ffprobe_path.as_deref())?,
            ffmpeg: tool_path("ffmpeg", tools.ffmpeg_path.as_deref())?,
        })
    }

    /// Subtitle streams of `video`, in container order.
    pub async fn list_streams(&self, video: &Path) -> Result<Vec<SubtitleStream>> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "s",
            ])
            .arg(video)
            .output()
            .await
            .map_err(|e| Error::tool("ffprobe", e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool("ffprobe", stderr.trim()));
        }

        parse_streams(&output.stdout)
    }

    /// Extract every text subtitle stream of `video` as SubRip.
    ///
    /// Returns the written files in stream order. A stream that fails to
    /// extract is logged and left out.
    pub async fn extract(&self, video: &Path) -> Result<Vec<PathBuf>> {
        let streams = self.list_streams(video).await?;
        let mut written = Vec::new();

        for stream in streams.iter().filter(|s| s.is_text()) {
            let Some(target) = output_path(video, stream) else {
                continue;
            };

            let map = format!("0:{}", stream.index);
            let output = Command::new(&self.ffmpeg)
                .args(["-y", "-v", "error", "-i"])
                .arg(video)
                .args(["-map", map.as_str(), "-c:s", "srt"])
                .arg(&target)
                .output()
                .await
                .map_err(|e| Error::tool("ffmpeg", e.to_string()))?;

            if output.status.success() {
                tracing::info!("Extracted subtitle stream {} to {:?}", stream.index, target);
                written.push(target);
            } else {
                tracing::warn!(
                    "ffmpeg could not extract stream {} of {:?}: {}",
                    stream.index,
                    video,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
        }

        Ok(written)
    }
}

fn tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!("Configured {} path {:?} does not exist", name, path);
    }
    which::which(name).map_err(|_| Error::tool(name, "not found in PATH"))
}

fn parse_streams(json: &[u8]) -> Result<Vec<SubtitleStream>> {
    let output: FfprobeOutput = serde_json::from_slice(json)?;
    Ok(output
        .streams
        .into_iter()
        .map(|s| SubtitleStream {
            index: s.index,
            codec: s.codec_name.unwrap_or_default().to_lowercase(),
            language: s.tags.language.filter(|l| !l.is_empty()),
        })
        .collect())
}

/// `<dir>/<stem>.<index>.<lang>.srt` next to the video.
pub fn output_path(video: &Path, stream: &SubtitleStream) -> Option<PathBuf> {
    let dir = video.parent()?;
    let stem = video.file_stem()?.to_string_lossy();
    let language = stream.language.as_deref().unwrap_or("und");
    Some(dir.join(format!("{}.{}.{}.srt", stem, stream.index, language)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FFPROBE_JSON: &str = r#"{
        "streams": [
            {"index": 2, "codec_name": "subrip", "codec_type": "subtitle", "tags": {"language": "rum"}},
            {"index": 3, "codec_name": "hdmv_pgs_subtitle", "codec_type": "subtitle", "tags": {"language": "eng"}},
            {"index": 4, "codec_name": "ASS", "codec_type": "subtitle"}
        ]
    }"#;

    #[test]
    fn parses_ffprobe_streams() {
        let streams = parse_streams(FFPROBE_JSON.as_bytes()).unwrap();
        assert_eq!(streams.len(), 3);
        assert_eq!(streams[0].language.as_deref(), Some("rum"));
        assert!(streams[0].is_text());
        assert!(!streams[1].is_text());
        assert_eq!(streams[2].codec, "ass");
        assert!(streams[2].is_text());
        assert_eq!(streams[2].language, None);
    }

    #[test]
    fn empty_probe_has_no_streams() {
        assert!(parse_streams(b"{}").unwrap().is_empty());
        assert!(parse_streams(b"not json").is_err());
    }

    #[test]
    fn output_paths_sit_next_to_video() {
        let video = Path::new("/media/tv/Show/Season 1/Show.S01E01.mkv");
        let stream = SubtitleStream {
            index: 4,
            codec: "ass".into(),
            language: None,
        };
        assert_eq!(
            output_path(video, &stream).unwrap(),
            Path::new("/media/tv/Show/Season 1/Show.S01E01.4.und.srt")
        );
    }

    #[test]
    fn missing_tool_is_an_error() {
        let tools = ToolsConfig {
            ffmpeg_path: Some(PathBuf::from("/nonexistent/ffmpeg")),
            ffprobe_path: Some(PathBuf::from("/nonexistent/ffprobe")),
        };
        // Falls back to PATH; both outcomes are valid on a dev machine.
        match SubtitleExtractor::discover(&tools) {
            Ok(extractor) => assert!(extractor.ffprobe.exists()),
            Err(e) => assert!(matches!(e, Error::Tool { .. })),
        }
    }
}
