//! Re-encoding subtitles to UTF-8 and archiving processed originals.

use encoding_rs::Encoding;
use importforged_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Decode `file_path` as `source_encoding` and write it as UTF-8.
///
/// Writes to `destination`, or over the source when `None`. Returns the path
/// written.
pub fn try_convert_encoding(
    file_path: &Path,
    source_encoding: &str,
    destination: Option<&Path>,
) -> Result<PathBuf> {
    let encoding = Encoding::for_label(source_encoding.trim().as_bytes())
        .ok_or_else(|| Error::UnsupportedEncoding(source_encoding.to_string()))?;

    let bytes = std::fs::read(file_path)?;
    let (text, had_errors) = encoding.decode_with_bom_removal(&bytes);
    if had_errors {
        tracing::warn!(
            "{:?} has bytes invalid in {}, replaced with U+FFFD",
            file_path,
            encoding.name()
        );
    }
    tracing::info!(
        "Subtitle buffer converted from {} to UTF-8",
        encoding.name()
    );

    let save_location = destination.unwrap_or(file_path);
    std::fs::write(save_location, text.as_bytes())?;
    tracing::info!("Subtitle saved successfully in {:?}", save_location);

    Ok(save_location.to_path_buf())
}

/// Like [`try_convert_encoding`], but logs failures and reports success as
/// a flag.
pub fn convert_encoding(
    file_path: &Path,
    source_encoding: &str,
    destination: Option<&Path>,
) -> bool {
    match try_convert_encoding(file_path, source_encoding, destination) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Failed to convert {:?} to UTF-8: {}", file_path, e);
            false
        }
    }
}

/// `path` with `.<suffix>` appended to its file name.
pub fn archive_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Rename a processed original so it is never picked up again.
///
/// Best effort: failures are logged and give `None`.
pub fn archive(path: &Path, suffix: &str) -> Option<PathBuf> {
    let target = archive_path(path, suffix);
    match std::fs::rename(path, &target) {
        Ok(()) => {
            tracing::info!("Archived external source subtitle in {:?}", target);
            Some(target)
        }
        Err(e) => {
            tracing::error!("Failed to archive external subtitle {:?}: {}", path, e);
            None
        }
    }
}
