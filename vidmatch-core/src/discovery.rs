//! File discovery for comparison inputs.
//!
//! Scans the top level of a directory for video files (.mp4, .avi, .mkv,
//! case-insensitive). Hidden files are skipped and the result is sorted so
//! pair order is stable across runs.

use crate::error::{CoreError, CoreResult};
use crate::utils::has_video_extension;

use std::path::{Path, PathBuf};

/// Finds video files in `input_dir` (non-recursive).
///
/// # Errors
///
/// * [`CoreError::PathError`] if `input_dir` is not a directory
/// * [`CoreError::Io`] if the directory cannot be read
/// * [`CoreError::NoFilesFound`] if it contains no video files
///
/// # Examples
///
/// ```rust,no_run
/// use vidmatch_core::find_video_files;
/// use std::path::Path;
///
/// match find_video_files(Path::new("/path/to/videos")) {
///     Ok(files) => println!("Found {} videos", files.len()),
///     Err(e) => println!("Error finding video files: {e}"),
/// }
/// ```
pub fn find_video_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(CoreError::PathError(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() || is_hidden(&path) {
                return None;
            }
            has_video_extension(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort();
    log::debug!(
        "Found {} video files in {}",
        files.len(),
        input_dir.display()
    );
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
