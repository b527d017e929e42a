/// Save-to-disk flow for generated images
///
/// Fetches the image behind the current URL, asks the user where to
/// put it via the native save dialog, and writes the bytes. The
/// suggested filename is derived from the prompt.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Appended to the truncated prompt to form the suggested filename
pub const FILE_NAME_SUFFIX: &str = "-ai-generated.png";

/// Longest prompt prefix carried into the filename
pub const FILE_NAME_PROMPT_CHARS: usize = 30;

/// Suggested filename for a prompt: its first 30 characters plus the
/// fixed suffix. Counted in characters, not bytes, so multi-byte text
/// is never split.
pub fn file_name_for(prompt: &str) -> String {
    let stem: String = prompt.chars().take(FILE_NAME_PROMPT_CHARS).collect();
    format!("{stem}{FILE_NAME_SUFFIX}")
}

/// Errors from downloading an image to disk
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Fetch(#[from] crate::api::FetchError),

    #[error("could not write file: {0}")]
    Write(#[from] std::io::Error),
}

/// Write image bytes to `path`
pub async fn write_image(path: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Fetch the image behind `url` and walk the user through saving it.
///
/// The save dialog is pre-filled with `file_name` and starts in the
/// user's Downloads directory when one is known. Returns the chosen
/// path, or `None` when the user cancels the dialog. The response body
/// and file handle are dropped on return.
pub async fn save_image(
    url: String,
    file_name: String,
) -> Result<Option<PathBuf>, DownloadError> {
    let bytes = crate::api::fetch_bytes(url).await?;

    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Save generated image")
        .set_file_name(&file_name);
    if let Some(dir) = dirs::download_dir() {
        dialog = dialog.set_directory(dir);
    }

    let Some(choice) = dialog.save_file().await else {
        return Ok(None);
    };

    let path = choice.path().to_path_buf();
    write_image(&path, &bytes).await?;
    Ok(Some(path))
}
