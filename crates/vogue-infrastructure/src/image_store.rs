//! Reading photos from disk and saving generated looks.

use std::path::Path;

use vogue_core::{ImagePayload, VogueError};

const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/heic"];

/// Reads an image file into a payload, guessing the MIME type from the
/// extension.
pub async fn read_image(path: impl AsRef<Path>) -> Result<ImagePayload, VogueError> {
    let path = path.as_ref();
    let mime = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .ok_or_else(|| {
            VogueError::image(format!("Cannot determine image type of {}", path.display()))
        })?;

    if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(VogueError::image(format!(
            "Unsupported image type {mime} for {}",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(VogueError::image(format!("{} is empty", path.display())));
    }

    tracing::debug!(path = %path.display(), %mime, bytes = bytes.len(), "[Images] read");
    Ok(ImagePayload::from_bytes(mime, &bytes))
}

/// Decodes `image` and writes the raw bytes to `path`, creating parent
/// directories as needed.
pub async fn write_image(path: impl AsRef<Path>, image: &ImagePayload) -> Result<(), VogueError> {
    let path = path.as_ref();
    let bytes = image.decode()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &bytes).await?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "[Images] saved");
    Ok(())
}
