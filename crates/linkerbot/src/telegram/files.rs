//! Telegram photos and image documents as a staging file source.

use async_trait::async_trait;
use linkercore::{FileSource, StagingError};
use std::path::Path;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, Message};
use tokio::io::AsyncWriteExt;

use crate::telegram::Bot;

/// Image extensions accepted from documents
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub struct TelegramFile {
    bot: Bot,
    file_id: FileId,
    extension: String,
}

impl TelegramFile {
    /// Picks the largest photo size, or an image document. `None` for anything else.
    pub fn from_message(bot: &Bot, msg: &Message) -> Option<Self> {
        let (file_id, extension) = image_of(msg)?;
        Some(Self {
            bot: bot.clone(),
            file_id,
            extension,
        })
    }

    pub fn is_image(msg: &Message) -> bool {
        image_of(msg).is_some()
    }
}

fn image_of(msg: &Message) -> Option<(FileId, String)> {
    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        // Telegram re-encodes photos as JPEG
        return Some((largest.file.id.clone(), "jpg".to_string()));
    }

    let doc = msg.document()?;
    let is_image_mime = doc
        .mime_type
        .as_ref()
        .map(|m| m.essence_str().starts_with("image/"))
        .unwrap_or(false);
    let extension = doc.file_name.as_deref().and_then(image_extension);

    match (is_image_mime, extension) {
        (_, Some(ext)) => Some((doc.file.id.clone(), ext)),
        (true, None) => Some((doc.file.id.clone(), "jpg".to_string())),
        (false, None) => None,
    }
}

fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[async_trait]
impl FileSource for TelegramFile {
    fn extension(&self) -> &str {
        &self.extension
    }

    async fn write_to(&self, dest: &Path) -> Result<u64, StagingError> {
        let file = self
            .bot
            .get_file(self.file_id.clone())
            .await
            .map_err(|e| StagingError::Fetch(e.to_string()))?;

        let mut dst = tokio::fs::File::create(dest).await?;
        self.bot
            .download_file(&file.path, &mut dst)
            .await
            .map_err(|e| StagingError::Fetch(e.to_string()))?;
        dst.flush().await?;

        log::debug!("Downloaded Telegram file {} to {}", file.path, dest.display());
        Ok(u64::from(file.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("Screenshot.PNG").as_deref(), Some("png"));
        assert_eq!(image_extension("photo.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(image_extension("notes.pdf"), None);
        assert_eq!(image_extension("README"), None);
    }
}
