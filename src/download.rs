use std::path::Path;

use anyhow::Result;
use bytes::Bytes;
use tempfile::NamedTempFile;
use url::Url;

/// An emoji image fetched from the gallery, not yet on disk.
#[derive(Default, Debug)]
pub struct Download {
    pub extension: Option<String>,
    pub data: Bytes,
}

impl Download {
    pub fn new(url: &str, data: Bytes) -> Download {
        Self {
            extension: extension_of(url),
            data,
        }
    }

    /// Write the image to a fresh temporary file. The file is deleted when
    /// the returned handle is dropped.
    pub async fn save_to_temp_file(&self) -> Result<NamedTempFile> {
        let suffix = self
            .extension
            .as_deref()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix("slackmojify-")
            .suffix(&suffix)
            .tempfile()?;
        tokio::fs::write(file.path(), &self.data).await?;
        Ok(file)
    }
}

fn extension_of(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let file_name = url.path_segments()?.last()?.to_owned();
    Path::new(&file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
