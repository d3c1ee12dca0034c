//! Trait for remote storage that receives the finished report folder.

use anyhow::Result;
use std::path::Path;

/// Uploads a local folder tree and returns the remote folder id.
///
/// Implementations match existing remote entries by name and update them
/// rather than creating duplicates, so uploading the same folder twice is
/// safe.
#[async_trait::async_trait]
pub trait UploadSink: Send + Sync {
    async fn upload_folder(&self, local_path: &Path) -> Result<String>;
}
