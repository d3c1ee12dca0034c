use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use weekly_seo_report::services::UploadSink;

/// Uploads report folders to an S3 bucket.
///
/// Objects land under `<prefix>/<folder name>/<relative path>`. Keys already
/// present are overwritten in place.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    gzip: bool,
}

impl S3Sink {
    pub async fn from_env(bucket: impl Into<String>, prefix: impl Into<String>, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
            prefix: prefix.into(),
            gzip,
        }
    }

    async fn existing_keys(&self, folder_prefix: &str) -> Result<HashSet<String>> {
        let mut keys = HashSet::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(folder_prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            for object in page?.contents() {
                if let Some(key) = object.key() {
                    keys.insert(key.to_string());
                }
            }
        }

        Ok(keys)
    }
}

/// Every regular file under `root`, in file-name order. Symlinks are not
/// followed.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Joins key parts with `/`, skipping empty ones.
fn object_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn relative_key(root: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(root)?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("md") => "text/markdown; charset=utf-8",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn gzip_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[async_trait]
impl UploadSink for S3Sink {
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket, gzip = self.gzip))]
    async fn upload_folder(&self, local_path: &Path) -> Result<String> {
        let folder_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Cannot upload {}: no folder name", local_path.display()))?;
        let folder_prefix = format!("{}/", object_key(&[self.prefix.as_str(), folder_name]));

        let existing = self.existing_keys(&folder_prefix).await?;
        debug!(existing = existing.len(), prefix = %folder_prefix, "Listed remote folder");

        let mut created = 0;
        let mut updated = 0;

        for path in collect_files(local_path)? {
            let relative = relative_key(local_path, &path)?;
            let contents = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            let (body, key, mime) = if self.gzip {
                let key = format!("{}.gz", object_key(&[folder_prefix.as_str(), relative.as_str()]));
                (gzip_bytes(&contents)?, key, "application/gzip")
            } else {
                let key = object_key(&[folder_prefix.as_str(), relative.as_str()]);
                (contents, key, content_type(&path))
            };

            let replacing = existing.contains(&key);

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&key)
                .body(ByteStream::from(body))
                .content_type(mime)
                .send()
                .await
                .with_context(|| format!("Failed to upload s3://{}/{}", self.bucket, key))?;

            if replacing {
                updated += 1;
                debug!(key = %key, "Updated object");
            } else {
                created += 1;
                debug!(key = %key, "Created object");
            }
        }

        info!(created, updated, prefix = %folder_prefix, "S3 upload complete");
        Ok(format!("s3://{}/{}", self.bucket, folder_prefix))
    }
}
