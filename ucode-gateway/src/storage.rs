//! MinIO (S3-compatible) object storage.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client;
use thiserror::Error;
use ucode_common::MinioConfig;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket listing failed: {0}")]
    List(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Sum of all object sizes in a bucket.
    async fn bucket_size_bytes(&self, bucket: &str) -> Result<u64, StorageError>;
}

pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub async fn connect(config: &MinioConfig) -> Self {
        let scheme = if config.secure { "https" } else { "http" };
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "ucode-minio",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(format!("{scheme}://{}", config.endpoint))
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        tracing::info!(endpoint = %config.endpoint, "Object storage client ready");
        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn bucket_size_bytes(&self, bucket: &str) -> Result<u64, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut total: u64 = 0;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::List(e.to_string()))?;
            total += page
                .contents()
                .iter()
                .filter_map(|object| object.size())
                .map(|size| size.max(0) as u64)
                .sum::<u64>();
        }
        Ok(total)
    }
}

/// Bytes to megabytes, rounded to two decimals.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    ((bytes as f64 / BYTES_PER_MB) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mb(1_572_864), 1.5);
        assert_eq!(bytes_to_mb(1_234_567), 1.18);
    }
}
