use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Write-only external blob sink. The core assumes the bucket already
/// exists; it never creates or lists it. A real implementation wraps an
/// S3-compatible client; `MemoryObjectStore` is the in-process test double.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PutRecord {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
    pub metadata: HashMap<String, String>,
}

/// In-memory `ObjectStore` for tests: records every `put` under its key,
/// overwriting on re-upload like a real bucket would.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: std::sync::Mutex<HashMap<String, PutRecord>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<PutRecord> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            PutRecord {
                bytes,
                content_type: content_type.to_string(),
                cache_control: cache_control.to_string(),
                metadata,
            },
        );
        Ok(())
    }
}

/// `ObjectStore` backed by a plain HTTP PUT to an S3-compatible gateway
/// (path-style `{endpoint}/{bucket}/{key}`), authenticated with access/secret
/// key headers rather than full AWS SigV4 request signing. SigV4 is out of
/// scope here: this worker's external collaborator is "a keyed blob sink",
/// and self-hosted gateways (e.g. a MinIO instance fronted by an
/// access-key-aware proxy) commonly accept this simpler header scheme.
/// Swap this for a signing client if a provider requires SigV4.
pub struct HttpObjectStore {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: String, bucket: String, access_key: String, secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            access_key,
            secret_key,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);

        let mut req = self
            .http
            .put(&url)
            .header("content-type", content_type)
            .header("cache-control", cache_control)
            .header("x-access-key", &self.access_key)
            .header("x-secret-key", &self.secret_key);

        for (k, v) in &metadata {
            req = req.header(format!("x-amz-meta-{k}"), v);
        }

        let resp = req
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("object store PUT failed for key {key}"))?;

        if !resp.status().is_success() {
            anyhow::bail!(
                "object store PUT for key {key} returned status {}",
                resp.status()
            );
        }

        Ok(())
    }
}
