//! Command handler modules for ach-cli.

pub mod db;
pub mod run;
pub mod serve;

use ach_config::WorkerConfig;
use ach_render::HttpObjectStore;
use std::sync::Arc;

/// Build the production `ObjectStore` from a validated `WorkerConfig`.
pub fn object_store_from_config(config: &WorkerConfig) -> Arc<dyn ach_render::ObjectStore> {
    Arc::new(HttpObjectStore::new(
        config.object_store_endpoint.clone(),
        config.object_store_bucket.clone(),
        config.object_store_secrets.access_key.clone(),
        config.object_store_secrets.secret_key.clone(),
    ))
}
