//! Destinations for imported listings.

use std::path::PathBuf;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::errors::ServiceError;
use crate::import::listing::Listing;

/// Persists one listing. Implementations must be idempotent: the importer
/// may call `save` several times for the same listing.
pub trait ListingSink: Send + Sync {
    fn save<'a>(&'a self, listing: &'a Listing) -> BoxFuture<'a, Result<(), ServiceError>>;
}

/// Writes each listing to `<dir>/<mls_number>.json`, overwriting.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File for `listing`. The MLS number is percent-encoded, so distinct
    /// MLS numbers never share a file.
    pub fn path_for(&self, listing: &Listing) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(&listing.mls_number)))
    }
}

impl ListingSink for FileSink {
    fn save<'a>(&'a self, listing: &'a Listing) -> BoxFuture<'a, Result<(), ServiceError>> {
        async move {
            tokio::fs::create_dir_all(&self.dir).await?;
            let body = serde_json::to_vec_pretty(listing)?;
            tokio::fs::write(self.path_for(listing), body).await?;
            Ok::<(), ServiceError>(())
        }
        .boxed()
    }
}
