//! Chunked encoding of oversized session values.
//!
//! A value that fits in one chunk is stored under its own key. A larger
//! value is split into `key.0`, `key.1`, ... and the chunk count is written
//! under the manifest key `key.chunks`. Readers consult the manifest first.

use thiserror::Error;

use crate::config::SessionConfig;
use crate::session::store::ScopedStore;

const MANIFEST_SUFFIX: &str = "chunks";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("chunk size must be at least 1 byte")]
    InvalidChunkSize,

    #[error("manifest for '{key}' is not a chunk count: '{value}'")]
    InvalidManifest { key: String, value: String },

    #[error("chunk {index} of '{key}' is missing")]
    MissingChunk { key: String, index: usize },
}

/// Splits and joins session values around a per-entry size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedCodec {
    chunk_size: usize,
}

impl ChunkedCodec {
    pub fn new(chunk_size: usize) -> Result<Self, SessionError> {
        if chunk_size == 0 {
            return Err(SessionError::InvalidChunkSize);
        }
        Ok(Self { chunk_size })
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        Self::new(config.chunk_size)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn manifest_key(key: &str) -> String {
        format!("{}.{}", key, MANIFEST_SUFFIX)
    }

    pub fn chunk_key(key: &str, index: usize) -> String {
        format!("{}.{}", key, index)
    }

    /// Store `value` under `key`, chunking it when it exceeds the limit.
    ///
    /// Returns the number of chunks written (0 when stored unchunked).
    pub fn write<S: ScopedStore>(&self, store: &mut S, key: &str, value: &str) -> usize {
        let previous = stored_chunk_count(store, key).unwrap_or(0);

        if value.len() <= self.chunk_size {
            store.set(key, value.to_string());
            store.remove(&Self::manifest_key(key));
            remove_chunks(store, key, 0..previous);
            return 0;
        }

        let chunks = split_on_char_boundaries(value, self.chunk_size);
        store.remove(key);
        for (index, chunk) in chunks.iter().enumerate() {
            store.set(&Self::chunk_key(key, index), (*chunk).to_string());
        }
        store.set(&Self::manifest_key(key), chunks.len().to_string());
        remove_chunks(store, key, chunks.len()..previous);

        tracing::debug!(
            key = %key,
            chunks = chunks.len(),
            bytes = value.len(),
            "Stored chunked session value"
        );
        chunks.len()
    }

    /// Read the value stored under `key`, joining chunks if needed.
    pub fn read<S: ScopedStore>(
        &self,
        store: &S,
        key: &str,
    ) -> Result<Option<String>, SessionError> {
        let count = match manifest(store, key) {
            Some(count) => count?,
            None => return Ok(store.get(key)),
        };

        let mut value = String::new();
        for index in 0..count {
            let chunk = store
                .get(&Self::chunk_key(key, index))
                .ok_or_else(|| SessionError::MissingChunk { key: key.to_string(), index })?;
            value.push_str(&chunk);
        }
        Ok(Some(value))
    }

    /// Remove the value under `key` together with any chunks and manifest.
    pub fn clear<S: ScopedStore>(&self, store: &mut S, key: &str) {
        let count = stored_chunk_count(store, key).unwrap_or(0);
        store.remove(key);
        remove_chunks(store, key, 0..count);
        store.remove(&Self::manifest_key(key));
    }
}

impl Default for ChunkedCodec {
    fn default() -> Self {
        Self { chunk_size: SessionConfig::default().chunk_size }
    }
}

/// Chunk count recorded in the manifest, ignoring an unreadable one.
fn stored_chunk_count<S: ScopedStore>(store: &S, key: &str) -> Option<usize> {
    manifest(store, key).and_then(Result::ok)
}

fn manifest<S: ScopedStore>(store: &S, key: &str) -> Option<Result<usize, SessionError>> {
    let raw = store.get(&ChunkedCodec::manifest_key(key))?;
    Some(raw.trim().parse::<usize>().map_err(|_| SessionError::InvalidManifest {
        key: key.to_string(),
        value: raw.clone(),
    }))
}

fn remove_chunks<S: ScopedStore>(store: &mut S, key: &str, range: std::ops::Range<usize>) {
    for index in range {
        store.remove(&ChunkedCodec::chunk_key(key, index));
    }
}

/// Split `value` into pieces of at most `limit` bytes without breaking a
/// UTF-8 sequence. A single character wider than `limit` gets its own piece.
fn split_on_char_boundaries(value: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = value;

    while !rest.is_empty() {
        let mut end = limit.min(rest.len());
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map(char::len_utf8).unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }

    chunks
}
