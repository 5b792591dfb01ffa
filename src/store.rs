//! Content store.
//!
//! A process-wide cache of the content document with load-once /
//! reload-on-demand semantics. The store is an explicit object handed to
//! every reader instead of a module-level global, so the cache contract can
//! be tested in isolation.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::content::ContentDocument;

/// Something the store can fetch the content document from.
pub trait ContentSource {
    /// Fetches the document as an untyped JSON tree.
    ///
    /// `fresh` asks the source to bypass any intermediate cache (the HTTP
    /// source appends a cache-busting query parameter).
    fn fetch(&self, fresh: bool) -> Result<Value, ClientError>;
}

impl<T: ContentSource + ?Sized> ContentSource for Arc<T> {
    fn fetch(&self, fresh: bool) -> Result<Value, ClientError> {
        (**self).fetch(fresh)
    }
}

/// A fetched document: the typed view plus the exact tree it was read from.
///
/// The tree keeps keys the typed model does not declare, so anything that
/// writes the document back starts from [`Snapshot::raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    document: ContentDocument,
    raw: Value,
}

impl Snapshot {
    /// Validates `raw` against the document model.
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let document = ContentDocument::from_value(raw.clone())?;
        Ok(Self { document, raw })
    }

    /// Typed view.
    pub fn document(&self) -> &ContentDocument {
        &self.document
    }

    /// Tree as fetched, including undeclared keys.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Deref for Snapshot {
    type Target = ContentDocument;

    fn deref(&self) -> &ContentDocument {
        &self.document
    }
}

/// Reads the document straight from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for the given `content.json` path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the content file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for FileSource {
    fn fetch(&self, _fresh: bool) -> Result<Value, ClientError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Cached access to the content document.
///
/// Once populated, the cached document is shared by every reader until
/// [`ContentStore::reload`] or [`ContentStore::invalidate`] replaces it.
/// Documents handed out are immutable snapshots (`Arc`), so a reload never
/// changes what an earlier reader already holds.
pub struct ContentStore<S> {
    source: S,
    cache: RwLock<Option<Arc<Snapshot>>>,
}

impl<S: ContentSource> ContentStore<S> {
    /// Creates an empty store backed by `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the cached document, if any, without any I/O.
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the cached document.
    pub fn set(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Drops the cached document; the next [`load`](Self::load) fetches again.
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns the cached document, fetching it first if the cache is empty.
    ///
    /// On failure the cache stays empty and the error is returned, so a later
    /// call retries. Concurrent first loads may each fetch; the first one to
    /// finish populates the cache and the others adopt its document.
    pub fn load(&self) -> Result<Arc<Snapshot>, ClientError> {
        if let Some(document) = self.get() {
            return Ok(document);
        }

        debug!("Content cache empty, fetching document");
        let fetched = Snapshot::from_value(self.source.fetch(false)?)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let document = cache.get_or_insert_with(|| Arc::new(fetched));
        Ok(Arc::clone(document))
    }

    /// Refetches the document, bypassing every cache, and overwrites the
    /// cached copy on success.
    ///
    /// Failures are logged and reported as `None`; the previous cache entry
    /// is left untouched.
    pub fn reload(&self) -> Option<Arc<Snapshot>> {
        let fetched = self
            .source
            .fetch(true)
            .and_then(|raw| Snapshot::from_value(raw).map_err(ClientError::from));
        match fetched {
            Ok(snapshot) => Some(self.set(snapshot)),
            Err(e) => {
                warn!("Failed to reload content: {}", e);
                None
            }
        }
    }
}
