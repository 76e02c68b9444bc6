use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt};
use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[error("stored value is not valid UTF-8")]
    Encoding,
    #[error("encoding record: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value persistence contract. Implementations are interchangeable;
/// callers rely only on get/set and on falling back when one fails.
pub trait KvStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<String>>>;

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, StorageResult<()>>;
}

/// Same-process store, used as the fallback backend and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<String>>> {
        let value = self.entries.lock().unwrap().get(key).cloned();
        async move { Ok(value) }.boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, StorageResult<()>> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        async { Ok(()) }.boxed()
    }
}

/// Embedded durable store backing per-user progress on the bot side.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Ok(Self {
            db: sled::open(path.as_ref())?,
        })
    }
}

impl KvStore for SledStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<String>>> {
        let result = (|| {
            match self.db.get(key)? {
                Some(raw) => String::from_utf8(raw.to_vec())
                    .map(Some)
                    .map_err(|_| StorageError::Encoding),
                None => Ok(None),
            }
        })();
        async move { result }.boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, StorageResult<()>> {
        let result = self
            .db
            .insert(key, value.as_bytes())
            .map(|_| ())
            .map_err(StorageError::from);
        async move { result }.boxed()
    }
}

/// Primary backend with a transparent same-device fallback. A missing
/// primary (capability probing failed at startup) or any primary error
/// routes the operation to the fallback; divergent values are never merged.
pub struct FallbackStore<P, S> {
    primary: Option<P>,
    fallback: S,
}

impl<P: KvStore, S: KvStore> FallbackStore<P, S> {
    pub fn new(primary: Option<P>, fallback: S) -> Self {
        Self { primary, fallback }
    }
}

impl<P: KvStore, S: KvStore> KvStore for FallbackStore<P, S> {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<String>>> {
        async move {
            match &self.primary {
                Some(primary) => match primary.get(key).await {
                    Ok(value) => Ok(value),
                    Err(err) => {
                        warn!("primary store get({}) failed, using fallback: {}", key, err);
                        self.fallback.get(key).await
                    }
                },
                None => self.fallback.get(key).await,
            }
        }
        .boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, StorageResult<()>> {
        async move {
            match &self.primary {
                Some(primary) => match primary.set(key, value).await {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        warn!("primary store set({}) failed, using fallback: {}", key, err);
                        self.fallback.set(key, value).await
                    }
                },
                None => self.fallback.set(key, value).await,
            }
        }
        .boxed()
    }
}
