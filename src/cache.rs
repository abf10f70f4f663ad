//! Named cache generations shared by the page and the interception worker.
//!
//! Each generation is identified by a tag (see `config::SHELL_CACHE_NAME`
//! and `config::DATA_CACHE_NAME`) and maps request URLs to buffered
//! responses. Writes overwrite in place; nothing expires except by deleting
//! a whole generation.
//!
//! # Implementations
//! - `MemoryCaches`: in-process maps, cheap to clone, used natively and in tests
//! - `web::BrowserCaches`: the browser Cache API

use crate::net::HttpResponse;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No cache subsystem in this execution context.
    Unavailable,
    /// The storage backend rejected an operation.
    Operation(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Unavailable => write!(f, "Cache storage is not available"),
            CacheError::Operation(msg) => write!(f, "Cache operation failed: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

pub type CacheFuture<'a, T> = LocalBoxFuture<'a, Result<T, CacheError>>;

/// Storage of named cache generations.
pub trait CacheStorage {
    /// Look up `url` in one generation.
    fn match_in<'a>(&'a self, tag: &'a str, url: &'a str) -> CacheFuture<'a, Option<HttpResponse>>;

    /// Look up `url` across every generation.
    fn match_any<'a>(&'a self, url: &'a str) -> CacheFuture<'a, Option<HttpResponse>>;

    /// Store `response` under `url`, creating the generation if needed.
    fn put<'a>(&'a self, tag: &'a str, url: &'a str, response: HttpResponse) -> CacheFuture<'a, ()>;

    /// Remove one entry. Returns whether it existed.
    fn delete_entry<'a>(&'a self, tag: &'a str, url: &'a str) -> CacheFuture<'a, bool>;

    /// Tags of all existing generations.
    fn keys(&self) -> CacheFuture<'_, Vec<String>>;

    /// Drop a whole generation. Returns whether it existed.
    fn delete_generation<'a>(&'a self, tag: &'a str) -> CacheFuture<'a, bool>;
}

/// Handle on a single generation.
pub struct NamedCache<'s, S: CacheStorage + ?Sized> {
    storage: &'s S,
    tag: &'s str,
}

impl<'s, S: CacheStorage + ?Sized> NamedCache<'s, S> {
    pub fn new(storage: &'s S, tag: &'s str) -> Self {
        NamedCache { storage, tag }
    }

    pub async fn match_url(&self, url: &str) -> Result<Option<HttpResponse>, CacheError> {
        self.storage.match_in(self.tag, url).await
    }

    pub async fn put(&self, url: &str, response: HttpResponse) -> Result<(), CacheError> {
        self.storage.put(self.tag, url, response).await
    }
}

type Generations = BTreeMap<String, HashMap<String, HttpResponse>>;

/// In-process cache storage. Clones share the same generations, which is how
/// a controller and a worker are wired to one store natively.
#[derive(Clone, Default)]
pub struct MemoryCaches {
    generations: Rc<RefCell<Generations>>,
}

impl MemoryCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str, url: &str) -> bool {
        self.generations
            .borrow()
            .get(tag)
            .is_some_and(|entries| entries.contains_key(url))
    }

    /// Number of entries in one generation (0 if it does not exist).
    pub fn len_of(&self, tag: &str) -> usize {
        self.generations.borrow().get(tag).map_or(0, HashMap::len)
    }
}

impl CacheStorage for MemoryCaches {
    fn match_in<'a>(&'a self, tag: &'a str, url: &'a str) -> CacheFuture<'a, Option<HttpResponse>> {
        let found = self
            .generations
            .borrow()
            .get(tag)
            .and_then(|entries| entries.get(url).cloned());
        future::ready(Ok(found)).boxed_local()
    }

    fn match_any<'a>(&'a self, url: &'a str) -> CacheFuture<'a, Option<HttpResponse>> {
        let found = self
            .generations
            .borrow()
            .values()
            .find_map(|entries| entries.get(url).cloned());
        future::ready(Ok(found)).boxed_local()
    }

    fn put<'a>(&'a self, tag: &'a str, url: &'a str, response: HttpResponse) -> CacheFuture<'a, ()> {
        self.generations
            .borrow_mut()
            .entry(tag.to_string())
            .or_default()
            .insert(url.to_string(), response);
        future::ready(Ok(())).boxed_local()
    }

    fn delete_entry<'a>(&'a self, tag: &'a str, url: &'a str) -> CacheFuture<'a, bool> {
        let existed = self
            .generations
            .borrow_mut()
            .get_mut(tag)
            .is_some_and(|entries| entries.remove(url).is_some());
        future::ready(Ok(existed)).boxed_local()
    }

    fn keys(&self) -> CacheFuture<'_, Vec<String>> {
        let tags = self.generations.borrow().keys().cloned().collect();
        future::ready(Ok(tags)).boxed_local()
    }

    fn delete_generation<'a>(&'a self, tag: &'a str) -> CacheFuture<'a, bool> {
        let existed = self.generations.borrow_mut().remove(tag).is_some();
        future::ready(Ok(existed)).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn put_overwrites_previous_entry() {
        let caches = MemoryCaches::new();
        let cache = NamedCache::new(&caches, "data");
        block_on(async {
            cache.put("/a", HttpResponse::json_ok("1")).await.unwrap();
            cache.put("/a", HttpResponse::json_ok("2")).await.unwrap();
            let hit = cache.match_url("/a").await.unwrap().unwrap();
            assert_eq!(hit.body, b"2");
        });
        assert_eq!(caches.len_of("data"), 1);
    }

    #[test]
    fn match_any_searches_every_generation() {
        let caches = MemoryCaches::new();
        block_on(async {
            caches.put("shell", "/index.html", HttpResponse::new(200, Some("text/html"), "<html>"))
                .await
                .unwrap();
            assert!(caches.match_any("/index.html").await.unwrap().is_some());
            assert!(caches.match_in("data", "/index.html").await.unwrap().is_none());
        });
    }

    #[test]
    fn delete_generation_removes_all_entries() {
        let caches = MemoryCaches::new();
        block_on(async {
            caches.put("old", "/", HttpResponse::json_ok("x")).await.unwrap();
            assert!(caches.delete_generation("old").await.unwrap());
            assert!(!caches.delete_generation("old").await.unwrap());
            assert!(caches.keys().await.unwrap().is_empty());
        });
    }

    #[test]
    fn delete_entry_keeps_the_rest_of_the_generation() {
        let caches = MemoryCaches::new();
        block_on(async {
            caches.put("shell", "/", HttpResponse::json_ok("a")).await.unwrap();
            caches.put("shell", "/index.html", HttpResponse::json_ok("b")).await.unwrap();
            assert!(caches.delete_entry("shell", "/").await.unwrap());
            assert!(!caches.delete_entry("shell", "/").await.unwrap());
            assert!(!caches.delete_entry("missing", "/").await.unwrap());
        });
        assert_eq!(caches.len_of("shell"), 1);
        assert!(caches.contains("shell", "/index.html"));
    }

    #[test]
    fn clones_share_storage() {
        let page = MemoryCaches::new();
        let worker = page.clone();
        block_on(worker.put("data", "/x", HttpResponse::json_ok("{}"))).unwrap();
        assert!(page.contains("data", "/x"));
    }
}
