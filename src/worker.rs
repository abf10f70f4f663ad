//! Network interception worker.
//!
//! Sits between the page and the network. Requests to the job-listing API
//! always go to the network and a copy of each successful response is kept
//! in the data cache; everything else is app shell and is served from cache
//! when possible. The shell cache is filled once per generation on install,
//! and activation deletes every generation other than the current two.

use crate::cache::{CacheError, CacheStorage, NamedCache};
use crate::config::{DATA_CACHE_NAME, FILES_TO_CACHE, SHELL_CACHE_NAME};
use crate::net::{FetchError, HttpResponse, Network};
use crate::utils::{city_key_from_url, is_data_api_url};
use futures::future::try_join_all;
use log::{debug, info, warn};
use std::cell::Cell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    /// Shell cached, waiting to take over.
    Installed,
    Active,
    /// A newer generation took over.
    Superseded,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Live job-listing API call.
    Data,
    /// Static app asset.
    Shell,
}

/// Decide how a request is handled from its URL alone.
pub fn classify(url: &str) -> RequestClass {
    if is_data_api_url(url) {
        RequestClass::Data
    } else {
        RequestClass::Shell
    }
}

#[derive(Debug)]
pub enum WorkerError {
    /// A manifest asset could not be fetched during install.
    AssetFetch { url: String, source: FetchError },
    Cache(CacheError),
    Network(FetchError),
    InvalidTransition { from: WorkerState, to: WorkerState },
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::AssetFetch { url, source } => {
                write!(f, "Failed to cache shell asset {}: {}", url, source)
            }
            WorkerError::Cache(e) => write!(f, "{}", e),
            WorkerError::Network(e) => write!(f, "{}", e),
            WorkerError::InvalidTransition { from, to } => {
                write!(f, "Worker cannot move from {:?} to {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::AssetFetch { source, .. } => Some(source),
            WorkerError::Cache(e) => Some(e),
            WorkerError::Network(e) => Some(e),
            WorkerError::InvalidTransition { .. } => None,
        }
    }
}

impl From<CacheError> for WorkerError {
    fn from(e: CacheError) -> Self {
        WorkerError::Cache(e)
    }
}

pub struct InterceptionWorker<C, N> {
    caches: C,
    network: N,
    shell_cache: String,
    data_cache: String,
    manifest: Vec<String>,
    state: Cell<WorkerState>,
}

impl<C: CacheStorage, N: Network> InterceptionWorker<C, N> {
    /// A worker for the current shell generation and manifest.
    pub fn new(caches: C, network: N) -> Self {
        InterceptionWorker {
            caches,
            network,
            shell_cache: SHELL_CACHE_NAME.to_string(),
            data_cache: DATA_CACHE_NAME.to_string(),
            manifest: FILES_TO_CACHE.iter().map(|path| path.to_string()).collect(),
            state: Cell::new(WorkerState::Installing),
        }
    }

    /// Use a different shell generation tag.
    pub fn with_shell_generation(mut self, tag: &str) -> Self {
        self.shell_cache = tag.to_string();
        self
    }

    pub fn with_manifest(mut self, manifest: &[&str]) -> Self {
        self.manifest = manifest.iter().map(|path| path.to_string()).collect();
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    pub fn shell_generation(&self) -> &str {
        &self.shell_cache
    }

    /// Fetch every manifest asset and store them in the shell generation.
    ///
    /// Nothing is written unless every fetch succeeds. Any failure terminates
    /// this worker and leaves the previous generation in control.
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Installing, WorkerState::Installed)?;
        info!("[ServiceWorker] Install");

        let result = self.populate_shell().await;
        match &result {
            Ok(()) => self.state.set(WorkerState::Installed),
            Err(e) => {
                warn!("[ServiceWorker] Install failed: {}", e);
                self.state.set(WorkerState::Terminated);
            }
        }
        result
    }

    async fn populate_shell(&self) -> Result<(), WorkerError> {
        let assets = try_join_all(self.manifest.iter().map(|url| self.fetch_asset(url))).await?;

        info!("[ServiceWorker] Caching app shell");
        let existed = self.caches.keys().await?.contains(&self.shell_cache);
        let shell = NamedCache::new(&self.caches, &self.shell_cache);
        let mut previous = Vec::with_capacity(assets.len());
        for (url, _) in &assets {
            previous.push(shell.match_url(url).await?);
        }

        let mut written = Vec::new();
        for ((url, response), before) in assets.into_iter().zip(previous) {
            if let Err(e) = shell.put(url, response).await {
                self.undo_shell_writes(existed, written).await;
                return Err(e.into());
            }
            written.push((url, before));
        }
        Ok(())
    }

    /// Put back what a failed install overwrote and remove what it added,
    /// so entries written by an earlier worker under the same tag survive.
    async fn undo_shell_writes(&self, existed: bool, written: Vec<(&str, Option<HttpResponse>)>) {
        if !existed {
            if let Err(e) = self.caches.delete_generation(&self.shell_cache).await {
                warn!("[ServiceWorker] Could not drop partial {}: {}", self.shell_cache, e);
            }
            return;
        }
        for (url, before) in written {
            let restored = match before {
                Some(response) => self.caches.put(&self.shell_cache, url, response).await,
                None => self.caches.delete_entry(&self.shell_cache, url).await.map(|_| ()),
            };
            if let Err(e) = restored {
                warn!("[ServiceWorker] Could not restore {} in {}: {}", url, self.shell_cache, e);
            }
        }
    }

    async fn fetch_asset<'a>(&self, url: &'a str) -> Result<(&'a str, HttpResponse), WorkerError> {
        let asset_error = |source| WorkerError::AssetFetch {
            url: url.to_string(),
            source,
        };
        let response = self.network.get(url).await.map_err(asset_error)?;
        if !response.is_ok() {
            return Err(asset_error(FetchError::Status(response.status)));
        }
        Ok((url, response))
    }

    /// Take control and delete every cache generation that is neither the
    /// current shell nor the data cache. Returns the deleted tags.
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        self.expect_state(WorkerState::Installed, WorkerState::Active)?;
        info!("[ServiceWorker] Activate");
        self.state.set(WorkerState::Active);

        let mut removed = Vec::new();
        for tag in self.caches.keys().await? {
            if tag == self.shell_cache || tag == self.data_cache {
                continue;
            }
            info!("[ServiceWorker] Removing old cache {}", tag);
            if self.caches.delete_generation(&tag).await? {
                removed.push(tag);
            }
        }
        Ok(removed)
    }

    /// A newer generation became active.
    pub fn supersede(&self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Active, WorkerState::Superseded)?;
        self.state.set(WorkerState::Superseded);
        Ok(())
    }

    /// Answer an intercepted request according to its class.
    pub async fn handle_fetch(&self, url: &str) -> Result<HttpResponse, WorkerError> {
        debug!("[ServiceWorker] Fetch {}", url);
        match classify(url) {
            RequestClass::Data => self.fetch_data(url).await,
            RequestClass::Shell => self.fetch_shell(url).await,
        }
    }

    /// Network only. Successful responses are copied into the data cache;
    /// failures reach the caller untouched.
    async fn fetch_data(&self, url: &str) -> Result<HttpResponse, WorkerError> {
        let response = self.network.get(url).await.map_err(WorkerError::Network)?;
        if response.is_ok() {
            let data = NamedCache::new(&self.caches, &self.data_cache);
            match data.put(url, response.clone()).await {
                Ok(()) => debug!(
                    "[ServiceWorker] Stored fresh data for {}",
                    city_key_from_url(url).unwrap_or("unknown city")
                ),
                Err(e) => warn!("[ServiceWorker] Could not store data for {}: {}", url, e),
            }
        }
        Ok(response)
    }

    /// Cache first, then network. Network responses are not cached here.
    async fn fetch_shell(&self, url: &str) -> Result<HttpResponse, WorkerError> {
        match self.cached_shell(url).await {
            Some(cached) => Ok(cached),
            None => self.network.get(url).await.map_err(WorkerError::Network),
        }
    }

    /// A cached copy of a shell request from any generation. Lookup errors
    /// count as a miss.
    pub async fn cached_shell(&self, url: &str) -> Option<HttpResponse> {
        match self.caches.match_any(url).await {
            Ok(found) => found,
            Err(e) => {
                debug!("[ServiceWorker] Cache lookup for {} failed: {}", url, e);
                None
            }
        }
    }

    fn expect_state(&self, expected: WorkerState, to: WorkerState) -> Result<(), WorkerError> {
        let from = self.state.get();
        if from == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidTransition { from, to })
        }
    }
}
