//! Browser bindings for the cache, network and storage seams.
//!
//! Everything here works from both the page (window) and the service worker
//! scope, except `LocalStorageSelections` which needs a window.

use crate::cache::{CacheError, CacheFuture, CacheStorage};
use crate::config::SELECTED_CITIES_KEY;
use crate::net::{FetchError, HttpResponse, Network};
use crate::selection::{decode_selections, encode_selections, SelectionStore, StorageError};
use crate::CitySelection;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Array, Promise, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, CacheQueryOptions, Headers, Response, ResponseInit, Window, WorkerGlobalScope};

/// Best-effort text of a JS exception.
pub fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", value))
}

enum GlobalScope {
    Window(Window),
    Worker(WorkerGlobalScope),
}

impl GlobalScope {
    fn current() -> Option<Self> {
        let global = js_sys::global();
        if let Some(window) = global.dyn_ref::<Window>() {
            return Some(GlobalScope::Window(window.clone()));
        }
        global.dyn_into::<WorkerGlobalScope>().ok().map(GlobalScope::Worker)
    }

    fn fetch(&self, url: &str) -> Promise {
        match self {
            GlobalScope::Window(window) => window.fetch_with_str(url),
            GlobalScope::Worker(worker) => worker.fetch_with_str(url),
        }
    }

    fn caches(&self) -> Result<web_sys::CacheStorage, JsValue> {
        match self {
            GlobalScope::Window(window) => window.caches(),
            GlobalScope::Worker(worker) => worker.caches(),
        }
    }
}

/// Buffer a JS response into an `HttpResponse`.
pub async fn read_response(response: &Response) -> Result<HttpResponse, JsValue> {
    let status = response.status();
    let content_type = response.headers().get("content-type")?;
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(HttpResponse {
        status,
        content_type,
        body: Uint8Array::new(&buffer).to_vec(),
    })
}

/// Build a JS response carrying the same status, content type and bytes.
pub fn to_js_response(response: &HttpResponse) -> Result<Response, JsValue> {
    let init = ResponseInit::new();
    init.set_status(response.status);
    let headers = Headers::new()?;
    if let Some(content_type) = &response.content_type {
        headers.set("content-type", content_type)?;
    }
    init.set_headers(&headers);

    // 204/304 responses must not carry a body
    if response.body.is_empty() {
        return Response::new_with_opt_buffer_source_and_init(None, &init);
    }
    let body = Uint8Array::from(response.body.as_slice());
    Response::new_with_opt_buffer_source_and_init(Some(&body), &init)
}

/// GET through the global `fetch` of the current scope.
#[derive(Clone, Copy, Default)]
pub struct BrowserNetwork;

impl BrowserNetwork {
    async fn fetch(url: &str) -> Result<HttpResponse, FetchError> {
        let transport = |e: JsValue| FetchError::Transport(js_error_text(&e));
        let scope = GlobalScope::current()
            .ok_or_else(|| FetchError::Transport("no global scope".to_string()))?;
        let value = JsFuture::from(scope.fetch(url)).await.map_err(transport)?;
        let response: Response = value.dyn_into().map_err(transport)?;
        read_response(&response).await.map_err(transport)
    }
}

impl Network for BrowserNetwork {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse, FetchError>> {
        Self::fetch(url).boxed_local()
    }
}

/// The browser Cache API.
#[derive(Clone)]
pub struct BrowserCaches {
    storage: web_sys::CacheStorage,
}

fn cache_error(value: JsValue) -> CacheError {
    CacheError::Operation(js_error_text(&value))
}

async fn resolve(promise: Promise) -> Result<JsValue, CacheError> {
    JsFuture::from(promise).await.map_err(cache_error)
}

async fn response_from_match(value: JsValue) -> Result<Option<HttpResponse>, CacheError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let response: Response = value.dyn_into().map_err(cache_error)?;
    read_response(&response).await.map(Some).map_err(cache_error)
}

impl BrowserCaches {
    /// `None` when the current scope has no cache subsystem.
    pub fn detect() -> Option<Self> {
        let storage = GlobalScope::current()?.caches().ok()?;
        Some(BrowserCaches { storage })
    }

    async fn open(&self, tag: &str) -> Result<Cache, CacheError> {
        resolve(self.storage.open(tag)).await?.dyn_into().map_err(cache_error)
    }
}

impl CacheStorage for BrowserCaches {
    fn match_in<'a>(&'a self, tag: &'a str, url: &'a str) -> CacheFuture<'a, Option<HttpResponse>> {
        async move {
            let options = CacheQueryOptions::new();
            options.set_cache_name(tag);
            let found = resolve(self.storage.match_with_str_and_options(url, &options)).await?;
            response_from_match(found).await
        }
        .boxed_local()
    }

    fn match_any<'a>(&'a self, url: &'a str) -> CacheFuture<'a, Option<HttpResponse>> {
        async move {
            let found = resolve(self.storage.match_with_str(url)).await?;
            response_from_match(found).await
        }
        .boxed_local()
    }

    fn put<'a>(&'a self, tag: &'a str, url: &'a str, response: HttpResponse) -> CacheFuture<'a, ()> {
        async move {
            let cache = self.open(tag).await?;
            let response = to_js_response(&response).map_err(cache_error)?;
            resolve(cache.put_with_str(url, &response)).await?;
            Ok(())
        }
        .boxed_local()
    }

    fn delete_entry<'a>(&'a self, tag: &'a str, url: &'a str) -> CacheFuture<'a, bool> {
        async move {
            let cache = self.open(tag).await?;
            let deleted = resolve(cache.delete_with_str(url)).await?;
            Ok(deleted.as_bool().unwrap_or(false))
        }
        .boxed_local()
    }

    fn keys(&self) -> CacheFuture<'_, Vec<String>> {
        async move {
            let keys: Array = resolve(self.storage.keys()).await?.dyn_into().map_err(cache_error)?;
            Ok(keys.iter().filter_map(|key| key.as_string()).collect())
        }
        .boxed_local()
    }

    fn delete_generation<'a>(&'a self, tag: &'a str) -> CacheFuture<'a, bool> {
        async move {
            let deleted = resolve(self.storage.delete(tag)).await?;
            Ok(deleted.as_bool().unwrap_or(false))
        }
        .boxed_local()
    }
}

/// Selected cities in `localStorage`.
#[derive(Clone, Copy, Default)]
pub struct LocalStorageSelections;

impl LocalStorageSelections {
    fn storage() -> Option<web_sys::Storage> {
        gloo_utils::window().local_storage().ok().flatten()
    }
}

impl SelectionStore for LocalStorageSelections {
    fn load(&self) -> Option<Vec<CitySelection>> {
        let raw = Self::storage()?.get_item(SELECTED_CITIES_KEY).ok()??;
        decode_selections(&raw)
    }

    fn save(&self, cities: &[CitySelection]) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        let encoded = encode_selections(cities)?;
        storage
            .set_item(SELECTED_CITIES_KEY, &encoded)
            .map_err(|e| StorageError::Write(js_error_text(&e)))
    }
}
