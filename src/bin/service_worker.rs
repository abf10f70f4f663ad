use job_cards::web::{js_error_text, to_js_response, BrowserCaches, BrowserNetwork};
use job_cards::worker::{classify, InterceptionWorker, RequestClass};
use log::{info, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{ExtendableEvent, FetchEvent, ServiceWorkerGlobalScope};

type BrowserWorker = InterceptionWorker<BrowserCaches, BrowserNetwork>;

fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    if let Err(e) = register_handlers() {
        warn!("[ServiceWorker] Could not register handlers: {}", js_error_text(&e));
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn register_handlers() -> Result<(), JsValue> {
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let caches = BrowserCaches::detect().ok_or_else(|| to_js_error("Cache API is not available"))?;
    let worker: Rc<BrowserWorker> = Rc::new(InterceptionWorker::new(caches, BrowserNetwork));

    let on_install = {
        let worker = worker.clone();
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let worker = worker.clone();
            let install = future_to_promise(async move {
                worker.install().await.map_err(to_js_error)?;
                Ok(JsValue::UNDEFINED)
            });
            if let Err(e) = event.wait_until(&install) {
                warn!("[ServiceWorker] waitUntil failed: {}", js_error_text(&e));
            }
        })
    };

    let on_activate = {
        let worker = worker.clone();
        let scope = scope.clone();
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let worker = worker.clone();
            let scope = scope.clone();
            let activate = future_to_promise(async move {
                let removed = worker.activate().await.map_err(to_js_error)?;
                info!(
                    "[ServiceWorker] {} active, removed {} old caches",
                    worker.shell_generation(),
                    removed.len()
                );
                JsFuture::from(scope.clients().claim()).await?;
                Ok(JsValue::UNDEFINED)
            });
            if let Err(e) = event.wait_until(&activate) {
                warn!("[ServiceWorker] waitUntil failed: {}", js_error_text(&e));
            }
        })
    };

    let on_fetch = {
        let worker = worker.clone();
        let scope = scope.clone();
        Closure::<dyn FnMut(FetchEvent)>::new(move |event: FetchEvent| {
            let request = event.request();
            // only GETs are buffered and replayed; leave everything else to the browser
            if request.method() != "GET" {
                return;
            }
            let worker = worker.clone();
            let scope = scope.clone();
            let response = future_to_promise(async move {
                let url = request.url();
                if classify(&url) == RequestClass::Shell {
                    if let Some(cached) = worker.cached_shell(&url).await {
                        return Ok(to_js_response(&cached)?.into());
                    }
                    // miss: hand the original request over untouched, opaque responses included
                    return JsFuture::from(scope.fetch_with_request(&request)).await;
                }
                let response = worker.handle_fetch(&url).await.map_err(to_js_error)?;
                Ok(to_js_response(&response)?.into())
            });
            if let Err(e) = event.respond_with(&response) {
                warn!("[ServiceWorker] respondWith failed: {}", js_error_text(&e));
            }
        })
    };

    scope.add_event_listener_with_callback("install", on_install.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("activate", on_activate.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("fetch", on_fetch.as_ref().unchecked_ref())?;

    // handlers live as long as the worker
    on_install.forget();
    on_activate.forget();
    on_fetch.forget();
    Ok(())
}
