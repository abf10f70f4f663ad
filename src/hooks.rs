use job_cards::config::SERVICE_WORKER_SCRIPT;
use job_cards::controller::{Controller, ViewEvent, ViewObserver};
use job_cards::web::{js_error_text, BrowserCaches, BrowserNetwork, LocalStorageSelections};
use log::{info, warn};
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use yew::prelude::*;

/// Owns the page's single controller.
///
/// The controller is built once with the browser network, `localStorage`
/// and (when available) the Cache API. Every view event forces a re-render,
/// and on mount the saved cities are loaded and the service worker is
/// registered.
#[hook]
pub fn use_job_controller() -> Rc<Controller> {
    let force_update = use_force_update();

    let controller = use_memo((), move |_| {
        let observer: ViewObserver = Rc::new(move |_: ViewEvent| force_update.force_update());
        let controller = Controller::new(Rc::new(BrowserNetwork), Rc::new(LocalStorageSelections))
            .with_observer(observer);
        match BrowserCaches::detect() {
            Some(caches) => controller.with_caches(Rc::new(caches)),
            None => controller,
        }
    });

    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            spawn_local(controller.start());
            register_service_worker();
            || ()
        });
    }

    controller
}

fn register_service_worker() {
    let navigator = gloo_utils::window().navigator();
    let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false);
    if !supported {
        return;
    }

    let registration = navigator.service_worker().register(SERVICE_WORKER_SCRIPT);
    spawn_local(async move {
        match JsFuture::from(registration).await {
            Ok(_) => info!("Service Worker Registered"),
            Err(e) => warn!("Service Worker registration failed: {}", js_error_text(&e)),
        }
    });
}
