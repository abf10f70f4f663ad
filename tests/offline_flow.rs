//! Page and worker sharing one cache store, as they do in the browser: the
//! page's data requests pass through the interception worker, which keeps a
//! copy that the page can draw from on the next start when offline.

use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use job_cards::cache::MemoryCaches;
use job_cards::config::{DATA_CACHE_NAME, FILES_TO_CACHE, SHELL_CACHE_NAME};
use job_cards::controller::Controller;
use job_cards::net::{data_url, FetchError, HttpResponse, Network};
use job_cards::selection::{MemorySelections, SelectionStore};
use job_cards::worker::{InterceptionWorker, WorkerState};
use job_cards::{CityKey, CitySelection};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

const SKANE_BODY: &str = r#"{"soklista":{"listnamn":"grupperat yrkesområde","totalt_antal_platsannonser":60,"totalt_antal_ledigajobb":1,"sokdata":[
    {"id":"1","namn":"Administration","antal_platsannonser":10,"antal_ledigajobb":0},
    {"id":"2","namn":"Bygg","antal_platsannonser":30,"antal_ledigajobb":1},
    {"id":"3","namn":"Data/IT","antal_platsannonser":15,"antal_ledigajobb":0},
    {"id":"4","namn":"Transport","antal_platsannonser":5,"antal_ledigajobb":0}
]}}"#;

/// The internet as seen by the worker.
#[derive(Default)]
struct Upstream {
    routes: RefCell<HashMap<String, HttpResponse>>,
    online: Cell<bool>,
}

impl Network for Upstream {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse, FetchError>> {
        let result = if self.online.get() {
            Ok(self
                .routes
                .borrow()
                .get(url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(404, None, "not found")))
        } else {
            Err(FetchError::Transport("offline".to_string()))
        };
        futures::future::ready(result).boxed_local()
    }
}

type Worker = InterceptionWorker<MemoryCaches, Rc<Upstream>>;

/// Routes the page's requests through the worker.
struct ThroughWorker(Rc<Worker>);

impl Network for ThroughWorker {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse, FetchError>> {
        async move {
            self.0
                .handle_fetch(url)
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))
        }
        .boxed_local()
    }
}

fn upstream() -> Rc<Upstream> {
    let upstream = Upstream::default();
    upstream.online.set(true);
    for path in FILES_TO_CACHE {
        upstream
            .routes
            .borrow_mut()
            .insert(path.to_string(), HttpResponse::new(200, Some("text/html"), format!("shell {}", path)));
    }
    upstream
        .routes
        .borrow_mut()
        .insert(data_url(&CityKey::from("12")), HttpResponse::json_ok(SKANE_BODY));
    Rc::new(upstream)
}

fn page(worker: &Rc<Worker>, caches: &MemoryCaches, selections: &MemorySelections) -> Controller {
    Controller::new(Rc::new(ThroughWorker(worker.clone())), Rc::new(selections.clone()))
        .with_caches(Rc::new(caches.clone()))
}

#[test]
fn data_cached_online_is_drawn_offline() {
    let caches = MemoryCaches::new();
    let selections = MemorySelections::new();
    let upstream = upstream();
    let worker: Rc<Worker> = Rc::new(InterceptionWorker::new(caches.clone(), upstream.clone()));
    block_on(async {
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
    });
    assert_eq!(worker.state(), WorkerState::Active);
    assert_eq!(caches.len_of(SHELL_CACHE_NAME), FILES_TO_CACHE.len());

    // first visit, online
    let online = page(&worker, &caches, &selections);
    block_on(online.start());
    block_on(online.add_city(CityKey::from("12"), "Skåne"));

    let skane_url = data_url(&CityKey::from("12"));
    assert!(caches.contains(DATA_CACHE_NAME, &skane_url));
    let online_areas = online.view().card(&CityKey::from("12")).unwrap().areas.clone();
    assert_eq!(
        online_areas,
        vec!["Bygg: 30 annonser", "Data/IT: 15 annonser", "Administration: 10 annonser"]
    );

    // restart with the network gone
    upstream.online.set(false);
    let offline = page(&worker, &caches, &selections);
    block_on(offline.start());

    let view = offline.view();
    assert!(!view.is_loading());
    assert_eq!(view.card(&CityKey::from("12")).unwrap().areas, online_areas);
    assert_eq!(view.card(&CityKey::from("1")).unwrap().label, "Stockholm");
    assert_eq!(
        selections.load(),
        Some(vec![CitySelection::new("1", "Stockholm"), CitySelection::new("12", "Skåne")])
    );
}

#[test]
fn shell_is_served_offline_after_install() {
    let caches = MemoryCaches::new();
    let upstream = upstream();
    let worker = InterceptionWorker::new(caches, upstream.clone());
    block_on(async {
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
    });

    upstream.online.set(false);

    for path in FILES_TO_CACHE {
        let response = block_on(worker.handle_fetch(path)).unwrap();
        assert_eq!(response.body, format!("shell {}", path).into_bytes());
    }
    assert!(block_on(worker.handle_fetch("/not-in-manifest.png")).is_err());
}

#[test]
fn raw_selection_record_is_json() {
    let selections = MemorySelections::new();
    let caches = MemoryCaches::new();
    let worker: Rc<Worker> = Rc::new(InterceptionWorker::new(caches.clone(), upstream()));
    let controller = page(&worker, &caches, &selections);

    block_on(controller.add_city(CityKey::from("AB"), "Stockholm"));

    assert_eq!(selections.raw().as_deref(), Some(r#"[{"key":"AB","label":"Stockholm"}]"#));
}
