//! Render/update controller.
//!
//! Owns the view state and the selected-city list, and runs the
//! cache-then-network sequence for each city. A cached response (if any) is
//! drawn as soon as it is found while the network request is in flight; the
//! network result then replaces it subject to the recency check in
//! `ViewState::render_or_update`. Both branches stamp `created` when they
//! resolve, so whichever resolves last wins.

use crate::cache::CacheStorage;
use crate::net::{data_url, FetchError, Network};
use crate::placeholder::initial_jobs;
use crate::render::{RenderOutcome, RenderReport, ViewState};
use crate::selection::SelectionStore;
use crate::{CityKey, CitySelection, JobResult, JobsPayload};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use std::cell::{Ref, RefCell};
use std::future::Future;
use std::rc::Rc;

/// Source of `created` stamps.
pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

/// Receives a notification after every visible change.
pub type ViewObserver = Rc<dyn Fn(ViewEvent)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    CardCreated(CityKey),
    CardUpdated(CityKey),
    /// The loading indicator was hidden and the card list revealed.
    LoadingFinished,
    AddDialogToggled(bool),
}

#[derive(Clone)]
pub struct Controller {
    view: Rc<RefCell<ViewState>>,
    selected: Rc<RefCell<Vec<CitySelection>>>,
    caches: Option<Rc<dyn CacheStorage>>,
    network: Rc<dyn Network>,
    selections: Rc<dyn SelectionStore>,
    clock: Clock,
    observer: Option<ViewObserver>,
}

impl Controller {
    pub fn new(network: Rc<dyn Network>, selections: Rc<dyn SelectionStore>) -> Self {
        Controller {
            view: Rc::new(RefCell::new(ViewState::new())),
            selected: Rc::new(RefCell::new(Vec::new())),
            caches: None,
            network,
            selections,
            clock: Rc::new(Utc::now),
            observer: None,
        }
    }

    /// Enable the cache-first branch. Without caches only the network is used.
    pub fn with_caches(mut self, caches: Rc<dyn CacheStorage>) -> Self {
        self.caches = Some(caches);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: ViewObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn view(&self) -> Ref<'_, ViewState> {
        self.view.borrow()
    }

    pub fn selected_cities(&self) -> Vec<CitySelection> {
        self.selected.borrow().clone()
    }

    /// Load the persisted city list and fetch every entry. On first run the
    /// placeholder city is drawn and saved as the initial selection.
    pub fn start(&self) -> impl Future<Output = ()> + 'static {
        let cities = match self.selections.load() {
            Some(cities) => {
                info!("Restoring {} selected cities", cities.len());
                *self.selected.borrow_mut() = cities.clone();
                cities
            }
            None => {
                info!("No saved cities, showing placeholder data");
                let jobs = initial_jobs();
                self.render_or_update(&jobs);
                *self.selected.borrow_mut() = vec![CitySelection {
                    key: jobs.key,
                    label: jobs.label,
                }];
                self.persist_selection();
                Vec::new()
            }
        };

        let requests: Vec<_> = cities
            .into_iter()
            .map(|city| self.request_city_data(city.key, &city.label))
            .collect();
        async move {
            join_all(requests).await;
        }
    }

    /// Draw cached data for `key` if present, then fetch fresh data.
    ///
    /// The returned future completes once both branches have settled; spawn
    /// it and forget it.
    pub fn request_city_data(&self, key: CityKey, label: &str) -> impl Future<Output = ()> + 'static {
        let this = self.clone();
        let label = label.to_string();
        let url = data_url(&key);
        async move {
            futures::join!(
                this.render_from_cache(&url, &key, &label),
                this.render_from_network(&url, &key, &label)
            );
        }
    }

    /// Refetch every city that currently has a card.
    pub fn refresh_all_visible(&self) -> impl Future<Output = ()> + 'static {
        let visible = self.view.borrow().visible_cities();
        debug!("Refreshing {} cards", visible.len());
        let requests: Vec<_> = visible
            .into_iter()
            .map(|city| self.request_city_data(city.key, &city.label))
            .collect();
        async move {
            join_all(requests).await;
        }
    }

    /// Append a city to the persisted selection and fetch its data.
    /// Duplicates are not filtered.
    pub fn add_city(&self, key: CityKey, label: &str) -> impl Future<Output = ()> + 'static {
        self.selected.borrow_mut().push(CitySelection {
            key: key.clone(),
            label: label.to_string(),
        });
        self.persist_selection();
        self.request_city_data(key, label)
    }

    pub fn toggle_add_dialog(&self, visible: bool) {
        self.view.borrow_mut().set_add_dialog_visible(visible);
        self.notify(ViewEvent::AddDialogToggled(visible));
    }

    /// Apply `record` to its card. Older records are dropped silently.
    pub fn render_or_update(&self, record: &JobResult) -> RenderReport {
        let report = self.view.borrow_mut().render_or_update(record);

        match report.outcome {
            RenderOutcome::Created => self.notify(ViewEvent::CardCreated(record.key.clone())),
            RenderOutcome::Updated => self.notify(ViewEvent::CardUpdated(record.key.clone())),
            RenderOutcome::Stale => debug!(
                "Dropping data for {} created at {}, card shows newer data",
                record.key, record.created
            ),
        }
        if report.finished_loading {
            self.notify(ViewEvent::LoadingFinished);
        }
        report
    }

    async fn render_from_cache(&self, url: &str, key: &CityKey, label: &str) {
        let Some(caches) = &self.caches else {
            return;
        };

        let cached = match caches.match_any(url).await {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                debug!("No cached data for {}", key);
                return;
            }
            Err(e) => {
                debug!("Cache lookup for {} failed: {}", key, e);
                return;
            }
        };

        match cached.json::<JobsPayload>() {
            Ok(payload) => {
                debug!("Drawing cached data for {}", key);
                let record = payload.into_result(key.clone(), label, (self.clock)());
                self.render_or_update(&record);
            }
            Err(e) => debug!("Ignoring unreadable cached data for {}: {}", key, e),
        }
    }

    async fn render_from_network(&self, url: &str, key: &CityKey, label: &str) {
        match self.fetch_jobs(url).await {
            Ok(payload) => {
                let record = payload.into_result(key.clone(), label, (self.clock)());
                self.render_or_update(&record);
            }
            Err(e) => {
                warn!("Fetching jobs for {} failed ({}), showing placeholder data", key, e);
                self.render_or_update(&initial_jobs());
            }
        }
    }

    async fn fetch_jobs(&self, url: &str) -> Result<JobsPayload, FetchError> {
        let response = self.network.get(url).await?;
        if response.status != 200 {
            return Err(FetchError::Status(response.status));
        }
        response.json()
    }

    fn persist_selection(&self) {
        let selected = self.selected.borrow();
        if let Err(e) = self.selections.save(&selected) {
            warn!("Could not save selected cities: {}", e);
        }
    }

    fn notify(&self, event: ViewEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}
