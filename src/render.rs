//! View model for the card list.
//!
//! Everything here is pure: the controller feeds records in and the UI binding
//! reads cards out. Cards are created on first data for a key and never
//! removed.

use crate::config::TOP_AREA_COUNT;
use crate::utils::{area_label, format_card_date};
use crate::{AreaStat, CityKey, CitySelection, JobResult};
use chrono::{DateTime, Utc};

/// One city's card as the UI should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub key: CityKey,
    pub label: String,
    /// `created` of the record currently shown.
    pub last_updated: DateTime<Utc>,
    pub last_updated_text: String,
    pub date: String,
    pub areas: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Created,
    Updated,
    /// The record was older than what the card shows and was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub outcome: RenderOutcome,
    /// Set only for the render that hid the loading indicator.
    pub finished_loading: bool,
}

/// The `TOP_AREA_COUNT` areas with the most ads, most first. Ties keep
/// their upstream order.
pub fn rank_areas(areas: &[AreaStat]) -> Vec<&AreaStat> {
    let mut ranked: Vec<&AreaStat> = areas.iter().collect();
    ranked.sort_by(|a, b| b.ad_count.cmp(&a.ad_count));
    ranked.truncate(TOP_AREA_COUNT);
    ranked
}

/// Project `record` onto a card, or `None` if `prior` already shows newer data.
pub fn render_card(record: &JobResult, prior: Option<&Card>) -> Option<Card> {
    if let Some(prior) = prior {
        if record.created < prior.last_updated {
            return None;
        }
    }

    // the location heading is fixed when the card is first drawn
    let label = match prior {
        Some(prior) => prior.label.clone(),
        None => record.label.clone(),
    };

    Some(Card {
        key: record.key.clone(),
        label,
        last_updated: record.created,
        last_updated_text: record.created.to_rfc3339(),
        date: format_card_date(&record.created),
        areas: rank_areas(&record.summary.areas)
            .into_iter()
            .map(area_label)
            .collect(),
    })
}

/// All view state owned by one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    is_loading: bool,
    add_dialog_visible: bool,
    cards: Vec<Card>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            is_loading: true,
            add_dialog_visible: false,
            cards: Vec::new(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn add_dialog_visible(&self) -> bool {
        self.add_dialog_visible
    }

    pub fn set_add_dialog_visible(&mut self, visible: bool) {
        self.add_dialog_visible = visible;
    }

    /// Cards in the order they were first drawn.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, key: &CityKey) -> Option<&Card> {
        self.cards.iter().find(|card| &card.key == key)
    }

    /// Key and label of every card on screen.
    pub fn visible_cities(&self) -> Vec<CitySelection> {
        self.cards
            .iter()
            .map(|card| CitySelection {
                key: card.key.clone(),
                label: card.label.clone(),
            })
            .collect()
    }

    /// Create or update the card for `record.key`, honoring recency.
    pub fn render_or_update(&mut self, record: &JobResult) -> RenderReport {
        let position = self.cards.iter().position(|card| card.key == record.key);
        let prior = position.map(|idx| &self.cards[idx]);

        let outcome = match (render_card(record, prior), position) {
            (None, _) => RenderOutcome::Stale,
            (Some(card), Some(idx)) => {
                self.cards[idx] = card;
                RenderOutcome::Updated
            }
            (Some(card), None) => {
                self.cards.push(card);
                RenderOutcome::Created
            }
        };

        let finished_loading = outcome != RenderOutcome::Stale && self.is_loading;
        if finished_loading {
            self.is_loading = false;
        }

        RenderReport {
            outcome,
            finished_loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::initial_jobs;
    use crate::JobSummary;
    use chrono::{Duration, TimeZone};

    fn area(id: &str, ad_count: u32) -> AreaStat {
        AreaStat {
            id: id.to_string(),
            name: format!("Area {}", id),
            ad_count,
            vacancy_count: 0,
        }
    }

    fn record(key: &str, created: DateTime<Utc>, ad_counts: &[u32]) -> JobResult {
        JobResult {
            key: CityKey::from(key),
            label: format!("City {}", key),
            created,
            summary: JobSummary {
                list_name: String::new(),
                total_ad_count: ad_counts.iter().sum(),
                total_vacancy_count: 0,
                areas: ad_counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| area(&i.to_string(), count))
                    .collect(),
            },
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn top_three_areas_by_ad_count() {
        let areas = vec![area("a", 1784), area("b", 649), area("c", 1488), area("d", 107), area("e", 1987)];
        let counts: Vec<u32> = rank_areas(&areas).iter().map(|a| a.ad_count).collect();
        assert_eq!(counts, vec![1987, 1784, 1488]);
    }

    #[test]
    fn ranking_ties_keep_upstream_order() {
        let areas = vec![area("first", 5), area("second", 5), area("third", 1)];
        let ids: Vec<&str> = rank_areas(&areas).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn fewer_than_three_areas_render_all() {
        let card = render_card(&record("1", noon(), &[4, 9]), None).unwrap();
        assert_eq!(card.areas, vec!["Area 1: 9 annonser", "Area 0: 4 annonser"]);
    }

    #[test]
    fn older_record_leaves_card_unchanged() {
        let mut view = ViewState::new();
        view.render_or_update(&record("1", noon(), &[10]));
        let before = view.card(&CityKey::from("1")).cloned();

        let report = view.render_or_update(&record("1", noon() - Duration::seconds(1), &[99]));
        assert_eq!(report.outcome, RenderOutcome::Stale);
        assert_eq!(view.card(&CityKey::from("1")).cloned(), before);
    }

    #[test]
    fn equal_timestamp_is_accepted() {
        let mut view = ViewState::new();
        view.render_or_update(&record("1", noon(), &[10]));
        let report = view.render_or_update(&record("1", noon(), &[20]));
        assert_eq!(report.outcome, RenderOutcome::Updated);
        assert_eq!(view.cards()[0].areas, vec!["Area 0: 20 annonser"]);
    }

    #[test]
    fn displayed_created_never_decreases() {
        let mut view = ViewState::new();
        let offsets = [5i64, 2, 9, 9, 1, 12, 3];
        let mut shown = Vec::new();
        for offset in offsets {
            view.render_or_update(&record("7", noon() + Duration::seconds(offset), &[1]));
            shown.push(view.cards()[0].last_updated);
        }
        assert!(shown.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(shown.last(), Some(&(noon() + Duration::seconds(12))));
    }

    #[test]
    fn loading_finishes_exactly_once() {
        let mut view = ViewState::new();
        assert!(view.is_loading());

        let first = view.render_or_update(&record("1", noon(), &[1]));
        let second = view.render_or_update(&record("2", noon(), &[1]));
        let third = view.render_or_update(&record("1", noon() + Duration::minutes(1), &[1]));

        assert!(first.finished_loading);
        assert!(!second.finished_loading);
        assert!(!third.finished_loading);
        assert!(!view.is_loading());
    }

    #[test]
    fn card_label_is_fixed_at_creation() {
        let mut view = ViewState::new();
        view.render_or_update(&record("1", noon(), &[1]));
        let mut relabeled = record("1", noon() + Duration::minutes(1), &[1]);
        relabeled.label = "Renamed".into();
        view.render_or_update(&relabeled);
        assert_eq!(view.cards()[0].label, "City 1");
    }

    #[test]
    fn cards_keep_first_render_order() {
        let mut view = ViewState::new();
        view.render_or_update(&record("12", noon(), &[1]));
        view.render_or_update(&initial_jobs());
        view.render_or_update(&record("12", noon() + Duration::minutes(1), &[1]));
        let keys: Vec<&str> = view.cards().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["12", "1"]);
    }
}
