use crate::config::DATA_API_HOST;
use crate::AreaStat;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for request URLs
static URL_HOST_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:[a-z][a-z0-9+.-]*)://(?:[^@/?#]*@)?([^/:?#]+)").unwrap());
static LANID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]lanid=([^&#]+)").unwrap());

const SWEDISH_MONTHS: [&str; 12] = [
    "jan.", "feb.", "mars", "apr.", "maj", "juni", "juli", "aug.", "sep.", "okt.", "nov.", "dec.",
];

/// Host part of an absolute URL, lowercased. Relative URLs have no host.
pub fn url_host(url: &str) -> Option<String> {
    URL_HOST_REGEX
        .captures(url)
        .map(|captures| captures[1].to_ascii_lowercase())
}

/// Whether `url` targets the upstream job-listing API.
pub fn is_data_api_url(url: &str) -> bool {
    url_host(url).is_some_and(|host| host == DATA_API_HOST)
}

/// The `lanid` query value of a data URL, if present.
pub fn city_key_from_url(url: &str) -> Option<&str> {
    LANID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Short Swedish date in local time, e.g. `10 maj 2018`.
pub fn format_card_date(created: &DateTime<Utc>) -> String {
    format_card_date_in(created, &Local)
}

pub fn format_card_date_in<Tz: TimeZone>(created: &DateTime<Utc>, tz: &Tz) -> String {
    let local = created.with_timezone(tz);
    let month = SWEDISH_MONTHS[local.month0() as usize];
    format!("{:02} {} {}", local.day(), month, local.year())
}

/// Text of one ranked area line on a card.
pub fn area_label(area: &AreaStat) -> String {
    format!("{}: {} annonser", area.name, area.ad_count)
}
