use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub mod cache;
pub mod config;
pub mod controller;
pub mod net;
pub mod placeholder;
pub mod render;
pub mod selection;
pub mod utils;
pub mod web;
pub mod worker;

/// Opaque identifier of a region, sent upstream as the `lanid` query value.
///
/// Older persisted selections store the placeholder city as the integer `1`,
/// so both JSON strings and numbers are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CityKey(String);

impl CityKey {
    pub fn new(key: impl Into<String>) -> Self {
        CityKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CityKey {
    fn from(key: &str) -> Self {
        CityKey::new(key)
    }
}

impl<'de> Deserialize<'de> for CityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Text(String),
            Number(i64),
        }

        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Text(text) => CityKey(text),
            RawKey::Number(number) => CityKey(number.to_string()),
        })
    }
}

/// One entry of the user's persisted city list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySelection {
    pub key: CityKey,
    pub label: String,
}

impl CitySelection {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        CitySelection {
            key: CityKey::new(key),
            label: label.into(),
        }
    }
}

/// Job counts for one occupational area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaStat {
    pub id: String,
    #[serde(rename = "namn")]
    pub name: String,
    #[serde(rename = "antal_platsannonser")]
    pub ad_count: u32,
    #[serde(rename = "antal_ledigajobb")]
    pub vacancy_count: u32,
}

/// The `soklista` block of the upstream payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(rename = "listnamn", default)]
    pub list_name: String,
    #[serde(rename = "totalt_antal_platsannonser", default)]
    pub total_ad_count: u32,
    #[serde(rename = "totalt_antal_ledigajobb", default)]
    pub total_vacancy_count: u32,
    #[serde(rename = "sokdata")]
    pub areas: Vec<AreaStat>,
}

/// Body returned by the job-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsPayload {
    #[serde(rename = "soklista")]
    pub summary: JobSummary,
}

impl JobsPayload {
    /// Attach the request context and a client-side `created` stamp.
    pub fn into_result(self, key: CityKey, label: &str, created: DateTime<Utc>) -> JobResult {
        JobResult {
            key,
            label: label.to_string(),
            created,
            summary: self.summary,
        }
    }
}

/// A fetched summary for one city, stamped with the time it was produced.
///
/// `created` is the only recency signal: a card never moves to a record
/// older than the one it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub key: CityKey,
    pub label: String,
    pub created: DateTime<Utc>,
    pub summary: JobSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_key_accepts_numbers_and_strings() {
        let entries: Vec<CitySelection> =
            serde_json::from_str(r#"[{"key":1,"label":"Stockholm"},{"key":"AB","label":"Solna"}]"#)
                .unwrap();
        assert_eq!(entries[0].key.as_str(), "1");
        assert_eq!(entries[1].key, CityKey::from("AB"));
    }

    #[test]
    fn city_key_serializes_as_plain_string() {
        let json = serde_json::to_string(&CitySelection::new("AB", "Stockholm")).unwrap();
        assert_eq!(json, r#"{"key":"AB","label":"Stockholm"}"#);
    }

    #[test]
    fn payload_reads_upstream_field_names() {
        let body = r#"{
            "soklista": {
                "listnamn": "grupperat yrkesområde",
                "totalt_antal_platsannonser": 10,
                "totalt_antal_ledigajobb": 2,
                "sokdata": [
                    {"id": "3", "namn": "Data/IT", "antal_platsannonser": 10, "antal_ledigajobb": 2, "extra": true}
                ]
            }
        }"#;
        let payload: JobsPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.summary.total_ad_count, 10);
        assert_eq!(payload.summary.areas[0].name, "Data/IT");
        assert_eq!(payload.summary.areas[0].vacancy_count, 2);
    }
}
