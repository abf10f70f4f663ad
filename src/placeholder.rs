//! Built-in record shown on first run and whenever a data request fails.

use crate::{AreaStat, CityKey, JobResult, JobSummary};
use chrono::{DateTime, NaiveDate, Utc};

pub const PLACEHOLDER_KEY: &str = "1";
pub const PLACEHOLDER_LABEL: &str = "Stockholm";

/// `(id, name, ad count, vacancy count)` per occupational area.
const AREAS: &[(&str, &str, u32, u32)] = &[
    ("1", "Administration, ekonomi, juridik", 1784, 3),
    ("2", "Bygg och anläggning", 649, 0),
    ("3", "Data/IT", 1488, 0),
    ("4", "Kropps- och skönhetsvård", 107, 0),
    ("5", "Försäljning, inköp, marknadsföring", 1987, 5),
    ("6", "Hantverksyrken", 60, 0),
    ("7", "Hotell, restaurang, storhushåll", 1026, 9),
    ("8", "Hälso- och sjukvård", 1593, 1),
    ("9", "Industriell tillverkning", 188, 0),
    ("10", "Installation, drift, underhåll", 464, 0),
    ("11", "Kultur, media, design", 187, 0),
    ("12", "Sanering och renhållning", 425, 1),
    ("13", "Naturbruk", 86, 0),
    ("14", "Naturvetenskapligt arbete", 78, 0),
    ("15", "Pedagogiskt arbete", 1987, 9),
    ("16", "Socialt arbete", 1052, 0),
    ("17", "Säkerhetsarbete", 95, 0),
    ("18", "Tekniskt arbete", 423, 0),
    ("19", "Transport", 682, 0),
    ("20", "Chefer och verksamhetsledare", 537, 1),
    ("22", "Militärt arbete", 4, 0),
];

/// 2018-05-10 15:50 Stockholm time.
fn placeholder_created() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2018, 5, 10)
        .and_then(|date| date.and_hms_opt(13, 50, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// The fixed Stockholm record. Its `created` stamp is old, so it never
/// replaces fresher data already shown on the Stockholm card.
pub fn initial_jobs() -> JobResult {
    JobResult {
        key: CityKey::new(PLACEHOLDER_KEY),
        label: PLACEHOLDER_LABEL.to_string(),
        created: placeholder_created(),
        summary: JobSummary {
            list_name: "grupperat yrkesområde".to_string(),
            total_ad_count: 14902,
            total_vacancy_count: 29,
            areas: AREAS
                .iter()
                .map(|&(id, name, ad_count, vacancy_count)| AreaStat {
                    id: id.to_string(),
                    name: name.to_string(),
                    ad_count,
                    vacancy_count,
                })
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_stockholm() {
        let jobs = initial_jobs();
        assert_eq!(jobs.key.as_str(), "1");
        assert_eq!(jobs.label, "Stockholm");
        assert_eq!(jobs.summary.areas.len(), 21);
        assert_eq!(jobs.created.to_rfc3339(), "2018-05-10T13:50:00+00:00");
    }
}
