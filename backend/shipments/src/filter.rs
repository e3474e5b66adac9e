use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    ShipmentRecord,
    dates::{DateBucket, matches_bucket},
    status::{StatusCategory, StatusFilter, UnknownVariant, classify, needs_attention},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTab {
    #[default]
    Active,
    Archive,
    Attention,
}

impl fmt::Display for ViewTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Archive => "archive",
            Self::Attention => "attention",
        })
    }
}

impl FromStr for ViewTab {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archive" => Ok(Self::Archive),
            "attention" => Ok(Self::Attention),
            _ => Err(UnknownVariant {
                kind: "tab",
                value: s.to_string(),
            }),
        }
    }
}

pub fn is_archive(record: &ShipmentRecord) -> bool {
    classify(&record.status()) == StatusCategory::Delivered
}

pub fn matches_status(record: &ShipmentRecord, filter: StatusFilter) -> bool {
    filter
        .category()
        .is_none_or(|category| classify(&record.status()) == category)
}

pub fn matches_tab(record: &ShipmentRecord, tab: ViewTab) -> bool {
    match tab {
        ViewTab::Active => !is_archive(record),
        ViewTab::Archive => is_archive(record),
        ViewTab::Attention => needs_attention(&record.status()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub date: DateBucket,
    pub status: StatusFilter,
    pub tab: ViewTab,
}

impl Filters {
    pub fn include(&self, record: &ShipmentRecord, now: NaiveDateTime) -> bool {
        include(record, self.date, self.status, self.tab, now)
    }

    /// Keeps input order.
    pub fn apply<'a>(
        &self,
        records: &'a [ShipmentRecord],
        now: NaiveDateTime,
    ) -> Vec<&'a ShipmentRecord> {
        records
            .iter()
            .filter(|record| self.include(record, now))
            .collect()
    }
}

pub fn include(
    record: &ShipmentRecord,
    date: DateBucket,
    status: StatusFilter,
    tab: ViewTab,
    now: NaiveDateTime,
) -> bool {
    matches_bucket(record, date, now) && matches_status(record, status) && matches_tab(record, tab)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn record(value: Value) -> ShipmentRecord {
        serde_json::from_value(value).unwrap()
    }

    fn with_status(status: &str) -> ShipmentRecord {
        record(json!({ "State": status }))
    }

    fn sample() -> Vec<ShipmentRecord> {
        vec![
            record(json!({ "Number": "1", "State": "Создана" })),
            record(json!({ "Number": "2", "State": "Доставлена", "DateArrival": "2025-06-15" })),
            record(json!({ "Number": "3", "State": "В пути, требует оплаты" })),
            record(json!({ "Number": "4" })),
            record(json!({ "Number": "5", "State": "Готов к выдаче", "DateArrival": "2025-05-01" })),
            record(json!({ "Number": "6", "State": "Ожидает доставки" })),
        ]
    }

    fn numbers(records: Vec<&ShipmentRecord>) -> Vec<String> {
        records.into_iter().filter_map(|r| r.number()).collect()
    }

    #[test]
    fn test_delivered_is_archive_regardless_of_filters() {
        let delivered = with_status("Доставлена получателю");

        for date in [DateBucket::All, DateBucket::Today, DateBucket::ThisMonth] {
            assert!(include(&delivered, date, StatusFilter::All, ViewTab::Archive, now()));
            assert!(!include(&delivered, date, StatusFilter::All, ViewTab::Active, now()));
            assert!(!include(&delivered, date, StatusFilter::Delivered, ViewTab::Active, now()));
        }
    }

    #[test]
    fn test_unclassified_only_passes_all() {
        for r in [with_status(""), with_status("Отменена"), record(json!({}))] {
            assert!(matches_status(&r, StatusFilter::All));

            for filter in [
                StatusFilter::Created,
                StatusFilter::Accepted,
                StatusFilter::InTransit,
                StatusFilter::ReadyForPickup,
                StatusFilter::Delivered,
            ] {
                assert!(!matches_status(&r, filter));
            }
        }
    }

    #[test]
    fn test_default_view_is_not_archive() {
        for r in sample() {
            assert_eq!(
                include(&r, DateBucket::All, StatusFilter::All, ViewTab::Active, now()),
                !is_archive(&r)
            );
        }
    }

    #[test]
    fn test_attention_tab() {
        let filters = Filters {
            tab: ViewTab::Attention,
            ..Filters::default()
        };

        assert_eq!(numbers(filters.apply(&sample(), now())), ["3", "6"]);
    }

    #[test]
    fn test_apply_keeps_order() {
        let records = sample();

        let active = Filters::default();
        assert_eq!(numbers(active.apply(&records, now())), ["1", "3", "4", "5", "6"]);

        let archive_today = Filters {
            date: DateBucket::Today,
            tab: ViewTab::Archive,
            ..Filters::default()
        };
        assert_eq!(numbers(archive_today.apply(&records, now())), ["2"]);

        let ready_this_week = Filters {
            date: DateBucket::ThisWeek,
            status: StatusFilter::ReadyForPickup,
            tab: ViewTab::Active,
        };
        assert!(ready_this_week.apply(&records, now()).is_empty());
    }
}
