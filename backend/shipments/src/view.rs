use chrono::NaiveDateTime;

use crate::{
    ShipmentRecord,
    filter::Filters,
    status::{StatusCategory, classify},
};

pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Failed(String),
    Loaded(Vec<ShipmentRecord>),
}

/// The list screen: one fetch per credential set, local re-filtering after.
#[derive(Debug, Clone)]
pub struct ShipmentList {
    login: String,
    state: ListState,
    pub filters: Filters,
}

impl ShipmentList {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            state: ListState::Loading,
            filters: Filters::default(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Returns `true` when the caller has to fetch again.
    pub fn set_login(&mut self, login: impl Into<String>) -> bool {
        let login = login.into();
        if login == self.login {
            return false;
        }

        self.login = login;
        self.state = ListState::Loading;
        true
    }

    pub fn loaded(&mut self, result: Result<Vec<ShipmentRecord>, String>) {
        self.state = match result {
            Ok(records) => ListState::Loaded(records),
            Err(message) => ListState::Failed(message),
        };
    }

    /// Empty while loading or failed.
    pub fn visible(&self, now: NaiveDateTime) -> Vec<&ShipmentRecord> {
        match &self.state {
            ListState::Loaded(records) => self.filters.apply(records, now),
            _ => Vec::new(),
        }
    }
}

/// What a rendered card shows. Missing fields become [`PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub number: String,
    pub status: String,
    pub category: StatusCategory,
    pub route: String,
    pub date: String,
}

impl From<&ShipmentRecord> for Card {
    fn from(record: &ShipmentRecord) -> Self {
        let status = record.status();
        let category = classify(&status);
        let or_placeholder = |value: Option<String>| value.unwrap_or_else(|| PLACEHOLDER.to_string());

        Self {
            number: or_placeholder(record.number()),
            status: if status.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                status
            },
            category,
            route: format!(
                "{} → {}",
                or_placeholder(record.from_city()),
                or_placeholder(record.to_city())
            ),
            date: or_placeholder(record.date().map(|d| d.format("%d.%m.%Y").to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::filter::ViewTab;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn records() -> Vec<ShipmentRecord> {
        serde_json::from_value(json!([
            { "Number": "1", "State": "В пути" },
            { "Number": "2", "State": "Доставлена" },
        ]))
        .unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let mut list = ShipmentList::new("order@x.com");
        assert_eq!(list.state(), &ListState::Loading);
        assert!(list.visible(now()).is_empty());

        list.loaded(Ok(records()));
        assert_eq!(list.visible(now()).len(), 1);

        list.filters.tab = ViewTab::Archive;
        assert_eq!(list.visible(now())[0].number().as_deref(), Some("2"));

        assert!(!list.set_login("order@x.com"));
        assert!(list.set_login("other@x.com"));
        assert_eq!(list.state(), &ListState::Loading);

        list.loaded(Err("Unauthorized".to_string()));
        assert_eq!(list.state(), &ListState::Failed("Unauthorized".to_string()));
        assert!(list.visible(now()).is_empty());
    }

    #[test]
    fn test_card_placeholders() {
        let card = Card::from(&ShipmentRecord::default());

        assert_eq!(card.number, PLACEHOLDER);
        assert_eq!(card.status, PLACEHOLDER);
        assert_eq!(card.category, StatusCategory::Unclassified);
        assert_eq!(card.route, "— → —");
        assert_eq!(card.date, PLACEHOLDER);
    }

    #[test]
    fn test_card_fields() {
        let record: ShipmentRecord = serde_json::from_value(json!({
            "Number": "000107984",
            "State": "Готов к выдаче",
            "CitySender": "Москва",
            "CityReceiver": "Калининград",
            "DatePrih": "2025-06-14T18:00:00",
        }))
        .unwrap();

        let card = Card::from(&record);
        assert_eq!(card.number, "000107984");
        assert_eq!(card.category, StatusCategory::ReadyForPickup);
        assert_eq!(card.route, "Москва → Калининград");
        assert_eq!(card.date, "14.06.2025");
    }
}
