use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NUMBER_ALIASES: &[&str] = &["Number", "number", "Nomer", "id"];
pub const STATUS_ALIASES: &[&str] = &["State", "Status", "state", "status"];
pub const FROM_CITY_ALIASES: &[&str] = &["CitySender", "FromCity", "from"];
pub const TO_CITY_ALIASES: &[&str] = &["CityReceiver", "ToCity", "to"];

// Checked in order, arrival first.
pub const DATE_ALIASES: &[&str] = &["DateArrival", "DatePrih", "DateVr", "DateDoc", "Date", "date"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// One perevozka exactly as the upstream sent it.
///
/// There is no schema: every accessor looks up a list of known aliases and
/// returns `None` when none of them carries a usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentRecord(pub Map<String, Value>);

impl ShipmentRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn field(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| match self.0.get(*alias)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn number(&self) -> Option<String> {
        self.field(NUMBER_ALIASES)
    }

    /// Empty string when the record carries no status.
    pub fn status(&self) -> String {
        self.field(STATUS_ALIASES).unwrap_or_default()
    }

    pub fn from_city(&self) -> Option<String> {
        self.field(FROM_CITY_ALIASES)
    }

    pub fn to_city(&self) -> Option<String> {
        self.field(TO_CITY_ALIASES)
    }

    /// Only the first present date alias counts. If it does not parse the
    /// record is undated, later aliases are not consulted.
    pub fn date(&self) -> Option<NaiveDateTime> {
        DATE_ALIASES
            .iter()
            .find_map(|alias| {
                self.0
                    .get(*alias)?
                    .as_str()
                    .filter(|raw| !raw.trim().is_empty())
            })
            .and_then(parse_date)
    }
}

impl From<Map<String, Value>> for ShipmentRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Upstream payloads are either a bare array or an object wrapping one.
pub fn records_from_json(value: Value) -> Vec<ShipmentRecord> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match ["items", "Perevozki", "data"]
            .iter()
            .find_map(|key| object.remove(*key))
        {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(ShipmentRecord(fields)),
            _ => None,
        })
        .collect()
}

/// Offset-carrying timestamps are moved to local time, everything else is
/// taken as local wall-clock time already.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
