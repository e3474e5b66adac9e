use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Unclassified,
    Created,
    Accepted,
    InTransit,
    ReadyForPickup,
    Delivered,
}

impl StatusCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unclassified => "unclassified",
            Self::Created => "created",
            Self::Accepted => "accepted",
            Self::InTransit => "in_transit",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::Delivered => "delivered",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unclassified => "Без статуса",
            Self::Created => "Создана",
            Self::Accepted => "Принята",
            Self::InTransit => "В пути",
            Self::ReadyForPickup => "Готова к выдаче",
            Self::Delivered => "Доставлена",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct StatusRule {
    pub category: StatusCategory,
    pub keywords: &'static [&'static str],
}

/// Checked top to bottom, first hit wins. Keywords are lower case.
pub const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        category: StatusCategory::Created,
        keywords: &["создан"],
    },
    StatusRule {
        category: StatusCategory::Accepted,
        keywords: &["принят"],
    },
    StatusRule {
        category: StatusCategory::InTransit,
        keywords: &["в пути"],
    },
    StatusRule {
        category: StatusCategory::ReadyForPickup,
        keywords: &["готов", "к выдаче"],
    },
    StatusRule {
        category: StatusCategory::Delivered,
        keywords: &["доставлен", "вручен"],
    },
];

/// "Requires action" and "awaiting" markers for the attention tab.
pub const ATTENTION_MARKERS: &[&str] = &["требует", "ожида"];

pub fn classify(status: &str) -> StatusCategory {
    classify_with(STATUS_RULES, status)
}

pub fn classify_with(rules: &[StatusRule], status: &str) -> StatusCategory {
    let status = status.to_lowercase();
    if status.is_empty() {
        return StatusCategory::Unclassified;
    }

    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| status.contains(keyword)))
        .map_or(StatusCategory::Unclassified, |rule| rule.category)
}

pub fn needs_attention(status: &str) -> bool {
    let status = status.to_lowercase();

    ATTENTION_MARKERS.iter().any(|marker| status.contains(marker))
}

/// Status dropdown. `Unclassified` is not selectable, so any concrete
/// choice hides records the classifier could not place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Created,
    Accepted,
    InTransit,
    ReadyForPickup,
    Delivered,
}

impl StatusFilter {
    pub const fn category(self) -> Option<StatusCategory> {
        match self {
            Self::All => None,
            Self::Created => Some(StatusCategory::Created),
            Self::Accepted => Some(StatusCategory::Accepted),
            Self::InTransit => Some(StatusCategory::InTransit),
            Self::ReadyForPickup => Some(StatusCategory::ReadyForPickup),
            Self::Delivered => Some(StatusCategory::Delivered),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "created" => Ok(Self::Created),
            "accepted" => Ok(Self::Accepted),
            "in_transit" => Ok(Self::InTransit),
            "ready_for_pickup" => Ok(Self::ReadyForPickup),
            "delivered" => Ok(Self::Delivered),
            _ => Err(UnknownVariant {
                kind: "status filter",
                value: s.to_string(),
            }),
        }
    }
}
