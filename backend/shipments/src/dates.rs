use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{ShipmentRecord, status::UnknownVariant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBucket {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
}

impl DateBucket {
    /// Exclusive upper bound on the day difference, `None` for `All`.
    pub const fn window_days(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Today => Some(1),
            Self::ThisWeek => Some(7),
            Self::ThisMonth => Some(31),
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
        })
    }
}

impl FromStr for DateBucket {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "this_week" | "week" => Ok(Self::ThisWeek),
            "this_month" | "month" => Ok(Self::ThisMonth),
            _ => Err(UnknownVariant {
                kind: "date bucket",
                value: s.to_string(),
            }),
        }
    }
}

/// Whole calendar days from `date` up to `now`'s day. Negative for future dates.
pub fn days_before(date: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now.date() - date.date()).num_days()
}

/// Records without a usable date always match.
pub fn matches_bucket(record: &ShipmentRecord, bucket: DateBucket, now: NaiveDateTime) -> bool {
    let Some(window) = bucket.window_days() else {
        return true;
    };

    let Some(date) = record.date() else {
        return true;
    };

    (0..window).contains(&days_before(date, now))
}
