//! # Shipments
//!
//! Everything the list screen does with perevozki once they arrive from 1C.
//!
//! The upstream gives no schema, so a [`ShipmentRecord`] is just the JSON
//! object it sent. Fields are looked up through alias lists and anything missing
//! renders as a placeholder instead of failing.
//!
//!
//!
//! ## Classification
//!
//! Status is free Russian text. [`status::classify`] walks [`status::STATUS_RULES`]
//! top to bottom and returns the first category whose keyword is a substring of
//! the lower-cased text. No match, or no text, is `unclassified`.
//!
//!
//!
//! ## Filtering
//!
//! A record is shown when all three hold:
//! - date bucket: whole days between the record's date and today fall in the window,
//!   undated records always pass, future records only pass `all`
//! - status filter: `all`, or the classified category equals the selection
//! - tab: `archive` is delivered, `active` is everything else, `attention` looks for
//!   "требует"/"ожида" in the status text
//!
//! Nothing here does I/O or keeps state between calls, callers pass `now`.

pub mod dates;
pub mod filter;
pub mod record;
pub mod status;
pub mod view;

pub use dates::{DateBucket, matches_bucket};
pub use filter::{Filters, ViewTab, include, is_archive};
pub use record::{ShipmentRecord, records_from_json};
pub use status::{StatusCategory, StatusFilter, classify};
pub use view::{Card, ListState, ShipmentList};
