//! Event log core for the Beacon device-management platform.
//!
//! Implements the persistence path for structured device/user events and
//! the declarative query layer over event history:
//!
//! - [`save_event`] assigns the next value of the durable `"event"`
//!   sequence and inserts the record in a single transaction, so every
//!   stored event carries a unique, strictly increasing `index`.
//! - [`find_events`] takes a [`ConditionSet`] (`select` / `where` /
//!   `between` / `limit`), translates it into a bounded, ordered SQL read
//!   via [`translate`], and normalizes the result so callers always
//!   observe descending-index ordering regardless of which comparison
//!   operator drove the underlying read.
//! - [`latest_event_for_device`] is the bounded limit-1 read backing the
//!   latest-event-per-device aggregation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use beacon_events::{save_event, find_events, ConditionSet, NewEvent};
//!
//! let record = save_event(&conn, &new_event)?;
//! let recent = find_events(&conn, &ConditionSet::default())?;
//! ```

mod error;
mod query;
mod record;
mod sequence;
mod store;

pub use error::{EventStoreError, CODE_CONNECTION, CODE_STORE};
pub use query::{
    translate, BetweenClause, Comparator, ConditionSet, QueryPlan, SortDirection, WhereClause,
};
pub use record::{EventRecord, NewEvent};
pub use sequence::{next_index, EVENT_SEQUENCE};
pub use store::{find_events, latest_event_for_device, save_event};
