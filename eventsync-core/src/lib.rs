//! Core of eventsync.
//!
//! - `event` / `criteria` / `search_terms`: what is fetched and what is wanted
//! - `filter` / `dedup`: selecting candidate events per target calendar
//! - `datetime` / `window`: zoned instants and the reconciliation window
//! - `remote` / `sync`: the calendar seam and the append-only sync engine

pub mod criteria;
pub mod datetime;
pub mod dedup;
pub mod error;
pub mod event;
pub mod filter;
pub mod remote;
pub mod search_terms;
pub mod sync;
pub mod window;

#[cfg(test)]
mod testing;

pub use criteria::SearchCriterion;
pub use datetime::{EventSpan, Normalizer};
pub use dedup::dedupe;
pub use error::{SyncError, SyncResult};
pub use event::{Category, Event, ListingResponse, Tag};
pub use filter::{filter, group_by_calendar};
pub use remote::{
    CalendarService, EntryTime, EventPage, NewCalendarEntry, RemoteCalendar, WindowReader,
    ensure_calendar,
};
pub use sync::{SyncEngine, SyncReport};
pub use window::CalendarWindow;
