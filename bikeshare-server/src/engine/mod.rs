//! Station state engine.
//!
//! One engine per deployment keeps the latest station information and
//! station status tables, refreshes each on its own TTL, and answers
//! challenge and availability queries against whatever is cached.

mod config;
mod error;
mod names;
mod runner;
mod select;
mod timers;


pub use config::{EngineConfig, SelectionConfig};
pub use error::{ManifestError, QueryError, SelectionError};
pub use names::NameShortener;
pub use runner::{
    Challenge, ChallengeStop, EngineHandle, EngineSnapshot, RefreshContext, TableMeta,
};
pub use select::{
    AvailabilitySummary, Candidate, ChallengePick, ChallengeRequest, InformationTable,
    StatusTable, eligible_stations, nearby, select_challenge, summarize,
};
pub use timers::{FeedKind, PendingTimers};
