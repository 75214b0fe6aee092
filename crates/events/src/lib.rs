//! Domain events: the observability side channel of the ledgers.
//!
//! Aggregates return events as plain values; this crate supplies the shared
//! event abstraction plus an in-memory journal that external tooling
//! (deployment scripts, dashboards) can consume. The domain never reads
//! events back.

pub mod envelope;
pub mod event;
pub mod journal;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use journal::EventJournal;
