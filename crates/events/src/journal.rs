//! In-memory event journal for tests/dev and external observers.
//!
//! Events are the source of truth; the journal wraps them into envelopes with
//! monotonic sequence numbers per contract stream. No IO, no async.

use uuid::Uuid;

use blockmart_core::ContractId;

use crate::{Event, EventEnvelope};

/// Append-only, in-memory event log for a single contract stream.
#[derive(Debug, Clone)]
pub struct EventJournal<E> {
    contract_id: ContractId,
    aggregate_type: String,
    next_sequence_number: u64,
    entries: Vec<EventEnvelope<E>>,
}

impl<E: Event> EventJournal<E> {
    pub fn new(contract_id: ContractId, aggregate_type: impl Into<String>) -> Self {
        Self {
            contract_id,
            aggregate_type: aggregate_type.into(),
            next_sequence_number: 1,
            entries: Vec::new(),
        }
    }

    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    /// Append a single event, assigning and returning its sequence number.
    pub fn record(&mut self, event: E) -> u64 {
        let sequence_number = self.next_sequence_number;
        self.next_sequence_number += 1;

        tracing::debug!(
            event_type = event.event_type(),
            sequence_number,
            height = event.height().value(),
            "event recorded"
        );

        self.entries.push(EventEnvelope::new(
            Uuid::now_v7(),
            self.contract_id,
            self.aggregate_type.clone(),
            sequence_number,
            event,
        ));

        sequence_number
    }

    /// Append many events in order.
    pub fn record_all(&mut self, events: impl IntoIterator<Item = E>) {
        for event in events {
            self.record(event);
        }
    }

    pub fn entries(&self) -> &[EventEnvelope<E>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
