//! Store domain module (event-sourced).
//!
//! The inventory/order ledger: owner-gated catalog administration, customer
//! purchases and returns with a block-height eligibility window, and
//! read-only aggregate queries. Implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage) — the host execution environment
//! supplies caller identity, the logical clock, and value transfer.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{
    AddProduct, BuyProduct, Order, OrderPlaced, ProductAdded, ProductId, ProductRecord,
    QuantityUpdated, ReturnInitiated, ReturnProduct, Store, StoreCommand, StoreEvent,
    UpdateQuantity, DEFAULT_RETURN_WINDOW,
};
