//! `blockmart-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the logical block-height clock, and the
//! aggregate traits every ledger in this workspace is built on.

pub mod aggregate;
pub mod height;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use height::BlockHeight;
pub use id::{AccountId, ContractId};
