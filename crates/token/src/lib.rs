//! Token domain module (event-sourced).
//!
//! A fungible-balance ledger with the well-known contract the store's host
//! environment collaborates with: mint (minter only), transfer, burn, and
//! balance queries. Pure deterministic domain logic, no IO.

pub mod error;
pub mod token;

pub use error::{TokenError, TokenResult};
pub use token::{
    Burn, Burned, Mint, Minted, Token, TokenCommand, TokenEvent, Transfer, Transferred,
};
