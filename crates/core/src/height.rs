//! Logical block height: the domain's only notion of time.

use serde::{Deserialize, Serialize};

/// Monotonically non-decreasing logical height, supplied by the host
/// execution environment with every command.
///
/// The domain never advances the counter itself; it only computes differences
/// against heights stored in past events (e.g. return-window eligibility).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Heights elapsed since `earlier`.
    ///
    /// Saturates at zero if `earlier` is in the future; the host guarantees
    /// monotonicity, so that only arises on malformed input.
    pub const fn elapsed_since(self, earlier: BlockHeight) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The height `blocks` later. Used by hosts and test harnesses to mine
    /// forward; saturates at the maximum representable height.
    pub const fn advanced_by(self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }
}

impl From<u64> for BlockHeight {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<BlockHeight> for u64 {
    fn from(value: BlockHeight) -> Self {
        value.0
    }
}

impl core::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
