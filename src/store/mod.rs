//! Per-session state for the three remote resources

pub mod slot;
pub mod stock_store;

use serde::{Deserialize, Serialize};

pub use slot::{Phase, ResourceSlot, ResourceState, Ticket};
pub use stock_store::StockStore;

/// How a slot treats fetches that overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Whichever fetch resolves last determines the state, even if it was
    /// issued first.
    #[default]
    LastSettled,
    /// Only the most recently issued fetch may settle; older ones are
    /// discarded when they resolve.
    LatestIssued,
}
