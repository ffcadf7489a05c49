//! Book ordering predicates and depth views
//!
//! The book has no storage of its own: these predicates define price-time
//! priority over the world's open orders, and the depth types are the
//! snapshot shape handed to external observers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use types::amount::Amount;
use types::order::Order;

/// Bid priority: price descending, then sequence ascending.
pub fn bid_priority(a: &Order, b: &Order) -> Ordering {
    b.price.cmp(&a.price).then(a.sequence.cmp(&b.sequence))
}

/// Ask priority: price ascending, then sequence ascending.
pub fn ask_priority(a: &Order, b: &Order) -> Ordering {
    a.price.cmp(&b.price).then(a.sequence.cmp(&b.sequence))
}

/// One aggregated price level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Amount,
    pub quantity: Amount,
}

/// Aggregated top-of-book snapshot, best levels first on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDepth {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}
