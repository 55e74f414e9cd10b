//! Domain record types carried by the queues.
//!
//! The queues themselves are generic; these are the concrete records the
//! trading pipeline moves through them. Sequence numbers are u64 for
//! wrap-safety. All types are `Copy` and fixed-width so they are eligible
//! for bulk transfer through the SPSC ring.

use serde::{Deserialize, Serialize};

/// Sequence number for records flowing through a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SeqNum(pub u64);

impl SeqNum {
    /// Initial sequence number for a new stream.
    pub const ZERO: Self = Self(0);

    /// Next sequence number (wraps on overflow).
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u64> for SeqNum {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<SeqNum> for u64 {
    fn from(s: SeqNum) -> Self {
        s.0
    }
}

/// Which side of the book a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// An order record as handed from a feed/strategy context to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Stream position assigned by the producer.
    pub seq: SeqNum,
    /// Limit price in fixed-point ticks.
    pub price_ticks: u64,
    /// Quantity in lots.
    pub quantity: u32,
    pub side: Side,
}

/// An execution record as reported back from the matching stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Sequence of the order this execution belongs to.
    pub order_seq: SeqNum,
    /// Fill price in fixed-point ticks.
    pub price_ticks: u64,
    /// Filled quantity in lots.
    pub filled: u32,
    pub side: Side,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_num_wraps_at_max() {
        assert_eq!(SeqNum::ZERO.next(), SeqNum(1));
        assert_eq!(SeqNum(u64::MAX).next(), SeqNum::ZERO);
    }

    #[test]
    fn records_roundtrip_through_serde() {
        let order = OrderRecord {
            seq: SeqNum(7),
            price_ticks: 100_000,
            quantity: 250,
            side: Side::Bid,
        };
        let json = serde_json::to_string(&order).unwrap();
        let back: OrderRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
