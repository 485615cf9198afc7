use crate::types::{Identity, ItemName, TransactionId};
use chrono::{DateTime, Utc};
use std::fmt;

/// A rentable inventory item, as last reported by the backend.
///
/// `quantity` is the number of units currently available for reservation.
/// It only changes as a side effect of transactions being accepted or
/// checked back in; reserving alone does not touch it.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Unique item name.
    pub name: ItemName,
    /// Units currently available.
    pub quantity: u32,
    /// When the item was last checked back in.
    pub date_in: Option<DateTime<Utc>>,
    /// When the item was last handed out.
    pub date_out: Option<DateTime<Utc>>,
}

/// Lifecycle state of a [`Transaction`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionState {
    /// Reservation created, item not yet handed out.
    Requested,
    /// An administrator handed the item out.
    Accepted,
    /// The item came back; terminal.
    Returned,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::Returned => "returned",
        };
        f.write_str(label)
    }
}

/// A reservation/checkout/return record, as last reported by the backend.
///
/// Invariants (enforced by the backend, preserved by every snapshot):
/// `returned` implies `accepted`; `date_accepted` is present iff `accepted`;
/// `date_returned` is present iff `returned`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    /// Backend-assigned identifier.
    pub id: TransactionId,
    /// Item the transaction is against.
    pub item: ItemName,
    /// Identity that created the reservation.
    pub requested_by: Identity,
    /// Units requested.
    pub requested_quantity: u32,
    /// When the reservation was created.
    pub date_requested: DateTime<Utc>,
    /// Whether an administrator has handed the item out.
    pub accepted: bool,
    /// Administrator who handed the item out.
    pub accepted_by: Option<Identity>,
    /// When the item was handed out.
    pub date_accepted: Option<DateTime<Utc>>,
    /// Whether the item has come back.
    pub returned: bool,
    /// When the item came back.
    pub date_returned: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Returns the lifecycle state implied by the flags.
    pub fn state(&self) -> TransactionState {
        if self.returned {
            TransactionState::Returned
        } else if self.accepted {
            TransactionState::Accepted
        } else {
            TransactionState::Requested
        }
    }

    /// Whether the record satisfies the flag/stamp invariants.
    pub fn is_consistent(&self) -> bool {
        if self.returned && !self.accepted {
            return false;
        }
        self.accepted == self.date_accepted.is_some()
            && self.returned == self.date_returned.is_some()
            && self.accepted == self.accepted_by.is_some()
    }
}
