use crate::model::{Transaction, TransactionState};
use crate::types::TransactionId;

/// Client-side snapshot of the transactions the caller may see.
///
/// Scoping happens backend-side: members receive only their own records,
/// admins receive everything, anonymous callers receive nothing. Like the
/// catalog, the snapshot is replaced wholesale after each successful call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with the backend's returned state.
    pub fn replace(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    /// Drops all records, as on logout or session reset.
    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// All transactions in the snapshot.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Looks a transaction up by id.
    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    /// Transactions currently in the given lifecycle state.
    pub fn in_state(&self, state: TransactionState) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.state() == state)
            .collect()
    }
}
