use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::backend::{
    Caller, ItemBackend, LedgerBackend, Requester, ReserveRequest, SessionBackend,
};
use crate::error::BackendError;
use crate::model::{Item, Transaction, TransactionState};
use crate::types::{AuthToken, Identity, ItemName, Level, TransactionId};

/// In-memory backend implementation for tests and demos.
///
/// Unlike the client-side snapshots, this is authoritative: it re-derives the
/// caller's level on every call, keeps a token blacklist, and owns quantity
/// accounting: availability is decremented when a reservation is accepted
/// and restored on check-in.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: RwLock<HashMap<Identity, Account>>,
    sessions: RwLock<HashMap<String, Identity>>,
    blacklist: RwLock<HashSet<String>>,
    items: RwLock<Vec<Item>>,
    transactions: RwLock<Vec<Transaction>>,
    token_seq: AtomicU64,
    transaction_seq: AtomicU64,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    level: Level,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account at the given level.
    pub fn add_account(&self, identity: Identity, password: impl Into<String>, level: Level) {
        let mut guard = self.inner.accounts.write().expect("poisoned lock");
        guard.insert(
            identity,
            Account {
                password: password.into(),
                level,
            },
        );
    }

    /// Seeds an inventory item.
    pub fn seed_item(&self, name: ItemName, quantity: u32) {
        let mut guard = self.inner.items.write().expect("poisoned lock");
        guard.push(Item {
            name,
            quantity,
            date_in: Some(Utc::now()),
            date_out: None,
        });
    }

    fn level_of(&self, caller: &Caller) -> Level {
        let blacklist = self.inner.blacklist.read().expect("poisoned lock");
        if blacklist.contains(caller.token.as_str()) {
            return Level::Anonymous;
        }
        let sessions = self.inner.sessions.read().expect("poisoned lock");
        match sessions.get(caller.token.as_str()) {
            Some(identity) if identity == &caller.identity => {
                let accounts = self.inner.accounts.read().expect("poisoned lock");
                accounts
                    .get(identity)
                    .map(|account| account.level)
                    .unwrap_or_default()
            }
            _ => Level::Anonymous,
        }
    }

    fn require(&self, caller: &Caller, required: Level) -> Result<(), BackendError> {
        let level = self.level_of(caller);
        if level < required {
            return Err(format!(
                "caller {} is {level}, operation requires {required}",
                caller.identity
            )
            .into());
        }
        Ok(())
    }

    fn next_transaction_id(&self) -> TransactionId {
        let n = self.inner.transaction_seq.fetch_add(1, Ordering::SeqCst) + 1;
        TransactionId::from_string(format!("T{n}"))
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn classify_token(
        &self,
        token: AuthToken,
        identity: Identity,
    ) -> std::result::Result<Level, BackendError> {
        Ok(self.level_of(&Caller { identity, token }))
    }

    async fn log_in(
        &self,
        identity: Identity,
        secret: String,
    ) -> std::result::Result<AuthToken, BackendError> {
        let accounts = self.inner.accounts.read().expect("poisoned lock");
        let Some(account) = accounts.get(&identity) else {
            return Err("invalid identity or password".into());
        };
        if account.password != secret {
            return Err("invalid identity or password".into());
        }
        drop(accounts);

        let n = self.inner.token_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("tok_{n}");
        let mut sessions = self.inner.sessions.write().expect("poisoned lock");
        sessions.insert(token.clone(), identity);
        Ok(AuthToken::new(token))
    }

    async fn log_out(&self, caller: Caller) -> std::result::Result<(), BackendError> {
        let mut sessions = self.inner.sessions.write().expect("poisoned lock");
        sessions.remove(caller.token.as_str());
        drop(sessions);
        let mut blacklist = self.inner.blacklist.write().expect("poisoned lock");
        blacklist.insert(caller.token.as_str().to_string());
        Ok(())
    }
}

#[async_trait]
impl ItemBackend for MemoryBackend {
    async fn list_items(&self) -> std::result::Result<Vec<Item>, BackendError> {
        let items = self.inner.items.read().expect("poisoned lock");
        Ok(items.clone())
    }

    async fn create_item(
        &self,
        caller: Caller,
        name: ItemName,
        quantity: u32,
    ) -> std::result::Result<Vec<Item>, BackendError> {
        self.require(&caller, Level::Admin)?;
        let mut items = self.inner.items.write().expect("poisoned lock");
        if items.iter().any(|item| item.name == name) {
            return Err(format!("an item named {name} already exists").into());
        }
        items.push(Item {
            name,
            quantity,
            date_in: Some(Utc::now()),
            date_out: None,
        });
        Ok(items.clone())
    }

    async fn delete_item(
        &self,
        caller: Caller,
        name: ItemName,
    ) -> std::result::Result<Vec<Item>, BackendError> {
        self.require(&caller, Level::Admin)?;
        let mut items = self.inner.items.write().expect("poisoned lock");
        let before = items.len();
        items.retain(|item| item.name != name);
        if items.len() == before {
            return Err(format!("no item with the name {name} found").into());
        }
        Ok(items.clone())
    }
}

#[async_trait]
impl LedgerBackend for MemoryBackend {
    async fn list_transactions(
        &self,
        caller: Caller,
    ) -> std::result::Result<Vec<Transaction>, BackendError> {
        let level = self.level_of(&caller);
        let transactions = self.inner.transactions.read().expect("poisoned lock");
        match level {
            Level::Anonymous => Err("listing transactions requires a valid session".into()),
            Level::Member => Ok(transactions
                .iter()
                .filter(|tx| tx.requested_by == caller.identity)
                .cloned()
                .collect()),
            Level::Admin => Ok(transactions.clone()),
        }
    }

    async fn reserve(
        &self,
        request: ReserveRequest,
    ) -> std::result::Result<Vec<Item>, BackendError> {
        if request.quantity == 0 {
            return Err("positive quantities only".into());
        }

        let requested_by = match request.requester {
            Requester::Session(caller) => {
                self.require(&caller, Level::Member)?;
                caller.identity
            }
            Requester::Guest(signup) => {
                // First reservation creates the account; a returning guest
                // keeps their existing one.
                let mut accounts = self.inner.accounts.write().expect("poisoned lock");
                accounts.entry(signup.email.clone()).or_insert(Account {
                    password: signup.password,
                    level: Level::Member,
                });
                signup.email
            }
        };

        let items = self.inner.items.read().expect("poisoned lock");
        if !items.iter().any(|item| item.name == request.item) {
            return Err(format!("no item with the name {} found", request.item).into());
        }
        let snapshot = items.clone();
        drop(items);

        let mut transactions = self.inner.transactions.write().expect("poisoned lock");
        transactions.push(Transaction {
            id: self.next_transaction_id(),
            item: request.item,
            requested_by,
            requested_quantity: request.quantity,
            date_requested: Utc::now(),
            accepted: false,
            accepted_by: None,
            date_accepted: None,
            returned: false,
            date_returned: None,
        });

        // Availability is untouched until an admin accepts.
        Ok(snapshot)
    }

    async fn accept(
        &self,
        caller: Caller,
        transaction: TransactionId,
        item: ItemName,
    ) -> std::result::Result<Vec<Transaction>, BackendError> {
        self.require(&caller, Level::Admin)?;

        let mut transactions = self.inner.transactions.write().expect("poisoned lock");
        let Some(tx) = transactions.iter_mut().find(|tx| tx.id == transaction) else {
            return Err(format!("no transaction {transaction} found").into());
        };
        if tx.state() != TransactionState::Requested {
            return Err(format!("transaction {transaction} is already {}", tx.state()).into());
        }
        if tx.item != item {
            return Err(format!("transaction {transaction} is not against {item}").into());
        }

        let mut items = self.inner.items.write().expect("poisoned lock");
        let Some(stock) = items.iter_mut().find(|stock| stock.name == item) else {
            return Err(format!("no item with the name {item} found").into());
        };
        if stock.quantity < tx.requested_quantity {
            return Err(format!("item {item} not available").into());
        }
        stock.quantity -= tx.requested_quantity;
        stock.date_out = Some(Utc::now());

        tx.accepted = true;
        tx.accepted_by = Some(caller.identity);
        tx.date_accepted = Some(Utc::now());
        Ok(transactions.clone())
    }

    async fn check_in(
        &self,
        caller: Caller,
        item: ItemName,
        transaction: TransactionId,
    ) -> std::result::Result<Vec<Transaction>, BackendError> {
        self.require(&caller, Level::Admin)?;

        let mut transactions = self.inner.transactions.write().expect("poisoned lock");
        let Some(tx) = transactions.iter_mut().find(|tx| tx.id == transaction) else {
            return Err(format!("no transaction {transaction} found").into());
        };
        if tx.state() != TransactionState::Accepted {
            return Err(format!(
                "transaction {transaction} is {}, expected accepted",
                tx.state()
            )
            .into());
        }

        let mut items = self.inner.items.write().expect("poisoned lock");
        if let Some(stock) = items.iter_mut().find(|stock| stock.name == item) {
            stock.quantity += tx.requested_quantity;
            stock.date_in = Some(Utc::now());
            stock.date_out = None;
        }

        tx.returned = true;
        tx.date_returned = Some(Utc::now());
        Ok(transactions.clone())
    }
}
