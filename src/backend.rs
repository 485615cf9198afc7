use crate::error::BackendError;
use crate::model::{Item, Transaction};
use crate::types::{AuthToken, Identity, ItemName, Level, TransactionId};
use async_trait::async_trait;

/// The `(identity, token)` pair stamped on every authenticated call.
///
/// The backend re-derives the caller's level from this pair on each request;
/// the client's own level gating is advisory only.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Caller {
    /// Identity the call is attributed to.
    pub identity: Identity,
    /// Opaque session token.
    pub token: AuthToken,
}

/// Account-creation fields supplied with an anonymous reservation.
///
/// The backend creates an account from these and attaches the reservation
/// to it. All fields have already passed client-side validation.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuestSignup {
    pub username: String,
    pub password: String,
    pub email: Identity,
    pub student_id: String,
}

/// Who a reservation is attributed to.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Requester {
    /// Signed-in caller; the reservation is attributed to the session identity.
    Session(Caller),
    /// Anonymous caller; the backend creates an account from the signup fields.
    Guest(GuestSignup),
}

/// A validated reservation ready to be issued.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReserveRequest {
    pub item: ItemName,
    pub quantity: u32,
    pub requester: Requester,
}

/// Backend interface for session classification and login.
#[async_trait]
pub trait SessionBackend {
    /// Classifies a `(token, identity)` pair into an authorization level.
    ///
    /// An unknown or invalidated token classifies as [`Level::Anonymous`].
    async fn classify_token(
        &self,
        token: AuthToken,
        identity: Identity,
    ) -> std::result::Result<Level, BackendError>;

    /// Exchanges credentials for a session token.
    async fn log_in(
        &self,
        identity: Identity,
        secret: String,
    ) -> std::result::Result<AuthToken, BackendError>;

    /// Invalidates a session token backend-side.
    async fn log_out(&self, caller: Caller) -> std::result::Result<(), BackendError>;
}

/// Backend interface for the item inventory.
#[async_trait]
pub trait ItemBackend {
    /// Returns all items. Label filtering is applied client-side.
    async fn list_items(&self) -> std::result::Result<Vec<Item>, BackendError>;

    /// Creates an item; admin only. Returns the full updated item list.
    async fn create_item(
        &self,
        caller: Caller,
        name: ItemName,
        quantity: u32,
    ) -> std::result::Result<Vec<Item>, BackendError>;

    /// Deletes an item by name; admin only. Returns the full updated item list.
    async fn delete_item(
        &self,
        caller: Caller,
        name: ItemName,
    ) -> std::result::Result<Vec<Item>, BackendError>;
}

/// Backend interface for the transaction ledger.
#[async_trait]
pub trait LedgerBackend {
    /// Returns the transactions the caller is entitled to see: members get
    /// their own, admins get all.
    async fn list_transactions(
        &self,
        caller: Caller,
    ) -> std::result::Result<Vec<Transaction>, BackendError>;

    /// Creates a reservation. Returns the updated item snapshot; available
    /// quantity is untouched until the reservation is accepted.
    async fn reserve(
        &self,
        request: ReserveRequest,
    ) -> std::result::Result<Vec<Item>, BackendError>;

    /// Hands an item out for a requested transaction; admin only. Returns the
    /// updated transaction list.
    async fn accept(
        &self,
        caller: Caller,
        transaction: TransactionId,
        item: ItemName,
    ) -> std::result::Result<Vec<Transaction>, BackendError>;

    /// Records the return of an accepted transaction; admin only. Returns the
    /// updated transaction list.
    async fn check_in(
        &self,
        caller: Caller,
        item: ItemName,
        transaction: TransactionId,
    ) -> std::result::Result<Vec<Transaction>, BackendError>;
}

/// Composite backend trait.
pub trait Backend: SessionBackend + ItemBackend + LedgerBackend + Send + Sync {}

impl<T> Backend for T where T: SessionBackend + ItemBackend + LedgerBackend + Send + Sync {}
