//! Client-side core for a shared equipment rental platform.
//!
//! Members of an organization browse a shared inventory and reserve items;
//! administrators approve reservations, hand items out, and record returns.
//! This crate implements the rental transaction lifecycle and the
//! authorization-gated inventory mutation logic: [`Coordinator`] validates
//! and authorizes typed [`Intent`]s against the caller's [`Level`], issues
//! them to a pluggable async [`Backend`], and folds each response back into
//! its [`Catalog`] and [`Ledger`] snapshots by wholesale replacement.
//!
//! The backend is the authority on everything: levels are re-derived from the
//! `(identity, token)` pair on every call, and the client-side gating here is
//! advisory UX rather than a security boundary. Rendering, identity-provider
//! redirect flows, and network transport are the caller's concern.
//!
//! # Examples
//!
//! Full rental lifecycle against the in-memory backend (enable
//! `memory-backend` and `memory-credentials`):
//! ```no_run
//! use stockroom::{CoordinatorBuilder, Identity, ItemName, Level};
//! # #[cfg(all(feature = "memory-backend", feature = "memory-credentials"))]
//! # {
//! use stockroom::{MemoryBackend, MemoryCredentialStore};
//! # futures::executor::block_on(async {
//! let backend = MemoryBackend::new();
//! backend.add_account(Identity::new("admin@example.ca")?, "pw", Level::Admin);
//! backend.seed_item(ItemName::new("Drill")?, 5);
//!
//! let mut coordinator = CoordinatorBuilder::new(backend)
//!     .credentials(MemoryCredentialStore::new())
//!     .build();
//! coordinator.load_session().await?;
//! coordinator.log_in(Identity::new("admin@example.ca")?, "pw".into()).await?;
//! coordinator.refresh_catalog().await?;
//! # Ok::<(), stockroom::Error>(())
//! # });
//! # }
//! ```
#![forbid(unsafe_code)]

mod backend;
mod catalog;
mod coordinator;
mod error;
mod ledger;
mod model;
mod session;
mod types;
mod validate;

#[cfg(feature = "memory-backend")]
mod memory_backend;

#[cfg(feature = "memory-credentials")]
mod memory_credentials;

pub use crate::backend::{
    Backend, Caller, GuestSignup, ItemBackend, LedgerBackend, Requester, ReserveRequest,
    SessionBackend,
};
pub use crate::catalog::Catalog;
pub use crate::coordinator::{AdminAction, Coordinator, CoordinatorBuilder, Intent};
pub use crate::error::{BackendError, Error, Result};
pub use crate::ledger::Ledger;
pub use crate::model::{Item, Transaction, TransactionState};
pub use crate::session::{CredentialStore, NoCredentialStore, Session, StoredCredentials};
pub use crate::types::{AuthToken, Identity, ItemName, Level, TransactionId};
pub use crate::validate::{
    FieldOutcome, ReservationForm, ValidationReport, parse_nonnegative_quantity,
    parse_positive_quantity, validate_reservation,
};

#[cfg(feature = "memory-backend")]
pub use crate::memory_backend::MemoryBackend;

#[cfg(feature = "memory-credentials")]
pub use crate::memory_credentials::MemoryCredentialStore;
