use crate::backend::{Backend, Caller, GuestSignup, Requester, ReserveRequest};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::model::{Item, Transaction, TransactionState};
use crate::session::{CredentialStore, NoCredentialStore, Session, StoredCredentials};
use crate::types::{Identity, ItemName, Level, TransactionId};
use crate::validate::{self, ReservationForm};
use log::{debug, warn};

/// A typed user action, interpreted and authorized by [`Coordinator::dispatch`].
///
/// The UI emits intents instead of threading submit callbacks through
/// component layers; the coordinator is the single interpreter.
#[derive(Clone, Debug)]
pub enum Intent {
    /// Create a reservation for an item.
    Reserve {
        item: ItemName,
        form: ReservationForm,
    },
    /// Hand an item out for a requested transaction.
    Accept {
        transaction: TransactionId,
        item: ItemName,
    },
    /// Record the return of an accepted transaction.
    CheckIn {
        item: ItemName,
        transaction: TransactionId,
    },
    /// Add a new item to the inventory.
    CreateItem { name: ItemName, quantity: u32 },
    /// Remove an item from the inventory.
    DeleteItem { name: ItemName },
}

/// Administrative action available on a transaction, gated by caller level
/// and lifecycle state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdminAction {
    /// Hand the item out (`Requested → Accepted`).
    Accept,
    /// Record the return (`Accepted → Returned`).
    CheckIn,
}

/// Coordinates user intents against the backend.
///
/// Holds the session, catalog, and ledger snapshots; authorizes each intent
/// against the session level before issuing the call, and folds the backend's
/// response back in by replacing the affected snapshot wholesale. The
/// client-side level gate is advisory UX; the backend re-checks every call
/// from the stamped `(identity, token)` pair and remains the authority.
#[derive(Debug)]
pub struct Coordinator<B, S = NoCredentialStore> {
    backend: B,
    credentials: S,
    session: Session,
    catalog: Catalog,
    ledger: Ledger,
}

/// Builder for [`Coordinator`].
pub struct CoordinatorBuilder<B, S = NoCredentialStore> {
    backend: B,
    credentials: S,
}

impl<B> CoordinatorBuilder<B, NoCredentialStore> {
    /// Creates a new builder with no credential persistence.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            credentials: NoCredentialStore,
        }
    }
}

impl<B, S> CoordinatorBuilder<B, S> {
    /// Sets the credential store implementation.
    pub fn credentials<S2: CredentialStore>(self, credentials: S2) -> CoordinatorBuilder<B, S2> {
        CoordinatorBuilder {
            backend: self.backend,
            credentials,
        }
    }

    /// Builds the coordinator with an anonymous session and empty snapshots.
    pub fn build(self) -> Coordinator<B, S> {
        Coordinator {
            backend: self.backend,
            credentials: self.credentials,
            session: Session::anonymous(),
            catalog: Catalog::new(),
            ledger: Ledger::new(),
        }
    }
}

impl<B, S> Coordinator<B, S>
where
    B: Backend,
    S: CredentialStore,
{
    /// Current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current ledger snapshot.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Establishes the session from persisted credentials.
    ///
    /// With no persisted pair the session is anonymous. Otherwise the backend
    /// classifies the pair; any classification failure degrades to anonymous
    /// rather than failing the load. A level above anonymous also refreshes
    /// the ledger.
    pub async fn load_session(&mut self) -> Result<Level> {
        let Some(credentials) = self.credentials.load().await else {
            self.session = Session::anonymous();
            self.ledger.clear();
            return Ok(Level::Anonymous);
        };

        let level = match self
            .backend
            .classify_token(credentials.token.clone(), credentials.identity.clone())
            .await
        {
            Ok(level) => level,
            Err(error) => {
                warn!("token classification failed, continuing as anonymous: {error}");
                Level::Anonymous
            }
        };
        debug!("session classified as {level} for {}", credentials.identity);
        self.session = Session::classified(credentials, level);

        if level > Level::Anonymous {
            self.refresh_ledger().await?;
        } else {
            self.ledger.clear();
        }
        Ok(level)
    }

    /// Exchanges credentials for a token, persists the pair, and reloads the
    /// session from scratch.
    ///
    /// On failure the session level is untouched and an authentication error
    /// is surfaced.
    pub async fn log_in(&mut self, identity: Identity, secret: String) -> Result<Level> {
        let token = self
            .backend
            .log_in(identity.clone(), secret)
            .await
            .map_err(|error| Error::Authentication(error.to_string()))?;

        self.credentials
            .store(StoredCredentials { token, identity })
            .await;
        self.load_session().await
    }

    /// Invalidates the token backend-side, clears persisted credentials, and
    /// resets the session to anonymous.
    ///
    /// Backend invalidation is best effort: local state is cleared even if
    /// the call fails, since the blacklist entry is the backend's concern.
    pub async fn log_out(&mut self) -> Result<()> {
        if let Some(caller) = self.session.caller() {
            if let Err(error) = self.backend.log_out(caller).await {
                warn!("token invalidation failed during logout: {error}");
            }
        }
        self.credentials.clear().await;
        self.session = Session::anonymous();
        self.ledger.clear();
        Ok(())
    }

    /// Fetches all items and replaces the catalog snapshot.
    pub async fn refresh_catalog(&mut self) -> Result<&[Item]> {
        let items = self.backend.list_items().await.map_err(Error::from)?;
        self.catalog.replace(items);
        Ok(self.catalog.items())
    }

    /// Items from the current snapshot, optionally filtered by label.
    pub fn list_items(&self, label: Option<&str>) -> Vec<&Item> {
        match label {
            Some(label) => self.catalog.filtered(label),
            None => self.catalog.items().iter().collect(),
        }
    }

    /// Fetches the transactions the caller may see and replaces the ledger.
    ///
    /// Anonymous callers see nothing; no call is issued for them. Members
    /// receive only their own records and admins everything; that scoping is
    /// backend-side, from the stamped `(identity, token)` pair.
    pub async fn refresh_ledger(&mut self) -> Result<&[Transaction]> {
        match self.session.caller() {
            None => self.ledger.clear(),
            Some(caller) => {
                let transactions = self
                    .backend
                    .list_transactions(caller)
                    .await
                    .map_err(Error::from)?;
                self.ledger.replace(transactions);
            }
        }
        Ok(self.ledger.transactions())
    }

    /// Interprets and executes a typed intent.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::Reserve { item, form } => self.reserve(item, &form).await,
            Intent::Accept { transaction, item } => self.accept(transaction, item).await,
            Intent::CheckIn { item, transaction } => self.check_in(item, transaction).await,
            Intent::CreateItem { name, quantity } => self.create_item(name, quantity).await,
            Intent::DeleteItem { name } => self.delete_item(name).await,
        }
    }

    /// Creates a reservation for an item.
    ///
    /// Validation runs first and blocks the call entirely if any applicable
    /// field fails. Signed-in callers are attributed their session identity;
    /// anonymous callers must supply the account-creation fields. On success
    /// the returned item snapshot replaces the catalog (available quantity is
    /// only decremented once the reservation is accepted), and a signed-in
    /// caller's ledger is refreshed so the new record shows up.
    pub async fn reserve(&mut self, item: ItemName, form: &ReservationForm) -> Result<()> {
        let report = validate::validate_reservation(self.session.level(), form);
        if !report.is_valid() {
            return Err(Error::Validation(report));
        }
        let Some(quantity) = validate::parse_positive_quantity(&form.quantity) else {
            return Err(Error::Validation(report));
        };

        let requester = match self.session.caller() {
            Some(caller) => Requester::Session(caller),
            None => Requester::Guest(GuestSignup {
                username: form.username.clone(),
                password: form.password.clone(),
                email: Identity::new(&form.email)?,
                student_id: form.student_id.clone(),
            }),
        };

        debug!("reserving {quantity} x {item}");
        let items = self
            .backend
            .reserve(ReserveRequest {
                item,
                quantity,
                requester,
            })
            .await
            .map_err(Error::from)?;
        self.catalog.replace(items);

        if self.session.caller().is_some() {
            self.refresh_ledger().await?;
        }
        Ok(())
    }

    /// Hands an item out for a requested transaction (admin only).
    ///
    /// The transition is `Requested → Accepted`; the backend stamps the
    /// accepting identity and date and decrements availability. A transaction
    /// already past `Requested` is refused without a call.
    pub async fn accept(&mut self, transaction: TransactionId, item: ItemName) -> Result<()> {
        let caller = self.require(Level::Admin)?;
        self.guard_state(&transaction, TransactionState::Requested)?;

        let transactions = self
            .backend
            .accept(caller, transaction, item)
            .await
            .map_err(Error::from)?;
        self.ledger.replace(transactions);
        Ok(())
    }

    /// Records the return of an accepted transaction (admin only).
    ///
    /// The transition is `Accepted → Returned`; refused client-side unless
    /// the transaction is currently `Accepted`, and the backend enforces the
    /// same rule authoritatively.
    pub async fn check_in(&mut self, item: ItemName, transaction: TransactionId) -> Result<()> {
        let caller = self.require(Level::Admin)?;
        self.guard_state(&transaction, TransactionState::Accepted)?;

        let transactions = self
            .backend
            .check_in(caller, item, transaction)
            .await
            .map_err(Error::from)?;
        self.ledger.replace(transactions);
        Ok(())
    }

    /// Adds a new item to the inventory (admin only).
    pub async fn create_item(&mut self, name: ItemName, quantity: u32) -> Result<()> {
        let caller = self.require(Level::Admin)?;
        debug!("creating item {name} with quantity {quantity}");
        let items = self
            .backend
            .create_item(caller, name, quantity)
            .await
            .map_err(Error::from)?;
        self.catalog.replace(items);
        Ok(())
    }

    /// Removes an item from the inventory (admin only).
    pub async fn delete_item(&mut self, name: ItemName) -> Result<()> {
        let caller = self.require(Level::Admin)?;
        debug!("deleting item {name}");
        let items = self
            .backend
            .delete_item(caller, name)
            .await
            .map_err(Error::from)?;
        self.catalog.replace(items);
        Ok(())
    }

    /// Administrative actions currently available on a transaction.
    ///
    /// Empty for non-admin callers. `Accept` is offered only while the
    /// transaction is `Requested`, `CheckIn` only while it is `Accepted`;
    /// a `Returned` transaction offers nothing.
    pub fn available_actions(&self, transaction: &Transaction) -> Vec<AdminAction> {
        if self.session.level() < Level::Admin {
            return Vec::new();
        }
        match transaction.state() {
            TransactionState::Requested => vec![AdminAction::Accept],
            TransactionState::Accepted => vec![AdminAction::CheckIn],
            TransactionState::Returned => Vec::new(),
        }
    }

    fn require(&self, required: Level) -> Result<Caller> {
        let level = self.session.level();
        if level < required {
            return Err(Error::NotAuthorized { required, level });
        }
        self.session
            .caller()
            .ok_or(Error::NotAuthorized { required, level })
    }

    /// Refuses an action whose target is known locally and not in the
    /// expected state. Unknown ids pass through; the backend decides.
    fn guard_state(&self, transaction: &TransactionId, expected: TransactionState) -> Result<()> {
        if let Some(known) = self.ledger.get(transaction) {
            let state = known.state();
            if state != expected {
                return Err(Error::UnavailableAction { state });
            }
        }
        Ok(())
    }
}
