#![cfg(all(feature = "memory-backend", feature = "memory-credentials"))]

use futures::executor::block_on;
use stockroom::{
    AdminAction, Coordinator, CoordinatorBuilder, Error, Identity, ItemName, Level, MemoryBackend,
    MemoryCredentialStore, ReservationForm, TransactionState,
};

fn identity(value: &str) -> Identity {
    Identity::new(value).expect("identity")
}

fn name(value: &str) -> ItemName {
    ItemName::new(value).expect("item name")
}

fn seeded_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.add_account(identity("admin@example.ca"), "admin_pw", Level::Admin);
    backend.add_account(identity("member@example.ca"), "member_pw", Level::Member);
    backend.seed_item(name("Drill"), 5);
    backend.seed_item(name("iPhone Charger"), 1);
    backend
}

fn coordinator_for(
    backend: MemoryBackend,
) -> Coordinator<MemoryBackend, MemoryCredentialStore> {
    CoordinatorBuilder::new(backend)
        .credentials(MemoryCredentialStore::new())
        .build()
}

#[test]
fn full_rental_lifecycle() {
    let backend = seeded_backend();

    // Member reserves three drills.
    let mut member = coordinator_for(backend.clone());
    block_on(member.load_session()).unwrap();
    assert_eq!(member.session().level(), Level::Anonymous);

    block_on(member.log_in(identity("member@example.ca"), "member_pw".to_string())).unwrap();
    assert_eq!(member.session().level(), Level::Member);

    block_on(member.refresh_catalog()).unwrap();
    let form = ReservationForm {
        quantity: "3".to_string(),
        ..ReservationForm::default()
    };
    block_on(member.reserve(name("Drill"), &form)).unwrap();

    let transactions = member.ledger().transactions();
    assert_eq!(transactions.len(), 1);
    let tx = transactions[0].clone();
    assert_eq!(tx.state(), TransactionState::Requested);
    assert_eq!(tx.requested_quantity, 3);
    // Reserving does not touch availability.
    assert_eq!(member.catalog().get(&name("Drill")).unwrap().quantity, 5);

    // Admin hands the drills out.
    let mut admin = coordinator_for(backend.clone());
    block_on(admin.log_in(identity("admin@example.ca"), "admin_pw".to_string())).unwrap();
    assert_eq!(admin.session().level(), Level::Admin);
    assert_eq!(admin.available_actions(&tx), vec![AdminAction::Accept]);

    block_on(admin.accept(tx.id.clone(), tx.item.clone())).unwrap();
    let accepted = admin.ledger().get(&tx.id).unwrap().clone();
    assert_eq!(accepted.state(), TransactionState::Accepted);
    assert_eq!(accepted.accepted_by.as_ref().unwrap(), &identity("admin@example.ca"));
    assert!(accepted.is_consistent());

    block_on(admin.refresh_catalog()).unwrap();
    assert_eq!(admin.catalog().get(&name("Drill")).unwrap().quantity, 2);

    // The drills come back.
    assert_eq!(admin.available_actions(&accepted), vec![AdminAction::CheckIn]);
    block_on(admin.check_in(accepted.item.clone(), accepted.id.clone())).unwrap();
    let returned = admin.ledger().get(&tx.id).unwrap().clone();
    assert_eq!(returned.state(), TransactionState::Returned);
    assert!(returned.is_consistent());

    block_on(admin.refresh_catalog()).unwrap();
    assert_eq!(admin.catalog().get(&name("Drill")).unwrap().quantity, 5);

    // Terminal: nothing further is offered.
    assert!(admin.available_actions(&returned).is_empty());
}

#[test]
fn session_survives_reload_until_logout() {
    let backend = seeded_backend();
    let credentials = MemoryCredentialStore::new();

    let mut first = CoordinatorBuilder::new(backend.clone())
        .credentials(credentials.clone())
        .build();
    block_on(first.log_in(identity("member@example.ca"), "member_pw".to_string())).unwrap();

    // A fresh coordinator over the same durable storage picks the session up.
    let mut second = CoordinatorBuilder::new(backend.clone())
        .credentials(credentials.clone())
        .build();
    let level = block_on(second.load_session()).unwrap();
    assert_eq!(level, Level::Member);

    // Logout invalidates the token backend-side; a third load is anonymous.
    block_on(second.log_out()).unwrap();
    let mut third = CoordinatorBuilder::new(backend)
        .credentials(credentials)
        .build();
    let level = block_on(third.load_session()).unwrap();
    assert_eq!(level, Level::Anonymous);
}

#[test]
fn member_scoping_holds_end_to_end() {
    let backend = seeded_backend();
    backend.add_account(identity("other@example.ca"), "other_pw", Level::Member);

    let form = ReservationForm {
        quantity: "1".to_string(),
        ..ReservationForm::default()
    };

    let mut member = coordinator_for(backend.clone());
    block_on(member.log_in(identity("member@example.ca"), "member_pw".to_string())).unwrap();
    block_on(member.reserve(name("Drill"), &form)).unwrap();

    let mut other = coordinator_for(backend.clone());
    block_on(other.log_in(identity("other@example.ca"), "other_pw".to_string())).unwrap();
    block_on(other.reserve(name("iPhone Charger"), &form)).unwrap();

    // Each member sees exactly their own record.
    for tx in other.ledger().transactions() {
        assert_eq!(tx.requested_by, identity("other@example.ca"));
    }
    assert_eq!(other.ledger().transactions().len(), 1);

    block_on(member.refresh_ledger()).unwrap();
    assert_eq!(member.ledger().transactions().len(), 1);
    assert_eq!(
        member.ledger().transactions()[0].requested_by,
        identity("member@example.ca")
    );

    // The admin sees both.
    let mut admin = coordinator_for(backend);
    block_on(admin.log_in(identity("admin@example.ca"), "admin_pw".to_string())).unwrap();
    assert_eq!(admin.ledger().transactions().len(), 2);
}

#[test]
fn guest_reservation_creates_an_account() {
    let backend = seeded_backend();

    let mut guest = coordinator_for(backend.clone());
    block_on(guest.load_session()).unwrap();
    let form = ReservationForm {
        quantity: "1".to_string(),
        username: "guest".to_string(),
        password: "guest_pw".to_string(),
        email: "guest@mail.example.ca".to_string(),
        student_id: "260123456".to_string(),
    };
    block_on(guest.reserve(name("Drill"), &form)).unwrap();
    assert!(guest.ledger().transactions().is_empty());

    // The guest can now sign in with the account the reservation created.
    let mut returning = coordinator_for(backend);
    block_on(returning.log_in(identity("guest@mail.example.ca"), "guest_pw".to_string()))
        .unwrap();
    assert_eq!(returning.session().level(), Level::Member);
    assert_eq!(returning.ledger().transactions().len(), 1);
    assert_eq!(
        returning.ledger().transactions()[0].requested_by,
        identity("guest@mail.example.ca")
    );
}

#[test]
fn backend_rejects_forged_admin_calls() {
    // A client that skips the advisory gate still cannot mutate anything:
    // the backend re-checks the level from the (identity, token) pair.
    let backend = seeded_backend();

    let mut member = coordinator_for(backend.clone());
    block_on(member.log_in(identity("member@example.ca"), "member_pw".to_string())).unwrap();

    let forged = stockroom::Caller {
        identity: identity("member@example.ca"),
        token: member.session().caller().unwrap().token,
    };
    let result = block_on(stockroom::ItemBackend::create_item(
        &backend,
        forged,
        name("Forged"),
        1,
    ));
    assert!(result.is_err());

    block_on(member.refresh_catalog()).unwrap();
    assert!(member.catalog().get(&name("Forged")).is_none());
}

#[test]
fn validation_blocks_the_call_before_the_backend() {
    let backend = seeded_backend();
    let mut guest = coordinator_for(backend.clone());
    block_on(guest.load_session()).unwrap();

    let form = ReservationForm {
        quantity: "0".to_string(),
        username: "guest".to_string(),
        password: "guest_pw".to_string(),
        email: "guest@mail.example.ca".to_string(),
        student_id: "123456".to_string(),
    };
    let result = block_on(guest.reserve(name("Drill"), &form));
    let Err(Error::Validation(report)) = result else {
        panic!("expected a validation error");
    };
    assert_eq!(report.quantity.message(), "Quantity must be greater than zero.");

    // No account was created, so the guest email cannot sign in.
    let mut check = coordinator_for(backend);
    let login = block_on(check.log_in(
        identity("guest@mail.example.ca"),
        "guest_pw".to_string(),
    ));
    assert!(matches!(login, Err(Error::Authentication(_))));
}
