//! Client-side form validation for the reservation dialog.
//!
//! Every field is checked independently and tagged with its own outcome;
//! the backend call is only issued when every applicable field passes.
//! Messages are the exact strings the dialog displays.

use crate::types::Level;
use std::fmt;

/// Outcome of validating a single form field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldOutcome {
    /// Field passed, or was not applicable to this caller level.
    Ok,
    /// Field failed; carries the user-facing message.
    Invalid(String),
}

impl FieldOutcome {
    /// Whether the field passed.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// User-facing message, empty when the field passed.
    pub fn message(&self) -> &str {
        match self {
            Self::Ok => "",
            Self::Invalid(message) => message,
        }
    }
}

/// Raw reservation dialog input, one string per text field.
///
/// The guest fields are only consulted for anonymous callers; a signed-in
/// caller's identity comes from the session and any supplemental fields are
/// ignored.
#[derive(Clone, Debug, Default)]
pub struct ReservationForm {
    pub quantity: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub student_id: String,
}

/// Aggregated per-field validation outcome for one reservation attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationReport {
    pub quantity: FieldOutcome,
    pub username: FieldOutcome,
    pub password: FieldOutcome,
    pub email: FieldOutcome,
    pub student_id: FieldOutcome,
}

impl ValidationReport {
    /// Whether every applicable field passed.
    pub fn is_valid(&self) -> bool {
        self.quantity.is_ok()
            && self.username.is_ok()
            && self.password.is_ok()
            && self.email.is_ok()
            && self.student_id.is_ok()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, outcome) in [
            ("quantity", &self.quantity),
            ("username", &self.username),
            ("password", &self.password),
            ("email", &self.email),
            ("student_id", &self.student_id),
        ] {
            if let FieldOutcome::Invalid(message) = outcome {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{name}: {message}")?;
                first = false;
            }
        }
        if first {
            f.write_str("all fields valid")?;
        }
        Ok(())
    }
}

/// Validates a reservation form for the given caller level.
///
/// Quantity is checked for every caller; the account-creation fields only
/// for anonymous callers, since a signed-in reservation is attributed to the
/// session identity.
pub fn validate_reservation(level: Level, form: &ReservationForm) -> ValidationReport {
    let guest = level == Level::Anonymous;
    ValidationReport {
        quantity: check_quantity(&form.quantity),
        username: if guest {
            check_username(&form.username)
        } else {
            FieldOutcome::Ok
        },
        password: if guest {
            check_password(&form.password)
        } else {
            FieldOutcome::Ok
        },
        email: if guest {
            check_email(&form.email)
        } else {
            FieldOutcome::Ok
        },
        student_id: if guest {
            check_student_id(&form.student_id)
        } else {
            FieldOutcome::Ok
        },
    }
}

/// Parses a positive reservation quantity.
pub fn parse_positive_quantity(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|q| *q > 0)
}

/// Parses a non-negative quantity, as used by the item-creation form.
pub fn parse_nonnegative_quantity(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn check_quantity(value: &str) -> FieldOutcome {
    match parse_positive_quantity(value) {
        Some(_) => FieldOutcome::Ok,
        None => FieldOutcome::Invalid("Quantity must be greater than zero.".to_string()),
    }
}

fn check_username(value: &str) -> FieldOutcome {
    if value.is_empty() || value.len() > 100 {
        FieldOutcome::Invalid("Username must be between 1 and 100 characters.".to_string())
    } else {
        FieldOutcome::Ok
    }
}

fn check_password(value: &str) -> FieldOutcome {
    if value.is_empty() {
        FieldOutcome::Invalid("Password must not be empty.".to_string())
    } else {
        FieldOutcome::Ok
    }
}

fn check_email(value: &str) -> FieldOutcome {
    if is_valid_email(value) {
        FieldOutcome::Ok
    } else {
        FieldOutcome::Invalid("Please enter a valid email address.".to_string())
    }
}

fn check_student_id(value: &str) -> FieldOutcome {
    if value.len() > 5 && value.chars().all(|ch| ch.is_ascii_digit()) {
        FieldOutcome::Ok
    } else {
        FieldOutcome::Invalid("Your student ID should be a 6 digit number.".to_string())
    }
}

/// Address shape check: `local@domain`, domain contains a dot, and the final
/// label is at least two letters. Deliverability is the backend's problem.
fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    let mut labels = domain.split('.');
    let Some(first) = labels.next() else {
        return false;
    };
    if first.is_empty() {
        return false;
    }
    let rest: Vec<&str> = labels.collect();
    if rest.is_empty() {
        return false;
    }
    if rest[..rest.len() - 1].iter().any(|label| label.is_empty()) {
        return false;
    }
    let tld = rest[rest.len() - 1];
    tld.len() >= 2 && tld.chars().all(|ch| ch.is_ascii_alphabetic())
}
