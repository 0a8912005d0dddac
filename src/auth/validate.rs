use lazy_static::lazy_static;
use regex::Regex;

use super::dto::RegisterRequest;
use crate::{error::AppError, response::FieldErrors};

pub const MIN_PASSWORD_LEN: usize = 8;

const REQUIRED: &str = "This field is required";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref E164_RE: Regex = Regex::new(r"^\+[1-9][0-9]{1,14}$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_e164(phone: &str) -> bool {
    E164_RE.is_match(phone)
}

/// Checks every field and reports the first failing rule of each.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    let mut fail = |field: &str, msg: &str| {
        errors.insert(field.to_string(), msg.to_string());
    };

    for (field, value) in [
        ("first_name", &req.first_name),
        ("last_name", &req.last_name),
        ("username", &req.username),
    ] {
        if value.trim().is_empty() {
            fail(field, REQUIRED);
        }
    }

    if req.email.trim().is_empty() {
        fail("email", REQUIRED);
    } else if !is_valid_email(&req.email) {
        fail("email", "Invalid email format");
    }

    if req.password.is_empty() {
        fail("password", REQUIRED);
    } else if req.password.chars().count() < MIN_PASSWORD_LEN {
        fail("password", "Password must be at least 8 characters");
    }

    if req.password_confirm != req.password {
        fail("password_confirm", "Password confirmation does not match");
    }

    if req.phone.trim().is_empty() {
        fail("phone", REQUIRED);
    } else if !is_e164(&req.phone) {
        fail("phone", "Invalid phone number format");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterRequest {
        RegisterRequest {
            first_name: "Alan".into(),
            last_name: "Turing".into(),
            username: "aturing".into(),
            email: "alan@bletchley.uk".into(),
            password: "enigma-1940".into(),
            password_confirm: "enigma-1940".into(),
            phone: "+441234567890".into(),
        }
    }

    fn field_errors(req: &RegisterRequest) -> FieldErrors {
        match validate_registration(req) {
            Err(AppError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(validate_registration(&valid()).is_ok());
    }

    #[test]
    fn empty_body_reports_every_required_field() {
        let errors = field_errors(&RegisterRequest::default());
        for field in ["first_name", "last_name", "username", "email", "password", "phone"] {
            assert_eq!(errors.get(field).map(String::as_str), Some(REQUIRED), "{field}");
        }
        assert!(!errors.contains_key("password_confirm"));
    }

    #[test]
    fn short_password() {
        let mut req = valid();
        req.password = "short".into();
        req.password_confirm = "short".into();
        let errors = field_errors(&req);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["password"], "Password must be at least 8 characters");
    }

    #[test]
    fn password_length_counts_characters() {
        let mut req = valid();
        req.password = "ééééééé".into(); // 7 chars, 14 bytes
        req.password_confirm = req.password.clone();
        assert!(field_errors(&req).contains_key("password"));
    }

    #[test]
    fn confirmation_mismatch() {
        let mut req = valid();
        req.password_confirm = "enigma-1941".into();
        let errors = field_errors(&req);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("password_confirm"));
    }

    #[test]
    fn email_and_phone_formats() {
        let mut req = valid();
        req.email = "not-an-email".into();
        req.phone = "0123-456".into();
        let errors = field_errors(&req);
        assert_eq!(errors["email"], "Invalid email format");
        assert_eq!(errors["phone"], "Invalid phone number format");
    }

    #[test]
    fn e164_rules() {
        assert!(is_e164("+14155552671"));
        assert!(is_e164("+628123456789"));
        assert!(!is_e164("14155552671"));
        assert!(!is_e164("+04155552671"));
        assert!(!is_e164("+1415555267112345"));
        assert!(!is_e164("+1 415 555 2671"));
    }
}
