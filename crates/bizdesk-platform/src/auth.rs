use bizdesk_core::{FormErrors, Result};

use crate::contracts::{LoginRequest, RegisterRequest};

const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// A password needs eight characters with a digit, an upper and lower case
/// letter, and one of the accepted special characters.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

pub fn validate_registration(request: &RegisterRequest) -> Result<()> {
    let mut errors = FormErrors::new();
    errors.min_len("first_name", &request.first_name, 2);
    errors.min_len("last_name", &request.last_name, 2);
    errors.email("email", &request.email);
    if errors.required("phone", &request.phone) {
        let phone = request.phone.trim();
        if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            errors.push("phone", "must be exactly 10 digits");
        }
    }
    errors.required("company", &request.company);
    if errors.required("password", &request.password) && !is_strong_password(&request.password) {
        errors.push(
            "password",
            "needs 8 characters with a digit, upper and lower case letters and a symbol",
        );
    }
    if errors.required("confirm_password", &request.confirm_password)
        && request.confirm_password != request.password
    {
        errors.push("confirm_password", "does not match the password");
    }
    if !request.terms {
        errors.push("terms", "must be accepted");
    }
    errors.into_result()
}

pub fn validate_login(request: &LoginRequest) -> Result<()> {
    let mut errors = FormErrors::new();
    errors.email("email", &request.email);
    errors.required("password", &request.password);
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdesk_core::DeskError;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            first_name: "Lucía".into(),
            last_name: "Martín".into(),
            email: "lucia@empresa.es".into(),
            phone: "6001234567".into(),
            company: "Empresa S.A.".into(),
            password: "Segura#2024".into(),
            confirm_password: "Segura#2024".into(),
            terms: true,
        }
    }

    #[test]
    fn password_strength_rules() {
        assert!(is_strong_password("Segura#2024"));
        assert!(!is_strong_password("Seg#24a"));
        assert!(!is_strong_password("segura#2024"));
        assert!(!is_strong_password("SEGURA#2024"));
        assert!(!is_strong_password("Segura2024"));
        assert!(!is_strong_password("Segura#abcd"));
        assert!(!is_strong_password("Segura_2024"));
    }

    #[test]
    fn accepts_complete_registration() {
        assert!(validate_registration(&registration()).is_ok());
    }

    #[test]
    fn reports_every_broken_registration_field() {
        let request = RegisterRequest {
            first_name: "L".into(),
            phone: "600-123".into(),
            confirm_password: "Otra#2024".into(),
            terms: false,
            ..registration()
        };
        let Err(DeskError::Validation(errors)) = validate_registration(&request) else {
            panic!("expected validation errors");
        };
        for field in ["first_name", "phone", "confirm_password", "terms"] {
            assert!(errors.has(field), "{field}");
        }
        assert!(!errors.has("password"));
    }

    #[test]
    fn login_needs_email_and_password() {
        assert!(
            validate_login(&LoginRequest {
                email: "lucia@empresa.es".into(),
                password: "x".into(),
                remember_me: false,
            })
            .is_ok()
        );
        let Err(DeskError::Validation(errors)) = validate_login(&LoginRequest::default()) else {
            panic!("expected validation errors");
        };
        assert!(errors.has("email"));
        assert!(errors.has("password"));
    }
}
