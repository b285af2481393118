use serde::{Deserialize, Serialize};

use crate::validation::FormErrors;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Every part of a postal address is mandatory wherever one is collected.
    pub fn validate_into(&self, prefix: &str, errors: &mut FormErrors) {
        errors.required(&format!("{prefix}.street"), &self.street);
        errors.required(&format!("{prefix}.city"), &self.city);
        errors.required(&format!("{prefix}.state"), &self.state);
        errors.required(&format!("{prefix}.postal_code"), &self.postal_code);
        errors.required(&format!("{prefix}.country"), &self.country);
    }
}

/// Splits a comma separated list, trimming entries and dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed copy of an optional text field, `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(
            split_list(" Electrónicos, Informática ,, "),
            vec!["Electrónicos".to_string(), "Informática".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn address_reports_each_missing_part() {
        let mut errors = FormErrors::new();
        Address {
            street: "Calle Tecnología 123".into(),
            ..Address::default()
        }
        .validate_into("address", &mut errors);
        assert_eq!(errors.errors.len(), 4);
        assert!(errors.has("address.postal_code"));
    }
}
