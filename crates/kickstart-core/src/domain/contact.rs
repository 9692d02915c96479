//! Registrant contact details for domain purchase.

use serde::{Deserialize, Serialize};

use crate::domain::error::TaskError;

/// Physical contact payload, supplied as JSON in `CONTACT_DETAILS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

impl ContactDetails {
    /// Parse and check the payload. `None` (variable unset) is itself an error.
    pub fn parse(raw: Option<&str>) -> Result<Self, TaskError> {
        let raw = raw.ok_or_else(|| TaskError::MissingInput {
            what: "registrant contact details".into(),
            hint: "Set CONTACT_DETAILS to a JSON object with name, email, phone and address".into(),
        })?;

        let details: Self = serde_json::from_str(raw)
            .map_err(|e| TaskError::validation(format!("CONTACT_DETAILS is not valid JSON: {e}")))?;
        details.validate()?;
        Ok(details)
    }

    fn validate(&self) -> Result<(), TaskError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
            ("address_line_1", &self.address_line_1),
            ("city", &self.city),
            ("country_code", &self.country_code),
            ("zip_code", &self.zip_code),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if !missing.is_empty() {
            return Err(TaskError::validation(format!(
                "CONTACT_DETAILS is missing: {}",
                missing.join(", ")
            )));
        }
        if !self.email.contains('@') {
            return Err(TaskError::validation("CONTACT_DETAILS.email is not an email address"));
        }
        Ok(())
    }
}
