use chrono::NaiveDateTime;
use common::UserId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Public view of an account. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RawRegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

impl RegisterRequest {
    /// Trims the name, lower-cases the email, then validates.
    pub fn new(raw: RawRegisterRequest) -> Result<Self, String> {
        let raw = RawRegisterRequest {
            email: normalize_email(&raw.email),
            password: raw.password,
            name: raw.name.trim().to_string(),
        };
        raw.validate().map_err(|e| first_message(&e))?;

        Ok(Self {
            email: raw.email,
            password: raw.password,
            name: raw.name,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Field order is unspecified, so sort for a stable message.
fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}
