use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::validation::FieldErrors;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "publisher" => Ok(Role::Publisher),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Full users row. Holds credentials, so it is never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub reset_password_token: Option<String>,
    pub reset_password_expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        // The column carries a CHECK constraint; fall back to the least privilege
        self.role.parse().unwrap_or(Role::User)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role(),
            created_at: self.created_at,
        }
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

const MIN_PASSWORD_LEN: usize = 6;

/// Validated input for a new user row; `password` is still plain text.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

/// Body of `POST /auth/register` and `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl CreateUser {
    /// Self registration may pick `user` or `publisher`, never `admin`.
    pub fn validate_registration(self) -> Result<NewUser, ApiError> {
        if self.role == Some(Role::Admin) {
            return Err(ApiError::validation_error(
                "Role admin cannot be self-assigned",
                None,
            ));
        }
        self.validate()
    }

    pub fn validate(self) -> Result<NewUser, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", self.name, "Please add a name", None);
        let email = match self.email {
            Some(email) => errors.email("email", Some(email)),
            None => {
                errors.add("email", "Please add an email");
                None
            }
        };
        let password = validate_password(&mut errors, "password", self.password);
        errors.finish()?;

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(NewUser {
                name,
                email,
                role: self.role.unwrap_or(Role::User),
                password,
            }),
            _ => Err(ApiError::validation_error("Invalid user", None)),
        }
    }
}

/// Body of `PUT /users/:id` (admin) and `PUT /auth/updatedetails`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Validated partial update; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUser {
    pub fn validate(self) -> Result<UserChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.optional_text("name", self.name, None);
        let email = errors.email("email", self.email);
        errors.finish()?;
        Ok(UserChanges { name, email, role: self.role })
    }

    /// Details update for the logged in user: role changes are not allowed.
    pub fn validate_details(mut self) -> Result<UserChanges, ApiError> {
        self.role = None;
        self.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl UpdatePassword {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut errors = FieldErrors::new();
        let current = match self.current_password {
            Some(p) if !p.is_empty() => Some(p),
            _ => {
                errors.add("currentPassword", "Please add your current password");
                None
            }
        };
        let new = validate_password(&mut errors, "newPassword", self.new_password);
        errors.finish()?;
        match (current, new) {
            (Some(current), Some(new)) => Ok((current, new)),
            _ => Err(ApiError::validation_error("Invalid password change", None)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPassword {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPassword {
    pub password: Option<String>,
}

impl ResetPassword {
    pub fn validate(self) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();
        let password = validate_password(&mut errors, "password", self.password);
        errors.finish()?;
        password.ok_or_else(|| ApiError::validation_error("Please add a password", None))
    }
}

fn validate_password(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => Some(p),
        Some(_) => {
            errors.add(field, format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
            None
        }
        None => {
            errors.add(field, "Please add a password");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(role: Option<Role>) -> CreateUser {
        CreateUser {
            name: Some("John Doe".into()),
            email: Some("John@Gmail.com".into()),
            password: Some("123456".into()),
            role,
        }
    }

    #[test]
    fn registration_defaults_to_user_and_normalizes_email() {
        let user = body(None).validate_registration().unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "john@gmail.com");
    }

    #[test]
    fn registration_cannot_claim_admin() {
        assert!(body(Some(Role::Admin)).validate_registration().is_err());
        assert!(body(Some(Role::Admin)).validate().is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut b = body(None);
        b.password = Some("123".into());
        let err = b.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().contains("at least 6"));
    }

    #[test]
    fn details_update_drops_role() {
        let changes = UpdateUser {
            name: Some("Jane".into()),
            email: None,
            role: Some(Role::Admin),
        }
        .validate_details()
        .unwrap();
        assert_eq!(changes.role, None);
        assert_eq!(changes.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::User, Role::Publisher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
