//! Account registration and password login.

use std::sync::Arc;

use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::forms::{FormErrors, INVALID_LOGIN, NON_FIELD, SignupForm, USERNAME_TAKEN};
use crate::ports::{PasswordService, UserRepository};

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn signup(&self, form: SignupForm) -> Result<User, DomainError> {
        let mut errors = form.check();
        if errors.get("username").is_empty()
            && self.users.find_by_username(&form.username).await?.is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }
        errors.into_result().map_err(DomainError::Validation)?;

        let password_hash = self
            .passwords
            .hash(&form.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(NewUser {
                username: form.username,
                email: form.email.unwrap_or_default(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with another signup for the same name.
                RepoError::Constraint(_) => {
                    let mut errors = FormErrors::default();
                    errors.add("username", USERNAME_TAKEN);
                    DomainError::Validation(errors)
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username / password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let invalid = || {
            let mut errors = FormErrors::default();
            errors.add(NON_FIELD, INVALID_LOGIN);
            DomainError::Validation(errors)
        };

        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            return Err(invalid());
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::warn!(username = %user.username, "Failed login attempt");
            return Err(invalid());
        }

        Ok(user)
    }
}
