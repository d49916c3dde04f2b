use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    validate_username, CleanError, FormErrors, FormFields, PASSWORDS_MISMATCH, USERNAME_TAKEN,
};
use crate::domain::UserRepositoryInterface;

/// Sign-up form. Passwords are never echoed back into a re-rendered form.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct SignUpForm {
    #[validate(
        length(max = 100, message = "Ensure this value has at most 100 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(
        length(max = 200, message = "Ensure this value has at most 200 characters."),
        email(message = "Enter a valid email address.")
    )]
    pub email: String,
    #[serde(skip_serializing)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub password1: String,
    #[serde(skip_serializing)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub password2: String,
}

/// Validated sign-up data, ready to become an account.
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl FormFields for SignUpForm {
    fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self.password1 = self.password1.trim().to_string();
        self.password2 = self.password2.trim().to_string();
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("username", &self.username),
            ("email", &self.email),
            ("password1", &self.password1),
            ("password2", &self.password2),
        ]
    }

    fn check_fields(&self, errors: &mut FormErrors) {
        if !self.password1.is_empty()
            && !self.password2.is_empty()
            && self.password1 != self.password2
        {
            errors.add_non_field(PASSWORDS_MISMATCH);
        }
    }
}

impl SignUpForm {
    /// Finish validation against the user store.
    ///
    /// Uniqueness is only checked for usernames that passed the field rules.
    pub async fn clean(
        &self,
        mut errors: FormErrors,
        users: &dyn UserRepositoryInterface,
    ) -> Result<NewAccount, CleanError> {
        if !errors.has_field("username") && users.username_taken(&self.username, None).await? {
            errors.add("username", USERNAME_TAKEN);
        }
        errors.check()?;

        Ok(NewAccount {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password1.clone(),
        })
    }
}
