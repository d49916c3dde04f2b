use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_username, CleanError, FormErrors, FormFields, USERNAME_TAKEN};
use crate::domain::{UpdateUserDto, User, UserRepositoryInterface};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct UpdateForm {
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
}

impl FormFields for UpdateForm {
    fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("username", &self.username), ("email", &self.email)]
    }
}

impl UpdateForm {
    /// Initial values for editing `account`.
    pub fn for_account(account: &User) -> Self {
        Self {
            username: account.username.clone(),
            email: account.email.clone(),
        }
    }

    /// Finish validation for an edit of `account`. Keeping the current
    /// username is allowed; taking another account's is not.
    pub async fn clean(
        &self,
        mut errors: FormErrors,
        account: &User,
        users: &dyn UserRepositoryInterface,
    ) -> Result<UpdateUserDto, CleanError> {
        if !errors.has_field("username")
            && self.username != account.username
            && users
                .username_taken(&self.username, Some(&account.id))
                .await?
        {
            errors.add("username", USERNAME_TAKEN);
        }
        errors.check()?;

        Ok(UpdateUserDto {
            username: self.username.clone(),
            email: self.email.clone(),
        })
    }
}
