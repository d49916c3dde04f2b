use serde::{Deserialize, Serialize};
use validator::Validate;

use super::FormFields;
use crate::domain::User;

/// Typed confirmation for account deletion.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct DeleteForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub username: String,
}

impl FormFields for DeleteForm {
    fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("username", &self.username)]
    }
}

impl DeleteForm {
    pub fn confirms(&self, account: &User) -> bool {
        self.username == account.username
    }
}
