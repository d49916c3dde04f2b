use serde::{Deserialize, Serialize};
use validator::Validate;

use super::FormFields;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct SignInForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub password: String,
}

impl FormFields for SignInForm {
    fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.password = self.password.trim().to_string();
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("username", &self.username), ("password", &self.password)]
    }
}
