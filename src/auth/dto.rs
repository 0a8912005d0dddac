use serde::Deserialize;

use crate::users::services::Registration;

/// Request body for user registration. Missing fields deserialize as empty
/// strings so they are reported by validation, not by the JSON parser.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub phone: String,
}

impl From<RegisterRequest> for Registration {
    fn from(r: RegisterRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            username: r.username,
            email: r.email,
            password: r.password,
            phone: r.phone,
        }
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
