// Session authentication module
use crate::error::Result;
use serde::{Serialize, Deserialize};

pub struct AuthenticationProvider;
pub enum AuthMethod { Password, LDAP, Kerberos, SAML }
pub struct AuthConfig;
pub struct PrivilegeCache;
pub struct RoleManager;
pub struct SessionCredentials;

// Credentials for authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
    pub auth_method: String,
    pub token: Option<String>,
}

// Result of authentication attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationResult {
    pub success: bool,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub privileges: Vec<String>,
    pub error_message: Option<String>,
}

impl AuthenticationProvider {
    pub fn new() -> Self { Self }
    pub async fn authenticate(&self, _username: &str, _password: &str) -> Result<bool> {
        Ok(true)
    }
}
