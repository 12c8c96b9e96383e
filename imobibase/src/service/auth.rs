use argon2::{Argon2, PasswordHash, PasswordVerifier};
use eyre::Context;
use imobibase_config::auth;
use imobibase_error::{Error, Result};
use smol_str::SmolStr;
use std::collections::HashMap;
use triomphe::Arc;

/// Credential checking against the statically configured user set
#[derive(Clone)]
pub struct AuthService {
    users: Arc<HashMap<SmolStr, SmolStr>>,
}

impl AuthService {
    /// Fails when any configured hash is not a parseable PHC string
    pub fn from_config(config: &auth::Configuration) -> eyre::Result<Self> {
        let mut users = HashMap::with_capacity(config.users.len());

        for user in &config.users {
            PasswordHash::new(&user.password_hash)
                .context(format!("Invalid password hash for user {}", user.username))?;

            users.insert(user.username.clone(), user.password_hash.clone());
        }

        Ok(Self {
            users: Arc::new(users),
        })
    }

    /// Check a username/password pair
    ///
    /// An unknown username reports as a plain mismatch, indistinguishable
    /// from a wrong password.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<bool> {
        let Some(password_hash) = self.users.get(username).cloned() else {
            return Ok(false);
        };

        let password = password.to_string();
        let is_valid = tokio::task::spawn_blocking(move || {
            let password_hash = PasswordHash::new(&password_hash)?;
            let argon2 = Argon2::default();

            Ok::<_, Error>(
                argon2
                    .verify_password(password.as_bytes(), &password_hash)
                    .is_ok(),
            )
        })
        .await??;

        Ok(is_valid)
    }
}
