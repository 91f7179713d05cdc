use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::PgPool;
use std::sync::Arc;

use crate::registration::RegistrationCoordinator;

/// Keys for signing and verifying access tokens, derived once from the
/// configured secret.
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Shared application state handed to every handler. The pool is the only
/// store handle in the process; nothing reaches for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(pool: PgPool, jwt_secret: &str) -> Self {
        Self {
            pool,
            jwt: Arc::new(JwtKeys::from_secret(jwt_secret)),
        }
    }

    /// Coordinator over this state's pool.
    pub fn registrations(&self) -> RegistrationCoordinator {
        RegistrationCoordinator::new(self.pool.clone())
    }
}
