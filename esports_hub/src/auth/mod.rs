//! Authentication module providing account registration, role-scoped login and
//! caller identity.
//!
//! This is a deliberately small layer:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (8-hour expiry) carrying the account role
//! - Two roles, [`Role::Admin`] and [`Role::User`]
//! - Stateless logout
//!
//! The lifecycle services never see tokens. They receive a [`Caller`] built
//! from verified claims.
//!
//! ## Example
//!
//! ```no_run
//! use esports_hub::auth::{AuthManager, LoginRequest, Role};
//! use esports_hub::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryStore::new()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!     auth.seed_default_users().await?;
//!
//!     let request = LoginRequest {
//!         email: "admin@example.com".to_string(),
//!         password: "password".to_string(),
//!     };
//!     let session = auth.login_as(request, Role::Admin).await?;
//!     println!("Token expires at {}", session.expires_at);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, Caller, LoginRequest, LoginResponse, NewUser, RegisterRequest, Role, User,
    UserCredentials, UserId,
};
