//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, LoginRequest, LoginResponse, NewUser, RegisterRequest, Role, User,
    },
};
use crate::db::UserRepository;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{info, warn};
use std::sync::Arc;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Display name given to accounts registered without one
pub const DEFAULT_USER_NAME: &str = "New User";

/// Development accounts created by [`AuthManager::seed_default_users`]:
/// (email, name, password, role)
const DEFAULT_USERS: [(&str, &str, &str, Role); 2] = [
    ("admin@example.com", "Admin", "password", Role::Admin),
    ("user@example.com", "Player One", "password", Role::User),
];

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    pepper: String,
    jwt_secret: String,
    token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User repository
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(users: Arc<dyn UserRepository>, pepper: String, jwt_secret: String) -> Self {
        Self {
            users,
            pepper,
            jwt_secret,
            token_duration: Duration::hours(8),
        }
    }

    /// Override how long issued access tokens stay valid
    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    /// Register a new participant account
    ///
    /// Accounts created here always hold [`Role::User`]; admins only come from
    /// seeding or direct provisioning.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::EmailTaken` - Email already registered
    /// * `AuthError::WeakPassword` - Password too short
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let email = normalize_email(&request.email)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        validate_password(&request.password)?;

        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        let user = self
            .users
            .create_user(NewUser {
                email,
                name,
                password_hash: self.hash_password(&request.password)?,
                role: Role::User,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AuthError::EmailTaken
                } else {
                    AuthError::Store(e)
                }
            })?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Login with any role
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No account for this email
    /// * `AuthError::InvalidPassword` - Incorrect password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<LoginResponse> {
        let user = self.authenticate(&request).await?;
        self.issue_token(user)
    }

    /// Login through an endpoint scoped to a single role
    ///
    /// # Errors
    ///
    /// Same as [`AuthManager::login`], plus `AuthError::RoleMismatch` when the
    /// account holds a different role than `role`.
    pub async fn login_as(&self, request: LoginRequest, role: Role) -> AuthResult<LoginResponse> {
        let user = self.authenticate(&request).await?;
        if user.role != role {
            warn!(
                "Rejected {} login for user {} holding role {}",
                role, user.id, user.role
            );
            return Err(AuthError::RoleMismatch(role));
        }
        self.issue_token(user)
    }

    /// Logout
    ///
    /// Tokens are stateless, so this only confirms the token is one we issued.
    /// Clients discard the token afterwards.
    pub fn logout(&self, token: &str) -> AuthResult<()> {
        let claims = self.verify_access_token(token)?;
        info!("User {} logged out", claims.sub);
        Ok(())
    }

    /// Verify an access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<AccessTokenClaims>` - Decoded claims or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Ensure the development admin and participant accounts exist
    ///
    /// Returns the number of accounts created.
    pub async fn seed_default_users(&self) -> AuthResult<usize> {
        let mut created = 0;
        for (email, name, password, role) in DEFAULT_USERS {
            if self.users.find_by_email(email).await?.is_some() {
                continue;
            }
            self.users
                .create_user(NewUser {
                    email: email.to_string(),
                    name: name.to_string(),
                    password_hash: self.hash_password(password)?,
                    role,
                })
                .await?;
            created += 1;
        }

        if created > 0 {
            info!("Seeded {} default account(s)", created);
        }
        Ok(created)
    }

    async fn authenticate(&self, request: &LoginRequest) -> AuthResult<User> {
        let email = request.email.trim().to_lowercase();
        let credentials = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.verify_password(&request.password, &credentials.password_hash)?;
        Ok(credentials.user)
    }

    fn issue_token(&self, user: User) -> AuthResult<LoginResponse> {
        let now = Utc::now();
        let expires_at = now + self.token_duration;
        let claims = AccessTokenClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(LoginResponse {
            token,
            expires_at,
            user,
        })
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidPassword)
    }
}

/// Lower-case and sanity check an email address
fn normalize_email(raw: &str) -> AuthResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.len() > 255 {
        return Err(AuthError::InvalidEmail(raw.trim().to_string()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn manager() -> AuthManager {
        AuthManager::new(
            Arc::new(MemoryStore::new()),
            "unit_test_pepper".to_string(),
            "unit_test_jwt_secret_that_is_long_enough".to_string(),
        )
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Player@Example.COM ").unwrap(),
            "player@example.com"
        );
        assert!(normalize_email("no-at-sign.example.com").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@b@example.com").is_err());
        assert!(normalize_email("player@localhost").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[tokio::test]
    async fn test_register_defaults_name_and_role() {
        let auth = manager();
        let user = auth
            .register(RegisterRequest {
                email: "Fresh@Example.com".to_string(),
                password: "secret1".to_string(),
                name: Some("   ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(user.email, "fresh@example.com");
        assert_eq!(user.name, DEFAULT_USER_NAME);
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let auth = manager();
        auth.seed_default_users().await.unwrap();

        let response = auth
            .login(LoginRequest {
                email: "admin@example.com".to_string(),
                password: "password".to_string(),
            })
            .await
            .unwrap();

        let claims = auth.verify_access_token(&response.token).unwrap();
        assert_eq!(claims.sub, response.user.id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_rejected() {
        let auth = manager();
        auth.seed_default_users().await.unwrap();
        let response = auth
            .login(LoginRequest {
                email: "user@example.com".to_string(),
                password: "password".to_string(),
            })
            .await
            .unwrap();

        let other = AuthManager::new(
            Arc::new(MemoryStore::new()),
            "unit_test_pepper".to_string(),
            "a_completely_different_signing_secret".to_string(),
        );
        assert!(matches!(
            other.verify_access_token(&response.token),
            Err(AuthError::JwtError(_))
        ));
    }
}
