/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and the account password rules
/// - [`jwt`]: access/refresh token issuance and validation
/// - [`token`]: one-time email tokens (verification, password reset)
/// - [`middleware`]: bearer-token middleware and [`middleware::AuthContext`]
///
/// # Example
///
/// ```no_run
/// use taskquest_shared::auth::jwt::{create_token, Claims, TokenType};
/// use taskquest_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("MyP@ssw0rd")?;
/// assert!(verify_password("MyP@ssw0rd", &hash)?);
///
/// let token = create_token(&Claims::new(1, TokenType::Access), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod token;
