/// Outstanding email tokens
///
/// The `auth` table keeps at most one token per email address: issuing a new
/// one (for either purpose) replaces the previous one. Tokens are stored as
/// SHA-256 digests and deleted when redeemed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     token VARCHAR(255) NOT NULL,
///     token_for VARCHAR(32) NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskquest_shared::auth::token::generate_email_token;
/// use taskquest_shared::models::auth_token::{AuthToken, TokenPurpose};
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::Error> {
/// let (token, hash) = generate_email_token();
/// AuthToken::issue(&pool, "user@example.com", &hash, TokenPurpose::Verification).await?;
///
/// let redeemed = AuthToken::redeem(
///     &pool,
///     "user@example.com",
///     &token,
///     TokenPurpose::Verification,
///     Duration::minutes(60),
/// )
/// .await?;
/// assert!(redeemed);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::normalize_email;
use crate::auth::token::hash_token;

/// What a token may be redeemed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Verification,
    Reset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Verification => "verification",
            TokenPurpose::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    pub id: i64,
    pub email: String,

    /// SHA-256 hex of the mailed token
    pub token: String,

    /// `verification` or `reset`
    pub token_for: String,

    pub updated_at: DateTime<Utc>,
}

impl AuthToken {
    /// Stores `token_hash` as the outstanding token for `email`, replacing any
    /// previous one
    pub async fn issue(
        pool: &PgPool,
        email: &str,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth (email, token, token_for)
            VALUES ($1, $2, $3)
            ON CONFLICT (email)
            DO UPDATE SET token = EXCLUDED.token, token_for = EXCLUDED.token_for
            RETURNING id, email, token, token_for, updated_at
            "#,
        )
        .bind(normalize_email(email))
        .bind(token_hash)
        .bind(purpose.as_str())
        .fetch_one(pool)
        .await
    }

    /// Consumes a plaintext token
    ///
    /// Returns `true` only if the token matches the outstanding one for
    /// `email`, was issued for `purpose`, and is younger than `ttl`. A
    /// matching token is deleted, so it can be redeemed once.
    pub async fn redeem(
        pool: &PgPool,
        email: &str,
        token: &str,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<bool, sqlx::Error> {
        let issued_after = Utc::now() - ttl;

        let deleted: Option<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM auth
            WHERE email = $1 AND token = $2 AND token_for = $3 AND updated_at > $4
            RETURNING id
            "#,
        )
        .bind(normalize_email(email))
        .bind(hash_token(token))
        .bind(purpose.as_str())
        .bind(issued_after)
        .fetch_optional(pool)
        .await?;

        Ok(deleted.is_some())
    }

    /// Removes expired tokens, returning how many were deleted
    pub async fn purge_expired(pool: &PgPool, ttl: Duration) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth WHERE updated_at <= $1")
            .bind(Utc::now() - ttl)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
