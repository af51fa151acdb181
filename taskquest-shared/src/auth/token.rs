/// One-time email tokens
///
/// Email verification and password reset links carry a random 32-character
/// base62 token. Only its SHA-256 hex digest is stored (see
/// `models::auth_token`), so a leaked `auth` table can't be replayed.
///
/// # Example
///
/// ```
/// use taskquest_shared::auth::token::{generate_email_token, hash_token};
///
/// let (token, hash) = generate_email_token();
/// assert_eq!(token.len(), 32);
/// assert_eq!(hash, hash_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of an email token (characters)
pub const EMAIL_TOKEN_LENGTH: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new email token
///
/// Returns `(plaintext_token, sha256_hex)`. The plaintext goes into the
/// email, the hash goes into the database.
pub fn generate_email_token() -> (String, String) {
    let token = generate_random_string(EMAIL_TOKEN_LENGTH);
    let hash = hash_token(&token);
    (token, hash)
}

/// Random base62 string from the thread-local CSPRNG
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hex-encoded SHA-256 of a token (64 characters)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cheap shape check run before touching the database
pub fn is_well_formed(token: &str) -> bool {
    token.len() == EMAIL_TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_email_token() {
        let (token, hash) = generate_email_token();

        assert_eq!(token.len(), EMAIL_TOKEN_LENGTH);
        assert!(is_well_formed(&token));
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<String> = (0..200).map(|_| generate_email_token().0).collect();
        assert_eq!(tokens.len(), 200);
    }

    #[test]
    fn test_hash_token_known_value() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdef"));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed("ABCDEFGHIJKLMNOPQRSTUVWXYZabcde!"));
        assert!(!is_well_formed(""));
    }
}
