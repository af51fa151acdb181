/// Password hashing and strength rules
///
/// Hashes use Argon2id (64 MB, 3 passes, 4 lanes, 32-byte output) and are
/// stored in PHC string format, so verification reads its parameters from
/// the stored hash.
///
/// # Example
///
/// ```
/// use taskquest_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sup3r$ecret")?;
/// assert!(verify_password("Sup3r$ecret", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Special characters accepted (and one of which is required) in passwords
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&#+";

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with Argon2id and a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))
}

/// Verifies a password against a stored PHC hash
///
/// `Ok(false)` means the password is wrong; `Err` means the stored hash is
/// unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks the account password rules
///
/// A password must be at least 8 characters, use only ASCII letters, digits
/// and the characters in [`PASSWORD_SPECIAL_CHARS`], and contain at least one
/// of each: lowercase, uppercase, digit, special.
///
/// ```
/// use taskquest_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("MyP@ssw0rd").is_ok());
/// assert!(validate_password_strength("Sh0rt!").is_err());
/// assert!(validate_password_strength("Password123").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let is_special = |c: char| PASSWORD_SPECIAL_CHARS.contains(c);

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if let Some(c) = password
        .chars()
        .find(|&c| !c.is_ascii_alphanumeric() && !is_special(c))
    {
        return Err(format!(
            "Password contains an unsupported character '{}'; allowed special characters are {}",
            c, PASSWORD_SPECIAL_CHARS
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(is_special) {
        return Err(format!(
            "Password must contain at least one special character ({})",
            PASSWORD_SPECIAL_CHARS
        ));
    }

    Ok(())
}

/// `validator` adapter for [`validate_password_strength`]
///
/// Used as `#[validate(custom(function = "password_rules"))]` on payload fields.
pub fn password_rules(password: &str) -> Result<(), validator::ValidationError> {
    validate_password_strength(password).map_err(|message| {
        let mut error = validator::ValidationError::new("password_strength");
        error.message = Some(message.into());
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("Test_password1!").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("Correct#1pass").unwrap();

        assert!(verify_password("Correct#1pass", &hash).unwrap());
        assert!(!verify_password("Wrong#1pass", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_validate_password_strength_valid() {
        for password in ["MyP@ssw0rd", "Str0ng!Pass", "C0mpl3x#Pwd", "Plus+Sign9"] {
            assert!(
                validate_password_strength(password).is_ok(),
                "Password '{}' should be valid",
                password
            );
        }
    }

    #[test]
    fn test_validate_password_strength_failures() {
        let cases = [
            ("Sh0rt!", "at least 8 characters"),
            ("lowercase1!", "uppercase letter"),
            ("UPPERCASE1!", "lowercase letter"),
            ("NoDigits!!", "digit"),
            ("NoSpecial123", "special character"),
            ("Spaced Pa55!", "unsupported character"),
            ("Under_Sc0re!", "unsupported character"),
        ];

        for (password, expected) in cases {
            let err = validate_password_strength(password).unwrap_err();
            assert!(
                err.contains(expected),
                "'{}' should fail with '{}', got '{}'",
                password,
                expected,
                err
            );
        }
    }

    #[test]
    fn test_password_rules_adapter() {
        assert!(password_rules("MyP@ssw0rd").is_ok());

        let err = password_rules("weak").unwrap_err();
        assert_eq!(err.code, "password_strength");
        assert!(err.message.is_some());
    }
}
