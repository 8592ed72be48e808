use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::errors::AppError;

const BCRYPT_COST: u32 = 12;
const BCRYPT_MAX_BYTES: usize = 72;
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

static UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid regex"));
static LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("valid regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid regex"));

fn truncated(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}

fn hash_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(truncated(password), cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// Hashes on the blocking pool; bcrypt at cost 12 takes a few hundred milliseconds.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_with_cost(&password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(truncated(&password), &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Registration password policy.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let fail = |msg: &'static str| -> Result<(), ValidationError> {
        Err(ValidationError::new("password_strength").with_message(msg.into()))
    };

    if !UPPER.is_match(password) {
        return fail("Password must contain at least one uppercase letter");
    }
    if !LOWER.is_match(password) {
        return fail("Password must contain at least one lowercase letter");
    }
    if !DIGIT.is_match(password) {
        return fail("Password must contain at least one digit");
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return fail("Password must contain at least one special character");
    }
    if password.chars().any(char::is_whitespace) {
        return fail("Password must not contain spaces");
    }
    Ok(())
}
