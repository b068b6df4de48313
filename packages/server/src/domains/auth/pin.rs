//! PIN hashing. PINs are a knowledge factor for returning users and are
//! only ever stored and compared as salted bcrypt hashes.

use anyhow::anyhow;

use crate::common::AuthError;

const BCRYPT_COST: u32 = 10;

/// Reject anything that is not exactly four digits.
pub fn validate_pin_format(pin: &str) -> Result<(), AuthError> {
    if pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AuthError::Validation("PIN must be 4 digits".to_string()))
    }
}

pub fn hash_pin(pin: &str) -> Result<String, AuthError> {
    validate_pin_format(pin)?;
    bcrypt::hash(pin, BCRYPT_COST)
        .map_err(|e| AuthError::Upstream(anyhow!("PIN hashing failed: {e}")))
}

pub fn verify_pin(pin: &str, pin_hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(pin, pin_hash)
        .map_err(|e| AuthError::Upstream(anyhow!("PIN verification failed: {e}")))
}
