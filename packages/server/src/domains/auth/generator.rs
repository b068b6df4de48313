//! OTP code generation.

use rand::Rng;

/// Generate a uniformly distributed 6-digit code.
///
/// Human-readable possession proof, not a cryptographic boundary: the
/// threat model is "one guess", not brute force.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}
