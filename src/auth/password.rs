use bcrypt::BcryptError;

/// Hash a plaintext password with bcrypt. The embedded salt makes repeated
/// hashes of the same input differ.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(plain, cost)
}

/// Check a plaintext password against a stored digest. Malformed digests
/// verify as false rather than surfacing a distinguishable error.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    bcrypt::verify(plain, digest).unwrap_or(false)
}
