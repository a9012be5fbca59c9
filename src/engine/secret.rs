// wfrun — Random secret tokens for `${GENERATE_SECRET}`

use rand::rngs::OsRng;
use rand::TryRngCore;
use thiserror::Error;

/// Bytes of entropy behind each `${GENERATE_SECRET}` expansion.
pub const SECRET_BYTES: usize = 32;

#[derive(Error, Debug)]
#[error("failed to obtain secure random bytes: {0}")]
pub struct SecretError(String);

/// `len` bytes from the operating system CSPRNG, hex encoded (lowercase).
pub fn generate(len: usize) -> Result<String, SecretError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SecretError(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_alphabet() {
        let token = generate(SECRET_BYTES).unwrap();
        assert_eq!(token.len(), 64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(generate(16).unwrap(), generate(16).unwrap());
    }

    #[test]
    fn test_generate_zero_bytes() {
        assert_eq!(generate(0).unwrap(), "");
    }
}
