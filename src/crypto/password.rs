use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::crypto::random;
use crate::error::{AppError, Result};

/// The only Argon2 version this implementation produces or accepts.
const ARGON2_VERSION: u32 = Version::V0x13 as u32;

/// Cost parameters for Argon2id, fixed at construction.
///
/// Changing these never breaks verification of existing credentials: the
/// parameters travel inside every encoded hash, and verification re-derives
/// under the embedded values rather than the hasher's own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Argon2Config {
    /// Working memory in KiB.
    pub memory_kib: u32,
    /// Time cost (passes over memory).
    pub iterations: u32,
    /// Lanes.
    pub parallelism: u32,
    /// Salt length in bytes.
    pub salt_length: usize,
    /// Derived key length in bytes.
    pub key_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 2,
            salt_length: 16,
            key_length: 32,
        }
    }
}

/// Capability to turn plaintext passwords into storable artifacts and check
/// candidates against them. Swapped for a stub in handler-level tests.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a self-describing encoded string.
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a plaintext candidate against an encoded hash.
    ///
    /// A wrong password is `Ok(false)`; errors are reserved for malformed
    /// or unsupported stored hashes.
    fn verify_password(&self, password: &str, encoded: &str) -> Result<bool>;
}

/// Argon2id implementation of [`PasswordHasher`].
///
/// Output uses the standard encoded representation:
/// `$argon2id$v=19$m=<kib>,t=<iters>,p=<lanes>$<b64 salt>$<b64 key>`
/// with unpadded standard base64 in the last two fields.
#[derive(Clone, Copy, Debug)]
pub struct Argon2Hasher {
    config: Argon2Config,
}

impl Argon2Hasher {
    /// Creates a hasher with the given cost configuration.
    pub fn new(config: Argon2Config) -> Self {
        Self { config }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Argon2Config::default())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = random::secure_bytes(self.config.salt_length)?;

        let mut key = derive_key(
            password,
            &salt,
            self.config.memory_kib,
            self.config.iterations,
            self.config.parallelism,
            self.config.key_length,
        )?;

        let encoded = format!(
            "$argon2id$v={}$m={},t={},p={}${}${}",
            ARGON2_VERSION,
            self.config.memory_kib,
            self.config.iterations,
            self.config.parallelism,
            general_purpose::STANDARD_NO_PAD.encode(&salt),
            general_purpose::STANDARD_NO_PAD.encode(&key),
        );

        key.zeroize();
        tracing::debug!("Password hashed with Argon2id");
        Ok(encoded)
    }

    fn verify_password(&self, password: &str, encoded: &str) -> Result<bool> {
        let decoded = decode_hash(encoded)?;

        let mut candidate = derive_key(
            password,
            &decoded.salt,
            decoded.memory_kib,
            decoded.iterations,
            decoded.parallelism,
            decoded.key.len(),
        )?;

        let matched: bool = decoded.key.ct_eq(&candidate).into();
        candidate.zeroize();
        Ok(matched)
    }
}

/// The parameters, salt and derived key extracted from an encoded hash.
struct DecodedHash {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

/// Derives `key_length` bytes from `(password, salt)` under the given costs.
fn derive_key(
    password: &str,
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    key_length: usize,
) -> Result<Vec<u8>> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(key_length))
        .map_err(|e| AppError::Hashing(format!("Argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut password_bytes = password.as_bytes().to_vec();
    let mut key = vec![0u8; key_length];
    let derived = argon2.hash_password_into(&password_bytes, salt, &mut key);
    password_bytes.zeroize();
    derived.map_err(|e| AppError::Hashing(format!("Argon2 derive: {}", e)))?;

    Ok(key)
}

/// Splits an encoded hash back into parameters, salt and key.
///
/// Fails with [`AppError::MalformedHash`] on the wrong field count, an
/// unparseable field or undecodable base64, and with
/// [`AppError::UnsupportedHashVersion`] when the embedded version is not the
/// one this implementation derives with.
fn decode_hash(encoded: &str) -> Result<DecodedHash> {
    let fields: Vec<&str> = encoded.split('$').collect();
    if fields.len() != 6 || !fields[0].is_empty() {
        return Err(AppError::MalformedHash);
    }

    if fields[1] != "argon2id" {
        return Err(AppError::MalformedHash);
    }

    let version: u32 = fields[2]
        .strip_prefix("v=")
        .and_then(|v| v.parse().ok())
        .ok_or(AppError::MalformedHash)?;
    if version != ARGON2_VERSION {
        return Err(AppError::UnsupportedHashVersion(version));
    }

    let (memory_kib, iterations, parallelism) = decode_cost_field(fields[3])?;

    let salt = general_purpose::STANDARD_NO_PAD
        .decode(fields[4])
        .map_err(|_| AppError::MalformedHash)?;
    let key = general_purpose::STANDARD_NO_PAD
        .decode(fields[5])
        .map_err(|_| AppError::MalformedHash)?;

    Ok(DecodedHash {
        memory_kib,
        iterations,
        parallelism,
        salt,
        key,
    })
}

/// Parses the `m=<kib>,t=<iters>,p=<lanes>` field.
fn decode_cost_field(field: &str) -> Result<(u32, u32, u32)> {
    let mut parts = field.split(',');

    let mut next = |prefix: &str| -> Result<u32> {
        parts
            .next()
            .and_then(|p| p.strip_prefix(prefix))
            .and_then(|v| v.parse().ok())
            .ok_or(AppError::MalformedHash)
    };

    let memory_kib = next("m=")?;
    let iterations = next("t=")?;
    let parallelism = next("p=")?;

    if parts.next().is_some() {
        return Err(AppError::MalformedHash);
    }

    Ok((memory_kib, iterations, parallelism))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Costs far below production defaults so the suite stays fast. The
    // encoding logic is identical at any cost level.
    fn fast_config() -> Argon2Config {
        Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::new(fast_config())
    }

    #[test]
    fn round_trip_verifies() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("correct horse battery staple").unwrap();
        assert!(hasher.verify_password("correct horse battery staple", &encoded).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("correctpw").unwrap();
        assert!(!hasher.verify_password("wrongpw", &encoded).unwrap());
    }

    #[test]
    fn empty_candidate_does_not_verify() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("correctpw").unwrap();
        assert!(!hasher.verify_password("", &encoded).unwrap());
    }

    #[test]
    fn encoded_hash_embeds_cost_parameters() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("pw").unwrap();
        assert!(encoded.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert_eq!(encoded.split('$').count(), 6);
    }

    #[test]
    fn salts_make_hashes_unique() {
        let hasher = fast_hasher();
        assert_ne!(
            hasher.hash_password("pw").unwrap(),
            hasher.hash_password("pw").unwrap()
        );
    }

    #[test]
    fn verification_uses_embedded_parameters_not_hasher_config() {
        let old = fast_hasher();
        let encoded = old.hash_password("pw").unwrap();

        // A hasher reconfigured with different costs must still verify
        // hashes produced under the old settings.
        let rotated = Argon2Hasher::new(Argon2Config {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 2,
            ..fast_config()
        });
        assert!(rotated.verify_password("pw", &encoded).unwrap());
        assert!(!rotated.verify_password("other", &encoded).unwrap());
    }

    #[test]
    fn tampered_key_segment_fails_closed() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("pw").unwrap();

        let mut fields: Vec<String> = encoded.split('$').map(str::to_owned).collect();
        let key_field = fields[5].clone();
        // Swap the first character of the key for a different base64 char;
        // the result still decodes, it just decodes to a different key.
        let replacement = if key_field.as_bytes()[0] == b'A' { 'B' } else { 'A' };
        fields[5] = format!("{}{}", replacement, &key_field[1..]);

        let tampered = fields.join("$");
        assert_ne!(tampered, encoded);
        assert!(!hasher.verify_password("pw", &tampered).unwrap());
    }

    #[test]
    fn undecodable_key_segment_is_malformed() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("pw").unwrap();

        let mut fields: Vec<String> = encoded.split('$').map(str::to_owned).collect();
        fields[5] = "!!!not-base64!!!".to_string();

        let err = hasher.verify_password("pw", &fields.join("$")).unwrap_err();
        assert!(matches!(err, AppError::MalformedHash));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let hasher = fast_hasher();
        for bad in [
            "",
            "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA",
            "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$a2V5$extra",
            "plainly not a hash",
        ] {
            let err = hasher.verify_password("pw", bad).unwrap_err();
            assert!(matches!(err, AppError::MalformedHash), "input: {:?}", bad);
        }
    }

    #[test]
    fn foreign_algorithm_is_malformed() {
        let hasher = fast_hasher();
        let err = hasher
            .verify_password("pw", "$argon2i$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$a2V5a2V5a2V5")
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedHash));
    }

    #[test]
    fn incompatible_version_is_rejected() {
        let hasher = fast_hasher();
        let encoded = hasher.hash_password("pw").unwrap();
        let downgraded = encoded.replace("$v=19$", "$v=16$");

        let err = hasher.verify_password("pw", &downgraded).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedHashVersion(16)));
    }

    #[test]
    fn garbled_cost_field_is_malformed() {
        let hasher = fast_hasher();
        for bad in [
            "$argon2id$v=19$m=1024,t=1$c2FsdHNhbHQ$a2V5a2V5a2V5",
            "$argon2id$v=19$t=1,m=1024,p=1$c2FsdHNhbHQ$a2V5a2V5a2V5",
            "$argon2id$v=19$m=abc,t=1,p=1$c2FsdHNhbHQ$a2V5a2V5a2V5",
            "$argon2id$v=19$m=1024,t=1,p=1,x=9$c2FsdHNhbHQ$a2V5a2V5a2V5",
        ] {
            let err = hasher.verify_password("pw", bad).unwrap_err();
            assert!(matches!(err, AppError::MalformedHash), "input: {:?}", bad);
        }
    }
}
