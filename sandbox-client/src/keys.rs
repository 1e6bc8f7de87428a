use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha256};

/// Tag bytes prepended to an unencrypted ed25519 secret key before
/// base58check encoding, so the sandbox client's own decoder recognizes
/// the string as an "edsk"-flavored secret rather than a public key or
/// address.
const EDSK_PREFIX: [u8; 4] = [13, 15, 58, 7];

/// A freshly generated keypair, with its secret already encoded into the
/// sandbox client's on-disk text form.
pub struct GeneratedKey {
    pub signing_key: SigningKey,
    pub encoded_secret: String,
}

fn base58check(payload: &[u8]) -> String {
    let checksum = Sha256::digest(Sha256::digest(payload));
    let mut full = payload.to_vec();
    full.extend_from_slice(&checksum[..4]);
    bs58::encode(full).into_string()
}

/// Encodes a signing key's 64-byte keypair bytes (seed + public key) into
/// the tagged base58check string the sandbox client expects after an
/// `unencrypted:` prefix.
pub fn encode_secret_key(signing_key: &SigningKey) -> String {
    let mut payload = EDSK_PREFIX.to_vec();
    payload.extend_from_slice(&signing_key.to_keypair_bytes());
    base58check(&payload)
}

/// Generates a new ed25519 keypair and its encoded secret.
pub fn generate_keypair() -> GeneratedKey {
    let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
    let encoded_secret = encode_secret_key(&signing_key);
    GeneratedKey {
        signing_key,
        encoded_secret,
    }
}

/// The literal value handed to the sandbox client's `import secret key`
/// subcommand: the encoded secret under the `unencrypted:` scheme tag.
pub fn unencrypted_uri(encoded_secret: &str) -> String {
    format!("unencrypted:{encoded_secret}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_is_base58_and_stable_length() {
        let key = generate_keypair();
        assert!(key.encoded_secret.chars().all(|c| c.is_ascii_alphanumeric()));
        // prefix(4) + keypair(64) + checksum(4) base58-encodes to a
        // consistently long string; spot-check a sane lower bound.
        assert!(key.encoded_secret.len() > 80);
    }

    #[test]
    fn same_key_encodes_deterministically() {
        let key = generate_keypair();
        let again = encode_secret_key(&key.signing_key);
        assert_eq!(key.encoded_secret, again);
    }

    #[test]
    fn different_keys_encode_differently() {
        let a = generate_keypair();
        let b = generate_keypair();
        assert_ne!(a.encoded_secret, b.encoded_secret);
    }

    #[test]
    fn unencrypted_uri_carries_the_scheme_tag() {
        let key = generate_keypair();
        assert_eq!(
            unencrypted_uri(&key.encoded_secret),
            format!("unencrypted:{}", key.encoded_secret)
        );
    }
}
