//! Opaque token key generation

use rand::RngCore;

/// Number of random bytes in a token key
const KEY_BYTES: usize = 20;

/// Generate a new high-entropy token key
///
/// 20 bytes from the OS CSPRNG, hex-encoded to a 40-character string.
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
