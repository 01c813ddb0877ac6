use anyhow::Context;
use argon2::{password_hash::Output, Argon2};
use rand::{rngs::OsRng, RngCore};
use tracing::error;

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 64;

/// Hex-encoded salt and derived key, stored side by side on the user.
#[derive(Debug, Clone)]
pub struct PasswordDigest {
    pub salt: String,
    pub hash: String,
}

fn derive_key(plain: &str, salt: &[u8]) -> anyhow::Result<[u8; KEY_LEN]> {
    let mut out = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(plain.as_bytes(), salt, &mut out)
        .map_err(|e| {
            error!(error = %e, "argon2 key derivation error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(out)
}

pub fn hash_password(plain: &str) -> anyhow::Result<PasswordDigest> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(plain, &salt)?;
    Ok(PasswordDigest {
        salt: hex::encode(salt),
        hash: hex::encode(key),
    })
}

pub fn verify_password(plain: &str, salt_hex: &str, hash_hex: &str) -> anyhow::Result<bool> {
    let salt = hex::decode(salt_hex).context("decode password salt")?;
    let stored = hex::decode(hash_hex).context("decode password hash")?;
    let stored = Output::new(&stored).map_err(|e| anyhow::anyhow!("stored hash: {e}"))?;

    let derived = derive_key(plain, &salt)?;
    let derived = Output::new(&derived).map_err(|e| anyhow::anyhow!("derived hash: {e}"))?;

    // Output's PartialEq is constant-time.
    Ok(derived == stored)
}
