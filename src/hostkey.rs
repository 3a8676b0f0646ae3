use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use russh_keys::key::KeyPair;

const HOST_KEY_BITS: usize = 2048;

/// Seed for the host-key PRNG: the sum of the hostname's code points. Same
/// deployment, same fingerprint across restarts; no key material on disk.
fn hostname_seed(hostname: &str) -> u64 {
    hostname.chars().map(|ch| ch as u64).sum()
}

/// Derive an RSA private key from a deterministic stream seeded by the
/// hostname. Exposed with a bit-size parameter so tests stay fast.
pub fn derive_rsa_key(hostname: &str, bits: usize) -> Result<RsaPrivateKey> {
    let mut rng = StdRng::seed_from_u64(hostname_seed(hostname));
    RsaPrivateKey::new(&mut rng, bits).context("RSA host key derivation failed")
}

/// The server host key: a 2048-bit RSA key derived from the hostname,
/// handed to the SSH transport via PKCS#8.
pub fn host_keypair(hostname: &str) -> Result<KeyPair> {
    let key = derive_rsa_key(hostname, HOST_KEY_BITS)?;
    let pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .context("Failed to encode host key")?;
    russh_keys::decode_secret_key(&pem, None).context("Failed to load derived host key")
}
