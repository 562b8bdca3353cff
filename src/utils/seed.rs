//! Entropy gathering for the annealing PRNG.
//!
//! Mixes the host identity, the current time, the process id, and whatever
//! the OS entropy source gives us, so that instances started in the same
//! second on the same host still diverge.

use std::hash::{Hash, Hasher};
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

/// Gathers a best-effort unique seed for the annealing PRNG.
///
/// Deterministic tests should bypass this and pass an explicit seed instead;
/// this function is only ever called once, at `Genome` construction, when
/// the caller has not supplied one.
pub fn gather_seed() -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();

    if let Ok(hostname) = std::env::var("HOSTNAME") {
        hostname.hash(&mut hasher);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_nanos().hash(&mut hasher);

    std::process::id().hash(&mut hasher);
    // Rust's stdlib has no portable getppid(); fall back to an env-derived
    // proxy so the mix still varies across distinct shells/process trees.
    std::env::var("SHLVL").unwrap_or_default().hash(&mut hasher);

    if let Some(bytes) = read_urandom() {
        bytes.hash(&mut hasher);
    }

    hasher.finish()
}

fn read_urandom() -> Option<[u8; 8]> {
    let mut file = std::fs::File::open("/dev/urandom").ok()?;
    let mut buf = [0u8; 8];
    file.read_exact(&mut buf).ok()?;
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_seed_is_callable_and_varies_across_calls() {
        let a = gather_seed();
        let b = gather_seed();
        // Not a strict guarantee (the mix could theoretically collide), but
        // with a nanosecond clock and /dev/urandom in play this should never
        // be observed to fail in practice.
        assert_ne!(a, b);
    }
}
