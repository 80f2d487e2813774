//! Folds values into the 32-bit integer keys of the Patricia engine.
//!
//! Hashing uses SipHash-2-4 under a process-global random key, initialized
//! once on first use. Randomizing the key makes the tree shape unpredictable
//! to outside input; residual collisions are absorbed by the collision
//! buckets in the leaves.

use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use rand::RngCore;
use siphasher::sip::SipHasher24;

static HASH_KEY: OnceLock<[u8; 16]> = OnceLock::new();

fn hash_key() -> &'static [u8; 16] {
    HASH_KEY.get_or_init(|| {
        let mut key = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut key);
        key
    })
}

/// Hashes `value` down to a Patricia key.
///
/// All 64 output bits of the hasher are folded into the key so that both
/// halves contribute to the tree shape.
pub(crate) fn key_hash<T: Hash + ?Sized>(value: &T) -> i32 {
    let mut hasher = SipHasher24::new_with_key(hash_key());
    value.hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as i32
}
