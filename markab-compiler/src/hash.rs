//! The multiply-with-carry hash that buckets dictionary entries. Has no
//! equivalent in the teacher repo — `fuel-vm` has no dictionary of its own —
//! so this module is built directly from the bucketing arithmetic a
//! self-hosted Forth-style dictionary needs, rather than adapted from an
//! existing file.

/// Number of hash buckets.
pub const BINS: u32 = 64;

const HASH_A: u32 = 7;
const HASH_B: u32 = 8;
const HASH_C: u32 = 38335;
const HASH_MASK: u32 = BINS - 1;

/// Bucket index (`0..BINS`) a dictionary name hashes to.
pub fn bucket_index(name: &str) -> u16 {
    let mut k: u32 = HASH_C;
    for byte in name.as_bytes() {
        k = ((k & 0xFFFF) << HASH_A).wrapping_add(k >> 16);
        k ^= *byte as u32;
    }
    k ^= k >> HASH_B;
    (k & HASH_MASK) as u16
}

/// Byte offset of a bucket's two-byte head cell within the bucket array.
pub fn bucket_offset(name: &str) -> u16 {
    bucket_index(name) * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_index_is_always_in_range() {
        for name in ["dup", "swap", "over", "", "a", "quite-a-long-word-name"] {
            assert!(bucket_index(name) < BINS as u16);
        }
    }

    #[test]
    fn hash_is_a_pure_function_of_the_bytes() {
        assert_eq!(bucket_index("dup"), bucket_index("dup"));
    }

    #[test]
    fn different_names_usually_land_in_different_buckets() {
        // Not a correctness property of the hash itself, just a sanity check
        // that it isn't degenerate for this small sample.
        let buckets: std::collections::HashSet<_> =
            ["dup", "swap", "over", "drop", "rot", "emit"].iter().map(|n| bucket_index(n)).collect();
        assert!(buckets.len() > 1);
    }
}
