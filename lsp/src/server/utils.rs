use std::hash::Hasher;

use ropey::Rope;
use twox_hash::XxHash64;

pub(crate) fn compute_content_hash(content: &Rope) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for chunk in content.chunks() {
        hasher.write(chunk.as_bytes());
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ignores_chunking() {
        let whole = Rope::from_str("ruleset a {\n  rule r {}\n}\n");
        let mut edited = Rope::from_str("ruleset a {\n}\n");
        edited.insert(12, "  rule r {}\n");
        assert_eq!(compute_content_hash(&whole), compute_content_hash(&edited));
        assert_ne!(compute_content_hash(&whole), compute_content_hash(&Rope::from_str("ruleset b {}")));
    }
}
