//! Content hashing for `Module::content_hash` (spec.md §3, §6.4: "Content
//! hashes serialise as lowercase hex SHA-256.").

use sha2::{Digest, Sha256};

pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_stable_and_lowercase_hex() {
        let a = sha256_hex("function add(a, b) { return a + b; }");
        let b = sha256_hex("function add(a, b) { return a + b; }");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn differing_content_hashes_differ() {
        assert_ne!(sha256_hex("a"), sha256_hex("b"));
    }
}
