//! Content hashing and cache key derivation using blake3.

use std::fmt;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash arbitrary data.
    #[inline]
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Convert to a 64-char lowercase hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars for brevity
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Cache key for a render: `"<file_path>:<hex digest>"`.
///
/// The digest covers `content` followed by `file_path`, so the key changes
/// whenever either changes and is stable across processes.
pub fn generate_key(file_path: &str, content: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(content.as_bytes());
    hasher.update(file_path.as_bytes());
    let digest = ContentHash::new(*hasher.finalize().as_bytes());
    format!("{file_path}:{}", digest.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(key: &str) -> &str {
        key.rsplit(':').next().unwrap()
    }

    fn assert_hex64(digest: &str) {
        assert_eq!(digest.len(), 64);
        assert!(
            digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_content_hash_display() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(format!("{}", hash), "abababababababab");
    }

    #[test]
    fn test_content_hash_hex_is_lowercase() {
        let hash = ContentHash::of(b"graph TD;A-->B");
        assert_hex64(&hash.to_hex());
        assert_eq!(hash, ContentHash::of(b"graph TD;A-->B"));
    }

    #[test]
    fn test_same_input_same_key() {
        let a = generate_key("a.mmd", "graph TD;A-->B");
        let b = generate_key("a.mmd", &String::from("graph TD;A-->B"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_changes_with_content_or_path() {
        let base = generate_key("a.mmd", "graph TD;A-->B");
        assert_ne!(base, generate_key("a.mmd", "graph TD;A-->C"));
        assert_ne!(base, generate_key("b.mmd", "graph TD;A-->B"));
    }

    #[test]
    fn test_key_format() {
        let key = generate_key("/work/docs/flow.mmd", "graph TD;A-->B");
        assert!(key.starts_with("/work/docs/flow.mmd:"));
        assert_hex64(digest_of(&key));
    }

    #[test]
    fn test_digest_fixed_length_for_any_input() {
        let large = "A-->B\n".repeat(20_000);
        assert!(large.len() > 100 * 1024);

        for (path, content) in [
            ("empty.mmd", ""),
            ("big.mmd", large.as_str()),
            ("C:\\Users\\me\\my diagrams\\flow.v2.mmd", "graph LR;X-->Y"),
            ("dir with spaces/a.b.c.puml", "@startuml\n@enduml"),
        ] {
            let key = generate_key(path, content);
            assert!(key.starts_with(path));
            assert_hex64(&key[path.len() + 1..]);
        }
    }
}
