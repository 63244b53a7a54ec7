//! URL schemes recognized for auto-linking.

/// Schemes registered in a fresh registry.
pub const DEFAULT_PROTOCOLS: &[&str] = &[
    "http://", "https://", "ftp://", "gopher://", "mailto:", "file://", "xmpp:", "irc://",
];

/// Ordered list of URL prefixes, matched case-insensitively.
///
/// # Example
/// ```
/// use imhtml::protocol::ProtocolRegistry;
///
/// let mut protocols = ProtocolRegistry::default();
/// assert_eq!(protocols.match_prefix("HTTP://example.org"), 7);
/// assert_eq!(protocols.match_prefix("spotify:track"), 0);
///
/// protocols.register("spotify:");
/// assert_eq!(protocols.match_prefix("spotify:track"), 8);
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    prefixes: Vec<String>,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl ProtocolRegistry {
    /// A registry with no schemes.
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Add a scheme. Returns `false` if it was already registered.
    pub fn register(&mut self, prefix: &str) -> bool {
        if prefix.is_empty() || self.position(prefix).is_some() {
            return false;
        }
        self.prefixes.push(prefix.to_string());
        true
    }

    /// Remove a scheme. Returns `false` if it was not registered.
    pub fn unregister(&mut self, prefix: &str) -> bool {
        match self.position(prefix) {
            Some(idx) => {
                self.prefixes.remove(idx);
                true
            }
            None => false,
        }
    }

    fn position(&self, prefix: &str) -> Option<usize> {
        self.prefixes
            .iter()
            .position(|p| p.eq_ignore_ascii_case(prefix))
    }

    /// Length of the registered scheme `text` starts with, or 0.
    pub fn match_prefix(&self, text: &str) -> usize {
        let bytes = text.as_bytes();
        self.prefixes
            .iter()
            .find(|p| bytes.len() >= p.len() && bytes[..p.len()].eq_ignore_ascii_case(p.as_bytes()))
            .map_or(0, String::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}
