//! Cache key format.
//!
//! Keys have the form `{prefix}:{id}` with the id in decimal, e.g. `user:42`.
//! [`KeySpace::key`] and [`KeySpace::id_from_key`] are the only places that
//! know this format; the batch path relies on them being exact inverses.

use thiserror::Error;

/// Separator between prefix and id.
pub const KEY_SEPARATOR: char = ':';

/// Errors from building or parsing cache keys.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The prefix is empty.
    #[error("Key prefix must not be empty")]
    EmptyPrefix,

    /// The key does not start with `{prefix}:`.
    #[error("Key '{key}' is outside namespace '{prefix}'")]
    ForeignKey { key: String, prefix: String },

    /// The id part of the key is not a decimal i64.
    #[error("Key '{key}' has a malformed id")]
    MalformedId { key: String },
}

/// Namespace of cache keys for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    /// Prefix including the trailing separator, e.g. `"user:"`.
    head: String,
}

impl KeySpace {
    /// Create a key space for the given prefix.
    pub fn new(prefix: impl Into<String>) -> Result<Self, KeyError> {
        let mut head = prefix.into();
        if head.is_empty() {
            return Err(KeyError::EmptyPrefix);
        }
        head.push(KEY_SEPARATOR);
        Ok(Self { head })
    }

    /// The prefix without separator.
    pub fn prefix(&self) -> &str {
        &self.head[..self.head.len() - KEY_SEPARATOR.len_utf8()]
    }

    /// Build the key for an id.
    pub fn key(&self, id: i64) -> String {
        format!("{}{}", self.head, id)
    }

    /// Build keys for a list of ids, preserving order.
    pub fn keys(&self, ids: &[i64]) -> Vec<String> {
        ids.iter().map(|&id| self.key(id)).collect()
    }

    /// Recover the id from a key built by [`KeySpace::key`].
    pub fn id_from_key(&self, key: &str) -> Result<i64, KeyError> {
        let digits = key
            .strip_prefix(self.head.as_str())
            .ok_or_else(|| KeyError::ForeignKey {
                key: key.to_string(),
                prefix: self.prefix().to_string(),
            })?;
        // i64::from_str accepts a leading '+', which key() never produces
        if digits.starts_with('+') {
            return Err(KeyError::MalformedId {
                key: key.to_string(),
            });
        }
        digits.parse().map_err(|_| KeyError::MalformedId {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_format() {
        let keys = KeySpace::new("user").unwrap();
        assert_eq!(keys.key(1), "user:1");
        assert_eq!(keys.key(-7), "user:-7");
        assert_eq!(keys.prefix(), "user");
    }

    #[test]
    fn test_keys_preserve_order() {
        let keys = KeySpace::new("user").unwrap();
        assert_eq!(keys.keys(&[3, 1, 2]), vec!["user:3", "user:1", "user:2"]);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert_eq!(KeySpace::new(""), Err(KeyError::EmptyPrefix));
    }

    #[test]
    fn test_prefix_may_contain_separator() {
        let keys = KeySpace::new("app:user").unwrap();
        assert_eq!(keys.key(5), "app:user:5");
        assert_eq!(keys.id_from_key("app:user:5"), Ok(5));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let keys = KeySpace::new("user").unwrap();
        assert!(matches!(
            keys.id_from_key("post:1"),
            Err(KeyError::ForeignKey { .. })
        ));
        assert!(matches!(
            keys.id_from_key("username:1"),
            Err(KeyError::ForeignKey { .. })
        ));
    }

    #[test]
    fn test_malformed_id_rejected() {
        let keys = KeySpace::new("user").unwrap();
        for key in ["user:", "user:abc", "user:1.5", "user:+1", "user:99999999999999999999"] {
            assert!(
                matches!(keys.id_from_key(key), Err(KeyError::MalformedId { .. })),
                "expected malformed id for {}",
                key
            );
        }
    }

    proptest! {
        #[test]
        fn prop_key_round_trip(prefix in "[a-z][a-z:_]{0,15}", id in any::<i64>()) {
            let keys = KeySpace::new(prefix).unwrap();
            prop_assert_eq!(keys.id_from_key(&keys.key(id)), Ok(id));
        }

        #[test]
        fn prop_distinct_ids_distinct_keys(a in any::<i64>(), b in any::<i64>()) {
            prop_assume!(a != b);
            let keys = KeySpace::new("user").unwrap();
            prop_assert_ne!(keys.key(a), keys.key(b));
        }
    }
}
