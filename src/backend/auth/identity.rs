//! Pseudonymous identities
//!
//! An identity is an `(alias, anonymousId)` pair. Registered users get one
//! at signup (or on first login if they predate that); anonymous visitors
//! get a fresh one per request that is never stored.

use serde::Serialize;
use uuid::Uuid;

const ADJECTIVES: [&str; 16] = [
    "Sneaky", "Silent", "Curious", "Spicy", "Mellow", "Witty", "Shady", "Bold",
    "Sleepy", "Cosmic", "Velvet", "Lucky", "Frosty", "Golden", "Hidden", "Rapid",
];

const NOUNS: [&str; 16] = [
    "Teapot", "Owl", "Fox", "Panda", "Raven", "Otter", "Tiger", "Koala",
    "Falcon", "Lynx", "Badger", "Moth", "Heron", "Gecko", "Bison", "Whale",
];

/// A generated display pseudonym
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub alias: String,
    pub anonymous_id: String,
}

impl Identity {
    /// Draw a new random identity
    pub fn generate() -> Self {
        Self::from_seed(Uuid::new_v4())
    }

    /// Derive an identity from a UUID's bytes
    pub fn from_seed(seed: Uuid) -> Self {
        let bytes = seed.as_bytes();
        let adjective = ADJECTIVES[(bytes[0] as usize) % ADJECTIVES.len()];
        let noun = NOUNS[(bytes[1] as usize) % NOUNS.len()];
        let number = u16::from_be_bytes([bytes[2], bytes[3]]) % 100;
        Self {
            alias: format!("{}{}{:02}", adjective, noun, number),
            anonymous_id: format!("anon_{}", &seed.simple().to_string()[..12]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_shape() {
        let identity = Identity::generate();
        assert!(identity.anonymous_id.starts_with("anon_"));
        assert_eq!(identity.anonymous_id.len(), "anon_".len() + 12);
        assert!(identity.alias.chars().next().unwrap().is_ascii_uppercase());
    }

    #[test]
    fn test_identity_is_deterministic_per_seed() {
        let seed = Uuid::new_v4();
        assert_eq!(Identity::from_seed(seed), Identity::from_seed(seed));
    }

    #[test]
    fn test_alias_suffix_is_two_digits() {
        let mut bytes = [0u8; 16];
        bytes[3] = 5;
        let identity = Identity::from_seed(Uuid::from_bytes(bytes));
        assert_eq!(identity.alias, "SneakyTeapot05");

        for _ in 0..64 {
            let alias = Identity::generate().alias;
            let suffix = &alias[alias.len() - 2..];
            assert!(suffix.chars().all(|c| c.is_ascii_digit()), "{}", alias);
            assert!(!alias[..alias.len() - 2].ends_with(|c: char| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_fresh_identities_differ() {
        assert_ne!(
            Identity::generate().anonymous_id,
            Identity::generate().anonymous_id
        );
    }
}
