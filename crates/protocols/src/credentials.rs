use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// A string that is redacted in debug output and wiped on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret in clear text.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is blank.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("\"\"")
        } else {
            f.write_str("\"***\"")
        }
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Credentials needed to open a gateway session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Hex-encoded signing key.
    #[serde(default)]
    pub private_key: SecretString,
    /// JSON-RPC endpoint.
    #[serde(default)]
    pub rpc_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let creds = Credentials {
            private_key: SecretString::new("deadbeef"),
            rpc_url: "https://arb1.example.org".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("***"));
        assert_eq!(creds.private_key.expose(), "deadbeef");
    }

    #[test]
    fn test_secret_deserializes_transparently() {
        let creds: Credentials =
            serde_json::from_str(r#"{"private_key":"abc","rpc_url":"http://localhost:8545"}"#)
                .unwrap();
        assert_eq!(creds.private_key.expose(), "abc");
        assert!(!creds.private_key.is_empty());
        assert!(SecretString::default().is_empty());
        assert!(serde_json::from_str::<Credentials>(r#"{"privatekey":"abc"}"#).is_err());
    }
}
