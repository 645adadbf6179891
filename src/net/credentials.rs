//! Wireless credentials received during provisioning.
//!
//! A node broadcasts `<prefix><blueprint>` until a peer answers with
//! `<ssid>|<password>`. The reply is split at the first `|`, so passwords may
//! contain `|`.

use std::fmt;
use std::str::FromStr;

use crate::error::CredentialsError;

/// Network name and secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Network name.
    pub ssid: String,
    /// Network secret.
    pub password: String,
}

impl Credentials {
    /// Parses a `<ssid>|<password>` reply.
    ///
    /// ```
    /// use pinwire::Credentials;
    ///
    /// let c = Credentials::parse("home|a|b").unwrap();
    /// assert_eq!((c.ssid.as_str(), c.password.as_str()), ("home", "a|b"));
    /// assert!(Credentials::parse("no-separator").is_err());
    /// ```
    pub fn parse(payload: &str) -> Result<Self, CredentialsError> {
        // senders may include the C string terminator
        let payload = payload.trim_end_matches('\0');
        match payload.split_once('|') {
            Some((ssid, password)) => Ok(Self {
                ssid: ssid.to_string(),
                password: password.to_string(),
            }),
            None => Err(CredentialsError::Malformed {
                payload: payload.to_string(),
            }),
        }
    }
}

impl FromStr for Credentials {
    type Err = CredentialsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credential request broadcast: `<prefix><blueprint>`.
pub fn discovery_message(prefix: &str, blueprint: &str) -> String {
    format!("{prefix}{blueprint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        let c: Credentials = "net|pw\0".parse().unwrap();
        assert_eq!(c.ssid, "net");
        assert_eq!(c.password, "pw");

        let empty = Credentials::parse("|").unwrap();
        assert!(empty.ssid.is_empty() && empty.password.is_empty());

        let err = Credentials::parse("garbage").unwrap_err();
        assert_eq!(err.as_label(), "credentials_malformed");
    }

    #[test]
    fn test_debug_hides_password() {
        let c = Credentials::parse("net|hunter2").unwrap();
        assert!(!format!("{c:?}").contains("hunter2"));
    }

    #[test]
    fn test_discovery_message() {
        assert_eq!(
            discovery_message("[volex-conn]", "vlx_led"),
            "[volex-conn]vlx_led"
        );
    }
}
