//! API key handling
//!
//! Keys come from the `--api-key` flag (or `CRM_API_KEY`), falling back to the
//! config file. Nothing is validated locally; the server decides.

use super::http::TransportError;

/// Bearer credentials for the CRM API
#[derive(Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
}

impl Credentials {
    /// Pick the first non-empty key, in priority order
    pub fn resolve(flag: Option<&str>, configured: Option<&str>) -> Self {
        let api_key = [flag, configured]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|key| !key.is_empty())
            .map(str::to_string);

        Self { api_key }
    }

    pub fn from_key(key: &str) -> Self {
        Self::resolve(Some(key), None)
    }

    /// Token for the Authorization header
    pub fn token(&self) -> Result<&str, TransportError> {
        self.api_key
            .as_deref()
            .ok_or(TransportError::MissingCredentials)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .finish()
    }
}

/// Mask all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_config() {
        let creds = Credentials::resolve(Some("from-flag"), Some("from-config"));
        assert_eq!(creds.token().unwrap(), "from-flag");
    }

    #[test]
    fn test_blank_flag_falls_back_to_config() {
        let creds = Credentials::resolve(Some("  "), Some("from-config"));
        assert_eq!(creds.token().unwrap(), "from-config");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let creds = Credentials::resolve(None, None);
        assert!(matches!(
            creds.token(),
            Err(TransportError::MissingCredentials)
        ));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh1234"), "****1234");
        assert_eq!(mask_secret("abc"), "****");
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let creds = Credentials::from_key("super-secret-key");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("-key"));
    }
}
