//! Relying-party policy: identity and origin binding.

use serde::{Deserialize, Serialize};
use url::Url;

/// Policy construction errors.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("at least one accepted origin is required")]
    NoOrigins,
    #[error("invalid origin url '{0}'")]
    InvalidOrigin(String),
}

/// How strongly the relying party asks authenticators for user
/// verification (PIN, biometric).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVerification {
    Discouraged,
    #[default]
    Preferred,
    Required,
}

impl UserVerification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discouraged => "discouraged",
            Self::Preferred => "preferred",
            Self::Required => "required",
        }
    }
}

/// Static relying-party configuration shared by both ceremonies.
///
/// Origin acceptance is an exact match against the configured set; there
/// is no prefix or subdomain matching.
#[derive(Debug, Clone)]
pub struct RpPolicy {
    rp_id: String,
    rp_name: String,
    origins: Vec<Url>,
    user_verification: UserVerification,
}

impl RpPolicy {
    /// Create a policy. `origins` is ordered; the first entry is the
    /// primary origin.
    pub fn new(rp_id: &str, rp_name: &str, origins: Vec<Url>) -> Result<Self, PolicyError> {
        if origins.is_empty() {
            return Err(PolicyError::NoOrigins);
        }
        Ok(Self {
            rp_id: rp_id.to_owned(),
            rp_name: rp_name.to_owned(),
            origins,
            user_verification: UserVerification::default(),
        })
    }

    /// Create a policy from unparsed origin strings.
    pub fn parse(rp_id: &str, rp_name: &str, origins: &[String]) -> Result<Self, PolicyError> {
        let origins = origins
            .iter()
            .map(|o| Url::parse(o).map_err(|_| PolicyError::InvalidOrigin(o.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rp_id, rp_name, origins)
    }

    pub fn with_user_verification(mut self, user_verification: UserVerification) -> Self {
        self.user_verification = user_verification;
        self
    }

    pub fn rp_id(&self) -> &str {
        &self.rp_id
    }

    pub fn rp_name(&self) -> &str {
        &self.rp_name
    }

    pub fn origins(&self) -> &[Url] {
        &self.origins
    }

    pub fn user_verification(&self) -> UserVerification {
        self.user_verification
    }

    /// Exact-match origin acceptance. Unparseable origins are rejected.
    pub fn accepts_origin(&self, claimed: &str) -> bool {
        match Url::parse(claimed) {
            Ok(url) => self.origins.iter().any(|origin| *origin == url),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RpPolicy {
        RpPolicy::parse(
            "localhost",
            "Test",
            &[
                "http://localhost:8080".to_string(),
                "https://app.example.com".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn accepts_configured_origins_exactly() {
        let policy = policy();
        assert!(policy.accepts_origin("http://localhost:8080"));
        assert!(policy.accepts_origin("https://app.example.com"));
        // trailing slash normalizes to the same origin
        assert!(policy.accepts_origin("http://localhost:8080/"));
    }

    #[test]
    fn rejects_unlisted_origins() {
        let policy = policy();
        assert!(!policy.accepts_origin("http://localhost:9090"));
        assert!(!policy.accepts_origin("https://evil.example.com"));
        assert!(!policy.accepts_origin("http://app.example.com"));
        assert!(!policy.accepts_origin("not a url"));
    }

    #[test]
    fn requires_at_least_one_origin() {
        assert!(matches!(
            RpPolicy::new("localhost", "Test", vec![]),
            Err(PolicyError::NoOrigins)
        ));
    }

    #[test]
    fn rejects_malformed_origin_strings() {
        let result = RpPolicy::parse("localhost", "Test", &["nope".to_string()]);
        assert!(matches!(result, Err(PolicyError::InvalidOrigin(_))));
    }
}
