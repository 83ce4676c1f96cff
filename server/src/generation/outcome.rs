//! Classification of raw provider failures.
//!
//! Classification is a pure function so every chain transition can be tested
//! without a network in sight.

/// A raw failure reported by a provider adapter.
#[derive(Debug)]
pub struct ProviderFailure {
    /// HTTP status reported by the provider, if the request got that far.
    pub status: Option<u16>,

    /// Provider-supplied message. Logged, never surfaced to callers.
    pub message: String,

    /// The provider could not be reached at all.
    pub unreachable: bool,
}

impl ProviderFailure {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        ProviderFailure {
            status: Some(status),
            message: message.into(),
            unreachable: false,
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        ProviderFailure {
            status: None,
            message: message.into(),
            unreachable: true,
        }
    }

    /// A response that was well-formed but empty where a payload was
    /// expected.
    pub fn empty_payload(message: impl Into<String>) -> Self {
        ProviderFailure {
            status: None,
            message: message.into(),
            unreachable: false,
        }
    }
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(error: reqwest::Error) -> Self {
        ProviderFailure {
            status: error.status().map(|status| status.as_u16()),
            unreachable: error.is_connect() || error.is_timeout(),
            message: error.to_string(),
        }
    }
}

/// The normalized category of a provider failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    RateLimited,
    ServiceUnavailable,
    TermsRejected,
    Transient,
}

/// Markers of a provider-side content-policy refusal, matched
/// case-insensitively against the failure message. These are provider
/// idiosyncrasies, not a systemic outage.
const TERMS_MARKERS: [&str; 4] = ["terms", "content policy", "policy violation", "moderation"];

pub fn classify(failure: &ProviderFailure) -> Classification {
    match failure.status {
        Some(429) => Classification::RateLimited,
        Some(503) => Classification::ServiceUnavailable,
        None if failure.unreachable => Classification::ServiceUnavailable,
        _ if mentions_terms(&failure.message) => Classification::TermsRejected,
        _ => Classification::Transient,
    }
}

fn mentions_terms(message: &str) -> bool {
    let message = message.to_lowercase();

    TERMS_MARKERS.iter().any(|marker| message.contains(marker))
}

/// The classified result of a single provider attempt.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    RateLimited,
    ServiceUnavailable,
    TermsRejected,
    Transient(String),
}

impl<T> Outcome<T> {
    pub fn from_attempt(result: Result<T, ProviderFailure>) -> Self {
        match result {
            Ok(payload) => Outcome::Success(payload),
            Err(failure) => match classify(&failure) {
                Classification::RateLimited => Outcome::RateLimited,
                Classification::ServiceUnavailable => Outcome::ServiceUnavailable,
                Classification::TermsRejected => Outcome::TermsRejected,
                Classification::Transient => Outcome::Transient(failure.message),
            },
        }
    }

    /// Whether the chain may advance past this outcome to the next provider.
    pub fn advances(&self) -> bool {
        matches!(
            self,
            Outcome::ServiceUnavailable | Outcome::TermsRejected | Outcome::Transient(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::RateLimited => "rate-limited",
            Outcome::ServiceUnavailable => "service-unavailable",
            Outcome::TermsRejected => "terms-rejected",
            Outcome::Transient(_) => "transient",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        let failure = ProviderFailure::from_status(429, "Too Many Requests");

        assert_eq!(classify(&failure), Classification::RateLimited);
        assert!(!Outcome::<()>::from_attempt(Err(failure)).advances());
    }

    #[test]
    fn status_503_and_unreachable_are_service_unavailable() {
        let down = ProviderFailure::from_status(503, "Service Unavailable");
        let gone = ProviderFailure::unreachable("connection refused");

        assert_eq!(classify(&down), Classification::ServiceUnavailable);
        assert_eq!(classify(&gone), Classification::ServiceUnavailable);
        assert!(Outcome::<()>::from_attempt(Err(down)).advances());
    }

    #[test]
    fn policy_refusals_are_terms_rejections() {
        for message in &[
            "PlayAI terms not accepted for this organization",
            "request rejected by Content Policy",
            "flagged by moderation",
        ] {
            let failure = ProviderFailure::from_status(400, *message);

            assert_eq!(classify(&failure), Classification::TermsRejected, "{}", message);
        }
    }

    #[test]
    fn anything_else_is_transient() {
        let failure = ProviderFailure::from_status(500, "Internal Server Error");

        assert_eq!(classify(&failure), Classification::Transient);
        assert!(Outcome::<()>::from_attempt(Err(failure)).advances());
    }

    #[test]
    fn rate_limit_wins_over_terms_wording() {
        // a 429 body that happens to mention "terms" is still a rate limit
        let failure = ProviderFailure::from_status(429, "see our terms of service");

        assert_eq!(classify(&failure), Classification::RateLimited);
    }
}
