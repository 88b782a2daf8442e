use crate::url::NormalizedUrl;
use crate::{UrlError, UrlResult};
use regex::Regex;
use url::{Host, Url};

/// Accepted shape for domain hosts: dot-separated labels and an alphabetic
/// (or punycode) top-level domain
const HOST_PATTERN: &str =
    r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,63}|xn--[a-z0-9-]{1,59})$";

/// Detects an explicit `scheme://` prefix
const SCHEME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9+.\-]*://";

/// Scheme assumed when the input carries none
const DEFAULT_SCHEME: &str = "http";

/// Validates and normalizes raw URL strings
///
/// The patterns are compiled once in [`UrlValidator::new`]; share a single
/// validator (for example behind an `Arc`) rather than building one per URL.
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Prepend `http://` when no scheme is present
/// 3. Parse the URL; reject if malformed
/// 4. Require an `http` or `https` scheme and a host
/// 5. Require domain hosts to look like `name.tld` (or be `localhost`)
/// 6. Render without a trailing `/` when the input had no path
///
/// Normalizing an already-normalized URL returns it unchanged.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    host_pattern: Regex,
    scheme_pattern: Regex,
}

impl UrlValidator {
    /// Builds a validator with the default host pattern
    pub fn new() -> UrlResult<Self> {
        Self::with_host_pattern(HOST_PATTERN)
    }

    /// Builds a validator that checks domain hosts against `pattern`
    pub fn with_host_pattern(pattern: &str) -> UrlResult<Self> {
        let host_pattern = Regex::new(pattern).map_err(|e| UrlError::Parse(e.to_string()))?;
        let scheme_pattern =
            Regex::new(SCHEME_PATTERN).map_err(|e| UrlError::Parse(e.to_string()))?;

        Ok(Self {
            host_pattern,
            scheme_pattern,
        })
    }

    /// Validates `raw` and returns its normalized form
    ///
    /// # Examples
    ///
    /// ```
    /// use url_visitor::url::UrlValidator;
    ///
    /// let validator = UrlValidator::new().unwrap();
    /// let url = validator.validate("example.com").unwrap();
    /// assert_eq!(url.as_str(), "http://example.com");
    /// assert!(validator.validate("not a url").is_err());
    /// ```
    pub fn validate(&self, raw: &str) -> UrlResult<NormalizedUrl> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let qualified = if self.scheme_pattern.is_match(trimmed) {
            trimmed.to_string()
        } else {
            format!("{}://{}", DEFAULT_SCHEME, trimmed)
        };

        let url = Url::parse(&qualified).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        match url.host() {
            None => return Err(UrlError::MissingHost),
            Some(Host::Domain(domain)) => {
                if domain != "localhost" && !self.host_pattern.is_match(domain) {
                    return Err(UrlError::InvalidHost(domain.to_string()));
                }
            }
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        }

        let mut rendered = url.to_string();
        if url.path() == "/"
            && url.query().is_none()
            && url.fragment().is_none()
            && !has_explicit_path(&qualified)
        {
            rendered.pop();
        }

        Ok(NormalizedUrl::from_validated(rendered))
    }
}

/// Returns true when anything follows the authority of `qualified`
fn has_explicit_path(qualified: &str) -> bool {
    qualified
        .split_once("://")
        .map(|(_, rest)| rest.contains('/'))
        .unwrap_or(false)
}
