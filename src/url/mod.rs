//! URL handling module for URL Visitor
//!
//! This module turns raw input strings into [`NormalizedUrl`]s: syntactically
//! valid, scheme-qualified URLs that are ready to be dispatched to a worker.

mod validator;

use serde::Serialize;
use std::fmt;

pub use validator::UrlValidator;

/// A syntactically valid, scheme-qualified URL
///
/// Only [`UrlValidator`] can produce one, so holding a `NormalizedUrl` means the
/// string has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub(crate) fn from_validated(url: String) -> Self {
        Self(url)
    }

    /// Returns the URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for NormalizedUrl {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
