use std::fmt;

/// Identity of a cached response: the request method and URL, both verbatim.
///
/// The two parts are kept as separate fields, so `("GET:", "x")` and
/// `("GET", ":x")` never compare equal.
#[derive(Clone, Hash, Eq, PartialEq, Debug)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

impl CacheKey {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
