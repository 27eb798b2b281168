//! Request header injection
//!
//! A [`HeaderInterceptor`] is asked for its headers on every request, so
//! values that change over time (tokens, locale) are always current.

/// Supplies headers added to every outgoing request
pub trait HeaderInterceptor: Send + Sync {
    fn headers_map(&self) -> Vec<(String, String)>;
}

/// Fixed set of headers
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders {
    headers: Vec<(String, String)>,
}

impl StaticHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

impl HeaderInterceptor for StaticHeaders {
    fn headers_map(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }
}
