use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Request headers with case-insensitive names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Headers::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

/// A request as it arrived on the wire.
///
/// The body is kept as raw bytes, since the signature covers exactly those bytes.
/// Certificate expiry and timestamp freshness are judged against `received_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    body: Vec<u8>,
    headers: Option<Headers>,
    received_at: OffsetDateTime,
}

impl InboundRequest {
    /// Create a request that arrived now
    pub fn new(body: impl Into<Vec<u8>>, headers: Option<Headers>) -> Self {
        InboundRequest {
            body: body.into(),
            headers,
            received_at: OffsetDateTime::now_utc(),
        }
    }

    /// Override the arrival time
    pub fn with_received_at(mut self, received_at: OffsetDateTime) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| headers.get(name))
    }

    pub fn received_at(&self) -> OffsetDateTime {
        self.received_at
    }
}
