//! Logical path derivation and upstream URL construction.
//!
//! # Responsibilities
//! - Split the inbound URI into decoded path segments and query pairs
//! - Honour the routing query parameter (serverless catch-all style)
//! - Build the upstream URL from base URL, segments and remaining query
//!
//! # Design Decisions
//! - Segments are stored decoded and re-encoded once when the URL is built
//! - Percent-escapes that do not decode to UTF-8 are rejected, never replaced
//! - Query pairs keep their order, repeated keys and valueless keys
//! - The routing parameter never reaches the upstream query string

use std::borrow::Cow;

use axum::http::Uri;
use percent_encoding::percent_decode_str;
use url::{form_urlencoded, Url};

use crate::http::response::ProxyError;

/// One query parameter. `value` is `None` for a bare key (`?flag`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub key: String,
    pub value: Option<String>,
}

impl QueryPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

/// The proxy-relevant view of an inbound URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalPath {
    /// Decoded, non-empty path segments.
    pub segments: Vec<String>,
    /// Query pairs with the routing parameter removed.
    pub query: Vec<QueryPair>,
}

impl LogicalPath {
    /// Derive the logical path of `uri`.
    ///
    /// When `path_param` is set and present in the query, its values carry
    /// the path instead of the URI path.
    pub fn from_uri(uri: &Uri, path_param: Option<&str>) -> Result<Self, ProxyError> {
        let pairs = uri.query().map(parse_query).transpose()?.unwrap_or_default();

        let Some(param) = path_param else {
            return Ok(Self {
                segments: split_path(uri.path())?,
                query: pairs,
            });
        };

        let (routing, query): (Vec<_>, Vec<_>) =
            pairs.into_iter().partition(|pair| pair.key == param);

        let segments = if routing.is_empty() {
            split_path(uri.path())?
        } else {
            routing
                .iter()
                .filter_map(|pair| pair.value.as_deref())
                .flat_map(|value| value.split('/'))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };

        Ok(Self { segments, query })
    }

    /// Slash-joined form used in log lines and echo responses.
    pub fn display(&self) -> String {
        self.segments.join("/")
    }
}

fn split_path(path: &str) -> Result<Vec<String>, ProxyError> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| decode(s, s))
        .collect()
}

fn parse_query(query: &str) -> Result<Vec<QueryPair>, ProxyError> {
    query
        .split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let (key, value) = match piece.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (piece, None),
            };
            Ok(QueryPair {
                key: decode(&key.replace('+', " "), piece)?,
                value: value
                    .map(|v| decode(&v.replace('+', " "), piece))
                    .transpose()?,
            })
        })
        .collect()
}

fn decode(encoded: &str, original: &str) -> Result<String, ProxyError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ProxyError::InvalidUri(original.to_string()))
}

/// Fully resolved upstream URL for one forwarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    url: Url,
}

impl UpstreamTarget {
    /// Append `segments` to `base` and attach `query`.
    pub fn build(base: &Url, segments: &[String], query: &[QueryPair]) -> Self {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        if query.is_empty() {
            url.set_query(None);
        } else {
            let serialized = query
                .iter()
                .map(|pair| {
                    let key: String = form_urlencoded::byte_serialize(pair.key.as_bytes()).collect();
                    match &pair.value {
                        Some(value) => {
                            let value: String =
                                form_urlencoded::byte_serialize(value.as_bytes()).collect();
                            format!("{}={}", key, value)
                        }
                        None => key,
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&serialized));
        }

        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}
