//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and parses `HttpResponse` values; moving bytes
//! over the network is the job of a [`Transport`](crate::Transport).
//!
//! All fields use owned types (`String`, `Vec`) so values can be stored,
//! compared in tests and sent across threads without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL without query string; `query` holds the
/// unencoded key/value pairs in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Full request URL with the query string form-encoded.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{query}", self.path)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: path.to_string(),
            query,
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn url_without_query_is_path() {
        let req = get("http://localhost/api/v1/tts/voices", Vec::new());
        assert_eq!(req.url(), "http://localhost/api/v1/tts/voices");
    }

    #[test]
    fn url_encodes_query_pairs() {
        let req = get(
            "http://localhost/api/v1/tts/voices",
            vec![("provider".to_string(), "azure cloud&co".to_string())],
        );
        assert_eq!(
            req.url(),
            "http://localhost/api/v1/tts/voices?provider=azure+cloud%26co"
        );
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }
}
