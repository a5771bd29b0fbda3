use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value as JsonValue;
use url::Url;

pub use http::Method;

use crate::error::Error;
use crate::types::AuthToken;

const AUTH_ENTRY_PATHS: [&str; 2] = ["/api/auth/signin", "/api/auth/signup"];
const APPLICATION_JSON: &str = "application/json";

/// Static classification of a route, used to disambiguate 401 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    /// No credential required (`/`, `/health`).
    Public,
    /// Sign-in and sign-up. A 401 here means bad credentials.
    AuthEntry,
    /// Everything under `/api/` that is not an auth entry.
    Protected,
}

impl EndpointCategory {
    /// Categorise an endpoint path. Any query string is ignored, and a
    /// missing leading `/` is tolerated the same way URL joining tolerates it.
    #[must_use]
    pub fn of(endpoint: &str) -> Self {
        let path = endpoint.split(['?', '#']).next().unwrap_or_default();
        let path = format!("/{}", path.trim_start_matches('/'));
        let path = path.trim_end_matches('/');
        if AUTH_ENTRY_PATHS.contains(&path) {
            Self::AuthEntry
        } else if path.starts_with("/api/") {
            Self::Protected
        } else {
            Self::Public
        }
    }
}

/// One outbound call: endpoint, method and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    endpoint: String,
    method: Method,
    body: Option<JsonValue>,
    category: Option<EndpointCategory>,
}

impl CallDescriptor {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
            category: None,
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the category derived from the endpoint path.
    #[must_use]
    pub fn with_category(mut self, category: EndpointCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn category(&self) -> EndpointCategory {
        self.category.unwrap_or_else(|| EndpointCategory::of(&self.endpoint))
    }
}

/// A transport-ready request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub category: EndpointCategory,
    /// Whether a bearer token was attached, captured at build time.
    pub had_token: bool,
}

/// Turn a descriptor plus the current token into a request.
///
/// The body is serialized as-is; field names are the caller's business.
///
/// # Errors
///
/// Returns [`Error::Config`] if the endpoint does not form a valid URL with
/// `base_url` or the token is not a valid header value.
pub fn build_request(
    base_url: &Url,
    descriptor: &CallDescriptor,
    token: Option<&AuthToken>,
) -> Result<PreparedRequest, Error> {
    let url = join_url(base_url, descriptor.endpoint())?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

    let body = match descriptor.body() {
        Some(body) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
            Some(serde_json::to_vec(body)?)
        }
        None => None,
    };

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| Error::Config("stored token is not a valid header value".into()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(PreparedRequest {
        method: descriptor.method().clone(),
        url,
        headers,
        body,
        category: descriptor.category(),
        had_token: token.is_some(),
    })
}

/// Append `endpoint` to the base URL, keeping any path prefix on the base.
fn join_url(base_url: &Url, endpoint: &str) -> Result<Url, Error> {
    let base = base_url.as_str().trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
        .parse()
        .map_err(|e| Error::Config(format!("invalid endpoint '{endpoint}': {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base() -> Url {
        "https://api.example.com".parse().unwrap()
    }

    #[test]
    fn categorises_endpoints() {
        assert_eq!(EndpointCategory::of("/api/auth/signin"), EndpointCategory::AuthEntry);
        assert_eq!(EndpointCategory::of("/api/auth/signup/"), EndpointCategory::AuthEntry);
        assert_eq!(EndpointCategory::of("/api/u1/tasks?status=all"), EndpointCategory::Protected);
        assert_eq!(EndpointCategory::of("/api/u1/chat"), EndpointCategory::Protected);
        assert_eq!(EndpointCategory::of("/health"), EndpointCategory::Public);
        assert_eq!(EndpointCategory::of("/"), EndpointCategory::Public);
    }

    #[test]
    fn categorises_endpoints_without_leading_slash() {
        assert_eq!(EndpointCategory::of("api/auth/signin"), EndpointCategory::AuthEntry);
        assert_eq!(EndpointCategory::of("//api/auth/signup"), EndpointCategory::AuthEntry);
        assert_eq!(EndpointCategory::of("api/u1/tasks"), EndpointCategory::Protected);
        assert_eq!(EndpointCategory::of("health"), EndpointCategory::Public);
        assert_eq!(EndpointCategory::of(""), EndpointCategory::Public);

        let req = build_request(&base(), &CallDescriptor::post("api/auth/signin"), None).unwrap();
        assert_eq!(req.url.as_str(), "https://api.example.com/api/auth/signin");
        assert_eq!(req.category, EndpointCategory::AuthEntry);
    }

    #[test]
    fn explicit_category_wins() {
        let call = CallDescriptor::get("/health").with_category(EndpointCategory::Protected);
        assert_eq!(call.category(), EndpointCategory::Protected);
    }

    #[test]
    fn bearer_header_only_with_token() {
        let call = CallDescriptor::get("/api/u1/tasks");

        let anonymous = build_request(&base(), &call, None).unwrap();
        assert!(anonymous.headers.get(AUTHORIZATION).is_none());
        assert!(!anonymous.had_token);

        let token = AuthToken::new("tok-1");
        let authed = build_request(&base(), &call, Some(&token)).unwrap();
        assert_eq!(authed.headers[AUTHORIZATION], "Bearer tok-1");
        assert!(authed.headers[AUTHORIZATION].is_sensitive());
        assert!(authed.had_token);
    }

    #[test]
    fn json_content_type_only_with_body() {
        let get = build_request(&base(), &CallDescriptor::get("/health"), None).unwrap();
        assert!(get.headers.get(CONTENT_TYPE).is_none());
        assert!(get.body.is_none());

        let post = CallDescriptor::post("/api/u1/tasks")
            .with_body(json!({"title": "Buy milk", "description": ""}));
        let req = build_request(&base(), &post, None).unwrap();
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        let sent: JsonValue = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"title": "Buy milk", "description": ""}));
    }

    #[test]
    fn body_field_names_pass_through() {
        let call = CallDescriptor::post("/api/u1/chat")
            .with_body(json!({"message": "hi", "conversation_id": 4, "extra_Field": true}));
        let req = build_request(&base(), &call, None).unwrap();
        let sent: JsonValue = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["extra_Field"], json!(true));
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let base: Url = "https://host.example.com/backend/".parse().unwrap();
        let req = build_request(&base, &CallDescriptor::get("/api/u1/tasks?status=all"), None)
            .unwrap();
        assert_eq!(
            req.url.as_str(),
            "https://host.example.com/backend/api/u1/tasks?status=all"
        );
        assert_eq!(req.category, EndpointCategory::Protected);
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let token = AuthToken::new("bad\ntoken");
        let result = build_request(&base(), &CallDescriptor::get("/api/x"), Some(&token));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
