//! Cross-origin headers for the `/api/v1` routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::server::ServerState;

/// Allowed origins, methods and headers sent back to browsers.
///
/// An origin entry of `"*"` allows any origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    /// Seconds a preflight answer may be cached.
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .map(String::from)
                .to_vec(),
            allow_headers: ["Content-Type", "Authorization"]
                .map(String::from)
                .to_vec(),
            max_age: 86_400,
        }
    }
}

impl CorsConfig {
    /// Default policy restricted to `origins`.
    pub fn with_origins(origins: Vec<String>) -> Self {
        Self {
            allow_origins: origins,
            ..Self::default()
        }
    }

    fn allows_any(&self) -> bool {
        self.allow_origins.iter().any(|o| o == "*")
    }

    /// Value of `Access-Control-Allow-Origin` for a request coming from
    /// `origin`, or `None` when the origin is not allowed.
    fn allow_origin(&self, origin: Option<&str>) -> Option<HeaderValue> {
        if self.allows_any() {
            return Some(HeaderValue::from_static("*"));
        }
        let origin = origin?;
        if self.allow_origins.iter().any(|o| o == origin) {
            HeaderValue::from_str(origin).ok()
        } else {
            None
        }
    }

    fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if let Some(value) = self.allow_origin(origin) {
            if !self.allows_any() {
                headers.insert(header::VARY, HeaderValue::from_static("Origin"));
            }
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }

        let joined = [
            (header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.join(", ")),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.join(", ")),
            (header::ACCESS_CONTROL_MAX_AGE, self.max_age.to_string()),
        ];
        for (name, value) in joined {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => tracing::warn!("skipping invalid cors header {name}: {value:?}"),
            }
        }
    }
}

/// Answer preflight requests directly and decorate every other response.
pub(crate) async fn cors(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    state.cors.apply(origin.as_deref(), response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restricted() -> CorsConfig {
        CorsConfig::with_origins(vec!["https://app.example.com".to_string()])
    }

    #[test]
    fn wildcard_allows_any_origin() {
        let config = CorsConfig::default();
        assert_eq!(
            config.allow_origin(Some("https://elsewhere.test")),
            Some(HeaderValue::from_static("*"))
        );
        assert_eq!(config.allow_origin(None), Some(HeaderValue::from_static("*")));
    }

    #[test]
    fn listed_origin_is_echoed() {
        assert_eq!(
            restricted().allow_origin(Some("https://app.example.com")),
            Some(HeaderValue::from_static("https://app.example.com"))
        );
    }

    #[test]
    fn unlisted_origin_gets_no_header() {
        let config = restricted();
        assert_eq!(config.allow_origin(Some("https://evil.test")), None);
        assert_eq!(config.allow_origin(None), None);

        let mut headers = HeaderMap::new();
        config.apply(Some("https://evil.test"), &mut headers);
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
    }

    #[test]
    fn apply_sets_policy_headers() {
        let mut headers = HeaderMap::new();
        restricted().apply(Some("https://app.example.com"), &mut headers);

        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(headers[header::VARY], "Origin");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }
}
