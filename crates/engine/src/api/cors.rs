//! Cross-origin policy for browser front-ends.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer from a comma separated origin list.
///
/// Unset, `*`, or a list with no valid origin allows every origin.
pub fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let allowed_origins = allowed_origins.map(str::trim).unwrap_or("*");
    if allowed_origins == "*" {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            value = allowed_origins,
            "CORS_ALLOWED_ORIGINS has no valid origins, allowing any origin"
        );
        return cors.allow_origin(Any);
    }

    cors.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::{routing::post, Router};
    use tower::ServiceExt;

    fn router(allowed_origins: Option<&str>) -> Router {
        Router::new()
            .route("/api/continue_story", post(|| async { "ok" }))
            .layer(cors_layer(allowed_origins))
    }

    async fn preflight(router: Router, origin: &str) -> Option<String> {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/continue_story")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn unset_allows_any_origin() {
        let allowed = preflight(router(None), "http://elves.test").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn wildcard_allows_any_origin() {
        let allowed = preflight(router(Some(" * ")), "http://elves.test").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn listed_origin_is_echoed() {
        let origins = Some("http://north.test, http://pole.test");

        let allowed = preflight(router(origins), "http://pole.test").await;
        assert_eq!(allowed.as_deref(), Some("http://pole.test"));

        let rejected = preflight(router(origins), "http://grinch.test").await;
        assert!(rejected.is_none());
    }

    #[tokio::test]
    async fn list_without_valid_origins_allows_any() {
        let allowed = preflight(router(Some(" , bad\norigin ,")), "http://elves.test").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }
}
