use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{
        header::{
            HOST, LOCATION, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
            X_DNS_PREFETCH_CONTROL, X_FRAME_OPTIONS,
        },
        HeaderName, HeaderValue, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::debug;

use crate::ratelimit::rate_limit;
use crate::shared::AppState;
use crate::{article, news, session};

/// Largest accepted request body
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

const HSTS: &str = "max-age=15552000; includeSubDomains";


async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Redirects plain-HTTP requests that arrived through a TLS-terminating proxy.
/// Requests without a usable Host header are passed through.
pub async fn require_https(req: Request, next: Next) -> Response {
    let forwarded_proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    match (forwarded_proto, host) {
        (Some(proto), Some(host)) if proto != "https" => {
            let path = req
                .uri()
                .path_and_query()
                .map(|p| p.as_str())
                .unwrap_or("/");
            let location = format!("https://{host}{path}");
            debug!(location = %location, "Redirecting to HTTPS");
            (StatusCode::FOUND, [(LOCATION, location)]).into_response()
        }
        _ => next.run(req).await,
    }
}

/// Builds the full HTTP surface. Routes under /api/news and /api/articles sit
/// behind the authentication gate.
pub fn router(state: AppState, production: bool) -> Router {
    let protected = Router::new()
        .route("/api/news", get(news::search_news))
        .route(
            "/api/articles",
            get(article::list_articles).post(article::create_article),
        )
        .route(
            "/api/articles/:id",
            get(article::get_article).delete(article::delete_article),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::jwt_auth,
        ));

    let mut app = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(session::login))
        .route("/api/auth/logout", post(session::logout))
        .route("/api/auth/register", post(session::register))
        .merge(protected)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http());

    if production {
        app = app
            .layer(SetResponseHeaderLayer::overriding(
                STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(HSTS),
            ))
            .layer(middleware::from_fn(require_https));
    }

    app.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::repository::InMemoryArticleRepository;
    use crate::shared::test_utils::{AppStateBuilder, DummyNewsClient};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app(production: bool) -> Router {
        let state = AppStateBuilder::new()
            .with_article_repository(Arc::new(InMemoryArticleRepository::new()))
            .with_news_client(Arc::new(DummyNewsClient))
            .build();
        router(state, production)
    }

    #[tokio::test]
    async fn test_health_sets_security_headers() {
        let response = app(false)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "DENY");
        assert_eq!(response.headers()[REFERRER_POLICY], "no-referrer");
        assert_eq!(response.headers()[X_DNS_PREFETCH_CONTROL], "off");
        assert_eq!(response.headers()["cross-origin-opener-policy"], "same-origin");
        assert!(response.headers().get(STRICT_TRANSPORT_SECURITY).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let response = app(false)
            .oneshot(Request::builder().uri("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_production_redirects_plain_http() {
        let request = Request::builder()
            .uri("/api/health?x=1")
            .header(HOST, "api.example.com")
            .header("x-forwarded-proto", "http")
            .body(Body::empty())
            .unwrap();
        let response = app(true).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "https://api.example.com/api/health?x=1"
        );
    }

    #[tokio::test]
    async fn test_production_passes_https_through() {
        let request = Request::builder()
            .uri("/api/health")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        let response = app(true).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[STRICT_TRANSPORT_SECURITY], HSTS);
    }

    #[tokio::test]
    async fn test_production_without_host_is_not_redirected() {
        let request = Request::builder()
            .uri("/api/health")
            .header("x-forwarded-proto", "http")
            .body(Body::empty())
            .unwrap();
        let response = app(true).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(LOCATION).is_none());
    }
}
