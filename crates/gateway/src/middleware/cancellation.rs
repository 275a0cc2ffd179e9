//! Per-request cancellation.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tokio_util::sync::CancellationToken;

/// Attach a fresh [`CancellationToken`] to the request extensions.
///
/// The token is cancelled as soon as the request future is dropped, so store
/// calls made on behalf of a client that went away are abandoned instead of
/// running to their time budget.
pub async fn cancellation_middleware(mut request: Request<Body>, next: Next) -> Response {
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    request.extensions_mut().insert(token);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_token_is_live_during_handler() {
        let app = Router::new()
            .route(
                "/",
                get(|Extension(token): Extension<CancellationToken>| async move {
                    if token.is_cancelled() {
                        "cancelled"
                    } else {
                        "live"
                    }
                }),
            )
            .layer(middleware::from_fn(cancellation_middleware));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"live");
    }

    #[tokio::test]
    async fn test_dropped_request_cancels_token() {
        let (tx, rx) = tokio::sync::oneshot::channel::<CancellationToken>();
        let tx = std::sync::Arc::new(std::sync::Mutex::new(Some(tx)));
        let app = Router::new()
            .route(
                "/",
                get(move |Extension(token): Extension<CancellationToken>| {
                    if let Some(tx) = tx.lock().unwrap().take() {
                        let _ = tx.send(token);
                    }
                    async {
                        std::future::pending::<()>().await;
                        "unreachable"
                    }
                }),
            )
            .layer(middleware::from_fn(cancellation_middleware));

        let request = tokio::spawn(app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()));
        let token = rx.await.unwrap();
        assert!(!token.is_cancelled());

        request.abort();
        let _ = request.await;
        assert!(token.is_cancelled());
    }
}
