pub mod files;
pub mod health;
pub mod items;
pub mod root;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use itembox_service::LocalService;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::Mode;
use crate::cors::cors_layer;
use crate::error::{not_found, panic_response, PanicPayload};

pub struct InnerAppState {
    pub service: LocalService,
    pub mode: Mode,
    pub allowed_origins: Vec<HeaderValue>,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    let mode = state.mode;
    let cors = cors_layer(state.allowed_origins.clone());

    Router::new()
        .merge(root::routes())
        .merge(health::routes())
        .merge(items::routes())
        .merge(files::routes())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(move |err: PanicPayload| panic_response(err, mode)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Value,
    }

    /// Drive one request through the router and decode the JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(app: &Router, uri: &str) -> TestResponse {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(app: &Router, uri: &str, body: &str) -> TestResponse {
        send(
            app,
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(app: &Router, uri: &str) -> TestResponse {
        send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
    }
}
