//! Middleware que genera o propaga X-Request-Id.
//!
//! Un id entrante no vacio se respeta tal cual (el caller ya esta
//! correlacionando); en cualquier otro caso se genera un UUIDv7, que
//! ordena por tiempo en los logs.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Nombre del header de request id.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Layer que asegura un request id por request.
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware { inner }
    }
}

/// Middleware que estampa el id en request y response.
#[derive(Clone)]
pub struct RequestIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let id = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        // Visible para los handlers y para el LoggingLayer
        if let Ok(value) = HeaderValue::from_str(&id) {
            request
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), value);
        }

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;

            if let Ok(value) = HeaderValue::from_str(&id) {
                response
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER.clone(), value);
            }

            Ok(response)
        })
    }
}
