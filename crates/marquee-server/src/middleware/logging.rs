//! Logging estructurado por request.
//!
//! Cada request corre dentro de un span propio con su request id,
//! metodo y path; al completar se emite un unico log con el status y
//! la latencia.

use axum::{
    body::Body,
    http::{Request, Response},
};
use std::{
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::{Instrument, info, info_span, warn};

use super::request_id::REQUEST_ID_HEADER;

/// Layer que loggea el ciclo de vida de cada request.
#[derive(Clone, Default)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware { inner }
    }
}

/// Middleware que envuelve la request en su span y emite el log final.
#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for LoggingMiddleware<S>
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

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let started = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        // El RequestIdLayer corre antes y garantiza el header
        let request_id = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let span = info_span!(
            "request",
            id = %request_id,
            method = %method,
            path = %path,
        );

        let mut inner = self.inner.clone();

        Box::pin(
            async move {
                let response = inner.call(request).await?;

                let status = response.status();
                let elapsed_ms = started.elapsed().as_millis() as u64;

                if status.is_server_error() {
                    warn!(status = status.as_u16(), elapsed_ms, "Request failed");
                } else {
                    info!(status = status.as_u16(), elapsed_ms, "Request completed");
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
