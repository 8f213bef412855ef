//! Tower middleware aplicado a todas las requests.
//!
//! `RequestIdLayer` asegura un X-Request-Id por request (propagado o
//! generado) y `LoggingLayer` corre cada request dentro de su span,
//! en ese orden.

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
