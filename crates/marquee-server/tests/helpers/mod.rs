//! Test helpers para marquee-server.

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod client;

pub use assertions::*;
pub use client::{TestClient, TestResponse, client, client_with_movies, make_movie, sample_catalog};
