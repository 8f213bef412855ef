//! Test client helpers.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower::ServiceExt;

use marquee_core::{Genre, MovieId, MovieRecord, QueryLimits};
use marquee_server::cache::{CacheCoordinator, CoordinatorConfig};
use marquee_server::metrics::CacheMetrics;
use marquee_server::{
    AppState, CatalogService, MokaStore, MokaStoreConfig, create_router_with_state,
};
use marquee_store::{MemoryStore, RecordStore};

/// Helper para tests de integracion HTTP.
pub struct TestClient {
    app: Router,
}

impl TestClient {
    /// Crea un nuevo test client con el router proporcionado.
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    /// Hace un GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Hace un GET request con headers personalizados.
    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        let mut builder = Request::builder().uri(uri).method("GET");

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Hace un POST request con body JSON.
    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Hace un PUT request con body JSON.
    pub async fn put_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .method("PUT")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Hace un DELETE request.
    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Ejecuta un request arbitrario.
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Wrapper sobre Response con helpers para assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    /// Retorna el body como string.
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    /// Parsea el body como JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    /// Retorna un header especifico.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Verifica que el status sea el esperado.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Verifica que el Content-Type contenga el valor esperado.
    pub fn assert_content_type_contains(&self, expected: &str) -> &Self {
        let content_type = self
            .header("content-type")
            .expect("Response missing Content-Type header");

        assert!(
            content_type.contains(expected),
            "Expected Content-Type to contain '{}' but got '{}'",
            expected,
            content_type
        );
        self
    }

    /// Verifica que un header exista.
    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    /// Verifica que un header tenga un valor especifico.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }
}

/// Construye un record de prueba.
pub fn make_movie(
    title: &str,
    genres: &[&str],
    year: u16,
    rating: f32,
    popularity: f64,
) -> MovieRecord {
    MovieRecord {
        id: MovieId::new(),
        title: title.to_string(),
        genres: genres.iter().map(|g| Genre::new(*g)).collect(),
        year,
        rating,
        description: format!("{} description", title),
        popularity,
    }
}

/// Catalogo de prueba con peliculas variadas.
pub fn sample_catalog() -> Vec<MovieRecord> {
    vec![
        make_movie("Dune", &["sci-fi", "adventure"], 2021, 8.1, 95.0),
        make_movie("Arrival", &["sci-fi", "drama"], 2016, 7.9, 70.0),
        make_movie("Heat", &["crime", "thriller"], 1995, 8.3, 60.0),
        make_movie("Amelie", &["comedy", "romance"], 2001, 8.0, 40.0),
        make_movie("The Lighthouse", &["horror", "drama"], 2019, 7.4, 25.0),
    ]
}

/// Crea un TestClient con el estado completo y los records dados.
pub fn client_with_movies(records: Vec<MovieRecord>) -> TestClient {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::with_records(records));
    let cache_metrics = CacheMetrics::new();
    let cache = Arc::new(MokaStore::new(
        MokaStoreConfig::default(),
        cache_metrics.clone(),
    ));
    let coordinator = Arc::new(CacheCoordinator::new(
        Arc::clone(&store),
        cache,
        CoordinatorConfig::default(),
        cache_metrics,
    ));
    let catalog = Arc::new(CatalogService::new(
        store,
        Arc::clone(&coordinator),
        QueryLimits::default(),
    ));

    let state = AppState::new(catalog, coordinator);

    // Recorder local, sin instalarlo globalmente (los tests corren en paralelo)
    let prometheus_handle = PrometheusBuilder::new().build_recorder().handle();

    TestClient::new(create_router_with_state(state, prometheus_handle))
}

/// Crea un TestClient con el catalogo de prueba por defecto.
pub fn client() -> TestClient {
    client_with_movies(sample_catalog())
}
