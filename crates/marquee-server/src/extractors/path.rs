use serde::Deserialize;

use marquee_core::{CatalogError, MovieId};

/// Extractor para rutas /movies/{id}
#[derive(Debug, Deserialize)]
pub struct MovieIdPath {
    pub id: String,
}

impl MovieIdPath {
    /// Parsea el id como [`MovieId`], rechazando UUIDs malformados.
    pub fn movie_id(&self) -> Result<MovieId, CatalogError> {
        MovieId::parse(&self.id).map_err(|e| CatalogError::invalid_id(&self.id, e.to_string()))
    }
}
