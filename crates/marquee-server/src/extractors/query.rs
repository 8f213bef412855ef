use serde::Deserialize;

use marquee_core::QueryParams;

/// Query parameters crudos para endpoints de catalogo.
///
/// `genre` llega como lista separada por comas (`?genre=drama,sci-fi`);
/// la normalizacion canonica ocurre despues en el query engine, aqui
/// solo se separa el string.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct MovieQuery {
    /// Texto de busqueda.
    pub q: Option<String>,

    /// Generos separados por coma.
    pub genre: Option<String>,

    /// Limite inferior del rango de anios (inclusivo).
    pub year_from: Option<u16>,

    /// Limite superior del rango de anios (inclusivo).
    pub year_to: Option<u16>,

    /// Offset de paginacion.
    pub offset: Option<usize>,

    /// Tamanio de pagina.
    pub limit: Option<usize>,

    /// Orden: title, year, rating o popularity.
    pub sort: Option<String>,
}

impl MovieQuery {
    /// Parsea el string de generos separados por coma.
    pub fn genres(&self) -> Vec<String> {
        self.genre
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Convierte los parametros crudos en [`QueryParams`] para normalizar.
    pub fn into_params(self) -> Result<QueryParams, String> {
        let sort = match self.sort.as_deref() {
            None => None,
            Some(raw) => Some(parse_sort(raw)?),
        };

        Ok(QueryParams {
            q: self.q.clone(),
            genre: self.genres(),
            year_from: self.year_from,
            year_to: self.year_to,
            offset: self.offset,
            limit: self.limit,
            sort,
        })
    }
}

fn parse_sort(raw: &str) -> Result<marquee_core::SortOrder, String> {
    use marquee_core::SortOrder;

    match raw.trim().to_lowercase().as_str() {
        "title" => Ok(SortOrder::Title),
        "year" => Ok(SortOrder::Year),
        "rating" => Ok(SortOrder::Rating),
        "popularity" => Ok(SortOrder::Popularity),
        other => Err(format!(
            "Invalid sort '{}': expected title, year, rating or popularity",
            other
        )),
    }
}
