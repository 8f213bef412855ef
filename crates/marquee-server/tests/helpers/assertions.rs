//! Custom assertions para tests.

use serde_json::Value;

/// Verifica que una respuesta JSON tenga el schema de un result set.
pub fn assert_result_set_schema(json: &Value) {
    assert!(json.is_object(), "Response should be a JSON object");

    let obj = json.as_object().unwrap();

    // Campos requeridos
    assert!(obj.contains_key("items"), "Missing 'items' field");
    assert!(obj.contains_key("total"), "Missing 'total' field");
    assert!(obj.contains_key("offset"), "Missing 'offset' field");
    assert!(obj.contains_key("limit"), "Missing 'limit' field");

    // Validar tipos
    assert!(obj["items"].is_array(), "'items' should be an array");
    assert!(obj["total"].is_u64(), "'total' should be a number");
    assert!(obj["offset"].is_u64(), "'offset' should be a number");
    assert!(obj["limit"].is_u64(), "'limit' should be a number");

    // Validar estructura de cada record
    if let Some(items) = obj["items"].as_array() {
        for item in items {
            assert_movie_schema(item);
        }
    }
}

/// Verifica que un JSON tenga el schema de un movie record.
pub fn assert_movie_schema(json: &Value) {
    assert!(json.is_object(), "Movie should be a JSON object");

    let obj = json.as_object().unwrap();

    assert!(obj.contains_key("id"), "Missing 'id' field");
    assert!(obj.contains_key("title"), "Missing 'title' field");
    assert!(obj.contains_key("genres"), "Missing 'genres' field");
    assert!(obj.contains_key("year"), "Missing 'year' field");
    assert!(obj.contains_key("rating"), "Missing 'rating' field");

    assert!(obj["id"].is_string(), "'id' should be a string");
    assert!(obj["title"].is_string(), "'title' should be a string");
    assert!(obj["genres"].is_array(), "'genres' should be an array");
}

/// Extrae los titulos de un result set, en orden.
pub fn titles(json: &Value) -> Vec<String> {
    json["items"]
        .as_array()
        .expect("'items' should be an array")
        .iter()
        .map(|item| item["title"].as_str().expect("title").to_string())
        .collect()
}
