use serde::Deserialize;

/// Raw catalog query string, exactly as the client sent it. Prices
/// arrive as strings so an unparseable value becomes our own 400
/// instead of a deserializer rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}
