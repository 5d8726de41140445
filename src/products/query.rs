use std::cmp::Ordering;

use crate::error::ApiError;
use crate::products::dto::ListParams;
use crate::products::repo::Product;

/// Sentinel the storefront sends for "no category filter".
pub const ALL_CATEGORIES: &str = "Todas";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A validated catalog query. Filters are conjunctive; a single key
/// and direction order the result, ties keeping input order.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    q: Option<String>,
    category: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort_by: SortKey,
    order: SortOrder,
}

impl CatalogQuery {
    /// Parse untrusted query parameters. Empty strings count as
    /// absent; an unrecognized sort key falls back to created_at and
    /// anything but "asc" sorts descending.
    pub fn from_params(params: ListParams) -> Result<Self, ApiError> {
        let q = non_empty(params.q).map(|s| s.to_lowercase());
        let category = non_empty(params.category).filter(|c| c != ALL_CATEGORIES);
        let min_price = parse_price(params.min_price, "min_price")?;
        let max_price = parse_price(params.max_price, "max_price")?;
        let sort_by = match params.sort_by.as_deref() {
            Some("price") => SortKey::Price,
            Some("name") => SortKey::Name,
            _ => SortKey::CreatedAt,
        };
        let order = match params.order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        Ok(Self {
            q,
            category,
            min_price,
            max_price,
            sort_by,
            order,
        })
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = &self.q {
            let in_name = product.name.to_lowercase().contains(q.as_str());
            let in_description = product.description.to_lowercase().contains(q.as_str());
            if !in_name && !in_description {
                return false;
            }
        }
        if let Some(category) = &self.category {
            // Exact match, case-sensitive as stored.
            if product.category != *category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        true
    }

    /// Filter and stably sort. Pure; never errors, an empty match is
    /// an empty list.
    pub fn apply(&self, mut products: Vec<Product>) -> Vec<Product> {
        products.retain(|p| self.matches(p));
        products.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortKey::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        products
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_price(value: Option<String>, field: &str) -> Result<Option<f64>, ApiError> {
    match non_empty(value) {
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ApiError::InvalidParameter(field.into())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn product(name: &str, description: &str, price: f64, category: &str, ts: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            price,
            stock: 0,
            image_url: String::new(),
            category: category.into(),
            created_at: OffsetDateTime::from_unix_timestamp(ts).unwrap(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Taza azul", "Cerámica artesanal", 30.0, "Hogar", 100),
            product("Lámpara", "Luz cálida para escritorio", 10.0, "Hogar", 200),
            product("Mochila", "Resistente al agua", 20.0, "Viaje", 300),
            product("Termo", "Mantiene bebidas calientes", 20.0, "Viaje", 400),
        ]
    }

    fn query(params: ListParams) -> CatalogQuery {
        CatalogQuery::from_params(params).expect("valid params")
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn defaults_sort_newest_first() {
        let result = query(ListParams::default()).apply(catalog());
        assert_eq!(names(&result), ["Termo", "Mochila", "Lámpara", "Taza azul"]);
    }

    #[test]
    fn price_asc_orders_totally() {
        let result = query(ListParams {
            sort_by: Some("price".into()),
            order: Some("asc".into()),
            ..Default::default()
        })
        .apply(catalog());
        let prices: Vec<f64> = result.iter().map(|p| p.price).collect();
        assert_eq!(prices, [10.0, 20.0, 20.0, 30.0]);
    }

    #[test]
    fn equal_sort_keys_keep_input_order() {
        // Mochila and Termo share a price; input order must survive
        // both directions.
        let asc = query(ListParams {
            sort_by: Some("price".into()),
            order: Some("asc".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert_eq!(names(&asc), ["Lámpara", "Mochila", "Termo", "Taza azul"]);

        let desc = query(ListParams {
            sort_by: Some("price".into()),
            order: Some("desc".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert_eq!(names(&desc), ["Taza azul", "Mochila", "Termo", "Lámpara"]);
    }

    #[test]
    fn q_matches_name_or_description_case_insensitively() {
        let result = query(ListParams {
            q: Some("CALIENTE".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert_eq!(names(&result), ["Termo"]);

        let result = query(ListParams {
            q: Some("taza".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert_eq!(names(&result), ["Taza azul"]);
    }

    #[test]
    fn category_filters_exactly() {
        let result = query(ListParams {
            category: Some("Viaje".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert!(result.iter().all(|p| p.category == "Viaje"));
        assert_eq!(result.len(), 2);

        // Case-sensitive as stored.
        let result = query(ListParams {
            category: Some("viaje".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert!(result.is_empty());
    }

    #[test]
    fn all_categories_sentinel_equals_no_filter() {
        let with_sentinel = query(ListParams {
            category: Some(ALL_CATEGORIES.into()),
            ..Default::default()
        })
        .apply(catalog());
        let without = query(ListParams::default()).apply(catalog());
        assert_eq!(names(&with_sentinel), names(&without));
    }

    #[test]
    fn filters_are_conjunctive_and_order_free() {
        let combined = query(ListParams {
            q: Some("a".into()),
            category: Some("Hogar".into()),
            min_price: Some("15".into()),
            max_price: Some("35".into()),
            order: Some("asc".into()),
            ..Default::default()
        });
        let products = catalog();
        let expected: Vec<&Product> = products
            .iter()
            .filter(|p| p.price <= 35.0)
            .filter(|p| p.category == "Hogar")
            .filter(|p| p.price >= 15.0)
            .filter(|p| {
                p.name.to_lowercase().contains('a') || p.description.to_lowercase().contains('a')
            })
            .collect();
        let got = combined.apply(products.clone());
        let got_ids: Vec<Uuid> = got.iter().map(|p| p.id).collect();
        let expected_ids: Vec<Uuid> = expected.iter().map(|p| p.id).collect();
        assert_eq!(got_ids, expected_ids);
    }

    #[test]
    fn inverted_price_range_yields_empty_list() {
        let result = query(ListParams {
            min_price: Some("10".into()),
            max_price: Some("5".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert!(result.is_empty());
    }

    #[test]
    fn unparseable_price_is_a_client_error() {
        let err = CatalogQuery::from_params(ListParams {
            min_price: Some("barato".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));
    }

    #[test]
    fn unknown_sort_key_falls_back_to_created_at() {
        let fallback = query(ListParams {
            sort_by: Some("popularity".into()),
            ..Default::default()
        })
        .apply(catalog());
        let default = query(ListParams::default()).apply(catalog());
        assert_eq!(names(&fallback), names(&default));
    }

    #[test]
    fn empty_string_params_count_as_absent() {
        let result = query(ListParams {
            q: Some("".into()),
            category: Some("  ".into()),
            min_price: Some("".into()),
            ..Default::default()
        })
        .apply(catalog());
        assert_eq!(result.len(), 4);
    }
}
