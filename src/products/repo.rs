use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Product record. created_at is set once at insert and is the
/// default catalog sort key. Negative price/stock are not rejected
/// here, matching the behavior the storefront was built against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image_url: String,
    pub category: String,
    pub created_at: OffsetDateTime,
}

pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image_url: String,
    pub category: String,
}

/// Partial update: absent field means unchanged, not cleared.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl Product {
    /// Full catalog in deterministic store order; the query pipeline
    /// filters and re-sorts on top of this.
    pub async fn fetch_all(db: &PgPool) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, image_url, category, created_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, image_url, category, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn create(db: &PgPool, new: &NewProduct) -> anyhow::Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, stock, image_url, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, price, stock, image_url, category, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(&new.image_url)
        .bind(&new.category)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: &ProductPatch,
    ) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                image_url = COALESCE($6, image_url),
                category = COALESCE($7, category)
            WHERE id = $1
            RETURNING id, name, description, price, stock, image_url, category, created_at
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.image_url.as_deref())
        .bind(patch.category.as_deref())
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_deserializes_partially() {
        let patch: ProductPatch = serde_json::from_str(r#"{"price": 99.99}"#).unwrap();
        assert_eq!(patch.price, Some(99.99));
        assert!(patch.name.is_none());
        assert!(patch.description.is_none());
        assert!(patch.stock.is_none());
        assert!(patch.category.is_none());
    }
}
