use agora_types::models::{Category, CategoryId};

use super::OptionalExt;
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

impl Database {
    pub async fn create_category(&self, name: &str) -> StoreResult<Category> {
        let name = name.to_owned();
        self.call(move |conn| {
            Ok(conn.query_row(
                "INSERT INTO categories (name) VALUES (?1) RETURNING id, name",
                [&name],
                map_row,
            )?)
        })
        .await
    }

    pub async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        self.call(move |conn| {
            conn.query_row("SELECT id, name FROM categories WHERE id = ?1", [id], map_row)
                .optional()
        })
        .await
    }

    pub async fn get_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let name = name.to_owned();
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, name FROM categories WHERE name = ?1",
                [&name],
                map_row,
            )
            .optional()
        })
        .await
    }

    pub async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.call(|conn| {
            let mut stmt = conn.prepare_cached("SELECT id, name FROM categories ORDER BY name")?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}
