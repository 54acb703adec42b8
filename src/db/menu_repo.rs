use sqlx::SqlitePool;

use super::is_unique_violation;
use crate::models::MenuItem;
use crate::store::{MenuStore, StoreError};

pub struct MenuRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: String,
    name: String,
    price: f64,
    category: String,
    is_available: bool,
    extra: String,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = StoreError;

    fn try_from(row: MenuItemRow) -> Result<Self, StoreError> {
        Ok(MenuItem {
            id: row.id,
            name: row.name,
            price: row.price,
            category: row.category,
            is_available: row.is_available,
            extra: serde_json::from_str(&row.extra)?,
        })
    }
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<MenuItem>, StoreError> {
        let row: Option<MenuItemRow> = sqlx::query_as("SELECT * FROM menu_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(MenuItem::try_from).transpose()
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl MenuStore for MenuRepository {
    async fn get_all(&self) -> Result<Vec<MenuItem>, StoreError> {
        let rows: Vec<MenuItemRow> =
            sqlx::query_as("SELECT * FROM menu_items ORDER BY category, name")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(MenuItem::try_from).collect()
    }

    async fn create(&self, item: &MenuItem) -> Result<(), StoreError> {
        let extra = serde_json::to_string(&item.extra)?;
        let result = sqlx::query(
            "INSERT INTO menu_items (id, name, price, category, is_available, extra)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.is_available)
        .bind(extra)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::AlreadyExists(item.id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, item: &MenuItem) -> Result<(), StoreError> {
        let extra = serde_json::to_string(&item.extra)?;
        let result = sqlx::query(
            "UPDATE menu_items SET name = ?, price = ?, category = ?, is_available = ?, extra = ?
             WHERE id = ?",
        )
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.is_available)
        .bind(extra)
        .bind(&item.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(item.id.clone()));
        }
        Ok(())
    }

    async fn upsert(&self, item: &MenuItem) -> Result<(), StoreError> {
        let extra = serde_json::to_string(&item.extra)?;
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, price, category, is_available, extra)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, price = excluded.price,
                category = excluded.category, is_available = excluded.is_available,
                extra = excluded.extra
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.is_available)
        .bind(extra)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn setup_repo() -> (MenuRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        (MenuRepository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_list_sorted_by_category_then_name() {
        let (repo, _temp) = setup_repo().await;

        repo.create(&MenuItem::new("m1", "Vada", 20.0).with_category("snacks"))
            .await
            .unwrap();
        repo.create(&MenuItem::new("m2", "Tea", 10.0).with_category("drinks"))
            .await
            .unwrap();
        repo.create(&MenuItem::new("m3", "Bajji", 25.0).with_category("snacks"))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Tea", "Bajji", "Vada"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let (repo, _temp) = setup_repo().await;
        let item = MenuItem::new("m1", "Tea", 10.0);

        repo.create(&item).await.unwrap();
        assert!(matches!(
            repo.create(&item).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_replaces_fields() {
        let (repo, _temp) = setup_repo().await;

        repo.upsert(&MenuItem::new("m1", "Tea", 10.0)).await.unwrap();
        repo.upsert(&MenuItem::new("m1", "Masala Tea", 15.0).with_available(false))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let item = repo.get_by_id("m1").await.unwrap().unwrap();
        assert_eq!(item.name, "Masala Tea");
        assert_eq!(item.price, 15.0);
        assert!(!item.is_available);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let (repo, _temp) = setup_repo().await;
        let ghost = MenuItem::new("ghost", "Nothing", 0.0);

        assert!(matches!(
            repo.update(&ghost).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete("ghost").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unmodelled_fields_are_stored() {
        let (repo, _temp) = setup_repo().await;
        let item: MenuItem =
            serde_json::from_str(r#"{"id":"m1","name":"Tea","imageUrl":"tea.png"}"#).unwrap();

        repo.upsert(&item).await.unwrap();

        let fetched = repo.get_by_id("m1").await.unwrap().unwrap();
        assert_eq!(fetched, item);
        assert_eq!(fetched.extra["imageUrl"], "tea.png");
    }
}
