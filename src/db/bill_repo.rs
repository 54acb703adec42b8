use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqlitePool;

use super::is_unique_violation;
use crate::models::{Bill, BillItem, PaymentMethod};
use crate::store::{BillStore, StoreError};

pub struct BillRepository {
    pool: SqlitePool,
}

// Row type for database queries
#[derive(sqlx::FromRow)]
struct BillRow {
    id: String,
    bill_number: String,
    items: String,
    subtotal: f64,
    cgst: f64,
    sgst: f64,
    total: f64,
    payment_method: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    created_by: String,
    created_by_name: String,
    created_at: String,
    bill_date: String,
    synced_to_cloud: bool,
    extra: String,
}

const INSERT_BILL: &str = r#"
    INSERT INTO bills (id, bill_number, items, subtotal, cgst, sgst, total, payment_method,
                       customer_name, customer_phone, created_by, created_by_name, created_at,
                       bill_date, synced_to_cloud, extra)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
"#;

const UPDATE_BILL: &str = r#"
    UPDATE bills
    SET bill_number = ?2, items = ?3, subtotal = ?4, cgst = ?5, sgst = ?6, total = ?7,
        payment_method = ?8, customer_name = ?9, customer_phone = ?10, created_by = ?11,
        created_by_name = ?12, created_at = ?13, bill_date = ?14, synced_to_cloud = ?15,
        extra = ?16
    WHERE id = ?1
"#;

const UPSERT_BILL: &str = r#"
    INSERT INTO bills (id, bill_number, items, subtotal, cgst, sgst, total, payment_method,
                       customer_name, customer_phone, created_by, created_by_name, created_at,
                       bill_date, synced_to_cloud, extra)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
    ON CONFLICT(id) DO UPDATE SET
        bill_number = excluded.bill_number, items = excluded.items,
        subtotal = excluded.subtotal, cgst = excluded.cgst, sgst = excluded.sgst,
        total = excluded.total, payment_method = excluded.payment_method,
        customer_name = excluded.customer_name, customer_phone = excluded.customer_phone,
        created_by = excluded.created_by, created_by_name = excluded.created_by_name,
        created_at = excluded.created_at, bill_date = excluded.bill_date,
        synced_to_cloud = excluded.synced_to_cloud, extra = excluded.extra
"#;

/// JSON-encoded columns of a bill.
struct Encoded {
    items: String,
    extra: String,
}

impl Encoded {
    fn new(bill: &Bill) -> Result<Self, StoreError> {
        Ok(Self {
            items: serde_json::to_string(&bill.items)?,
            extra: serde_json::to_string(&bill.extra)?,
        })
    }
}

/// Binds every bill column in the `?1..?16` order shared by the statements above.
fn bind_bill<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    bill: &'q Bill,
    encoded: Encoded,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&bill.id)
        .bind(&bill.bill_number)
        .bind(encoded.items)
        .bind(bill.subtotal)
        .bind(bill.cgst)
        .bind(bill.sgst)
        .bind(bill.total)
        .bind(bill.payment_method.to_string())
        .bind(&bill.customer_name)
        .bind(&bill.customer_phone)
        .bind(&bill.created_by)
        .bind(&bill.created_by_name)
        .bind(&bill.created_at)
        .bind(&bill.bill_date)
        .bind(bill.synced_to_cloud)
        .bind(encoded.extra)
}

impl BillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Bill>, StoreError> {
        let row: Option<BillRow> = sqlx::query_as("SELECT * FROM bills WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(hydrate_bill).transpose()
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<Bill>, StoreError> {
        let rows: Vec<BillRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(hydrate_bill).collect()
    }
}

#[async_trait::async_trait]
impl BillStore for BillRepository {
    async fn get_all(&self) -> Result<Vec<Bill>, StoreError> {
        self.fetch("SELECT * FROM bills ORDER BY rowid").await
    }

    async fn get_unsynced(&self) -> Result<Vec<Bill>, StoreError> {
        self.fetch("SELECT * FROM bills WHERE synced_to_cloud = 0 ORDER BY rowid")
            .await
    }

    async fn create(&self, bill: &Bill) -> Result<(), StoreError> {
        let encoded = Encoded::new(bill)?;
        match bind_bill(sqlx::query(INSERT_BILL), bill, encoded)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::AlreadyExists(bill.id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, bill: &Bill) -> Result<(), StoreError> {
        let encoded = Encoded::new(bill)?;
        let result = bind_bill(sqlx::query(UPDATE_BILL), bill, encoded)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(bill.id.clone()));
        }
        Ok(())
    }

    async fn upsert(&self, bill: &Bill) -> Result<(), StoreError> {
        let encoded = Encoded::new(bill)?;
        bind_bill(sqlx::query(UPSERT_BILL), bill, encoded)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM bills WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn hydrate_bill(row: BillRow) -> Result<Bill, StoreError> {
    let items: Vec<BillItem> = serde_json::from_str(&row.items)?;

    Ok(Bill {
        id: row.id,
        bill_number: row.bill_number,
        items,
        subtotal: row.subtotal,
        cgst: row.cgst,
        sgst: row.sgst,
        total: row.total,
        payment_method: PaymentMethod::from(row.payment_method),
        customer_name: row.customer_name,
        customer_phone: row.customer_phone,
        created_by: row.created_by,
        created_by_name: row.created_by_name,
        created_at: row.created_at,
        bill_date: row.bill_date,
        synced_to_cloud: row.synced_to_cloud,
        extra: serde_json::from_str(&row.extra)?,
    })
}
