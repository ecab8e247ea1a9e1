use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Employee {
    pub id: Uuid,
    pub employee_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateEmployee {
    pub employee_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Employee {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateEmployee,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"INSERT INTO employees (id, employee_name, email, phone)
               VALUES (?1, ?2, ?3, ?4)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.employee_name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = ?1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY employee_name ASC")
            .fetch_all(pool)
            .await
    }
}
