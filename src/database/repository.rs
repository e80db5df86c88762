use serde::Serialize;
use serde_json::json;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::FilterData;

/// Typed read-side repository: one table, one row type, filtered selects.
/// Inserts and updates are entity-specific and live next to their row types
/// in `database::models`.
pub struct Repository<T> {
    table_name: String,
    soft_delete_column: Option<&'static str>,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            table_name: table_name.into(),
            soft_delete_column: None,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Reads exclude rows where `column` is set.
    pub fn with_soft_delete(mut self, column: &'static str) -> Self {
        self.soft_delete_column = Some(column);
        self
    }

    fn builder(&self) -> Result<QueryBuilder<T>, DatabaseError> {
        let mut builder = QueryBuilder::<T>::new(&self.table_name)?;
        if let Some(column) = self.soft_delete_column {
            builder = builder.with_soft_delete(column);
        }
        Ok(builder)
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        self.builder()?.filter(filter_data)?.select_all(&self.pool).await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        self.builder()?.filter(filter_data)?.select_optional(&self.pool).await
    }

    pub async fn select_404(&self, filter_data: FilterData) -> Result<T, DatabaseError> {
        match self.builder()?.filter(filter_data)?.select_one(&self.pool).await {
            Ok(row) => Ok(row),
            Err(DatabaseError::Sqlx(sqlx::Error::RowNotFound)) => {
                Err(DatabaseError::NotFound("Record not found".to_string()))
            }
            Err(other) => Err(other),
        }
    }

    pub async fn select_by_id(&self, id: Uuid) -> Result<T, DatabaseError> {
        let filter = FilterData { where_clause: Some(json!({ "id": id })), ..Default::default() };
        self.select_404(filter).await
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        self.builder()?.filter(filter_data)?.count(&self.pool).await
    }
}
