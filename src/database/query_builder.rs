use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::types::SqlParam;
use crate::filter::{Filter, Page, Pagination};

/// Executes a [`Filter`] against the pool. Rows come back as JSON objects
/// already shaped for the response.
pub struct QueryBuilder {
    filter: Filter,
}

impl QueryBuilder {
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<Value>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    pub async fn select_optional(&self, pool: &PgPool) -> Result<Option<Value>, DatabaseError> {
        Ok(self.select_all(pool).await?.into_iter().next())
    }

    pub async fn count(&self, pool: &PgPool) -> Result<u64, DatabaseError> {
        let sql_result = self.filter.to_count_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param(q, p);
        }
        let count: i64 = q.fetch_one(pool).await?.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Current page plus the total over the whole filtered set.
    pub async fn page(self, pool: &PgPool) -> Result<Page<Value>, DatabaseError> {
        let total = self.count(pool).await?;
        let data = self.select_all(pool).await?;
        let request = self.filter.page();
        Ok(Page {
            data,
            total,
            pagination: Pagination::new(request, total),
        })
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Number(n) => q.bind(*n),
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Timestamp(t) => q.bind(*t),
    }
}
