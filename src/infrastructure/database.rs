//! 数据库基础设施
//!
//! 进程持有一个连接池；每次调用检出一个连接、执行一条参数化语句，
//! 连接在离开作用域时归还（成功与失败路径相同）。

use sqlx::{
    mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow},
    pool::PoolConnection,
    sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow},
    Arguments, FromRow,
};
use std::time::Duration;
use tracing::{debug, error, info};

use super::config::{DatabaseTarget, PoolConfig};

/// 位置参数绑定值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbValue {
    Int(i64),
    Text(String),
}

impl From<i64> for DbValue {
    fn from(value: i64) -> Self {
        DbValue::Int(value)
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

/// 写语句的执行结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    pub rows_affected: u64,
    /// 驱动返回 0 时为 `None`
    pub last_insert_id: Option<i64>,
}

/// 数据库错误
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("数据库连接失败: {0}")]
    Connect(String),
    /// 语句执行失败，携带驱动原始错误信息
    #[error("{0}")]
    Statement(String),
}

#[derive(Clone, Debug)]
pub enum DbPool {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub async fn connect(target: &DatabaseTarget, config: &PoolConfig) -> Result<Self, DbError> {
        info!(
            "Connecting to {} database (max_connections={})",
            target.backend(),
            config.max_connections
        );

        let pool = match target {
            DatabaseTarget::MySql(options) => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(config.acquire_timeout())
                    .idle_timeout(config.idle_timeout())
                    .max_lifetime(config.max_lifetime())
                    .connect_with(options.clone())
                    .await
                    .map_err(connect_error)?;
                DbPool::MySql(pool)
            }
            DatabaseTarget::Sqlite(options) => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(config.acquire_timeout())
                    .idle_timeout(config.idle_timeout())
                    .max_lifetime(config.max_lifetime())
                    .connect_with(options.clone())
                    .await
                    .map_err(connect_error)?;
                DbPool::Sqlite(pool)
            }
        };

        Ok(Self { pool })
    }

    /// 单连接、永不过期的内存 SQLite 库，本地演示与测试使用
    pub async fn sqlite_in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(connect_error)?;

        Ok(Self::from_sqlite_pool(pool))
    }

    pub fn from_sqlite_pool(pool: SqlitePool) -> Self {
        Self {
            pool: DbPool::Sqlite(pool),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self.pool {
            DbPool::MySql(_) => "mysql",
            DbPool::Sqlite(_) => "sqlite",
        }
    }

    /// 执行读语句，返回全部结果行
    pub async fn fetch_all<T>(&self, sql: &str, values: &[DbValue]) -> Result<Vec<T>, DbError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        debug!(sql, binds = values.len(), "fetch_all");

        let rows = match &self.pool {
            DbPool::MySql(pool) => {
                let mut conn = checkout(pool).await?;
                let rows = sqlx::query_as_with::<MySql, T, _>(sql, mysql_arguments(values))
                    .fetch_all(&mut *conn)
                    .await;
                rows
            }
            DbPool::Sqlite(pool) => {
                let mut conn = checkout(pool).await?;
                let rows = sqlx::query_as_with::<Sqlite, T, _>(sql, sqlite_arguments(values))
                    .fetch_all(&mut *conn)
                    .await;
                rows
            }
        };

        rows.map_err(|e| statement_error(sql, e))
    }

    /// 执行写语句，返回影响行数与自增 ID
    pub async fn execute(&self, sql: &str, values: &[DbValue]) -> Result<QueryOutcome, DbError> {
        debug!(sql, binds = values.len(), "execute");

        match &self.pool {
            DbPool::MySql(pool) => {
                let mut conn = checkout(pool).await?;
                let result = sqlx::query_with::<MySql, _>(sql, mysql_arguments(values))
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| statement_error(sql, e))?;

                Ok(QueryOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: non_zero(result.last_insert_id() as i64),
                })
            }
            DbPool::Sqlite(pool) => {
                let mut conn = checkout(pool).await?;
                let result = sqlx::query_with::<Sqlite, _>(sql, sqlite_arguments(values))
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| statement_error(sql, e))?;

                Ok(QueryOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: non_zero(result.last_insert_rowid()),
                })
            }
        }
    }

    /// 连通性检查
    pub async fn ping(&self) -> Result<(), DbError> {
        self.execute("SELECT 1", &[]).await.map(|_| ())
    }

    /// 建表（仅在表不存在时）
    pub async fn create_products_table(&self) -> Result<(), DbError> {
        let ddl = match self.pool {
            DbPool::MySql(_) => {
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    product_id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                    product_name VARCHAR(255) NOT NULL
                )
                "#
            }
            DbPool::Sqlite(_) => {
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    product_name TEXT NOT NULL
                )
                "#
            }
        };

        info!("Ensuring products table exists ({})", self.backend());
        self.execute(ddl, &[]).await.map(|_| ())
    }

    pub async fn close(&self) {
        match &self.pool {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
        info!("Database pool closed");
    }
}

async fn checkout<DB: sqlx::Database>(
    pool: &sqlx::Pool<DB>,
) -> Result<PoolConnection<DB>, DbError> {
    pool.acquire().await.map_err(connect_error)
}

fn mysql_arguments(values: &[DbValue]) -> MySqlArguments {
    let mut args = MySqlArguments::default();
    for value in values {
        match value {
            DbValue::Int(v) => args.add(*v),
            DbValue::Text(v) => args.add(v.clone()),
        }
    }
    args
}

fn sqlite_arguments<'q>(values: &[DbValue]) -> SqliteArguments<'q> {
    let mut args = SqliteArguments::default();
    for value in values {
        match value {
            DbValue::Int(v) => args.add(*v),
            DbValue::Text(v) => args.add(v.clone()),
        }
    }
    args
}

fn non_zero(id: i64) -> Option<i64> {
    (id != 0).then_some(id)
}

fn connect_error(err: sqlx::Error) -> DbError {
    error!("Database connection error: {}", err);
    DbError::Connect(err.to_string())
}

fn statement_error(sql: &str, err: sqlx::Error) -> DbError {
    error!(sql, "Database statement error: {}", err);
    DbError::Statement(err.to_string())
}
