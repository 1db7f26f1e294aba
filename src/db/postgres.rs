use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    Clause, Collection, Document, DocumentStore, Filter, FindOptions, CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
};
use crate::{
    error::{AppError, AppResult},
    models::{id::STORE_ID_FIELD, DocumentId},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Document store backed by PostgreSQL
///
/// Each collection is a table of `(seq, id, doc JSONB, created_at, updated_at)`.
/// Filters are translated to JSONB operators so matching happens in the database.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Appends ` WHERE ...` for the filter; every clause is bound, never inlined
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    builder.push(" WHERE TRUE");

    for clause in filter.clauses() {
        builder.push(" AND ");
        match clause {
            Clause::Id(id) => {
                builder.push("id = ").push_bind(id.0);
            }
            Clause::IdIn(ids) => {
                let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
                builder.push("id = ANY(").push_bind(ids).push(")");
            }
            Clause::Eq(field, value) => {
                // Containment equals equality for scalar values
                let mut probe = Document::new();
                probe.insert(field.clone(), value.clone());
                builder.push("doc @> ").push_bind(Json(probe));
            }
            Clause::ContainsIgnoreCase(field, needle) => {
                builder
                    .push("strpos(lower(doc ->> ")
                    .push_bind(field.clone())
                    .push("), lower(")
                    .push_bind(needle.clone())
                    .push(")) > 0");
            }
            Clause::HasElement(field, value) => {
                builder
                    .push("(doc -> ")
                    .push_bind(field.clone())
                    .push(") @> ")
                    .push_bind(Json(value.clone()));
            }
            Clause::AnyElementOf(field, values) => {
                builder
                    .push("(doc -> ")
                    .push_bind(field.clone())
                    .push(") ?| ")
                    .push_bind(values.clone());
            }
        }
    }
}

/// Restores the store id into a fetched document body
fn into_document(id: Uuid, Json(mut doc): Json<Document>) -> Document {
    doc.insert(STORE_ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}

fn created_at_of(doc: &Document) -> Option<DateTime<Utc>> {
    doc.get(CREATED_AT_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// LIMIT/OFFSET operand; values past `i64::MAX` saturate
fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_insert_error(collection: Collection, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("duplicate key in collection {}", collection))
        }
        _ => AppError::Database(e),
    }
}

#[async_trait::async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> AppResult<Vec<Document>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT id, doc FROM {}",
            collection.as_str()
        ));
        push_filter(&mut builder, filter);

        if options.newest_first {
            builder.push(" ORDER BY created_at DESC, seq DESC");
        } else {
            builder.push(" ORDER BY seq");
        }
        if let Some(limit) = options.limit {
            builder.push(" LIMIT ").push_bind(sql_bound(limit));
        }
        builder.push(" OFFSET ").push_bind(sql_bound(options.skip));

        let rows: Vec<(Uuid, Json<Document>)> =
            builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(id, doc)| into_document(id, doc))
            .collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> AppResult<Option<Document>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT id, doc FROM {}",
            collection.as_str()
        ));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY seq LIMIT 1");

        let row: Option<(Uuid, Json<Document>)> =
            builder.build_query_as().fetch_optional(&self.pool).await?;

        Ok(row.map(|(id, doc)| into_document(id, doc)))
    }

    async fn insert(&self, collection: Collection, mut document: Document) -> AppResult<DocumentId> {
        let id = DocumentId::new();
        let now = Utc::now();
        let stamp = Value::String(now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true));

        document.remove(STORE_ID_FIELD);
        document
            .entry(CREATED_AT_FIELD.to_string())
            .or_insert_with(|| stamp.clone());
        document.insert(UPDATED_AT_FIELD.to_string(), stamp);
        let created_at = created_at_of(&document).unwrap_or(now);

        let sql = format!(
            "INSERT INTO {} (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            collection.as_str()
        );
        sqlx::query(&sql)
            .bind(id.0)
            .bind(Json(&document))
            .bind(created_at)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(collection, e))?;

        tracing::debug!(collection = %collection, id = %id, "Inserted document");

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut set: Document,
    ) -> AppResult<u64> {
        let now = Utc::now();
        set.remove(STORE_ID_FIELD);
        set.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
        );

        let table = collection.as_str();
        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET doc = doc || ", table));
        builder
            .push_bind(Json(set))
            .push(", updated_at = ")
            .push_bind(now)
            .push(format!(" WHERE seq = (SELECT seq FROM {}", table));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY seq LIMIT 1)");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> AppResult<u64> {
        let table = collection.as_str();
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "DELETE FROM {} WHERE seq = (SELECT seq FROM {}",
            table, table
        ));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY seq LIMIT 1)");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> AppResult<u64> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", collection.as_str()));
        push_filter(&mut builder, filter);

        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn list_collections(&self) -> AppResult<Vec<String>> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name NOT LIKE '\_%'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
