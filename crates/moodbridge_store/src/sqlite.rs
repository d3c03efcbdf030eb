use anyhow::{Context, Result};
use async_trait::async_trait;
use moodbridge_core::{
    ContentFilter, ContentStore, ContentType, EmotionLabel, EmotionRole, RecommendationRecord,
};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, type, title, description, source_emotion, target_emotion, \
     content, image_url, link, external_id, external_source FROM recommendations";

#[derive(Clone)]
pub struct SqliteContentStore {
    pool: Pool<Sqlite>,
}

impl SqliteContentStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_max_connections(db_path, 5).await
    }

    pub async fn with_max_connections<P: AsRef<Path>>(
        db_path: P,
        max_connections: u32,
    ) -> Result<Self> {
        let path = db_path.as_ref().display().to_string();
        // An in-memory database lives and dies with its connection.
        let max_connections = if path == ":memory:" {
            1
        } else {
            max_connections.max(1)
        };

        let db_url = format!("sqlite://{}?mode=rwc", path);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!("Content store ready at {}", path);
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recommendations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                source_emotion TEXT NOT NULL,
                target_emotion TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT '',
                external_id TEXT,
                external_source TEXT,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recommendations table")?;

        // Tier 1 (exact pair) lookups
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recommendations_pair \
             ON recommendations(type, source_emotion, target_emotion)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recommendations pair index")?;

        // Tier 2 (target only) lookups
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recommendations_target \
             ON recommendations(type, target_emotion)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recommendations target index")?;

        Ok(())
    }

    /// Insert one record, returning its row id.
    pub async fn insert(&self, record: &RecommendationRecord) -> Result<i64> {
        let result = insert_query(record, chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert recommendation '{}'", record.title))?;
        Ok(result.last_insert_rowid())
    }

    /// Insert records in a single transaction.
    pub async fn insert_many(&self, records: &[RecommendationRecord]) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;
        for record in records {
            insert_query(record, now)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert recommendation '{}'", record.title))?;
        }
        tx.commit().await?;
        tracing::debug!("Inserted {} recommendations", records.len());
        Ok(records.len())
    }

    /// Row count, optionally for a single type.
    pub async fn count(&self, content_type: Option<&ContentType>) -> Result<i64> {
        let count: i64 = match content_type {
            Some(t) => sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recommendations WHERE type = ?")
                .bind(t.as_str())
                .fetch_one(&self.pool)
                .await,
            None => sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recommendations")
                .fetch_one(&self.pool)
                .await,
        }
        .context("Failed to count recommendations")?;
        Ok(count)
    }

    /// Load a JSON array of records and insert them.
    ///
    /// Labels and types are normalized while decoding, so a seed file may use
    /// any casing. A blank emotion fails the whole import.
    pub async fn import_seed_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read seed file: {}", path.as_ref().display()))?;
        let records: Vec<RecommendationRecord> =
            serde_json::from_str(&raw).context("Failed to parse seed file")?;
        let inserted = self.insert_many(&records).await?;
        tracing::info!(
            "Imported {} recommendations from {}",
            inserted,
            path.as_ref().display()
        );
        Ok(inserted)
    }
}

fn insert_query(
    record: &RecommendationRecord,
    created_at: i64,
) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT INTO recommendations
            (type, title, description, source_emotion, target_emotion, content,
             image_url, link, external_id, external_source, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.content_type.as_str())
    .bind(&record.title)
    .bind(&record.description)
    .bind(record.source_emotion.as_str())
    .bind(record.target_emotion.as_str())
    .bind(&record.content)
    .bind(&record.image_url)
    .bind(&record.link)
    .bind(&record.external_id)
    .bind(&record.external_source)
    .bind(created_at)
}

fn row_to_record(row: &SqliteRow) -> Result<RecommendationRecord> {
    let source: String = row.get("source_emotion");
    let target: String = row.get("target_emotion");
    let content_type: String = row.get("type");

    Ok(RecommendationRecord {
        title: row.get("title"),
        description: row.get("description"),
        content_type: ContentType::new(&content_type),
        source_emotion: EmotionLabel::parse(&source, EmotionRole::Source)?,
        target_emotion: EmotionLabel::parse(&target, EmotionRole::Target)?,
        content: row.get("content"),
        image_url: row.get("image_url"),
        link: row.get("link"),
        external_id: row.get("external_id"),
        external_source: row.get("external_source"),
    })
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ContentFilter) {
    qb.push(" WHERE type = ");
    qb.push_bind(filter.content_type.as_str().to_string());
    if let Some(source) = &filter.source {
        qb.push(" AND source_emotion = ");
        qb.push_bind(source.as_str().to_string());
    }
    if let Some(target) = &filter.target {
        qb.push(" AND target_emotion = ");
        qb.push_bind(target.as_str().to_string());
    }
}

fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn count_matching(&self, filter: &ContentFilter) -> Result<usize> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM recommendations");
        push_filter(&mut qb, filter);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count matching recommendations")?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn query(
        &self,
        filter: &ContentFilter,
        offset: usize,
        max_rows: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        push_filter(&mut qb, filter);
        // Stable order; the resolver picks offsets and shuffles.
        qb.push(" ORDER BY id LIMIT ");
        qb.push_bind(to_sql_int(max_rows));
        qb.push(" OFFSET ");
        qb.push_bind(to_sql_int(offset));

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query recommendations")?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            match row_to_record(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let id: i64 = row.get("id");
                    tracing::warn!("Skipping malformed recommendation row {}: {}", id, e);
                }
            }
        }
        Ok(records)
    }
}
