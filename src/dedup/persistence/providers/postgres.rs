use crate::dedup::decision::SearchParams;
use crate::dedup::defaults;
use crate::dedup::domain::workout::{
    Intensity, MatchCandidate, MuscleGroupFlags, Visibility, WorkoutRecord,
};
use crate::dedup::persistence::CatalogStore;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

/// pgvector-backed catalog.
///
/// Vectors are stored in an unconstrained `vector` column; an HNSW index over
/// `embedding::vector(N)` is created for the configured dimension and every
/// search uses that same expression so the planner can pick the index.
#[derive(Debug)]
pub struct PostgresCatalog {
    pool: PgPool,
    dimensions: usize,
}

impl PostgresCatalog {
    pub async fn new(connection_string: &str, max_connections: u32, dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            bail!("Embedding dimension must be positive");
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await?;

        // Run Migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        let catalog = Self { pool, dimensions };
        catalog.ensure_vector_index().await?;
        Ok(catalog)
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_vector_index(&self) -> Result<()> {
        let dims = self.dimensions;
        let statement = format!(
            "CREATE INDEX IF NOT EXISTS workouts_embedding_hnsw_{dims} \
             ON workouts USING hnsw ((embedding::vector({dims})) vector_cosine_ops)"
        );
        sqlx::query(&statement)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create HNSW index for {dims} dimensions"))?;
        tracing::info!(dimensions = dims, "Workout vector index ready");
        Ok(())
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            bail!(
                "Embedding dimension mismatch: catalog expects {}, got {}",
                self.dimensions,
                vector.len()
            );
        }
        Ok(())
    }
}

fn muscles_to_json(flags: Option<&MuscleGroupFlags>) -> Result<Option<serde_json::Value>> {
    flags.map(serde_json::to_value).transpose().map_err(Into::into)
}

fn muscles_from_row(row: &PgRow, column: &str) -> Result<Option<MuscleGroupFlags>> {
    let value: Option<serde_json::Value> = row.try_get(column)?;
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(Into::into)
}

fn intensity_from_row(row: &PgRow) -> Result<Option<Intensity>> {
    let value: Option<String> = row.try_get("intensity")?;
    value
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Intensity>().map_err(|e| anyhow!(e)))
        .transpose()
}

fn record_from_row(row: &PgRow) -> Result<WorkoutRecord> {
    let visibility: String = row.try_get("visibility")?;

    Ok(WorkoutRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        intensity: intensity_from_row(row)?,
        primary_muscle_group: muscles_from_row(row, "primary_muscle_group")?,
        secondary_muscle_group: muscles_from_row(row, "secondary_muscle_group")?,
        visibility: visibility.parse::<Visibility>().map_err(|e| anyhow!(e))?,
        cover_image: row.try_get("cover_image")?,
        video_url: row.try_get("video_url")?,
        images: row.try_get("images")?,
        popularity: row.try_get("popularity")?,
        embedding: vec![], // never loaded for listing or search results
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn insert_workout(&self, record: &WorkoutRecord) -> Result<()> {
        self.check_dimensions(&record.embedding)?;
        let embedding_vector = Vector::from(record.embedding.clone());

        sqlx::query(
            r#"
            INSERT INTO workouts (
                id, name, description, category, intensity,
                primary_muscle_group, secondary_muscle_group,
                visibility, cover_image, video_url, images, popularity,
                embedding, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.category)
        .bind(record.intensity.map(Intensity::as_str))
        .bind(muscles_to_json(record.primary_muscle_group.as_ref())?)
        .bind(muscles_to_json(record.secondary_muscle_group.as_ref())?)
        .bind(record.visibility.as_str())
        .bind(&record.cover_image)
        .bind(&record.video_url)
        .bind(&record.images)
        .bind(record.popularity)
        .bind(embedding_vector)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn search_similar(
        &self,
        query_vec: &[f32],
        params: SearchParams,
    ) -> Result<Vec<MatchCandidate>> {
        self.check_dimensions(query_vec)?;
        let embedding_vector = Vector::from(query_vec.to_vec());
        let limit_i64 = i64::try_from(params.limit)?;
        let ef_search = params
            .candidate_pool
            .max(params.limit)
            .min(defaults::MAX_CANDIDATE_POOL_SIZE);
        let dims = self.dimensions;

        let mut tx = self.pool.begin().await?;

        // Breadth of the HNSW graph walk, scoped to this transaction.
        sqlx::query("SELECT set_config('hnsw.ef_search', $1, true)")
            .bind(ef_search.to_string())
            .execute(&mut *tx)
            .await?;

        // Score = 1 - cosine_distance / 2, i.e. (1 + cos) / 2 in [0, 1].
        let statement = format!(
            r#"
            SELECT id, name, description, category, intensity,
                   primary_muscle_group, secondary_muscle_group,
                   1 - ((embedding::vector({dims}) <=> $1) / 2) AS score
            FROM workouts
            ORDER BY embedding::vector({dims}) <=> $1
            LIMIT $2
            "#
        );
        let rows = sqlx::query(&statement)
            .bind(embedding_vector) // $1
            .bind(limit_i64) // $2
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut matches = Vec::with_capacity(rows.len());
        for row in rows {
            let score: f64 = row.try_get("score")?;
            matches.push(MatchCandidate {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                category: row.try_get("category")?,
                intensity: intensity_from_row(&row)?,
                primary_muscle_group: muscles_from_row(&row, "primary_muscle_group")?,
                secondary_muscle_group: muscles_from_row(&row, "secondary_muscle_group")?,
                similarity: score as f32,
            });
        }
        Ok(matches)
    }

    async fn list_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, category, intensity,
                   primary_muscle_group, secondary_muscle_group,
                   visibility, cover_image, video_url, images, popularity,
                   created_at, updated_at
            FROM workouts
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}
