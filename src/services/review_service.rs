use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::review::{NewReview, ReviewChanges};
use crate::database::models::Review;
use crate::database::resource::REVIEWS;
use crate::error::ApiError;
use crate::filter::{Filter, Page};

pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Review>, ApiError> {
        let row = sqlx::query_as::<_, Review>("SELECT id, bootcamp_id, user_id, rating FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get(&self, id: Uuid) -> Result<Review, ApiError> {
        self.find(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No review found with the id of {}", id)))
    }

    pub async fn get_json(&self, id: Uuid) -> Result<Value, ApiError> {
        super::fetch_json(&self.pool, &REVIEWS, id, &["bootcamp"])
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No review found with the id of {}", id)))
    }

    pub async fn list(&self, filter: Filter) -> Result<Page<Value>, ApiError> {
        super::fetch_page(&self.pool, filter).await
    }

    pub async fn create(&self, bootcamp_id: Uuid, user_id: Uuid, new: NewReview) -> Result<Value, ApiError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO reviews (id, title, text, rating, bootcamp_id, user_id) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.text)
        .bind(new.rating)
        .bind(bootcamp_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        refresh_average_rating(&mut tx, bootcamp_id).await?;
        tx.commit().await?;

        tracing::info!(review = %id, bootcamp = %bootcamp_id, "Review created");
        self.get_json(id).await
    }

    pub async fn update(&self, review: &Review, changes: ReviewChanges) -> Result<Value, ApiError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE reviews SET title = COALESCE($2, title), text = COALESCE($3, text), \
             rating = COALESCE($4, rating) WHERE id = $1",
        )
        .bind(review.id)
        .bind(changes.title)
        .bind(changes.text)
        .bind(changes.rating)
        .execute(&mut *tx)
        .await?;
        refresh_average_rating(&mut tx, review.bootcamp_id).await?;
        tx.commit().await?;
        self.get_json(review.id).await
    }

    pub async fn delete(&self, review: &Review) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id)
            .execute(&mut *tx)
            .await?;
        refresh_average_rating(&mut tx, review.bootcamp_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn refresh_average_rating(tx: &mut Transaction<'_, Postgres>, bootcamp_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE bootcamps SET average_rating = \
         (SELECT AVG(rating)::float8 FROM reviews WHERE bootcamp_id = $1) \
         WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
