use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::course::{CourseChanges, NewCourse};
use crate::database::models::Course;
use crate::database::resource::COURSES;
use crate::error::ApiError;
use crate::filter::{Filter, Page};

pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Course>, ApiError> {
        let row = sqlx::query_as::<_, Course>("SELECT id, title, bootcamp_id, user_id FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get(&self, id: Uuid) -> Result<Course, ApiError> {
        self.find(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No course with the id of {}", id)))
    }

    pub async fn get_json(&self, id: Uuid) -> Result<Value, ApiError> {
        super::fetch_json(&self.pool, &COURSES, id, &["bootcamp"])
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No course with the id of {}", id)))
    }

    pub async fn list(&self, filter: Filter) -> Result<Page<Value>, ApiError> {
        super::fetch_page(&self.pool, filter).await
    }

    pub async fn create(&self, bootcamp_id: Uuid, user_id: Uuid, new: NewCourse) -> Result<Value, ApiError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO courses (id, title, description, weeks, tuition, minimum_skill, \
             scholarship_available, bootcamp_id, user_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.weeks)
        .bind(new.tuition)
        .bind(&new.minimum_skill)
        .bind(new.scholarship_available)
        .bind(bootcamp_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        refresh_average_cost(&mut tx, bootcamp_id).await?;
        tx.commit().await?;

        tracing::info!(course = %id, bootcamp = %bootcamp_id, "Course created");
        self.get_json(id).await
    }

    pub async fn update(&self, course: &Course, changes: CourseChanges) -> Result<Value, ApiError> {
        let mut qb = sqlx::QueryBuilder::<Postgres>::new("UPDATE courses SET ");
        let mut set = qb.separated(", ");
        let mut touched = false;
        if let Some(title) = changes.title {
            set.push("title = ").push_bind_unseparated(title);
            touched = true;
        }
        if let Some(description) = changes.description {
            set.push("description = ").push_bind_unseparated(description);
            touched = true;
        }
        if let Some(weeks) = changes.weeks {
            set.push("weeks = ").push_bind_unseparated(weeks);
            touched = true;
        }
        if let Some(tuition) = changes.tuition {
            set.push("tuition = ").push_bind_unseparated(tuition);
            touched = true;
        }
        if let Some(skill) = changes.minimum_skill {
            set.push("minimum_skill = ").push_bind_unseparated(skill);
            touched = true;
        }
        if let Some(scholarship) = changes.scholarship_available {
            set.push("scholarship_available = ").push_bind_unseparated(scholarship);
            touched = true;
        }

        if touched {
            qb.push(" WHERE id = ").push_bind(course.id);
            let mut tx = self.pool.begin().await?;
            qb.build().execute(&mut *tx).await?;
            refresh_average_cost(&mut tx, course.bootcamp_id).await?;
            tx.commit().await?;
        }
        self.get_json(course.id).await
    }

    pub async fn delete(&self, course: &Course) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course.id)
            .execute(&mut *tx)
            .await?;
        refresh_average_cost(&mut tx, course.bootcamp_id).await?;
        tx.commit().await?;
        tracing::info!(course = %course.id, "Course deleted");
        Ok(())
    }
}

/// Bootcamp average tuition, rounded up to the next multiple of ten; null with no courses.
async fn refresh_average_cost(tx: &mut Transaction<'_, Postgres>, bootcamp_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE bootcamps SET average_cost = \
         (SELECT CEIL(AVG(tuition) / 10) * 10 FROM courses WHERE bootcamp_id = $1) \
         WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
