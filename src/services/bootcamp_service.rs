use serde_json::Value;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::access::Actor;
use crate::database::models::bootcamp::{BootcampChanges, NewBootcamp};
use crate::database::models::{Bootcamp, Role};
use crate::database::resource::BOOTCAMPS;
use crate::error::ApiError;
use crate::filter::{Filter, Page};
use crate::geo::GeoPoint;

const BOOTCAMP_COLUMNS: &str = "id, name, slug, user_id, photo, created_at";

pub struct BootcampService {
    pool: PgPool,
}

impl BootcampService {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Bootcamp>, ApiError> {
        let row = sqlx::query_as::<_, Bootcamp>(&format!(
            "SELECT {} FROM bootcamps WHERE id = $1",
            BOOTCAMP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Like [`find`](Self::find) but a missing row is a 404.
    pub async fn get(&self, id: Uuid) -> Result<Bootcamp, ApiError> {
        self.find(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Bootcamp not found with id of {}", id)))
    }

    pub async fn get_json(&self, id: Uuid) -> Result<Value, ApiError> {
        super::fetch_json(&self.pool, &BOOTCAMPS, id, &["courses"])
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Bootcamp not found with id of {}", id)))
    }

    pub async fn list(&self, filter: Filter) -> Result<Page<Value>, ApiError> {
        super::fetch_page(&self.pool, filter.populate("courses")?).await
    }

    /// Whether the user already owns a bootcamp that counts against the one-per-publisher rule.
    pub async fn has_published(&self, user_id: Uuid) -> Result<bool, ApiError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM bootcamps WHERE user_id = $1 AND NOT admin_owned)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create(&self, owner: &Actor, new: NewBootcamp, location: GeoPoint) -> Result<Value, ApiError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO bootcamps (id, name, slug, description, website, phone, email, \
             longitude, latitude, formatted_address, street, city, state, zipcode, country, \
             careers, housing, job_assistance, job_guarantee, accept_gi, user_id, admin_owned) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
             $16, $17, $18, $19, $20, $21, $22)",
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(&new.website)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(location.longitude)
        .bind(location.latitude)
        .bind(&location.formatted_address)
        .bind(&location.street)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.zipcode)
        .bind(&location.country)
        .bind(&new.careers)
        .bind(new.housing)
        .bind(new.job_assistance)
        .bind(new.job_guarantee)
        .bind(new.accept_gi)
        .bind(owner.id)
        .bind(owner.role == Role::Admin)
        .execute(&self.pool)
        .await?;

        tracing::info!(bootcamp = %id, owner = %owner.id, "Bootcamp created");
        self.get_json(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: BootcampChanges,
        location: Option<GeoPoint>,
    ) -> Result<Value, ApiError> {
        let mut qb = sqlx::QueryBuilder::<Postgres>::new("UPDATE bootcamps SET ");
        let mut set = qb.separated(", ");
        let mut touched = false;

        macro_rules! assign {
            ($column:literal, $value:expr) => {
                if let Some(value) = $value {
                    set.push(concat!($column, " = ")).push_bind_unseparated(value);
                    touched = true;
                }
            };
        }

        assign!("name", changes.name);
        assign!("slug", changes.slug);
        assign!("description", changes.description);
        assign!("website", changes.website);
        assign!("phone", changes.phone);
        assign!("email", changes.email);
        assign!("careers", changes.careers);
        assign!("housing", changes.housing);
        assign!("job_assistance", changes.job_assistance);
        assign!("job_guarantee", changes.job_guarantee);
        assign!("accept_gi", changes.accept_gi);

        if let Some(point) = location {
            set.push("longitude = ").push_bind_unseparated(point.longitude);
            set.push("latitude = ").push_bind_unseparated(point.latitude);
            set.push("formatted_address = ").push_bind_unseparated(point.formatted_address);
            set.push("street = ").push_bind_unseparated(point.street);
            set.push("city = ").push_bind_unseparated(point.city);
            set.push("state = ").push_bind_unseparated(point.state);
            set.push("zipcode = ").push_bind_unseparated(point.zipcode);
            set.push("country = ").push_bind_unseparated(point.country);
            touched = true;
        }

        if touched {
            qb.push(" WHERE id = ").push_bind(id);
            qb.build().execute(&self.pool).await?;
        }
        self.get_json(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        // Courses and reviews go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(bootcamp = %id, "Bootcamp deleted");
        Ok(())
    }

    pub async fn set_photo(&self, id: Uuid, file_name: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE bootcamps SET photo = $2 WHERE id = $1")
            .bind(id)
            .bind(file_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
