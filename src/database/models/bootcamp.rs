use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{slugify, FieldErrors};
use crate::error::ApiError;

pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// The columns the server reasons about (ownership, naming, photo).
/// Responses are rendered from the resource field table instead.
#[derive(Debug, Clone, FromRow)]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub user_id: Uuid,
    pub photo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcamp {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewBootcamp {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<String>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

impl CreateBootcamp {
    pub fn validate(self) -> Result<NewBootcamp, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", self.name, "Please add a name", Some(50));
        let description =
            errors.required_text("description", self.description, "Please add a description", Some(500));
        let website = errors.url("website", self.website);
        let phone = errors.optional_text("phone", self.phone, Some(20));
        let email = errors.email("email", self.email);
        let address = errors.required_text("address", self.address, "Please add an address", None);
        let careers = match self.careers {
            Some(careers) => validate_careers(&mut errors, careers),
            None => {
                errors.add("careers", "Please add at least one career");
                None
            }
        };
        errors.finish()?;

        match (name, description, address, careers) {
            (Some(name), Some(description), Some(address), Some(careers)) => Ok(NewBootcamp {
                slug: slugify(&name),
                name,
                description,
                website,
                phone,
                email,
                address,
                careers,
                housing: self.housing.unwrap_or(false),
                job_assistance: self.job_assistance.unwrap_or(false),
                job_guarantee: self.job_guarantee.unwrap_or(false),
                accept_gi: self.accept_gi.unwrap_or(false),
            }),
            _ => Err(ApiError::validation_error("Invalid bootcamp", None)),
        }
    }
}

/// Body of `PUT /bootcamps/:id`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcamp {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct BootcampChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl UpdateBootcamp {
    pub fn validate(self) -> Result<BootcampChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.optional_text("name", self.name, Some(50));
        let description = errors.optional_text("description", self.description, Some(500));
        let website = errors.url("website", self.website);
        let phone = errors.optional_text("phone", self.phone, Some(20));
        let email = errors.email("email", self.email);
        let address = errors.optional_text("address", self.address, None);
        let careers = self.careers.and_then(|c| validate_careers(&mut errors, c));
        errors.finish()?;

        Ok(BootcampChanges {
            slug: name.as_deref().map(slugify),
            name,
            description,
            website,
            phone,
            email,
            address,
            careers,
            housing: self.housing,
            job_assistance: self.job_assistance,
            job_guarantee: self.job_guarantee,
            accept_gi: self.accept_gi,
        })
    }
}

fn validate_careers(errors: &mut FieldErrors, careers: Vec<String>) -> Option<Vec<String>> {
    if careers.is_empty() {
        errors.add("careers", "Please add at least one career");
        return None;
    }
    if let Some(bad) = careers.iter().find(|c| !CAREERS.contains(&c.as_str())) {
        errors.add("careers", format!("`{}` is not a valid career", bad));
        return None;
    }
    let mut unique: Vec<String> = Vec::with_capacity(careers.len());
    for career in careers {
        if !unique.contains(&career) {
            unique.push(career);
        }
    }
    Some(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateBootcamp {
        CreateBootcamp {
            name: Some("Devworks Bootcamp".into()),
            description: Some("Full stack web development".into()),
            website: Some("https://devworks.com".into()),
            phone: Some("(111) 111-1111".into()),
            email: Some("enroll@devworks.com".into()),
            address: Some("233 Bay State Rd Boston MA 02215".into()),
            careers: Some(vec!["Web Development".into(), "UI/UX".into()]),
            housing: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn create_derives_slug_and_defaults_flags() {
        let new = valid().validate().unwrap();
        assert_eq!(new.slug, "devworks-bootcamp");
        assert!(new.housing);
        assert!(!new.accept_gi);
    }

    #[test]
    fn create_rejects_unknown_career_and_missing_address() {
        let mut body = valid();
        body.careers = Some(vec!["Basket Weaving".into()]);
        body.address = None;
        match body.validate().unwrap_err() {
            ApiError::ValidationError { field_errors: Some(fields), .. } => {
                assert!(fields.contains_key("careers"));
                assert!(fields.contains_key("address"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn update_reslugs_only_when_renamed() {
        let changes = UpdateBootcamp { name: Some("New Name".into()), ..Default::default() }
            .validate()
            .unwrap();
        assert_eq!(changes.slug.as_deref(), Some("new-name"));

        let changes = UpdateBootcamp { housing: Some(false), ..Default::default() }.validate().unwrap();
        assert!(changes.slug.is_none());
    }

    #[test]
    fn name_longer_than_fifty_is_rejected() {
        let mut body = valid();
        body.name = Some("x".repeat(51));
        assert!(body.validate().is_err());
    }
}
