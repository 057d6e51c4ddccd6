use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::FieldErrors;
use crate::error::ApiError;

pub const SKILL_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];

#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: String,
    pub scholarship_available: bool,
}

impl CreateCourse {
    pub fn validate(self) -> Result<NewCourse, ApiError> {
        let mut errors = FieldErrors::new();
        let title = errors.required_text("title", self.title, "Please add a course title", None);
        let description =
            errors.required_text("description", self.description, "Please add a description", None);
        let weeks = errors.required_text("weeks", self.weeks, "Please add number of weeks", None);
        let tuition = match self.tuition {
            Some(t) => validate_tuition(&mut errors, t),
            None => {
                errors.add("tuition", "Please add a tuition cost");
                None
            }
        };
        let minimum_skill = match self.minimum_skill {
            Some(s) => validate_skill(&mut errors, s),
            None => {
                errors.add("minimumSkill", "Please add a minimum skill");
                None
            }
        };
        errors.finish()?;

        match (title, description, weeks, tuition, minimum_skill) {
            (Some(title), Some(description), Some(weeks), Some(tuition), Some(minimum_skill)) => Ok(NewCourse {
                title,
                description,
                weeks,
                tuition,
                minimum_skill,
                scholarship_available: self.scholarship_available.unwrap_or(false),
            }),
            _ => Err(ApiError::validation_error("Invalid course", None)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

impl UpdateCourse {
    pub fn validate(self) -> Result<CourseChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let changes = CourseChanges {
            title: errors.optional_text("title", self.title, None),
            description: errors.optional_text("description", self.description, None),
            weeks: errors.optional_text("weeks", self.weeks, None),
            tuition: self.tuition.and_then(|t| validate_tuition(&mut errors, t)),
            minimum_skill: self.minimum_skill.and_then(|s| validate_skill(&mut errors, s)),
            scholarship_available: self.scholarship_available,
        };
        errors.finish()?;
        Ok(changes)
    }
}

fn validate_tuition(errors: &mut FieldErrors, tuition: f64) -> Option<f64> {
    if tuition.is_finite() && tuition >= 0.0 {
        Some(tuition)
    } else {
        errors.add("tuition", "Tuition must be a non-negative number");
        None
    }
}

fn validate_skill(errors: &mut FieldErrors, skill: String) -> Option<String> {
    let skill = skill.trim().to_lowercase();
    if SKILL_LEVELS.contains(&skill.as_str()) {
        Some(skill)
    } else {
        errors.add("minimumSkill", format!("Minimum skill must be one of {}", SKILL_LEVELS.join(", ")));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_core_fields() {
        match CreateCourse::default().validate().unwrap_err() {
            ApiError::ValidationError { field_errors: Some(fields), .. } => {
                for field in ["title", "description", "weeks", "tuition", "minimumSkill"] {
                    assert!(fields.contains_key(field), "missing {}", field);
                }
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn skill_is_normalized() {
        let course = CreateCourse {
            title: Some("Front End Web Development".into()),
            description: Some("HTML, CSS and JavaScript".into()),
            weeks: Some("8".into()),
            tuition: Some(8000.0),
            minimum_skill: Some("Beginner".into()),
            scholarship_available: None,
        }
        .validate()
        .unwrap();
        assert_eq!(course.minimum_skill, "beginner");
        assert!(!course.scholarship_available);
    }

    #[test]
    fn negative_tuition_rejected_on_update() {
        let err = UpdateCourse { tuition: Some(-1.0), ..Default::default() }.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
