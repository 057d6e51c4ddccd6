use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::FieldErrors;
use crate::error::ApiError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateReview {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub title: String,
    pub text: String,
    pub rating: i32,
}

impl CreateReview {
    pub fn validate(self) -> Result<NewReview, ApiError> {
        let mut errors = FieldErrors::new();
        let title = errors.required_text("title", self.title, "Please add a title for the review", Some(100));
        let text = errors.required_text("text", self.text, "Please add some text", None);
        let rating = match self.rating {
            Some(r) => validate_rating(&mut errors, r),
            None => {
                errors.add("rating", "Please add a rating between 1 and 10");
                None
            }
        };
        errors.finish()?;

        match (title, text, rating) {
            (Some(title), Some(text), Some(rating)) => Ok(NewReview { title, text, rating }),
            _ => Err(ApiError::validation_error("Invalid review", None)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReview {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Default, Clone)]
pub struct ReviewChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

impl UpdateReview {
    pub fn validate(self) -> Result<ReviewChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let changes = ReviewChanges {
            title: errors.optional_text("title", self.title, Some(100)),
            text: errors.optional_text("text", self.text, None),
            rating: self.rating.and_then(|r| validate_rating(&mut errors, r)),
        };
        errors.finish()?;
        Ok(changes)
    }
}

fn validate_rating(errors: &mut FieldErrors, rating: i32) -> Option<i32> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Some(rating)
    } else {
        errors.add("rating", format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (10, true), (11, false)] {
            let result = CreateReview {
                title: Some("Great".into()),
                text: Some("Learned a lot".into()),
                rating: Some(rating),
            }
            .validate();
            assert_eq!(result.is_ok(), ok, "rating {}", rating);
        }
    }

    #[test]
    fn update_with_nothing_is_a_no_op() {
        let changes = UpdateReview::default().validate().unwrap();
        assert!(changes.title.is_none() && changes.text.is_none() && changes.rating.is_none());
    }
}
