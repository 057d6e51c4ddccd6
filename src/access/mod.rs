//! Owner-or-admin checks for mutations on existing resources, plus role gates.
//!
//! Nothing here touches the database: handlers load the target first and pass
//! it in, so a missing target is reported as 404 before any access decision.

use std::fmt;

use uuid::Uuid;

use crate::database::models::{Bootcamp, Course, Review, Role, User};
use crate::error::ApiError;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role(),
        }
    }
}

/// A resource with a single owning user.
pub trait Owned {
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

impl Owned for Bootcamp {
    const KIND: &'static str = "bootcamp";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Course {
    const KIND: &'static str = "course";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Review {
    const KIND: &'static str = "review";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
    AddCourse,
    UploadPhoto,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Update => "update",
            Action::Delete => "delete",
            Action::AddCourse => "add a course to",
            Action::UploadPhoto => "upload a photo for",
        })
    }
}

/// Allows the action iff the actor owns the resource or is an admin.
pub fn authorize<R: Owned>(resource: &R, actor: &Actor, action: Action) -> Result<(), ApiError> {
    if actor.role == Role::Admin || resource.owner_id() == actor.id {
        return Ok(());
    }
    tracing::debug!(actor = %actor.id, resource = %resource.id(), %action, "Ownership check failed");
    Err(ApiError::unauthorized(format!(
        "User {} is not authorized to {} {} {}",
        actor.id,
        action,
        R::KIND,
        resource.id()
    )))
}

/// Allows the request iff the actor's role is one of `allowed`.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(ApiError::unauthorized(format!(
            "User role {} is not authorized to access this route",
            actor.role
        )))
    }
}
