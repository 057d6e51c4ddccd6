//! Queryable resource definitions: the JSON shape of each resource, the
//! columns behind its filterable fields, and the relations it can populate.

use crate::filter::types::{FieldDef, FieldKind, Relation, ResourceDef};

const fn field(name: &'static str, column: &'static str, select: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef {
        name,
        column: Some(column),
        select,
        kind,
    }
}

pub static BOOTCAMPS: ResourceDef = ResourceDef {
    name: "bootcamp",
    table: "bootcamps",
    fields: &[
        field("id", "id", "t.\"id\"", FieldKind::Uuid),
        field("name", "name", "t.\"name\"", FieldKind::Text),
        field("slug", "slug", "t.\"slug\"", FieldKind::Text),
        field("description", "description", "t.\"description\"", FieldKind::Text),
        field("website", "website", "t.\"website\"", FieldKind::Text),
        field("phone", "phone", "t.\"phone\"", FieldKind::Text),
        field("email", "email", "t.\"email\"", FieldKind::Text),
        FieldDef {
            name: "location",
            column: None,
            select: "json_build_object('type', 'Point', \
                     'coordinates', json_build_array(t.\"longitude\", t.\"latitude\"), \
                     'formattedAddress', t.\"formatted_address\", 'street', t.\"street\", \
                     'city', t.\"city\", 'state', t.\"state\", 'zipcode', t.\"zipcode\", \
                     'country', t.\"country\")",
            kind: FieldKind::Text,
        },
        field("careers", "careers", "t.\"careers\"", FieldKind::TextArray),
        field("averageRating", "average_rating", "t.\"average_rating\"", FieldKind::Number),
        field("averageCost", "average_cost", "t.\"average_cost\"", FieldKind::Number),
        field("photo", "photo", "t.\"photo\"", FieldKind::Text),
        field("housing", "housing", "t.\"housing\"", FieldKind::Boolean),
        field("jobAssistance", "job_assistance", "t.\"job_assistance\"", FieldKind::Boolean),
        field("jobGuarantee", "job_guarantee", "t.\"job_guarantee\"", FieldKind::Boolean),
        field("acceptGi", "accept_gi", "t.\"accept_gi\"", FieldKind::Boolean),
        field("user", "user_id", "t.\"user_id\"", FieldKind::Uuid),
        field("createdAt", "created_at", "t.\"created_at\"", FieldKind::Timestamp),
    ],
    relations: &[Relation {
        name: "courses",
        replaces: None,
        select: "(SELECT COALESCE(json_agg(json_build_object(\
                 'id', c.\"id\", 'title', c.\"title\", 'description', c.\"description\", \
                 'weeks', c.\"weeks\", 'tuition', c.\"tuition\", 'minimumSkill', c.\"minimum_skill\", \
                 'scholarshipAvailable', c.\"scholarship_available\", 'bootcamp', c.\"bootcamp_id\", \
                 'user', c.\"user_id\", 'createdAt', c.\"created_at\") ORDER BY c.\"created_at\"), '[]'::json) \
                 FROM \"courses\" c WHERE c.\"bootcamp_id\" = t.\"id\")",
    }],
};

const BOOTCAMP_SUMMARY: &str = "(SELECT json_build_object('id', b.\"id\", 'name', b.\"name\", \
                                'description', b.\"description\") \
                                FROM \"bootcamps\" b WHERE b.\"id\" = t.\"bootcamp_id\")";

pub static COURSES: ResourceDef = ResourceDef {
    name: "course",
    table: "courses",
    fields: &[
        field("id", "id", "t.\"id\"", FieldKind::Uuid),
        field("title", "title", "t.\"title\"", FieldKind::Text),
        field("description", "description", "t.\"description\"", FieldKind::Text),
        field("weeks", "weeks", "t.\"weeks\"", FieldKind::Text),
        field("tuition", "tuition", "t.\"tuition\"", FieldKind::Number),
        field("minimumSkill", "minimum_skill", "t.\"minimum_skill\"", FieldKind::Text),
        field(
            "scholarshipAvailable",
            "scholarship_available",
            "t.\"scholarship_available\"",
            FieldKind::Boolean,
        ),
        field("bootcamp", "bootcamp_id", "t.\"bootcamp_id\"", FieldKind::Uuid),
        field("user", "user_id", "t.\"user_id\"", FieldKind::Uuid),
        field("createdAt", "created_at", "t.\"created_at\"", FieldKind::Timestamp),
    ],
    relations: &[Relation {
        name: "bootcamp",
        replaces: Some("bootcamp"),
        select: BOOTCAMP_SUMMARY,
    }],
};

pub static REVIEWS: ResourceDef = ResourceDef {
    name: "review",
    table: "reviews",
    fields: &[
        field("id", "id", "t.\"id\"", FieldKind::Uuid),
        field("title", "title", "t.\"title\"", FieldKind::Text),
        field("text", "text", "t.\"text\"", FieldKind::Text),
        field("rating", "rating", "t.\"rating\"", FieldKind::Number),
        field("bootcamp", "bootcamp_id", "t.\"bootcamp_id\"", FieldKind::Uuid),
        field("user", "user_id", "t.\"user_id\"", FieldKind::Uuid),
        field("createdAt", "created_at", "t.\"created_at\"", FieldKind::Timestamp),
    ],
    relations: &[Relation {
        name: "bootcamp",
        replaces: Some("bootcamp"),
        select: BOOTCAMP_SUMMARY,
    }],
};

/// Users as exposed to admins; credentials and reset tokens are never selectable.
pub static USERS: ResourceDef = ResourceDef {
    name: "user",
    table: "users",
    fields: &[
        field("id", "id", "t.\"id\"", FieldKind::Uuid),
        field("name", "name", "t.\"name\"", FieldKind::Text),
        field("email", "email", "t.\"email\"", FieldKind::Text),
        field("role", "role", "t.\"role\"", FieldKind::Text),
        field("createdAt", "created_at", "t.\"created_at\"", FieldKind::Timestamp),
    ],
    relations: &[],
};
