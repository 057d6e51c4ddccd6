// One module per resource; each handler names its route in a doc line.
pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;
