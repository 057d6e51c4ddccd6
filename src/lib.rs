pub mod access;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod filter;
pub mod geo;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

pub use routes::app;
pub use state::AppState;
