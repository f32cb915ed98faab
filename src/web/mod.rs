//! HTTP surface: the form page and a JSON scoring endpoint

pub mod render;
pub mod routes;

pub use routes::{router, AppState};
