//! Web surface: a single page with one question box and a "Run Query" button

pub mod handler;
pub mod server;

pub use handler::AppState;
pub use server::{router, HttpServer};
