pub mod callback;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod quota;
pub mod routes;
pub mod state;
