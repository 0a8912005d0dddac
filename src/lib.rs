pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod publish;
pub mod response;
pub mod state;
pub mod users;
