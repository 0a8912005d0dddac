pub mod handlers;
pub mod publisher;

pub use handlers::publish_routes as router;
