pub mod error;
pub mod handlers;
pub mod server;

pub use server::{ApiState, build_api_router, start_api};
