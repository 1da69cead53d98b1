pub mod models;
mod router;
pub mod services;
pub mod state;

pub use router::router;
