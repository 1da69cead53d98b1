pub mod api;
pub mod config;
pub mod content_type;
pub mod delivery;
pub mod humanize;
pub mod imaging;
pub mod observability;
pub mod storage;
