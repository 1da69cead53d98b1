//! HTTP models for the asset and health endpoints

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query string of `GET /{prefix}/{*path}`
#[derive(Debug, Default, Deserialize)]
pub struct SizeQuery {
    pub w: Option<u32>,
    pub h: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
