//! Asset delivery core
//!
//! ## Flow
//! 1. Resolve the MIME type from the path extension (unknown → not found, no storage read)
//! 2. Open the asset stream from storage (miss → not found)
//! 3. Non-raster or width-less requests pass the stream through untouched
//! 4. Raster requests with a width are probed from a header prefix; within
//!    bounds → passthrough, the prefix emitted ahead of the rest of the stream
//! 5. Otherwise the asset is buffered (up to the decode limit), resized and
//!    sent as a buffer
//!
//! Every step produces a [`Payload`], rendered by [`emit`]. Storage streams and
//! decoded images carry resource leases released on drop, on every path.

mod cache;
mod error;
mod payload;
mod request;
mod service;
mod stream;

pub use cache::{CacheDirective, VARY_BY_QUERY};
pub use error::{DeliveryError, ErrorResponse};
pub use payload::{Payload, emit};
pub use request::AssetRequest;
pub use service::AssetService;
pub use stream::AssetStream;
