//! Network services for the control channel.
//!
//! - `shared`: `SharedRobotState<B>`, one controller behind a lock (requires `std`)
//! - `web`: Axum server with the UI, static assets and the `/ws` channel (requires `web`)
//!
//! Every session shares a single controller:
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_rover::services::{build_router, SharedRobotState, WebServerConfig};
//!
//! let state = Arc::new(SharedRobotState::new(controller));
//! let router = build_router(Arc::clone(&state), &WebServerConfig::default());
//! ```

pub mod shared;

#[cfg(feature = "web")]
pub mod web;

pub use shared::*;

#[cfg(feature = "web")]
pub use web::*;
