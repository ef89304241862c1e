//! # Soloserve Routes
//!
//! The route layer: wire types, the [`RouteTable`] handler collection, and
//! in-process dispatch from a canonical operation to its handler.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatch;
pub mod routes;
pub mod wire;

pub use dispatch::dispatch;
pub use routes::{RouteTable, ServerRoutes};
