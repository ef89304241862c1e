//! # Soloserve Core
//!
//! Core types and traits for the Soloserve single-shot route runner.
//!
//! This crate provides the foundational abstractions shared by the route
//! layer and the CLI:
//! - Common error types
//! - Canonical operation identifiers and alias normalization
//! - The in-process request/response pair handed to route handlers
//! - Cooperative cancellation
//! - The engine collaborator trait

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod engine;
pub mod error;
pub mod exec;
pub mod operation;

pub use cancel::CancelToken;
pub use engine::{
    DeltaStream, Engine, EngineParams, Generation, Message, ModelInfo, Prompt, RankedDocument,
};
pub use error::{Error, Result};
pub use exec::{ChunkStream, ExecutionRequest, ExecutionResponse, ResponsePayload};
pub use operation::Operation;
