//! # Soloserve
//!
//! Single-shot command-line front end for an inference server: one
//! invocation builds the JSON body a route's HTTP layer would have received,
//! calls the route handler in-process, prints the response (streaming or
//! not) to stdout, and exits with a POSIX-style code. No listener is ever
//! opened.
//!
//! The pipeline lives in this crate; the route handlers and the engine sit
//! behind the `soloserve-routes` and `soloserve-core` collaborator traits.

#![warn(clippy::all)]

pub mod app;
pub mod args;
pub mod body;
pub mod config;
pub mod echo;
pub mod emit;
pub mod lifecycle;
pub mod logging;
