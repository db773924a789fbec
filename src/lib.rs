// SPDX-License-Identifier: MIT OR Apache-2.0

//! heline - terminal client for the heline code and document search service
//!
//! Library side of the `heline` CLI: wire types, HTTP client, the search
//! session state machine and its async controller, and rendering.

pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod errors;
pub mod filters;
pub mod location;
pub mod output;
pub mod render;
pub mod session;
pub mod snippet;
