//! Diagram preview core.
//!
//! Renders Mermaid, PlantUML and Structurizr sources for live preview panels:
//!
//! ```text
//! file ──> backend::resolve ──> adapter (cache + compiler / surface engine)
//!                                   │
//!              panel controller <───┘──> display surface (detect, insert)
//! ```
//!
//! [`context::PreviewContext`] wires everything together.

#[macro_use]
pub mod logger;

pub mod adapter;
pub mod backend;
pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod context;
pub mod core;
pub mod panel;
pub mod surface;
pub mod utils;
