//! Runtime orchestration and lifecycle management.
//!
//! This module contains the infrastructure around the catalog core:
//!
//! - **System orchestration**: wiring the catalog to its journal and store
//! - **Configuration**: layered defaults, file and environment
//! - **Observability setup**: initializing tracing and logging
//!
//! # Main Components
//!
//! - [`LibrarySystem`] - The orchestrator that owns the catalog and its collaborators
//! - [`LibraryConfig`] - Configuration loaded with the `config` crate
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod system;
pub mod tracing;

pub use self::config::*;
pub use self::system::*;
pub use self::tracing::*;
