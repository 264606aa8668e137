//! Shared utilities for the zonegov workspace.

pub mod logging;

pub use logging::init_tracing;
