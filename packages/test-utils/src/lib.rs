//! Shared test utilities for the Chorale workspace
//!
//! Provides mock implementations of external services so tests never reach
//! over the network.
//!
//! # Mock Services
//!
//! - [`MockManifestServer`] - Mock external library manager for import tests

mod library_manager;

pub use library_manager::{ManifestEntryFixture, MockManifestServer};
