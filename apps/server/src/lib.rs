//! Chorale server core
//!
//! Two surfaces live here: the background library-sync scheduler with its two
//! interchangeable strategies (folder scanner and manifest importer), and the
//! per-user key-value preference store. The HTTP layer consumes both but is a
//! separate concern.

pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod sync;
