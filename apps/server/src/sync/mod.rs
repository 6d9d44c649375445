//! Background library synchronization
//!
//! A [`SyncStrategy`] knows how to reconcile the tracks table against some
//! source of truth; the [`scheduler`] runs whichever strategy was selected at
//! bootstrap on a fixed cadence. The scheduler never inspects the strategy
//! beyond its trait surface, so new sources slot in without touching the loop.

pub mod folder_scanner;
pub mod importer;
pub mod scheduler;

pub use folder_scanner::FolderScanner;
pub use importer::ManifestImporter;
pub use scheduler::SyncScheduler;

use async_trait::async_trait;

use crate::error::ServerResult;

/// A source of library state the server can synchronize against
#[async_trait]
pub trait SyncStrategy: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Run one synchronization pass
    ///
    /// `full` forces a complete re-import even where the source looks
    /// unchanged; scheduled runs pass `false`.
    async fn synchronize(&self, full: bool) -> ServerResult<()>;
}
