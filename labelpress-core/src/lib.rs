//! # labelpress-core
//!
//! SKU label printing pipeline - resolution, inspection, dispatch and history.
//!
//! ## Scope
//!
//! This crate handles HOW a label reaches the printer:
//! - SKU → pre-rendered PDF path resolution
//! - First-page geometry extraction (size, orientation)
//! - Ghostscript discovery and silent per-copy dispatch
//! - Separator sheet handling after a label run
//! - Durable CSV history ledger (append, list, reprint, delete, clear)
//!
//! Interactive concerns (entry widgets, history tables) stay in front-end
//! code; the HTTP adapter lives in `labelpress-server`.
//!
//! ## Example
//!
//! ```ignore
//! use labelpress_core::{Config, DispatchOptions, PrintService};
//!
//! let config = Config::load("printer_config.json".as_ref())?;
//! let service = PrintService::new(&config);
//!
//! let summary = service
//!     .dispatch("ABC123", 3, "LabelPrinter1", DispatchOptions::default())
//!     .await?;
//! println!("{}", summary.report.outcome);
//! ```

pub mod config;
pub mod dispatch;
pub mod ghostscript;
pub mod history;
pub mod inspect;
pub mod resolver;
pub mod service;

// Re-exports
pub use config::{Config, ConfigError, read_printer_list};
pub use dispatch::{DispatchOutcome, DispatchReport, Dispatcher, PrintJob};
pub use ghostscript::ToolNotFound;
pub use history::{HistoryError, HistoryLedger, HistoryRecord, JobStatus, RecordId};
pub use inspect::{InspectError, PageGeometry, inspect};
pub use resolver::{ResolveError, ResolvedDocument, Resolver};
pub use service::{
    DispatchOptions, DispatchSummary, PrintService, ServiceError, ServiceResult, SkuInfo,
};
