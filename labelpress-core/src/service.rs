//! Pipeline facade
//!
//! `PrintService` wires the resolver, dispatcher and ledger together and is
//! the entrypoint shared by scripting callers and the HTTP adapter. Every
//! dispatch attempt, successful or not, appends exactly one history record.

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{self, Config};
use crate::dispatch::{DispatchReport, Dispatcher, PrintJob};
use crate::history::{HistoryError, HistoryLedger, HistoryRecord, JobStatus, RecordId};
use crate::inspect::{self, InspectError, PageGeometry};
use crate::resolver::{ResolveError, ResolvedDocument, Resolver};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    #[error("printer name must not be empty")]
    EmptyPrinter,

    #[error("printer not in configured list: {0}")]
    UnknownPrinter(String),

    #[error("history record not found: {0}")]
    RecordNotFound(RecordId),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Resolution plus geometry, what a front end shows before printing.
#[derive(Debug, Clone)]
pub struct SkuInfo {
    pub document: ResolvedDocument,
    pub geometry: PageGeometry,
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Print the configured separator sheet after the label copies
    pub separator: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self { separator: true }
    }
}

/// The outcome of one pipeline run: the dispatch report plus the history
/// record it produced.
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    pub record: HistoryRecord,
    pub report: DispatchReport,
}

pub struct PrintService {
    resolver: Resolver,
    dispatcher: Dispatcher,
    ledger: HistoryLedger,
    printers: Vec<String>,
}

impl PrintService {
    pub fn new(config: &Config) -> Self {
        let dispatcher = Dispatcher::new(config);
        Self::with_dispatcher(config, dispatcher)
    }

    /// Build with a custom dispatcher (e.g. injected tool candidates).
    pub fn with_dispatcher(config: &Config, dispatcher: Dispatcher) -> Self {
        let printers = config::read_printer_list(&config.printer_list_file).unwrap_or_default();
        Self {
            resolver: Resolver::new(config),
            dispatcher,
            ledger: HistoryLedger::new(&config.history_file),
            printers,
        }
    }

    /// Printer names from the configured list file.
    pub fn printers(&self) -> &[String] {
        &self.printers
    }

    /// Resolve a SKU and report its document geometry.
    pub fn resolve(&self, identifier: &str) -> ServiceResult<SkuInfo> {
        let document = self.resolver.resolve(identifier)?;
        let geometry = inspect::inspect(&document.path)?;
        Ok(SkuInfo { document, geometry })
    }

    /// Auxiliary documents available next to the separator sheet.
    pub fn aux_documents(&self) -> Vec<String> {
        self.resolver.list_aux_documents()
    }

    /// Run the full pipeline for one request and record the outcome.
    ///
    /// Request validation failures (zero quantity, unknown printer) reject
    /// the call before a job exists and leave the ledger untouched.
    #[instrument(skip(self, options), fields(sku = %identifier, printer = %printer))]
    pub async fn dispatch(
        &self,
        identifier: &str,
        quantity: u32,
        printer: &str,
        options: DispatchOptions,
    ) -> ServiceResult<DispatchSummary> {
        if quantity == 0 {
            return Err(ServiceError::InvalidQuantity);
        }
        if printer.trim().is_empty() {
            return Err(ServiceError::EmptyPrinter);
        }
        if !self.printers.is_empty() && !self.printers.iter().any(|name| name == printer) {
            return Err(ServiceError::UnknownPrinter(printer.to_string()));
        }

        let job = PrintJob {
            identifier: identifier.to_string(),
            quantity,
            printer: printer.to_string(),
            separator: options.separator,
        };
        self.run(job).await
    }

    /// Re-derive a job from a stored record and re-enter the pipeline.
    ///
    /// The source record is untouched; the reprint produces a strictly
    /// newer record, without a separator.
    pub async fn reprint(&self, id: RecordId) -> ServiceResult<DispatchSummary> {
        let source = self
            .ledger
            .get(id)?
            .ok_or(ServiceError::RecordNotFound(id))?;

        info!(record_id = id, sku = %source.identifier, "reprinting from history");
        let job = PrintJob {
            identifier: source.identifier.clone(),
            quantity: source.quantity,
            printer: source.printer.clone(),
            separator: false,
        };
        self.run(job).await
    }

    async fn run(&self, job: PrintJob) -> ServiceResult<DispatchSummary> {
        let report = self.dispatcher.dispatch(&job).await;

        let status = if report.outcome.is_success() {
            JobStatus::Success
        } else {
            JobStatus::Failure
        };
        let record = self.ledger.append(
            status,
            &job.identifier,
            job.quantity,
            &job.printer,
            report.detail.clone(),
        )?;

        info!(
            record_id = record.id,
            outcome = %report.outcome,
            copies = report.copies_submitted,
            "dispatch recorded"
        );
        Ok(DispatchSummary { record, report })
    }

    /// All history records, newest first.
    pub fn history(&self) -> ServiceResult<Vec<HistoryRecord>> {
        Ok(self.ledger.list()?)
    }

    /// Remove one record; unknown ids are a no-op. Returns whether a record
    /// was removed.
    pub fn delete(&self, id: RecordId) -> ServiceResult<bool> {
        Ok(self.ledger.delete(id)?)
    }

    /// Remove all records.
    pub fn clear(&self) -> ServiceResult<()> {
        Ok(self.ledger.clear()?)
    }
}
