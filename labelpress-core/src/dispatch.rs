//! Print dispatch pipeline
//!
//! Fixed order per request: locate the rasterizer, resolve the label
//! document, inspect its geometry, invoke the rasterizer once per copy,
//! then dispatch the separator sheet once after all label copies. Every
//! failure is converted to a report at this boundary; `dispatch` never
//! returns an `Err`.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::ghostscript::{self, ToolNotFound};
use crate::inspect::{self, PageGeometry};
use crate::resolver::Resolver;

/// One submission request. Constructed per call; only its outcome is
/// persisted.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub identifier: String,
    pub quantity: u32,
    pub printer: String,
    pub separator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// All copies and the separator (when requested) submitted
    Success,
    /// All copies submitted; the separator was missing or rejected
    SuccessNoSeparator,
    /// The rasterizer failed after some copies had been submitted
    PartialCopies(u32),
    /// Nothing reached the printer
    Failed,
}

impl DispatchOutcome {
    /// Whether every requested label copy reached the printer.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessNoSeparator)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::SuccessNoSeparator => write!(f, "success (separator skipped)"),
            Self::PartialCopies(count) => write!(f, "partial ({count} copies submitted)"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub outcome: DispatchOutcome,
    pub copies_submitted: u32,
    pub separator_submitted: bool,
    pub detail: Option<String>,
}

impl DispatchReport {
    fn failed(detail: impl Into<String>) -> Self {
        Self {
            outcome: DispatchOutcome::Failed,
            copies_submitted: 0,
            separator_submitted: false,
            detail: Some(detail.into()),
        }
    }
}

pub struct Dispatcher {
    resolver: Resolver,
    separator_name: String,
    tool_override: Option<PathBuf>,
    tool_candidates: Option<Vec<PathBuf>>,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: Resolver::new(config),
            separator_name: config.separator_name.clone(),
            tool_override: config.ghostscript_path.clone(),
            tool_candidates: None,
        }
    }

    /// Replace rasterizer discovery with a fixed candidate list.
    pub fn with_tool_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.tool_candidates = Some(candidates);
        self
    }

    fn locate_tool(&self) -> Result<PathBuf, ToolNotFound> {
        match &self.tool_candidates {
            Some(candidates) => {
                ghostscript::first_existing(candidates.clone()).ok_or(ToolNotFound)
            }
            None => ghostscript::locate(self.tool_override.as_deref()),
        }
    }

    /// Run the full pipeline for one job.
    #[instrument(
        skip(self, job),
        fields(sku = %job.identifier, printer = %job.printer, copies = job.quantity)
    )]
    pub async fn dispatch(&self, job: &PrintJob) -> DispatchReport {
        let tool = match self.locate_tool() {
            Ok(tool) => tool,
            Err(ToolNotFound) => {
                warn!("rasterizer not found, aborting request");
                return DispatchReport::failed("rasterizer not found: ghostscript is not installed");
            }
        };

        let document = match self.resolver.resolve(&job.identifier) {
            Ok(document) => document,
            Err(e) => return DispatchReport::failed(format!("label document unavailable: {e}")),
        };

        let geometry = match inspect::inspect(&document.path) {
            Ok(geometry) => geometry,
            Err(e) => return DispatchReport::failed(format!("label document unreadable: {e}")),
        };

        let mut copies_submitted = 0u32;
        for copy in 1..=job.quantity {
            match self.run_tool(&tool, &job.printer, &geometry, &document.path).await {
                Ok(()) => copies_submitted += 1,
                Err(detail) => {
                    warn!(copy, error = %detail, "rasterizer rejected copy");
                    let outcome = if copies_submitted == 0 {
                        DispatchOutcome::Failed
                    } else {
                        DispatchOutcome::PartialCopies(copies_submitted)
                    };
                    return DispatchReport {
                        outcome,
                        copies_submitted,
                        separator_submitted: false,
                        detail: Some(format!(
                            "printer '{}' rejected copy {copy} of {}: {detail}",
                            job.printer, job.quantity
                        )),
                    };
                }
            }
        }
        info!(copies_submitted, "label copies submitted");

        if !job.separator {
            return DispatchReport {
                outcome: DispatchOutcome::Success,
                copies_submitted,
                separator_submitted: false,
                detail: None,
            };
        }

        // A separator problem never undoes the copies already submitted.
        match self.dispatch_separator(&tool, &job.printer, &geometry).await {
            Ok(()) => DispatchReport {
                outcome: DispatchOutcome::Success,
                copies_submitted,
                separator_submitted: true,
                detail: None,
            },
            Err(detail) => {
                warn!(error = %detail, "separator skipped");
                DispatchReport {
                    outcome: DispatchOutcome::SuccessNoSeparator,
                    copies_submitted,
                    separator_submitted: false,
                    detail: Some(detail),
                }
            }
        }
    }

    /// Separator: exactly one copy, after all label copies, reusing the
    /// label's geometry.
    async fn dispatch_separator(
        &self,
        tool: &Path,
        printer: &str,
        geometry: &PageGeometry,
    ) -> Result<(), String> {
        let separator = self
            .resolver
            .resolve_separator(&self.separator_name)
            .map_err(|e| format!("separator unavailable: {e}"))?;
        info!(file = %separator.path.display(), "dispatching separator sheet");
        self.run_tool(tool, printer, geometry, &separator.path)
            .await
            .map_err(|detail| format!("separator rejected: {detail}"))
    }

    async fn run_tool(
        &self,
        tool: &Path,
        printer: &str,
        geometry: &PageGeometry,
        document: &Path,
    ) -> Result<(), String> {
        let args = ghostscript::raster_args(printer, geometry, document);

        let mut command = Command::new(tool);
        command.args(&args);
        #[cfg(windows)]
        command.creation_flags(0x0800_0000); // CREATE_NO_WINDOW

        let output = command
            .output()
            .await
            .map_err(|e| format!("failed to start rasterizer: {e}"))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ))
        }
    }
}
