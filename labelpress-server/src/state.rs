use labelpress_core::PrintService;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PrintService>,
}

impl AppState {
    pub fn new(service: PrintService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
