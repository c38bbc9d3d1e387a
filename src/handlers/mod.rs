pub mod common;
pub mod health;
pub mod reports;

use std::sync::Arc;

use crate::db::DbPool;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates report logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub executive_reports: Arc<crate::services::executive_reports::ExecutiveReportService>,
    pub godown_reports: Arc<crate::services::godown_reports::GodownReportService>,
    pub customer_reports: Arc<crate::services::customer_reports::CustomerReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            executive_reports: Arc::new(
                crate::services::executive_reports::ExecutiveReportService::new(db.clone()),
            ),
            godown_reports: Arc::new(crate::services::godown_reports::GodownReportService::new(
                db.clone(),
            )),
            customer_reports: Arc::new(
                crate::services::customer_reports::CustomerReportService::new(db),
            ),
        }
    }
}
