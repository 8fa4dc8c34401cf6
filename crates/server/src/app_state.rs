use std::sync::Arc;

use visit_ledger_core::app::ledger::VisitLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<VisitLedger>,
}
