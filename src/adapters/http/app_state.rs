use std::sync::Arc;

use crate::{infra::config::AppConfig, use_cases::billable_admin::BillableAdminUseCases};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub billable_admin_use_cases: Arc<BillableAdminUseCases>,
}
