// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::refresh_service::RefreshService;
use crate::application::run_service::RunService;

#[derive(Clone)]
pub struct AppState {
    pub run_service: RunService,
    pub chart_service: ChartService,
    pub refresh_service: RefreshService,
}
