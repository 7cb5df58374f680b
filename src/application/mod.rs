// Application layer - Use cases built on the repository trait
pub mod chart_service;
pub mod log_repository;
pub mod refresh_service;
pub mod run_service;
