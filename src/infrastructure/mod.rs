// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod event_stream;
pub mod file_types;
pub mod fs_repository;
pub mod http_response;
