// Run domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
}

impl Run {
    pub fn new(name: String, modified: Option<DateTime<Utc>>) -> Self {
        Self { name, modified }
    }
}
