use crate::domain::model::{TableReport, TableSpec};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Migrates one table end to end.
#[async_trait]
pub trait TableRunner: Send + Sync {
    async fn run_table(&self, table: &TableSpec) -> Result<TableReport>;
}
