use crate::config::{AppConfig, MongoConfig, MysqlConfig};
use crate::core::commands::{export_command, load_command, StageCommand};
use crate::core::pipeline::PipelineRunner;
use crate::core::transform::LineTransformer;
use crate::domain::model::{TableReport, TableSpec};
use crate::domain::ports::TableRunner;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Migrates a table with `mongoexport | transform | mysql`.
#[derive(Debug, Clone)]
pub struct TablePipeline {
    mongo: MongoConfig,
    mysql: MysqlConfig,
}

impl TablePipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            mongo: config.mongo.clone(),
            mysql: config.mysql.clone(),
        }
    }

    /// Producer and consumer commands for `table`.
    pub fn commands(&self, table: &TableSpec) -> (StageCommand, StageCommand) {
        (
            export_command(&self.mongo, table),
            load_command(&self.mysql, table),
        )
    }
}

#[async_trait]
impl TableRunner for TablePipeline {
    async fn run_table(&self, table: &TableSpec) -> Result<TableReport> {
        let started_at = chrono::Utc::now();
        let (producer, consumer) = self.commands(table);
        let runner = PipelineRunner::new(LineTransformer::from_fields(&table.fields));

        let stats = runner.run(&producer, &consumer).await?;

        Ok(TableReport {
            mongo_name: table.mongo_name.clone(),
            mysql_name: table.mysql_name.clone(),
            rows: stats.rows,
            started_at,
            elapsed: stats.elapsed,
        })
    }
}
