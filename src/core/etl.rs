use crate::domain::model::{TableReport, TableSpec};
use crate::domain::ports::TableRunner;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Migrates tables one after another. The first failing table stops the
/// job; later tables are not attempted.
pub struct EtlEngine<R: TableRunner> {
    runner: R,
    monitor: SystemMonitor,
}

impl<R: TableRunner> EtlEngine<R> {
    pub fn new(runner: R) -> Self {
        Self::new_with_monitoring(runner, false)
    }

    pub fn new_with_monitoring(runner: R, monitor_enabled: bool) -> Self {
        Self {
            runner,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self, tables: &[TableSpec]) -> Result<Vec<TableReport>> {
        tracing::info!("Starting migration of {} table(s)", tables.len());
        let mut reports = Vec::with_capacity(tables.len());

        for (index, table) in tables.iter().enumerate() {
            tracing::info!(
                "🚚 [{}/{}] {} → {}",
                index + 1,
                tables.len(),
                table.mongo_name,
                table.mysql_name
            );

            let report = self.runner.run_table(table).await.inspect_err(|e| {
                tracing::error!(
                    table = %table.mongo_name,
                    skipped = tables.len() - index - 1,
                    "❌ Table failed: {}",
                    e
                );
            })?;

            tracing::info!(
                table = %report.mongo_name,
                rows = report.rows,
                started_at = %report.started_at.to_rfc3339(),
                finished_at = %report.finished_at().to_rfc3339(),
                "✅ Loaded into {} in {:.2?}",
                report.mysql_name,
                report.elapsed
            );
            self.monitor.log_stats(&table.mongo_name);
            reports.push(report);
        }

        self.monitor.log_final_stats();
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockRunner {
        calls: Arc<Mutex<Vec<String>>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl TableRunner for MockRunner {
        async fn run_table(&self, table: &TableSpec) -> Result<TableReport> {
            self.calls.lock().await.push(table.mongo_name.clone());
            if self.fail_on.as_deref() == Some(table.mongo_name.as_str()) {
                return Err(EtlError::ProcessingError {
                    message: format!("{} broke", table.mongo_name),
                });
            }
            Ok(TableReport {
                mongo_name: table.mongo_name.clone(),
                mysql_name: table.mysql_name.clone(),
                rows: 10,
                started_at: chrono::Utc::now(),
                elapsed: std::time::Duration::from_millis(5),
            })
        }
    }

    fn tables(names: &[&str]) -> Vec<TableSpec> {
        names
            .iter()
            .map(|name| TableSpec {
                mongo_name: name.to_string(),
                mysql_name: format!("{}_t", name),
                fields: vec!["_id".to_string()],
                create_cmd: String::new(),
                after_cmd: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_runs_tables_in_order() {
        let runner = MockRunner::default();
        let engine = EtlEngine::new(runner.clone());

        let reports = engine.run(&tables(&["a", "b", "c"])).await.unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].mysql_name, "c_t");
        assert!(reports[0].finished_at() > reports[0].started_at);
        assert_eq!(*runner.calls.lock().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_first_failure_stops_remaining_tables() {
        let runner = MockRunner {
            fail_on: Some("b".to_string()),
            ..Default::default()
        };
        let engine = EtlEngine::new(runner.clone());

        let err = engine.run(&tables(&["a", "b", "c"])).await.unwrap_err();

        assert!(err.to_string().contains("b broke"));
        assert_eq!(*runner.calls.lock().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_no_tables() {
        let engine = EtlEngine::new(MockRunner::default());
        assert!(engine.run(&[]).await.unwrap().is_empty());
    }
}
