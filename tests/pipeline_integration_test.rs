#![cfg(unix)]

use anyhow::Result;
use async_trait::async_trait;
use mongo2mysql::core::commands::StageCommand;
use mongo2mysql::core::{TableReport, TableRunner, TableSpec};
use mongo2mysql::{AppConfig, EtlEngine, EtlError, LineTransformer, PipelineRunner, TablePipeline};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stands in for mongoexport/mysql: each collection is a `<name>.jsonl`
/// fixture and each loaded table becomes `<mysql_name>.tsv`.
struct FixtureRunner {
    dir: PathBuf,
}

impl FixtureRunner {
    fn producer(&self, table: &TableSpec) -> StageCommand {
        let source = self.dir.join(format!("{}.jsonl", table.mongo_name));
        StageCommand::new("mongoexport", "sh").args([
            "-c".to_string(),
            format!("exec cat '{}'", source.display()),
        ])
    }

    fn consumer(&self, table: &TableSpec) -> StageCommand {
        let target = self.dir.join(format!("{}.tsv", table.mysql_name));
        StageCommand::new("mysql", "sh").args([
            "-c".to_string(),
            format!("exec cat > '{}'", target.display()),
        ])
    }
}

#[async_trait]
impl TableRunner for FixtureRunner {
    async fn run_table(&self, table: &TableSpec) -> mongo2mysql::Result<TableReport> {
        let started_at = chrono::Utc::now();
        let runner = PipelineRunner::new(LineTransformer::from_fields(&table.fields));
        let stats = runner.run(&self.producer(table), &self.consumer(table)).await?;
        Ok(TableReport {
            mongo_name: table.mongo_name.clone(),
            mysql_name: table.mysql_name.clone(),
            rows: stats.rows,
            started_at,
            elapsed: stats.elapsed,
        })
    }
}

fn write_fixture(dir: &Path, name: &str, lines: &[&str]) -> Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(dir.join(format!("{}.jsonl", name)), content)?;
    Ok(())
}

fn config(dir: &Path) -> Result<AppConfig> {
    let yaml = r#"
mongo:
  host: localhost
  db: shop
mysql:
  login_path: etl
  db: warehouse
tables:
  - mongo_name: users
    mysql_name: users
    fields: [name, age, tags]
  - mongo_name: orders
    mysql_name: orders
    fields: [_id, total, shipping.city]
  - mongo_name: reviews
    mysql_name: reviews
    fields: [stars]
"#;
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml)?;
    Ok(AppConfig::from_file(&path)?)
}

#[tokio::test]
async fn test_tables_load_sequentially() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    write_fixture(dir, "users", &[
        r#"{"name":"Ann","age":30,"tags":["x","y"]}"#,
        r#"{"name":"Bob","age":null,"tags":[]}"#,
    ])?;
    write_fixture(dir, "orders", &[
        r#"{"_id":7,"total":19.99,"shipping":{"city":"Oslo"}}"#,
        r#"{"_id":8,"total":20.0}"#,
    ])?;
    write_fixture(dir, "reviews", &[r#"{"stars":5}"#])?;

    let config = config(dir)?;
    let engine = EtlEngine::new(FixtureRunner { dir: dir.to_path_buf() });

    let reports = engine.run(&config.tables).await?;

    assert_eq!(reports.iter().map(|r| r.rows).collect::<Vec<_>>(), vec![2, 2, 1]);
    assert_eq!(std::fs::read_to_string(dir.join("users.tsv"))?, "Ann\t30\tx|y\nBob\t\t\n");
    assert_eq!(
        std::fs::read_to_string(dir.join("orders.tsv"))?,
        "7\t19.990000\tOslo\n8\t20\t\n"
    );
    assert_eq!(std::fs::read_to_string(dir.join("reviews.tsv"))?, "5\n");
    Ok(())
}

#[tokio::test]
async fn test_malformed_export_aborts_remaining_tables() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    write_fixture(dir, "users", &[r#"{"name":"Ann","age":30,"tags":[]}"#])?;
    write_fixture(dir, "orders", &[r#"{"_id":7}"#, r#"{"_id":8"#, r#"{"_id":9}"#])?;
    write_fixture(dir, "reviews", &[r#"{"stars":5}"#])?;

    let config = config(dir)?;
    let engine = EtlEngine::new(FixtureRunner { dir: dir.to_path_buf() });

    let err = engine.run(&config.tables).await.unwrap_err();

    assert!(matches!(err, EtlError::DecodeError { .. }));
    assert!(dir.join("users.tsv").exists());
    assert!(!dir.join("reviews.tsv").exists());
    let orders = std::fs::read_to_string(dir.join("orders.tsv")).unwrap_or_default();
    assert!(!orders.contains('9'));
    Ok(())
}

#[tokio::test]
async fn test_missing_export_fixture_fails_the_table() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let config = config(dir)?;
    let engine = EtlEngine::new(FixtureRunner { dir: dir.to_path_buf() });

    let err = engine.run(&config.tables[..1]).await.unwrap_err();

    match err {
        EtlError::StageFailure { stage, .. } => assert_eq!(stage, "mongoexport"),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_table_pipeline_builds_tool_commands() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config(temp_dir.path())?;
    let pipeline = TablePipeline::new(&config);

    let (export, load) = pipeline.commands(&config.tables[1]);

    assert_eq!(
        export.to_string(),
        "mongoexport --host localhost --port 27017 --db shop --collection orders --type=json"
    );
    assert_eq!(load.program, "mysql");
    assert_eq!(
        load.args.last().map(String::as_str),
        Some(";LOAD DATA LOCAL INFILE '/dev/stdin' IGNORE INTO TABLE orders;")
    );
    Ok(())
}
