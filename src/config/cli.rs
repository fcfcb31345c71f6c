use clap::{CommandFactory, Parser};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "mongo2mysql")]
#[command(version)]
#[command(about = "Stream MongoDB collections into MySQL tables via mongoexport and LOAD DATA")]
pub struct CliArgs {
    /// Path to the YAML or TOML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Override `mysql.db` from the configuration
    #[arg(long, alias = "mysql.db", value_name = "DB")]
    pub mysql_db: Option<String>,

    /// Only migrate these collections (by mongo_name); repeatable
    #[arg(short, long = "table", value_name = "NAME")]
    pub tables: Vec<String>,

    /// Print the commands for each table without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log CPU and memory usage after each table
    #[arg(long)]
    pub monitor: bool,
}

impl CliArgs {
    /// Writes the `--help` text to `out`.
    pub fn write_usage<W: Write>(out: &mut W) -> std::io::Result<()> {
        Self::command().write_help(out)
    }
}
