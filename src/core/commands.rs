use crate::config::{MongoConfig, MysqlConfig};
use crate::domain::model::TableSpec;
use std::fmt;

/// Local path the load statement reads from; the client's stdin.
pub const LOAD_INPUT_PATH: &str = "/dev/stdin";

/// An external program with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    /// Stage name used in logs and errors.
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl StageCommand {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub(crate) fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// `mongoexport` emitting one JSON document per line for the table's
/// collection.
pub fn export_command(mongo: &MongoConfig, table: &TableSpec) -> StageCommand {
    StageCommand::new("mongoexport", "mongoexport").args([
        "--host".to_string(),
        mongo.host.clone(),
        "--port".to_string(),
        mongo.port.to_string(),
        "--db".to_string(),
        mongo.db.clone(),
        "--collection".to_string(),
        table.mongo_name.clone(),
        "--type=json".to_string(),
    ])
}

/// Create statement, bulk load from stdin, then the after statement.
/// `IGNORE` makes the server skip rows that violate unique keys instead of
/// aborting the load.
pub fn load_statement(table: &TableSpec) -> String {
    format!(
        "{};LOAD DATA LOCAL INFILE '{}' IGNORE INTO TABLE {};{}",
        table.create_cmd, LOAD_INPUT_PATH, table.mysql_name, table.after_cmd
    )
}

/// `mysql` client running [`load_statement`] with the rows on stdin.
pub fn load_command(mysql: &MysqlConfig, table: &TableSpec) -> StageCommand {
    StageCommand::new("mysql", "mysql")
        .arg(format!("--login-path={}", mysql.login_path))
        .arg("--compress=TRUE")
        .args(["--database".to_string(), mysql.db.clone()])
        .arg("--verbose")
        .args(["--execute".to_string(), load_statement(table)])
}
