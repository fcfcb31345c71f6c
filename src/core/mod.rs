pub mod commands;
pub mod etl;
pub mod paths;
pub mod pipeline;
pub mod resolver;
pub mod row;
pub mod transform;

pub use crate::domain::model::{FieldPath, FieldPaths, Record, TableReport, TableSpec, Value};
pub use crate::domain::ports::TableRunner;
pub use crate::utils::error::Result;
