use crate::utils::error::{EtlError, Result};
use std::borrow::Cow;

/// Writes rows in the tab separated format consumed by `LOAD DATA`.
#[derive(Debug)]
pub struct RowEncoder {
    builder: csv::WriterBuilder,
}

impl Default for RowEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RowEncoder {
    pub fn new() -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(b'\t')
            .quote(b'"')
            .double_quote(true)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .buffer_capacity(1024);
        Self { builder }
    }

    /// Encodes one row into a single `\n` terminated line.
    pub fn encode<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<u8>> {
        let cleaned: Vec<Cow<'_, str>> = values
            .iter()
            .map(|value| escape_controls(value.as_ref()))
            .collect();

        // csv quotes a lone empty field; the loader expects an empty line.
        if cleaned.len() <= 1 && cleaned.iter().all(|value| value.is_empty()) {
            return Ok(b"\n".to_vec());
        }

        let mut writer = self.builder.from_writer(Vec::new());
        writer.write_record(cleaned.iter().map(|value| value.as_bytes()))?;
        writer
            .into_inner()
            .map_err(|e| EtlError::IoError(e.into_error()))
    }
}

/// Replaces literal tabs and newlines with `\t` and `\n` so the delimiter
/// encoder never has to quote them.
pub fn escape_controls(value: &str) -> Cow<'_, str> {
    if value.contains(['\t', '\n']) {
        Cow::Owned(value.replace('\t', "\\t").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(value)
    }
}
