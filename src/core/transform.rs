use crate::core::paths::expand;
use crate::core::resolver::resolve;
use crate::core::row::RowEncoder;
use crate::domain::model::{FieldPaths, Record};
use crate::utils::error::{EtlError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const SNIPPET_CHARS: usize = 80;
const PROGRESS_EVERY: u64 = 100_000;

/// Turns one JSON document line into one delimited row line.
#[derive(Debug)]
pub struct LineTransformer {
    paths: FieldPaths,
    encoder: RowEncoder,
}

impl LineTransformer {
    pub fn new(paths: FieldPaths) -> Self {
        Self {
            paths,
            encoder: RowEncoder::new(),
        }
    }

    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self::new(expand(fields))
    }

    pub fn paths(&self) -> &FieldPaths {
        &self.paths
    }

    pub fn transform(&self, line: &[u8]) -> Result<Vec<u8>> {
        let record = Record::from_json_slice(line).map_err(|source| EtlError::DecodeError {
            snippet: snippet(line),
            source,
        })?;

        let row: Vec<String> = self.paths.iter().map(|path| resolve(&record, path)).collect();
        self.encoder.encode(&row)
    }
}

fn snippet(line: &[u8]) -> String {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end();
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Applies `transformer` to every line of `reader` and writes the rows to
/// `writer` in the same order. Rows are written as soon as they are
/// produced, so a slow writer throttles the reader. The writer is shut down
/// at end of input. Returns the number of rows written.
pub async fn transform_stream<R, W>(
    transformer: &LineTransformer,
    mut reader: R,
    mut writer: W,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut rows: u64 = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }

        let row = transformer.transform(&line).inspect_err(|e| {
            tracing::error!(line = rows + 1, "❌ Transform stopped: {}", e);
        })?;
        writer.write_all(&row).await?;
        rows += 1;

        if rows % PROGRESS_EVERY == 0 {
            tracing::debug!(rows, "Transformed rows so far");
        }
    }

    writer.shutdown().await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fields: &[&str], line: &str) -> String {
        let transformer = LineTransformer::from_fields(fields);
        String::from_utf8(transformer.transform(line.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_transform_mixed_types() {
        assert_eq!(
            run(&["name", "age", "tags"], r#"{"name":"Ann","age":30,"tags":["x","y"]}"#),
            "Ann\t30\tx|y\n"
        );
    }

    #[test]
    fn test_transform_fractional_float() {
        assert_eq!(run(&["score"], r#"{"score":2.5}"#), "2.500000\n");
    }

    #[test]
    fn test_transform_missing_nested_key() {
        assert_eq!(
            run(&["addr.city", "addr.zip"], r#"{"addr":{"city":"X"}}"#),
            "X\t\n"
        );
    }

    #[test]
    fn test_transform_accepts_trailing_newline() {
        assert_eq!(run(&["a"], "{\"a\":\"b\"}\r\n"), "b\n");
    }

    #[test]
    fn test_transform_escapes_string_contents() {
        assert_eq!(
            run(&["note", "id"], r#"{"note":"line1\nline2\tend","id":1}"#),
            "line1\\nline2\\tend\t1\n"
        );
    }

    #[test]
    fn test_transform_rejects_malformed_line() {
        let transformer = LineTransformer::from_fields(&["a"]);
        let err = transformer.transform(b"{\"a\": oops}").unwrap_err();
        match err {
            EtlError::DecodeError { snippet, .. } => assert_eq!(snippet, "{\"a\": oops}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(transformer.transform(b"\n").is_err());
        assert!(transformer.transform(b"[1]").is_err());
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "x".repeat(200);
        let s = snippet(long.as_bytes());
        assert_eq!(s.chars().count(), SNIPPET_CHARS + 1);
        assert!(s.ends_with('…'));
    }

    #[tokio::test]
    async fn test_stream_preserves_order() {
        let transformer = LineTransformer::from_fields(&["n"]);
        let input: String = (1..=50).map(|i| format!("{{\"n\":{}}}\n", i)).collect();
        let mut output = Vec::new();

        let rows = transform_stream(&transformer, input.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(rows, 50);
        let expected: String = (1..=50).map(|i| format!("{}\n", i)).collect();
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_stream_handles_missing_final_newline() {
        let transformer = LineTransformer::from_fields(&["n"]);
        let mut output = Vec::new();

        let rows = transform_stream(&transformer, &b"{\"n\":1}\n{\"n\":2}"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(rows, 2);
        assert_eq!(output, b"1\n2\n");
    }

    #[tokio::test]
    async fn test_stream_stops_at_malformed_line() {
        let transformer = LineTransformer::from_fields(&["n"]);
        let input = "{\"n\":1}\n{\"n\":2}\nnot json\n{\"n\":4}\n";
        let mut output = Vec::new();

        let result = transform_stream(&transformer, input.as_bytes(), &mut output).await;

        assert!(matches!(result, Err(EtlError::DecodeError { .. })));
        assert_eq!(output, b"1\n2\n");
    }

    #[tokio::test]
    async fn test_stream_empty_input() {
        let transformer = LineTransformer::from_fields(&["n"]);
        let mut output = Vec::new();
        let rows = transform_stream(&transformer, &b""[..], &mut output).await.unwrap();
        assert_eq!(rows, 0);
        assert!(output.is_empty());
    }
}
