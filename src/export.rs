// src/export.rs

//! Record export: text lines and a tabular form.
//!
//! The tabular form quote-wraps every field and doubles embedded quotes.
//! A tolerant row parser is included so exports can be verified and so the
//! failure fallback path can surface raw data without loss.

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Record;

/// Header of the tabular form.
pub const TABLE_HEADER: [&str; 3] = ["Post ID", "URL", "Comments"];

/// Synthesize the post URL from the configured prefix and raw identifier.
pub fn post_url(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}")
}

/// One line per record: `Post ID: {id} — {url} — {metric} {unit}`.
pub fn to_text(records: &[Record], url_prefix: &str, unit: &str) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&format!(
            "Post ID: {} — {} — {} {}\n",
            record.id,
            post_url(url_prefix, &record.id),
            record.metric_value,
            unit,
        ));
    }
    out
}

/// Tabular form: header row, then `id, url, metric` per record.
pub fn to_table(records: &[Record], url_prefix: &str) -> String {
    let mut out = String::new();
    write_row(&mut out, &TABLE_HEADER.map(String::from));
    for record in records {
        write_row(
            &mut out,
            &[
                record.id.clone(),
                post_url(url_prefix, &record.id),
                record.metric_value.to_string(),
            ],
        );
    }
    out
}

/// Every field is quote-wrapped; embedded quotes are escaped by doubling.
fn write_row(out: &mut String, row: &[String]) {
    let mut first = true;
    for field in row {
        if !first {
            out.push(',');
        } else {
            first = false;
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

/// Minimal tabular parser (quotes + CRLF tolerant).
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Write serialized records to a file.
///
/// On failure the error is returned for operator reporting; callers should
/// surface the raw data with [`raw_lines`] so nothing collected is lost.
pub fn save(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::export(path.display().to_string(), e))?;
    }
    fs::write(path, content).map_err(|e| AppError::export(path.display().to_string(), e))?;
    log::info!("Exported {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Plain fallback lines for when serialization or hand-off fails.
pub fn raw_lines(records: &[Record], url_prefix: &str) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}",
                r.id,
                post_url(url_prefix, &r.id),
                r.metric_value
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://www.linkedin.com/feed/update/";

    fn records() -> Vec<Record> {
        vec![
            Record::new("urn:li:activity:2", 1500, "item[1]", 1),
            Record::new("urn:li:activity:1", 250, "item[0]", 0),
        ]
    }

    #[test]
    fn test_text_line_format() {
        let text = to_text(&records(), PREFIX, "comments");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Post ID: urn:li:activity:2 — https://www.linkedin.com/feed/update/urn:li:activity:2 — 1500 comments"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_table_header_and_quoting() {
        let table = to_table(&records(), PREFIX);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "\"Post ID\",\"URL\",\"Comments\"");
        assert!(lines[1].starts_with("\"urn:li:activity:2\","));
    }

    #[test]
    fn test_table_roundtrip_with_quotes_and_commas() {
        // Fields containing quote and comma characters must survive
        // encode-then-parse unchanged.
        let tricky = vec![
            Record::new("urn:li:activity:7,\"quoted\"", 42, "item[0]", 0),
            Record::new("urn:li:activity:8", 0, "item[1]", 1),
        ];
        let table = to_table(&tricky, PREFIX);
        let rows = parse_rows(&table);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Post ID", "URL", "Comments"]);
        assert_eq!(rows[1][0], "urn:li:activity:7,\"quoted\"");
        assert_eq!(rows[1][1], post_url(PREFIX, "urn:li:activity:7,\"quoted\""));
        assert_eq!(rows[1][2], "42");
        assert_eq!(rows[2][0], "urn:li:activity:8");
    }

    #[test]
    fn test_parse_tolerates_crlf() {
        let rows = parse_rows("\"a\",\"b\"\r\n\"c\",\"d\"\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_save_and_raw_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/records.csv");
        save(&path, &to_table(&records(), PREFIX)).unwrap();
        assert!(path.exists());

        let lines = raw_lines(&records(), PREFIX);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("urn:li:activity:2"));
    }
}
