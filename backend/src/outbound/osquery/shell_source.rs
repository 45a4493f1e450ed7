//! Runs inventory queries through `osqueryi --json`.
//!
//! Each query spawns one child process. The child is killed if the collecting
//! future is dropped, so a poller timeout never leaves a stray `osqueryi`.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::domain::ports::{FactRow, FactSource, FactSourceError, RawFacts};

use super::queries::{AGENT_INFO, INSTALLED_APPS, InventoryQuery, OS_VERSION};

/// [`FactSource`] that shells out to an `osqueryi` binary.
#[derive(Debug, Clone)]
pub struct OsqueryShellSource {
    binary: PathBuf,
}

impl OsqueryShellSource {
    /// Use `binary`, resolved through `PATH` when it is a bare name.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, query: InventoryQuery) -> Result<Vec<FactRow>, FactSourceError> {
        let output = Command::new(&self.binary)
            .arg("--json")
            .arg(query.sql)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                FactSourceError::unavailable(format!(
                    "failed to run {}: {err}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(query = query.name, status = %output.status, %stderr, "osqueryi exited with failure");
            return Err(FactSourceError::query_failed(
                query.name,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        let rows = parse_rows(&output.stdout)
            .map_err(|message| FactSourceError::decode(query.name, message))?;
        debug!(query = query.name, rows = rows.len(), "osqueryi query finished");
        Ok(rows)
    }
}

#[async_trait]
impl FactSource for OsqueryShellSource {
    async fn collect(&self) -> Result<RawFacts, FactSourceError> {
        Ok(RawFacts {
            os_version: self.run(OS_VERSION).await?,
            agent_info: self.run(AGENT_INFO).await?,
            apps: self.run(INSTALLED_APPS).await?,
        })
    }
}

/// Decode `osqueryi --json` output into rows of string cells.
///
/// Strings are kept verbatim, numbers and booleans are rendered with their
/// JSON text, and nulls are dropped so they read as absent columns.
pub(crate) fn parse_rows(stdout: &[u8]) -> Result<Vec<FactRow>, String> {
    let value: Value = serde_json::from_slice(stdout).map_err(|err| err.to_string())?;
    let Value::Array(items) = value else {
        return Err("expected a JSON array of rows".to_owned());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(columns) => columns
                .into_iter()
                .filter_map(|(column, cell)| {
                    cell_text(cell)
                        .map(|text| text.map(|text| (column.clone(), text)))
                        .map_err(|kind| format!("row {index} column `{column}` holds {kind}"))
                        .transpose()
                })
                .collect::<Result<FactRow, String>>(),
            _ => Err(format!("row {index} is not a JSON object")),
        })
        .collect()
}

fn cell_text(cell: Value) -> Result<Option<String>, &'static str> {
    match cell {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) => Err("an array"),
        Value::Object(_) => Err("an object"),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn keeps_strings_verbatim() {
        let rows = parse_rows(
            br#"[{"name":"Safari.app","path":"/Applications/Safari.app","last_opened_time":"1700000000.5"}]"#,
        )
        .expect("valid rows");

        let row = rows.first().expect("one row");
        assert_eq!(row.get("name").map(String::as_str), Some("Safari.app"));
        assert_eq!(
            row.get("last_opened_time").map(String::as_str),
            Some("1700000000.5")
        );
    }

    #[rstest]
    fn stringifies_numbers_and_booleans() {
        let rows = parse_rows(br#"[{"last_opened_time":1700000000.25,"pid":42,"enabled":true}]"#)
            .expect("valid rows");

        let row = rows.first().expect("one row");
        assert_eq!(
            row.get("last_opened_time").map(String::as_str),
            Some("1700000000.25")
        );
        assert_eq!(row.get("pid").map(String::as_str), Some("42"));
        assert_eq!(row.get("enabled").map(String::as_str), Some("true"));
    }

    #[rstest]
    fn drops_null_cells() {
        let rows =
            parse_rows(br#"[{"name":"Xcode.app","display_name":null}]"#).expect("valid rows");

        let row = rows.first().expect("one row");
        assert!(!row.contains_key("display_name"));
        assert_eq!(row.len(), 1);
    }

    #[rstest]
    fn empty_array_is_no_rows() {
        assert_eq!(parse_rows(b"[\n\n]").expect("valid rows"), Vec::<FactRow>::new());
    }

    #[rstest]
    #[case(b"".as_slice(), "EOF")]
    #[case(br#"{"version":"5.12.1"}"#.as_slice(), "JSON array")]
    #[case(br#"["5.12.1"]"#.as_slice(), "row 0 is not a JSON object")]
    #[case(br#"[{"tags":["a"]}]"#.as_slice(), "column `tags` holds an array")]
    fn rejects_unexpected_shapes(#[case] stdout: &[u8], #[case] fragment: &str) {
        let message = parse_rows(stdout).expect_err("shape is rejected");

        assert!(message.contains(fragment), "{message}");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let source = OsqueryShellSource::new("/nonexistent/hostwatch/osqueryi");

        let error = source.collect().await.expect_err("binary does not exist");

        assert!(matches!(error, FactSourceError::Unavailable { .. }), "{error}");
    }

    #[cfg(unix)]
    #[rstest]
    #[tokio::test]
    async fn non_zero_exit_names_the_first_query() {
        let source = OsqueryShellSource::new("false");

        let error = source.collect().await.expect_err("false exits non-zero");

        assert!(
            matches!(&error, FactSourceError::QueryFailed { query, .. } if query == "os_version"),
            "{error}"
        );
    }

    #[cfg(unix)]
    #[rstest]
    #[tokio::test]
    async fn empty_output_is_a_decode_error() {
        let source = OsqueryShellSource::new("true");

        let error = source.collect().await.expect_err("true prints nothing");

        assert!(matches!(error, FactSourceError::Decode { .. }), "{error}");
    }
}
