//! Google Sheets status table client.
//!
//! Reads a sheet through the public `gviz` query endpoint. The endpoint does
//! not return bare JSON: the table is wrapped in a JavaScript callback,
//! `google.visualization.Query.setResponse({...});`, which has to be peeled
//! off before the payload can be deserialized.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static ENVELOPE: OnceLock<Regex> = OnceLock::new();

fn envelope_pattern() -> &'static Regex {
    ENVELOPE.get_or_init(|| {
        Regex::new(r"google\.visualization\.Query\.setResponse\(([\s\S]*)\);?")
            .unwrap_or_else(|e| panic!("invalid gviz envelope pattern: {e}"))
    })
}

/// Locate the JSON payload inside a gviz callback envelope.
///
/// Returns `None` when the envelope is absent, which happens while the sheet
/// is still propagating or when Google serves an HTML error page.
pub fn unwrap_envelope(text: &str) -> Option<&str> {
    envelope_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Deserialize the JSON payload of a gviz response.
pub fn parse_table(payload: &str) -> Result<GvizTable, SheetsError> {
    let response: GvizResponse = serde_json::from_str(payload)?;
    Ok(response.table)
}

#[derive(Debug, Deserialize)]
struct GvizResponse {
    table: GvizTable,
}

#[derive(Debug, Default, Deserialize)]
pub struct GvizTable {
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GvizRow {
    /// Cells in column order. Either the whole list or individual cells may
    /// be `null` for blank regions of the sheet.
    #[serde(default)]
    pub c: Option<Vec<Option<GvizCell>>>,
}

impl GvizRow {
    pub fn cell(&self, index: usize) -> Option<&GvizCell> {
        self.c.as_ref()?.get(index)?.as_ref()
    }

    /// Display text of a cell: raw value, else formatted value, else empty.
    pub fn text(&self, index: usize) -> String {
        self.cell(index).map(GvizCell::display_text).unwrap_or_default()
    }
}

/// A gviz cell: `v` is the typed value, `f` the sheet's formatted rendering.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Option<serde_json::Value>,
    #[serde(default)]
    pub f: Option<String>,
}

impl GvizCell {
    /// Text of the raw value only; falsy values (`""`, `0`, `false`) read as empty.
    pub fn value_text(&self) -> String {
        match &self.v {
            Some(value) if is_truthy(value) => render_value(value),
            _ => String::new(),
        }
    }

    pub fn display_text(&self) -> String {
        match (&self.v, &self.f) {
            (Some(value), _) if !value.is_null() => render_value(value),
            (_, Some(formatted)) => formatted.clone(),
            _ => String::new(),
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a cell value the way a spreadsheet user reads it: integral numbers
/// without a trailing `.0`, strings without JSON quotes.
fn render_value(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
                        format!("{f:.0}")
                    }
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        other => other.to_string(),
    }
}

/// HTTP client for one named sheet of one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    sheet_name: String,
}

impl SheetsClient {
    pub fn new(
        base_url: &str,
        sheet_id: &str,
        sheet_name: &str,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            sheet_id: sheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
        })
    }

    pub fn query_url(&self) -> String {
        format!("{}/spreadsheets/d/{}/gviz/tq", self.base_url, self.sheet_id)
    }

    /// Fetch the raw gviz response text for the whole sheet.
    ///
    /// The upstream status code is deliberately not checked: an error page
    /// simply fails to match the envelope and reads as "nothing yet".
    pub async fn fetch_raw(&self) -> Result<String, SheetsError> {
        let start = Instant::now();

        let response = self
            .http
            .get(self.query_url())
            .query(&[("tqx", "out:json"), ("sheet", self.sheet_name.as_str())])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        metrics::histogram!("sheet_fetch_seconds").record(start.elapsed().as_secs_f64());
        tracing::debug!(
            status = status.as_u16(),
            bytes = text.len(),
            sheet = %self.sheet_name,
            "Fetched status sheet"
        );

        Ok(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("HTTP request to Google Sheets failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse sheet payload: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell(v: serde_json::Value) -> GvizCell {
        GvizCell { v: Some(v), f: None }
    }

    #[test]
    fn test_unwrap_envelope() {
        let text = "/*O_o*/\ngoogle.visualization.Query.setResponse({\"table\":{\"rows\":[]}});";
        assert_eq!(unwrap_envelope(text), Some("{\"table\":{\"rows\":[]}}"));
    }

    #[test]
    fn test_unwrap_envelope_without_semicolon() {
        let text = "google.visualization.Query.setResponse({\"a\":1})";
        assert_eq!(unwrap_envelope(text), Some("{\"a\":1}"));
    }

    #[test]
    fn test_unwrap_envelope_missing() {
        assert_eq!(unwrap_envelope("<html>Sign in</html>"), None);
        assert_eq!(unwrap_envelope(""), None);
    }

    #[test]
    fn test_parse_table_with_null_cells() {
        let payload = json!({
            "version": "0.6",
            "status": "ok",
            "table": {
                "cols": [{"id": "A", "type": "string"}],
                "rows": [
                    {"c": [{"v": "abc"}, null, {"v": null, "f": "x"}]},
                    {"c": null}
                ]
            }
        })
        .to_string();

        let table = parse_table(&payload).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].text(0), "abc");
        assert_eq!(table.rows[0].text(1), "");
        assert_eq!(table.rows[0].text(2), "x");
        assert_eq!(table.rows[0].text(9), "");
        assert!(table.rows[1].cell(0).is_none());
    }

    #[test]
    fn test_parse_table_rejects_garbage() {
        assert!(matches!(parse_table("{not json"), Err(SheetsError::Parse(_))));
        assert!(matches!(parse_table("{\"rows\":[]}"), Err(SheetsError::Parse(_))));
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(cell(json!(42)).display_text(), "42");
        assert_eq!(cell(json!(42.0)).display_text(), "42");
        assert_eq!(cell(json!(1.5)).display_text(), "1.5");
        assert_eq!(cell(json!(true)).display_text(), "true");
    }

    #[test]
    fn test_value_text_treats_falsy_as_empty() {
        assert_eq!(cell(json!(0)).value_text(), "");
        assert_eq!(cell(json!("")).value_text(), "");
        assert_eq!(cell(json!(false)).value_text(), "");
        assert_eq!(cell(json!(" id1 ")).value_text(), " id1 ");
        let formatted_only = GvizCell { v: None, f: Some("id1".into()) };
        assert_eq!(formatted_only.value_text(), "");
    }

    #[test]
    fn test_query_url() {
        let client =
            SheetsClient::new("https://docs.google.com/", "sheet123", "Hoja 1", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.query_url(),
            "https://docs.google.com/spreadsheets/d/sheet123/gviz/tq"
        );
    }
}
