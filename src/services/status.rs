use crate::models::status::{ResultData, StatusResponse};
use crate::services::sheets::GvizTable;

/// Column layout of the workflow's status sheet.
pub mod columns {
    pub const REQUEST_ID: usize = 0;
    pub const STATUS: usize = 1;
    pub const IMAGE_NAME: usize = 2;
    pub const IMAGE_URL: usize = 3;
    pub const VIDEO_NAME: usize = 4;
    pub const VIDEO_URL: usize = 5;
}

/// Status of a row as written by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RowStatus {
    Completed,
    Pending,
}

/// Literals the workflow writes into the status column once both media are
/// ready. Compared after trimming and lowercasing.
// Other locales stay pending until the workflow is seen emitting them.
const COMPLETED_LITERALS: &[&str] = &["completado", "completed", "true"];

pub fn normalize_status(raw: &str) -> RowStatus {
    let normalized = raw.trim().to_lowercase();
    if COMPLETED_LITERALS.contains(&normalized.as_str()) {
        RowStatus::Completed
    } else {
        RowStatus::Pending
    }
}

/// Resolve a request token against the status table.
///
/// Scans linearly and stops at the first row whose token column equals
/// `request_id` exactly (case-sensitive, after trimming the cell).
pub fn resolve(table: &GvizTable, request_id: &str) -> StatusResponse {
    let Some(row) = table.rows.iter().find(|row| {
        row.cell(columns::REQUEST_ID)
            .is_some_and(|cell| cell.value_text().trim() == request_id)
    }) else {
        tracing::debug!(request_id, rows = table.rows.len(), "Request id not in sheet yet");
        return StatusResponse::not_found();
    };

    let raw_status = row.text(columns::STATUS);
    let status = normalize_status(&raw_status);
    tracing::info!(request_id, raw_status = %raw_status, status = %status, "Found status row");

    match status {
        RowStatus::Completed => StatusResponse::completed(ResultData {
            file_name: row.text(columns::IMAGE_NAME),
            file_url: row.text(columns::IMAGE_URL),
            video_name: row.text(columns::VIDEO_NAME),
            video_url: row.text(columns::VIDEO_URL),
        }),
        RowStatus::Pending => StatusResponse::in_progress(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::CheckStatus;
    use crate::services::sheets::parse_table;
    use serde_json::json;

    fn table(rows: serde_json::Value) -> GvizTable {
        parse_table(&json!({ "table": { "rows": rows } }).to_string()).unwrap()
    }

    fn row(id: &str, status: &str) -> serde_json::Value {
        json!({"c": [
            {"v": id},
            {"v": status},
            {"v": "image.png"},
            {"v": "https://drive.example/img"},
            {"v": "video.mp4"},
            {"v": "https://drive.example/vid"}
        ]})
    }

    #[test]
    fn test_normalize_completed_literals() {
        for raw in ["Completado", "COMPLETED", "true", "  TRUE  ", "completed\n"] {
            assert_eq!(normalize_status(raw), RowStatus::Completed, "{raw:?}");
        }
    }

    #[test]
    fn test_normalize_everything_else_pending() {
        for raw in ["en progreso", "", "done", "false", "complete"] {
            assert_eq!(normalize_status(raw), RowStatus::Pending, "{raw:?}");
        }
    }

    #[test]
    fn test_resolve_no_match() {
        let t = table(json!([row("other", "completado")]));
        let response = resolve(&t, "abc");
        assert!(!response.found);
        assert_eq!(response.status, CheckStatus::Pending);
        assert!(response.data.is_none());
    }

    #[test]
    fn test_resolve_empty_table() {
        let response = resolve(&GvizTable::default(), "abc");
        assert!(!response.found);
        assert_eq!(response.status, CheckStatus::Pending);
    }

    #[test]
    fn test_resolve_completed_copies_columns() {
        let t = table(json!([row("zzz", "pending"), row("abc", " Completado ")]));
        let response = resolve(&t, "abc");
        assert!(response.found);
        assert_eq!(response.status, CheckStatus::Completed);
        let data = response.data.unwrap();
        assert_eq!(data.file_name, "image.png");
        assert_eq!(data.file_url, "https://drive.example/img");
        assert_eq!(data.video_name, "video.mp4");
        assert_eq!(data.video_url, "https://drive.example/vid");
    }

    #[test]
    fn test_resolve_in_progress_row() {
        let t = table(json!([row("abc", "en progreso")]));
        let response = resolve(&t, "abc");
        assert!(response.found);
        assert_eq!(response.status, CheckStatus::Pending);
        assert!(response.data.is_none());
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let t = table(json!([row("abc", "en progreso"), row("abc", "completed")]));
        assert_eq!(resolve(&t, "abc").status, CheckStatus::Pending);
    }

    #[test]
    fn test_resolve_trims_cell_and_is_case_sensitive() {
        let t = table(json!([row("  abc  ", "true")]));
        assert!(resolve(&t, "abc").found);
        assert!(!resolve(&t, "ABC").found);
    }

    #[test]
    fn test_resolve_skips_blank_rows_and_missing_cells() {
        let t = table(json!([
            {"c": null},
            {"c": [null, {"v": "completed"}]},
            {"c": [{"v": "abc"}, {"v": "TRUE"}]}
        ]));
        let response = resolve(&t, "abc");
        assert_eq!(response.status, CheckStatus::Completed);
        let data = response.data.unwrap();
        assert_eq!(data.file_name, "");
        assert_eq!(data.video_url, "");
    }

    #[test]
    fn test_resolve_numeric_id_cell() {
        let t = table(json!([{"c": [{"v": 12345.0}, {"v": "completado"}]}]));
        assert!(resolve(&t, "12345").found);
    }
}
