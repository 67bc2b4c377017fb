//! Error types for the attendance pipeline.
//!
//! Data-quality problems (stray text in numeric cells, rows without a team)
//! are absorbed during normalization and never show up here. What remains
//! are failures to read the workbook and structural mismatches in a sheet.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttendanceError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or a sheet could not be read.
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// An uploaded xlsx payload could not be parsed.
    #[error("Failed to read xlsx data: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// A CSV export could not be read or a report could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON configuration or summary serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A requested sheet is not part of the workbook.
    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// The meeting-name header and the attendance columns disagree in count,
    /// so positional pairing would attribute attendance to the wrong meeting.
    #[error(
        "Found {} meeting names ({}) but {} attendance columns ({})",
        .meetings.len(),
        .meetings.join(", "),
        .columns.len(),
        .columns.join(", ")
    )]
    MeetingColumnMismatch {
        meetings: Vec<String>,
        columns: Vec<String>,
    },

    /// A quarter sheet could not be parsed.
    #[error("Quarter {quarter}: {source}")]
    Quarter {
        quarter: String,
        #[source]
        source: Box<AttendanceError>,
    },
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_lists_both_sides() {
        let err = AttendanceError::MeetingColumnMismatch {
            meetings: vec!["Standup".into(), "Retro".into(), "Planning".into()],
            columns: vec!["Attendance".into(), "Attendance.1".into()],
        };
        assert_eq!(
            err.to_string(),
            "Found 3 meeting names (Standup, Retro, Planning) but 2 attendance columns (Attendance, Attendance.1)"
        );
    }
}
