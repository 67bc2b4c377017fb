//! Meeting discovery for fine-grained quarter sheets.
//!
//! The row above the sub-labels carries one meeting name per merged column
//! group; every other cell in that row is blank (or an `Unnamed: n`
//! placeholder when the sheet was exported by other tooling). Meetings are
//! paired with the `Attendance…` columns strictly by position, so both lists
//! are collected left to right.

use crate::error::{AttendanceError, Result};
use crate::types::{AttendanceTable, CellValue, MeetingColumn, MeetingMap};
use crate::util::dedupe_labels;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Unnamed(?::\s*\d+(?:_level_\d+)?)?)?$").expect("placeholder pattern is valid")
});

/// True for header labels produced by blank or merged cells.
pub fn is_placeholder(label: &str) -> bool {
    PLACEHOLDER.is_match(label.trim())
}

/// Meeting names in the header row, in left-to-right order.
pub fn discover_meetings(header_row: &[CellValue]) -> Vec<String> {
    let names = header_row
        .iter()
        .filter_map(CellValue::as_label)
        .filter(|label| !is_placeholder(label))
        .collect();
    dedupe_labels(names)
}

/// Pair meeting `n` with attendance column `n`.
///
/// Fails when the counts differ: pairing the overlap would silently credit
/// attendance to the wrong meeting.
pub fn map_meetings_to_columns(
    table: &AttendanceTable,
    meeting_names: &[String],
) -> Result<MeetingMap> {
    if meeting_names.len() != table.attendance_columns.len() {
        return Err(AttendanceError::MeetingColumnMismatch {
            meetings: meeting_names.to_vec(),
            columns: table.attendance_columns.clone(),
        });
    }
    let entries = meeting_names
        .iter()
        .zip(&table.attendance_columns)
        .enumerate()
        .map(|(position, (meeting, column))| MeetingColumn {
            meeting: meeting.clone(),
            column: column.clone(),
            position,
        })
        .collect::<Vec<MeetingColumn>>();
    for e in &entries {
        log::debug!("Meeting '{}' -> column '{}'", e.meeting, e.column);
    }
    Ok(MeetingMap { entries })
}
