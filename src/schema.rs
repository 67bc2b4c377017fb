//! Two-phase quarter parsing: work out the shape of a sheet from its header
//! content, then read the data with that shape.
//!
//! Both sheet variants put their column labels on row 2 (after two title
//! rows). Fine-grained sheets additionally carry meeting names on row 1,
//! one per merged column group.

use crate::error::{AttendanceError, Result};
use crate::meetings::{discover_meetings, map_meetings_to_columns};
use crate::normalize::normalize;
use crate::types::{MeetingMap, QuarterData, RawTable, Sheet, ATTENDANCE_PREFIX};
use crate::util::dedupe_labels;

pub const MEETING_ROW: usize = 1;
pub const HEADER_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetLayout {
    /// Pre-aggregated `Attended` / `Absent` / `Total Meetings` columns.
    Coarse,
    /// One attendance indicator column per meeting.
    PerMeeting { meetings: Vec<String> },
}

pub fn detect_layout(sheet: &Sheet) -> SheetLayout {
    let has_indicators = sheet
        .row(HEADER_ROW)
        .iter()
        .filter_map(|c| c.as_label())
        .any(|label| label.starts_with(ATTENDANCE_PREFIX));
    if has_indicators {
        SheetLayout::PerMeeting {
            meetings: discover_meetings(sheet.row(MEETING_ROW)),
        }
    } else {
        SheetLayout::Coarse
    }
}

/// Everything below the header row, labelled by the header row.
pub fn raw_table(sheet: &Sheet) -> RawTable {
    let header = sheet.row(HEADER_ROW);
    let data: Vec<_> = sheet
        .rows
        .iter()
        .skip(HEADER_ROW + 1)
        .filter(|row| !row.iter().all(|c| c.is_blank()))
        .cloned()
        .collect();
    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let labels = (0..width)
        .map(|i| {
            header
                .get(i)
                .and_then(|c| c.as_label())
                .unwrap_or_else(|| format!("Unnamed: {}", i))
        })
        .collect();
    RawTable {
        columns: dedupe_labels(labels),
        rows: data,
    }
}

pub fn parse_quarter(sheet: &Sheet) -> Result<QuarterData> {
    let layout = detect_layout(sheet);
    let table = normalize(&raw_table(sheet));
    let meetings = match &layout {
        SheetLayout::Coarse => MeetingMap::default(),
        SheetLayout::PerMeeting { meetings } => map_meetings_to_columns(&table, meetings)
            .map_err(|source| AttendanceError::Quarter {
                quarter: sheet.name.clone(),
                source: Box::new(source),
            })?,
    };
    log::info!(
        "Parsed {}: {} employees, {} meetings",
        sheet.name,
        table.records.len(),
        meetings.entries.len()
    );
    Ok(QuarterData {
        quarter: sheet.name.clone(),
        table,
        meetings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
        Sheet {
            name: "Q3".into(),
            rows,
        }
    }

    fn fine_grained(meeting_row: Vec<CellValue>) -> Sheet {
        sheet(vec![
            vec![text("Q3")],
            meeting_row,
            vec![
                text("Employee Name"),
                text("Team"),
                text("Working period"),
                text("Attendance"),
                CellValue::Empty,
                text("Attendance"),
                text("Attended"),
            ],
            vec![
                text("Alice"),
                text("Ops"),
                CellValue::Number(2.0),
                text("Yes"),
                CellValue::Empty,
                text("No"),
            ],
            vec![],
            vec![CellValue::Empty, text(" ")],
            vec![
                text("Bob"),
                text("Ops"),
                CellValue::Empty,
                text("No"),
                text("stray"),
                text("No"),
                CellValue::Number(0.0),
            ],
        ])
    }

    #[test]
    fn header_content_decides_layout() {
        let coarse = sheet(vec![
            vec![text("Q3")],
            vec![text("Weekly meetings")],
            vec![text("Employee Name"), text("Team"), text("Attended")],
        ]);
        assert_eq!(detect_layout(&coarse), SheetLayout::Coarse);

        let fine = fine_grained(vec![
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            text("Standup"),
            CellValue::Empty,
            text("Retro"),
        ]);
        assert_eq!(
            detect_layout(&fine),
            SheetLayout::PerMeeting {
                meetings: vec!["Standup".into(), "Retro".into()]
            }
        );
    }

    #[test]
    fn raw_table_labels_every_column() {
        let fine = fine_grained(vec![]);
        let raw = raw_table(&fine);
        assert_eq!(
            raw.columns,
            vec![
                "Employee Name",
                "Team",
                "Working period",
                "Attendance",
                "Unnamed: 4",
                "Attendance.1",
                "Attended"
            ]
        );
        // Blank rows between data rows are skipped.
        assert_eq!(raw.rows.len(), 2);
    }

    #[test]
    fn quarter_with_matching_meetings_parses() {
        let fine = fine_grained(vec![
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            text("Standup"),
            CellValue::Empty,
            text("Retro"),
        ]);
        let quarter = parse_quarter(&fine).unwrap();
        assert_eq!(quarter.quarter, "Q3");
        assert_eq!(quarter.table.records.len(), 2);
        assert_eq!(quarter.meetings.column_for("Retro"), Some("Attendance.1"));
    }

    #[test]
    fn new_meeting_counts_need_no_code_change() {
        let mut rows = vec![
            vec![text("Q4")],
            Vec::new(),
            vec![text("Employee Name"), text("Team")],
        ];
        let meetings = ["A", "B", "C", "D", "E"];
        for m in meetings {
            rows[1].push(text(m));
            rows[1].push(CellValue::Empty);
            rows[2].push(text("Attendance"));
            rows[2].push(text("Notes"));
        }
        rows.push(vec![text("Alice"), text("Ops")]);
        let quarter = parse_quarter(&sheet(rows)).unwrap();
        assert_eq!(quarter.meetings.meeting_names(), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(quarter.meetings.column_for("E"), Some("Attendance.4"));
    }

    #[test]
    fn mismatched_meetings_fail_with_quarter_name() {
        let fine = fine_grained(vec![text("Standup"), text("Retro"), text("Planning")]);
        let err = parse_quarter(&fine).unwrap_err();
        assert!(err.to_string().starts_with("Quarter Q3: Found 3 meeting names"));
        match err {
            AttendanceError::Quarter { source, .. } => assert!(matches!(
                *source,
                AttendanceError::MeetingColumnMismatch { .. }
            )),
            other => panic!("unexpected error: {other}"),
        }
    }
}
