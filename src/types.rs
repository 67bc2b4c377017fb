use chrono::{DateTime, Local};
use serde::Serialize;
use tabled::Tabled;

pub const EMPLOYEE_NAME: &str = "Employee Name";
pub const TEAM: &str = "Team";
pub const WORKING_PERIOD: &str = "Working period";
pub const ATTENDED: &str = "Attended";
pub const ABSENT: &str = "Absent";
pub const TOTAL_MEETINGS: &str = "Total Meetings";
/// Prefix shared by every per-meeting attendance indicator column.
pub const ATTENDANCE_PREFIX: &str = "Attendance";

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A single spreadsheet cell, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as a trimmed, non-empty string.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            CellValue::Number(n) => Some(crate::util::format_plain(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }

    /// True for the literal value `1`, whether stored as a number or as text.
    pub fn is_literal_one(&self) -> bool {
        match self {
            CellValue::Number(n) => *n == 1.0,
            CellValue::Text(s) => s.trim() == "1",
            _ => false,
        }
    }
}

/// Absolute cell grid of one sheet. Row 0 is the first row of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn row(&self, index: usize) -> &[CellValue] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Sheet data below its header row, with one unique label per column.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Index of the column whose label matches `name`, ignoring case and
    /// surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    pub fn cell<'a>(row: &'a [CellValue], index: Option<usize>) -> &'a CellValue {
        index.and_then(|i| row.get(i)).unwrap_or(&EMPTY_CELL)
    }
}

/// One employee's attendance within one quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub employee_name: String,
    pub team: String,
    pub working_period: Option<f64>,
    pub attended: Option<f64>,
    pub absent: Option<f64>,
    pub total_meetings: Option<f64>,
    /// Raw indicator values, aligned with `AttendanceTable::attendance_columns`.
    pub indicators: Vec<Option<String>>,
}

/// Canonical per-employee table of one quarter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttendanceTable {
    /// Attendance indicator columns in sheet order.
    pub attendance_columns: Vec<String>,
    pub records: Vec<AttendanceRecord>,
}

impl AttendanceTable {
    pub fn is_per_meeting(&self) -> bool {
        !self.attendance_columns.is_empty()
    }

    /// Render the canonical table back into raw form.
    #[cfg(test)]
    pub fn to_raw(&self) -> RawTable {
        let mut columns: Vec<String> = [
            EMPLOYEE_NAME,
            TEAM,
            WORKING_PERIOD,
            ATTENDED,
            ABSENT,
            TOTAL_MEETINGS,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        columns.extend(self.attendance_columns.iter().cloned());

        let number = |v: Option<f64>| v.map(CellValue::Number).unwrap_or(CellValue::Empty);
        let rows = self
            .records
            .iter()
            .map(|r| {
                let mut row = vec![
                    CellValue::Text(r.employee_name.clone()),
                    CellValue::Text(r.team.clone()),
                    number(r.working_period),
                    number(r.attended),
                    number(r.absent),
                    number(r.total_meetings),
                ];
                row.extend(r.indicators.iter().map(|i| match i {
                    Some(s) => CellValue::Text(s.clone()),
                    None => CellValue::Empty,
                }));
                row
            })
            .collect();
        RawTable { columns, rows }
    }
}

/// A meeting paired with the attendance column that records it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingColumn {
    pub meeting: String,
    pub column: String,
    /// Index into `AttendanceTable::attendance_columns`.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeetingMap {
    pub entries: Vec<MeetingColumn>,
}

impl MeetingMap {
    pub fn meeting_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.meeting.clone()).collect()
    }

    #[cfg(test)]
    pub fn column_for(&self, meeting: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.meeting == meeting)
            .map(|e| e.column.as_str())
    }
}

/// A parsed quarter: its canonical table plus the meetings it defines.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterData {
    pub quarter: String,
    pub table: AttendanceTable,
    pub meetings: MeetingMap,
}

/// Row-level output of the filter step.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRow {
    pub employee_name: String,
    pub team: String,
    pub working_period: Option<f64>,
    /// One mark per selected meeting; `None` when the cell was not counted.
    pub marks: Vec<Option<bool>>,
    pub attended: u64,
    pub absent: u64,
    pub total_meetings: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamAggregate {
    pub team: String,
    pub members: usize,
    pub avg_working_period: Option<f64>,
    /// Attended counts per selected meeting.
    pub meeting_attended: Vec<u64>,
    pub attended: u64,
    pub absent: u64,
    pub total_meetings: u64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    /// Selected meetings, in sheet order.
    pub meetings: Vec<String>,
    pub rows: Vec<FilteredRow>,
    /// Sorted alphabetically by team.
    pub teams: Vec<TeamAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_meetings: u64,
    pub attended: u64,
    pub attendance_percentage: f64,
    pub avg_working_period: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuarterReport {
    pub quarter: String,
    pub meetings_available: Vec<String>,
    pub result: FilterResult,
    pub metrics: Metrics,
}

/// Filtered row tagged with its quarter, for cross-quarter views.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeAttendance {
    pub quarter: String,
    pub employee_name: String,
    pub team: String,
    pub working_period: Option<f64>,
    pub attended: u64,
    pub absent: u64,
    pub total_meetings: u64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub quarters: Vec<QuarterReport>,
    pub employees: Vec<EmployeeAttendance>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TeamSummaryRow {
    #[serde(rename = "Team")]
    #[tabled(rename = "Team")]
    pub team: String,
    #[serde(rename = "Members")]
    #[tabled(rename = "Members")]
    pub members: usize,
    #[serde(rename = "Working period")]
    #[tabled(rename = "Working period")]
    pub working_period: String,
    #[serde(rename = "Attended")]
    #[tabled(rename = "Attended")]
    pub attended: u64,
    #[serde(rename = "Absent")]
    #[tabled(rename = "Absent")]
    pub absent: u64,
    #[serde(rename = "Total Meetings")]
    #[tabled(rename = "Total Meetings")]
    pub total_meetings: u64,
    #[serde(rename = "Total %age")]
    #[tabled(rename = "Total %age")]
    pub total_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct EmployeeRow {
    #[serde(rename = "Quarter")]
    #[tabled(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Employee Name")]
    #[tabled(rename = "Employee Name")]
    pub employee_name: String,
    #[serde(rename = "Team")]
    #[tabled(rename = "Team")]
    pub team: String,
    #[serde(rename = "Working period")]
    #[tabled(rename = "Working period")]
    pub working_period: String,
    #[serde(rename = "Attended")]
    #[tabled(rename = "Attended")]
    pub attended: u64,
    #[serde(rename = "Absent")]
    #[tabled(rename = "Absent")]
    pub absent: u64,
    #[serde(rename = "Total Meetings")]
    #[tabled(rename = "Total Meetings")]
    pub total_meetings: u64,
    #[serde(rename = "Total %age")]
    #[tabled(rename = "Total %age")]
    pub total_pct: String,
}

#[derive(Debug, Serialize)]
pub struct QuarterSummary {
    pub quarter: String,
    pub teams: Vec<String>,
    pub meetings: Vec<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: DateTime<Local>,
    pub quarters: Vec<QuarterSummary>,
    pub total_employees: usize,
}
