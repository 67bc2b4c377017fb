use crate::types::{
    AttendanceRecord, AttendanceTable, CellValue, RawTable, ABSENT, ATTENDANCE_PREFIX, ATTENDED,
    EMPLOYEE_NAME, TEAM, TOTAL_MEETINGS, WORKING_PERIOD,
};
use crate::util::coerce_number;

/// Convert a raw sheet table into the canonical per-employee table.
///
/// Numeric fields that cannot be parsed become `None`; only rows without a
/// team and the `1`/`1` placeholder row are dropped. The input is left
/// untouched.
pub fn normalize(raw: &RawTable) -> AttendanceTable {
    let name_idx = raw.column_index(EMPLOYEE_NAME);
    let team_idx = raw.column_index(TEAM);
    let period_idx = raw.column_index(WORKING_PERIOD);
    let attended_idx = raw.column_index(ATTENDED);
    let absent_idx = raw.column_index(ABSENT);
    let total_idx = raw.column_index(TOTAL_MEETINGS);

    if team_idx.is_none() {
        log::warn!("No '{}' column found; every row will be dropped", TEAM);
    }

    let indicator_idx: Vec<usize> = raw
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.trim_start().starts_with(ATTENDANCE_PREFIX))
        .map(|(i, _)| i)
        .collect();
    let attendance_columns = indicator_idx
        .iter()
        .map(|&i| raw.columns[i].clone())
        .collect();

    let mut missing_team = 0usize;
    let mut sentinels = 0usize;
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let name_cell = RawTable::cell(row, name_idx);
        let team_cell = RawTable::cell(row, team_idx);

        if name_cell.is_literal_one() && team_cell.is_literal_one() {
            sentinels += 1;
            continue;
        }
        let team = match team_label(team_cell) {
            Some(t) => t,
            None => {
                missing_team += 1;
                continue;
            }
        };

        records.push(AttendanceRecord {
            employee_name: name_cell.as_label().unwrap_or_default(),
            team,
            working_period: coerce_number(RawTable::cell(row, period_idx)),
            attended: coerce_number(RawTable::cell(row, attended_idx)),
            absent: coerce_number(RawTable::cell(row, absent_idx)),
            total_meetings: coerce_number(RawTable::cell(row, total_idx)),
            indicators: indicator_idx
                .iter()
                .map(|&i| indicator_value(RawTable::cell(row, Some(i))))
                .collect(),
        });
    }

    log::debug!(
        "Normalized {} rows ({} without team, {} placeholder rows dropped)",
        records.len(),
        missing_team,
        sentinels
    );

    AttendanceTable {
        attendance_columns,
        records,
    }
}

// Booleans and error cells are not team names.
fn team_label(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(_) | CellValue::Number(_) => cell.as_label(),
        _ => None,
    }
}

// Text is kept verbatim so the indicator policy decides how strictly to match.
fn indicator_value(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => cell.as_label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn coarse_raw(rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable {
            columns: vec![
                "Employee Name".into(),
                "Team".into(),
                "Working period".into(),
                "Attended".into(),
                "Absent".into(),
                "Total Meetings".into(),
            ],
            rows,
        }
    }

    #[test]
    fn coerces_numbers_and_keeps_unknowns() {
        let raw = coarse_raw(vec![vec![
            text("Alice"),
            text("Ops"),
            text("n/a"),
            CellValue::Number(8.0),
            text(" 2 "),
            CellValue::Empty,
        ]]);
        let table = normalize(&raw);
        assert_eq!(table.records.len(), 1);
        let r = &table.records[0];
        assert_eq!(r.working_period, None);
        assert_eq!(r.attended, Some(8.0));
        assert_eq!(r.absent, Some(2.0));
        assert_eq!(r.total_meetings, None);
    }

    #[test]
    fn drops_rows_without_team() {
        let raw = coarse_raw(vec![
            vec![text("Alice"), CellValue::Empty],
            vec![text("Bob"), text("   ")],
            vec![text("Cara"), CellValue::Bool(true)],
            vec![text("Dan"), text("Ops")],
        ]);
        let table = normalize(&raw);
        let names: Vec<_> = table.records.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(names, vec!["Dan"]);
    }

    #[test]
    fn drops_placeholder_row() {
        let raw = coarse_raw(vec![
            vec![CellValue::Number(1.0), CellValue::Number(1.0)],
            vec![text("1"), text("1")],
            vec![CellValue::Number(1.0), text("Ops")],
            vec![text("Alice"), CellValue::Number(1.0)],
        ]);
        let table = normalize(&raw);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].employee_name, "1");
        assert_eq!(table.records[0].team, "Ops");
        assert_eq!(table.records[1].team, "1");
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = RawTable {
            columns: vec![
                "Notes".into(),
                "Employee Name".into(),
                "Team".into(),
                "Attendance".into(),
                "Working period".into(),
                "Attendance.1".into(),
                "Total Meetings".into(),
            ],
            rows: vec![
                vec![
                    text("x"),
                    text(" Alice "),
                    text("Ops"),
                    text("Yes"),
                    text("3.5"),
                    text("No"),
                    text("2"),
                ],
                vec![text("y"), CellValue::Number(1.0), CellValue::Number(1.0), text("Yes")],
                vec![
                    text("z"),
                    text("Bob"),
                    CellValue::Number(7.0),
                    CellValue::Empty,
                    text("??"),
                    text(" maybe "),
                ],
                vec![text("w"), text("Cara"), CellValue::Empty, text("Yes")],
            ],
        };
        let once = normalize(&raw);
        let twice = normalize(&once.to_raw());
        assert_eq!(once, twice);
        assert_eq!(once.records.len(), 2);
        assert_eq!(once.attendance_columns, vec!["Attendance", "Attendance.1"]);
        assert_eq!(once.records[1].indicators, vec![None, Some(" maybe ".to_string())]);
    }

    #[test]
    fn input_is_not_mutated() {
        let raw = coarse_raw(vec![vec![CellValue::Number(1.0), CellValue::Number(1.0)]]);
        let before = raw.clone();
        let _ = normalize(&raw);
        assert_eq!(raw, before);
    }
}
