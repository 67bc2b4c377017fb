use crate::config::IndicatorPolicy;
use crate::types::{
    AttendanceRecord, EmployeeAttendance, FilterResult, FilteredRow, MeetingColumn, Metrics,
    QuarterData, QuarterReport, TeamAggregate,
};
use crate::util::{mean, percentage};
use std::collections::{BTreeMap, BTreeSet};

/// A multi-select choice. An empty selection means "everything".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn from_choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = choices
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Only(set)
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// The selected options, in the order they are offered.
    pub fn resolve(&self, options: &[String]) -> Vec<String> {
        options.iter().filter(|o| self.contains(o)).cloned().collect()
    }

    /// Selected values that are not among `options`.
    pub fn unknown<'a>(&'a self, options: &[String]) -> Vec<&'a str> {
        match self {
            Selection::All => Vec::new(),
            Selection::Only(set) => set
                .iter()
                .filter(|s| !options.contains(s))
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Restrict a quarter to the selected teams and meetings, recompute the
/// per-row counts and roll them up per team.
///
/// Quarters without per-meeting columns use the sheet's own attended and
/// absent counts and ignore the meeting filter. Team rows come back sorted
/// by team name.
pub fn filter_and_aggregate(
    quarter: &QuarterData,
    team_filter: &Selection,
    meeting_filter: &Selection,
    policy: &IndicatorPolicy,
) -> FilterResult {
    let per_meeting = quarter.table.is_per_meeting();
    let unknown = meeting_filter.unknown(&quarter.meetings.meeting_names());
    if !unknown.is_empty() {
        if per_meeting {
            log::warn!("{}: no meeting named {}", quarter.quarter, unknown.join(", "));
        } else {
            log::debug!("{}: meeting filter ignored for summary sheet", quarter.quarter);
        }
    }

    let selected: Vec<&MeetingColumn> = quarter
        .meetings
        .entries
        .iter()
        .filter(|m| meeting_filter.contains(&m.meeting))
        .collect();

    let mut inconsistent_totals = 0usize;
    let rows: Vec<FilteredRow> = quarter
        .table
        .records
        .iter()
        .filter(|r| team_filter.contains(&r.team))
        .map(|r| {
            if per_meeting {
                per_meeting_row(r, &selected, policy)
            } else {
                let row = summary_row(r);
                if let Some(total) = r.total_meetings {
                    if total != row.total_meetings as f64 {
                        inconsistent_totals += 1;
                    }
                }
                row
            }
        })
        .collect();
    if inconsistent_totals > 0 {
        log::warn!(
            "{}: {} rows have Total Meetings different from Attended + Absent; using the sum",
            quarter.quarter,
            inconsistent_totals
        );
    }

    let teams = aggregate_by_team(&rows, selected.len());
    FilterResult {
        meetings: selected.iter().map(|m| m.meeting.clone()).collect(),
        rows,
        teams,
    }
}

fn per_meeting_row(
    record: &AttendanceRecord,
    selected: &[&MeetingColumn],
    policy: &IndicatorPolicy,
) -> FilteredRow {
    let marks: Vec<Option<bool>> = selected
        .iter()
        .map(|m| {
            let value = record.indicators.get(m.position).and_then(|v| v.as_deref());
            policy.classify(value)
        })
        .collect();
    let attended = marks.iter().filter(|m| **m == Some(true)).count() as u64;
    let counted = marks.iter().filter(|m| m.is_some()).count() as u64;
    FilteredRow {
        employee_name: record.employee_name.clone(),
        team: record.team.clone(),
        working_period: record.working_period,
        marks,
        attended,
        absent: counted - attended,
        total_meetings: counted,
    }
}

fn summary_row(record: &AttendanceRecord) -> FilteredRow {
    let attended = count(record.attended);
    let absent = count(record.absent);
    FilteredRow {
        employee_name: record.employee_name.clone(),
        team: record.team.clone(),
        working_period: record.working_period,
        marks: Vec::new(),
        attended,
        absent,
        total_meetings: attended + absent,
    }
}

// Unknown or negative counts contribute nothing. A single cell is capped at
// u32::MAX so sums over any realistic sheet stay within u64.
fn count(value: Option<f64>) -> u64 {
    value
        .filter(|v| *v > 0.0)
        .map(|v| v.round().min(u32::MAX as f64) as u64)
        .unwrap_or(0)
}

fn aggregate_by_team(rows: &[FilteredRow], meeting_count: usize) -> Vec<TeamAggregate> {
    #[derive(Default)]
    struct Acc {
        members: usize,
        periods: Vec<f64>,
        meeting_attended: Vec<u64>,
        attended: u64,
        absent: u64,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in rows {
        let e = map.entry(r.team.as_str()).or_insert_with(|| Acc {
            meeting_attended: vec![0; meeting_count],
            ..Acc::default()
        });
        e.members += 1;
        e.periods.extend(r.working_period);
        for (sum, mark) in e.meeting_attended.iter_mut().zip(&r.marks) {
            if *mark == Some(true) {
                *sum += 1;
            }
        }
        e.attended += r.attended;
        e.absent += r.absent;
    }

    map.into_iter()
        .map(|(team, acc)| {
            let total_meetings = acc.attended + acc.absent;
            TeamAggregate {
                team: team.to_string(),
                members: acc.members,
                avg_working_period: mean(acc.periods),
                meeting_attended: acc.meeting_attended,
                attended: acc.attended,
                absent: acc.absent,
                total_meetings,
                attendance_percentage: percentage(acc.attended, total_meetings),
            }
        })
        .collect()
}

/// Reduce a filtered table to its four headline numbers.
///
/// `avg_working_period` is `None` when no row has a known working period.
pub fn summarize(rows: &[FilteredRow]) -> Metrics {
    let total_meetings: u64 = rows.iter().map(|r| r.total_meetings).sum();
    let attended: u64 = rows.iter().map(|r| r.attended).sum();
    Metrics {
        total_meetings,
        attended,
        attendance_percentage: percentage(attended, total_meetings),
        avg_working_period: mean(rows.iter().filter_map(|r| r.working_period)),
    }
}

/// Row-level tables of several quarters stacked into one, for the
/// working-period-by-employee view.
pub fn employees_across_quarters(reports: &[QuarterReport]) -> Vec<EmployeeAttendance> {
    reports
        .iter()
        .flat_map(|q| {
            q.result.rows.iter().map(move |r| EmployeeAttendance {
                quarter: q.quarter.clone(),
                employee_name: r.employee_name.clone(),
                team: r.team.clone(),
                working_period: r.working_period,
                attended: r.attended,
                absent: r.absent,
                total_meetings: r.total_meetings,
                attendance_percentage: percentage(r.attended, r.total_meetings),
            })
        })
        .collect()
}
