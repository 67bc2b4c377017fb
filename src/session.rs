//! Per-session analysis context.
//!
//! A `Session` owns the workbook it was opened with and never mutates it:
//! every analysis re-parses the quarter sheets it needs, so repeated runs
//! with different filters cannot affect each other. Callers that serve
//! several users keep one `Session` each.

use crate::config::AnalysisConfig;
use crate::error::{AttendanceError, Result};
use crate::loader::Workbook;
use crate::reports::{employees_across_quarters, filter_and_aggregate, summarize, Selection};
use crate::schema::parse_quarter;
use crate::types::{Analysis, QuarterData, QuarterReport};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisRequest {
    pub quarters: Selection,
    pub teams: Selection,
    pub meetings: Selection,
}

#[derive(Debug)]
pub struct Session {
    workbook: Workbook,
    config: AnalysisConfig,
}

impl Session {
    pub fn new(workbook: Workbook, config: AnalysisConfig) -> Self {
        Self { workbook, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn quarters(&self) -> Vec<String> {
        self.workbook.quarter_names(&self.config.quarter_prefix)
    }

    pub fn quarter(&self, name: &str) -> Result<QuarterData> {
        parse_quarter(self.workbook.sheet(name)?)
    }

    pub fn meetings(&self, quarter: &str) -> Result<Vec<String>> {
        Ok(self.quarter(quarter)?.meetings.meeting_names())
    }

    /// Teams to offer for selection: the roster when the workbook has one,
    /// otherwise every team seen in the selected quarters, sorted.
    pub fn team_options(&self, quarters: &Selection) -> Result<Vec<String>> {
        if let Some(teams) = self.workbook.roster_teams(
            &self.config.roster_sheet,
            &self.config.roster_column,
            self.config.roster_skip_rows,
        ) {
            return Ok(teams);
        }
        let mut teams = BTreeSet::new();
        for quarter in quarters.resolve(&self.quarters()) {
            let data = self.quarter(&quarter)?;
            teams.extend(data.table.records.into_iter().map(|r| r.team));
        }
        Ok(teams.into_iter().collect())
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<Analysis> {
        let available = self.quarters();
        let unknown = request.quarters.unknown(&available);
        if !unknown.is_empty() {
            log::warn!("No quarter sheet named {}", unknown.join(", "));
        }

        let mut reports = Vec::new();
        for quarter in request.quarters.resolve(&available) {
            let data = self.quarter(&quarter)?;
            let result = filter_and_aggregate(
                &data,
                &request.teams,
                &request.meetings,
                &self.config.indicators,
            );
            let metrics = summarize(&result.rows);
            log::info!(
                "{}: {} rows, {} teams, {:.1}% attendance",
                quarter,
                result.rows.len(),
                result.teams.len(),
                metrics.attendance_percentage
            );
            reports.push(QuarterReport {
                quarter,
                meetings_available: data.meetings.meeting_names(),
                result,
                metrics,
            });
        }
        if reports.is_empty() {
            return Err(AttendanceError::SheetNotFound(format!(
                "{}*",
                self.config.quarter_prefix
            )));
        }

        let employees = employees_across_quarters(&reports);
        Ok(Analysis {
            quarters: reports,
            employees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_fixture_workbook;

    fn open_fixture() -> Session {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture_workbook(dir.path());
        let (workbook, _) = Workbook::open(&path).unwrap();
        Session::new(workbook, AnalysisConfig::default())
    }

    #[test]
    fn lists_quarters_meetings_and_roster_teams() {
        let session = open_fixture();
        assert_eq!(session.quarters(), vec!["Q1", "Q2"]);
        assert_eq!(session.meetings("Q1").unwrap(), vec!["Standup", "Retro"]);
        assert!(session.meetings("Q2").unwrap().is_empty());
        assert_eq!(
            session.team_options(&Selection::All).unwrap(),
            vec!["Ops", "Sales", "Design"]
        );
    }

    #[test]
    fn teams_come_from_data_without_roster() {
        let session = open_fixture();
        let config = AnalysisConfig {
            roster_sheet: "No Such Sheet".into(),
            ..AnalysisConfig::default()
        };
        let session = Session::new(session.workbook.clone(), config);
        assert_eq!(
            session.team_options(&Selection::All).unwrap(),
            vec!["Design", "Ops", "Sales"]
        );
        assert_eq!(
            session.team_options(&Selection::from_choices(["Q1"])).unwrap(),
            vec!["Ops", "Sales"]
        );
    }

    #[test]
    fn analyzes_every_quarter_by_default() {
        let session = open_fixture();
        let analysis = session.analyze(&AnalysisRequest::default()).unwrap();
        assert_eq!(analysis.quarters.len(), 2);

        let q1 = &analysis.quarters[0];
        assert_eq!(q1.result.rows.len(), 3);
        assert_eq!(q1.metrics.total_meetings, 6);
        assert_eq!(q1.metrics.attended, 4);
        let ops = &q1.result.teams[0];
        assert_eq!(ops.team, "Ops");
        assert_eq!(ops.attendance_percentage, 75.0);

        let q2 = &analysis.quarters[1];
        assert_eq!(q2.metrics.total_meetings, 30);
        assert_eq!(q2.metrics.attended, 17);
        assert_eq!(q2.metrics.avg_working_period, Some(5.0));

        assert_eq!(analysis.employees.len(), 6);
    }

    #[test]
    fn filters_apply_per_run() {
        let session = open_fixture();
        let narrow = AnalysisRequest {
            quarters: Selection::from_choices(["Q1"]),
            teams: Selection::from_choices(["Ops"]),
            meetings: Selection::from_choices(["Retro"]),
        };
        let first = session.analyze(&narrow).unwrap();
        assert_eq!(first.quarters.len(), 1);
        assert_eq!(first.quarters[0].metrics.total_meetings, 2);
        assert_eq!(first.quarters[0].metrics.attended, 1);

        let wide = session.analyze(&AnalysisRequest::default()).unwrap();
        let again = session.analyze(&narrow).unwrap();
        assert_eq!(first, again);
        assert_eq!(wide.quarters[0].metrics.total_meetings, 6);
    }

    #[test]
    fn unknown_quarters_only_is_an_error() {
        let session = open_fixture();
        let request = AnalysisRequest {
            quarters: Selection::from_choices(["Q9"]),
            ..AnalysisRequest::default()
        };
        assert!(matches!(
            session.analyze(&request),
            Err(AttendanceError::SheetNotFound(_))
        ));
    }
}
