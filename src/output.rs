//! Presentation boundary.
//!
//! The pipeline hands over typed numbers; everything in this module turns
//! them into display strings, console tables or files.

use crate::error::Result;
use crate::reports::employees_across_quarters;
use crate::types::{
    Analysis, EmployeeAttendance, EmployeeRow, QuarterReport, QuarterSummary, SummaryStats,
    TeamAggregate, TeamSummaryRow,
};
use crate::util::{format_int, format_number, format_percent};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// Receives computed tables and renders them somewhere.
pub trait Presenter {
    fn quarter(&mut self, report: &QuarterReport) -> Result<()>;
    fn employees(&mut self, rows: &[EmployeeAttendance]) -> Result<()>;
    fn finish(&mut self, analysis: &Analysis) -> Result<()>;
}

/// Run every presenter over a finished analysis.
pub fn present(analysis: &Analysis, presenters: &mut [&mut dyn Presenter]) -> Result<()> {
    for p in presenters.iter_mut() {
        for report in &analysis.quarters {
            p.quarter(report)?;
        }
        p.employees(&analysis.employees)?;
        p.finish(analysis)?;
    }
    Ok(())
}

fn working_period(v: Option<f64>) -> String {
    v.map(|v| format_number(v, 2)).unwrap_or_else(|| "-".to_string())
}

pub fn team_rows(teams: &[TeamAggregate]) -> Vec<TeamSummaryRow> {
    teams
        .iter()
        .map(|t| TeamSummaryRow {
            team: t.team.clone(),
            members: t.members,
            working_period: working_period(t.avg_working_period),
            attended: t.attended,
            absent: t.absent,
            total_meetings: t.total_meetings,
            total_pct: format_percent(t.attendance_percentage),
        })
        .collect()
}

pub fn employee_rows(rows: &[EmployeeAttendance]) -> Vec<EmployeeRow> {
    rows.iter()
        .map(|r| EmployeeRow {
            quarter: r.quarter.clone(),
            employee_name: r.employee_name.clone(),
            team: r.team.clone(),
            working_period: working_period(r.working_period),
            attended: r.attended,
            absent: r.absent,
            total_meetings: r.total_meetings,
            total_pct: format_percent(r.attendance_percentage),
        })
        .collect()
}

pub fn summary_stats(analysis: &Analysis) -> SummaryStats {
    SummaryStats {
        generated_at: chrono::Local::now(),
        quarters: analysis
            .quarters
            .iter()
            .map(|q| QuarterSummary {
                quarter: q.quarter.clone(),
                teams: q.result.teams.iter().map(|t| t.team.clone()).collect(),
                meetings: q.result.meetings.clone(),
                metrics: q.metrics.clone(),
            })
            .collect(),
        total_employees: analysis.employees.len(),
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Team table with one column per selected meeting, between the working
/// period and the totals.
pub fn write_team_csv(path: &Path, report: &QuarterReport) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![
        "Team".to_string(),
        "Members".to_string(),
        "Working period".to_string(),
    ];
    header.extend(report.result.meetings.iter().cloned());
    header.extend(
        ["Attended", "Absent", "Total Meetings", "Total %age"]
            .iter()
            .map(|s| s.to_string()),
    );
    wtr.write_record(&header)?;

    for t in &report.result.teams {
        let mut record = vec![
            t.team.clone(),
            t.members.to_string(),
            working_period(t.avg_working_period),
        ];
        record.extend(t.meeting_attended.iter().map(|n| n.to_string()));
        record.push(t.attended.to_string());
        record.push(t.absent.to_string());
        record.push(t.total_meetings.to_string());
        record.push(format_percent(t.attendance_percentage));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("({} more rows)\n", format_int(rows.len() - max_rows));
    }
}

/// KPI lines and markdown previews on stdout.
pub struct ConsolePresenter {
    pub preview_rows: usize,
}

impl Presenter for ConsolePresenter {
    fn quarter(&mut self, report: &QuarterReport) -> Result<()> {
        let m = &report.metrics;
        println!("## {}\n", report.quarter);
        if !report.meetings_available.is_empty() {
            println!("Meetings: {}", report.result.meetings.join(", "));
        }
        println!("Total Meetings: {}", format_int(m.total_meetings));
        println!("Total Attended Meetings: {}", format_int(m.attended));
        println!("Attendance Percentage: {}", format_percent(m.attendance_percentage));
        println!("Avg. Working Period: {}\n", working_period(m.avg_working_period));
        preview_table_rows(&team_rows(&report.result.teams), self.preview_rows);
        Ok(())
    }

    fn employees(&mut self, rows: &[EmployeeAttendance]) -> Result<()> {
        println!("Working Period by Employee\n");
        preview_table_rows(&employee_rows(rows), self.preview_rows);
        Ok(())
    }

    fn finish(&mut self, _analysis: &Analysis) -> Result<()> {
        println!("---");
        Ok(())
    }
}

/// CSV tables per quarter, the stacked employee table and `summary.json`.
pub struct FileExporter {
    pub out_dir: PathBuf,
    pub written: Vec<PathBuf>,
}

impl FileExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            written: Vec::new(),
        }
    }

    fn target(&mut self, file: String) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file);
        self.written.push(path.clone());
        Ok(path)
    }
}

impl Presenter for FileExporter {
    fn quarter(&mut self, report: &QuarterReport) -> Result<()> {
        let teams = self.target(format!("{}_teams.csv", report.quarter))?;
        write_team_csv(&teams, report)?;

        let rows = employees_across_quarters(std::slice::from_ref(report));
        let employees = self.target(format!("{}_employees.csv", report.quarter))?;
        write_csv(&employees, &employee_rows(&rows))
    }

    fn employees(&mut self, rows: &[EmployeeAttendance]) -> Result<()> {
        let path = self.target("employees_all_quarters.csv".to_string())?;
        write_csv(&path, &employee_rows(rows))
    }

    fn finish(&mut self, analysis: &Analysis) -> Result<()> {
        let path = self.target("summary.json".to_string())?;
        write_json(&path, &summary_stats(analysis))
    }
}
