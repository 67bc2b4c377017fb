// Fixture workbook shared by the loader, schema and session tests.
//
// Q1 is fine-grained (Standup and Retro, three sub-columns each), Q2 is
// coarse, and the roster lists Ops, Sales and Design. Column A is left empty
// on every sheet.
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};

enum Cell<'a> {
    S(&'a str),
    N(f64),
    Skip,
}
use Cell::{Skip, N, S};

fn write_row(ws: &mut Worksheet, row: u32, cells: &[Cell]) {
    for (i, cell) in cells.iter().enumerate() {
        let col = (i + 1) as u16;
        match cell {
            S(s) => {
                ws.write_string(row, col, *s).unwrap();
            }
            N(n) => {
                ws.write_number(row, col, *n).unwrap();
            }
            Skip => {}
        }
    }
}

pub fn write_fixture_workbook(dir: &Path) -> PathBuf {
    let mut workbook = Workbook::new();

    let q1 = workbook.add_worksheet();
    q1.set_name("Q1").unwrap();
    write_row(q1, 0, &[S("Q1 Meeting Attendance")]);
    write_row(q1, 1, &[Skip, Skip, Skip, S("Standup"), Skip, Skip, S("Retro")]);
    write_row(
        q1,
        2,
        &[
            S("Employee Name"),
            S("Team"),
            S("Working period"),
            S("Date"),
            S("Attendance"),
            S("Notes"),
            S("Date"),
            S("Attendance"),
            S("Notes"),
            S("Attended"),
            S("Absent"),
            S("Total Meetings"),
            S("Total %age"),
        ],
    );
    write_row(
        q1,
        3,
        &[
            S("Alice"),
            S("Ops"),
            N(3.0),
            S("Jan 5"),
            S("Yes"),
            Skip,
            S("Jan 9"),
            S("No"),
            Skip,
            N(1.0),
            N(1.0),
            N(2.0),
        ],
    );
    write_row(
        q1,
        4,
        &[
            S("Bob"),
            S("Ops"),
            N(5.0),
            S("Jan 5"),
            S("Yes"),
            Skip,
            S("Jan 9"),
            S("Yes"),
            S("on time"),
            N(2.0),
            N(0.0),
            N(2.0),
        ],
    );
    write_row(
        q1,
        5,
        &[S("Cara"), S("Sales"), N(2.0), S("Jan 5"), S("Late"), Skip, S("Jan 9"), S("Yes")],
    );
    write_row(q1, 6, &[N(1.0), N(1.0)]);
    write_row(
        q1,
        7,
        &[S("Dan"), Skip, N(4.0), S("Jan 5"), S("Yes"), Skip, S("Jan 9"), S("Yes")],
    );

    let q2 = workbook.add_worksheet();
    q2.set_name("Q2").unwrap();
    write_row(q2, 0, &[S("Q2 Meeting Attendance")]);
    write_row(q2, 1, &[S("All meetings")]);
    write_row(
        q2,
        2,
        &[
            S("Employee Name"),
            S("Team"),
            S("Working period"),
            S("Attended"),
            S("Absent"),
            S("Total Meetings"),
        ],
    );
    write_row(q2, 3, &[S("Alice"), S("Ops"), N(3.0), N(8.0), N(2.0), N(10.0)]);
    write_row(q2, 4, &[S("Bob"), S("Ops"), S("n/a"), N(4.0), N(6.0), N(10.0)]);
    write_row(q2, 5, &[S("Eve"), S("Design"), N(7.0), N(5.0), N(5.0), N(10.0)]);
    write_row(q2, 6, &[N(1.0), N(1.0), Skip, N(9.0)]);

    let roster = workbook.add_worksheet();
    roster.set_name("Employee Master Sheet").unwrap();
    write_row(roster, 0, &[S("Employee Master")]);
    write_row(roster, 3, &[S("List of Teams")]);
    write_row(roster, 4, &[S("Ops")]);
    write_row(roster, 5, &[S("Sales")]);
    write_row(roster, 6, &[S("Ops")]);
    write_row(roster, 8, &[S("Design")]);

    let path = dir.join("attendance.xlsx");
    workbook.save(&path).unwrap();
    path
}
