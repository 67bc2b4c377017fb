// Entry point and high-level CLI flow.
//
// One-shot mode loads the workbook, runs a single analysis for the filters
// given on the command line and writes the reports. `--interactive` keeps
// the workbook loaded and offers a menu:
// - [1] loads (or reloads) the workbook and prints diagnostics,
// - [2] chooses quarters, teams and meetings,
// - [3] generates the reports for the current choice,
// - [4] exits. End of input also exits.
mod config;
mod error;
mod loader;
mod meetings;
mod normalize;
mod output;
mod reports;
mod schema;
mod session;
#[cfg(test)]
mod test_support;
mod types;
mod util;

use clap::Parser;
use config::AnalysisConfig;
use error::Result;
use loader::Workbook;
use output::{ConsolePresenter, FileExporter, Presenter};
use reports::Selection;
use session::{AnalysisRequest, Session};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "attendance-report")]
#[command(about = "Team attendance analytics from quarterly meeting sheets", long_about = None)]
struct Cli {
    /// Workbook (.xlsx, .xls, .ods), a CSV export, a directory of CSV
    /// exports, or `-` to read xlsx data from stdin
    workbook: PathBuf,

    /// Quarter sheet to include (repeatable, default: all)
    #[arg(short, long = "quarter")]
    quarters: Vec<String>,

    /// Team to include (repeatable, default: all)
    #[arg(short, long = "team")]
    teams: Vec<String>,

    /// Meeting to include (repeatable, default: all)
    #[arg(short, long = "meeting")]
    meetings: Vec<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the exported reports
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Rows shown in console previews
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Keep the workbook loaded and pick filters from a menu
    #[arg(short, long)]
    interactive: bool,
}

impl Cli {
    fn request(&self) -> AnalysisRequest {
        AnalysisRequest {
            quarters: Selection::from_choices(&self.quarters),
            teams: Selection::from_choices(&self.teams),
            meetings: Selection::from_choices(&self.meetings),
        }
    }

    fn load_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(dir) = &self.out_dir {
            config.output_dir = dir.clone();
        }
        if let Some(n) = self.preview_rows {
            config.preview_rows = n;
        }
        Ok(config)
    }
}

/// One trimmed line, or `None` once the input is exhausted.
fn read_line_from<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Print `label` and read one line from stdin.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_line_from(&mut io::stdin().lock())
}

#[derive(Debug, PartialEq, Eq)]
enum MenuChoice {
    Load,
    Filters,
    Generate,
    Exit,
    Invalid,
}

impl MenuChoice {
    fn parse(line: Option<&str>) -> Self {
        match line {
            None | Some("4") => MenuChoice::Exit,
            Some("1") => MenuChoice::Load,
            Some("2") => MenuChoice::Filters,
            Some("3") => MenuChoice::Generate,
            Some(_) => MenuChoice::Invalid,
        }
    }
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` or the
/// input ended.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = prompt("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn split_choices(line: &str) -> Selection {
    Selection::from_choices(line.split(','))
}

fn prompt_choices(label: &str) -> Selection {
    split_choices(&prompt(label).unwrap_or_default())
}

/// Load the workbook and print a short summary of what was found.
fn handle_load(path: &Path, config: AnalysisConfig) -> Result<Session> {
    let (workbook, report) = if path == Path::new("-") {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        Workbook::from_xlsx_bytes(&bytes)?
    } else {
        Workbook::open(path)?
    };
    let session = Session::new(workbook, config);
    println!(
        "Loaded workbook... ({} sheets, {} rows, quarters: {})",
        util::format_int(report.sheets),
        util::format_int(report.total_rows),
        session.quarters().join(", ")
    );
    println!();
    Ok(session)
}

/// Show the available options and read a new filter choice.
fn handle_filters(session: &Session) -> Result<AnalysisRequest> {
    let quarters = session.quarters();
    println!("Quarters: {}", quarters.join(", "));
    let quarter_choice = prompt_choices("Select quarters (comma separated, blank for all): ");

    let teams = session.team_options(&quarter_choice)?;
    println!("Teams: {}", teams.join(", "));
    let team_choice = prompt_choices("Choose teams (comma separated, blank for all): ");

    for quarter in quarter_choice.resolve(&quarters) {
        let meetings = session.meetings(&quarter)?;
        if !meetings.is_empty() {
            println!("{} meetings: {}", quarter, meetings.join(", "));
        }
    }
    let meeting_choice = prompt_choices("Select meetings (comma separated, blank for all): ");
    println!();

    Ok(AnalysisRequest {
        quarters: quarter_choice,
        teams: team_choice,
        meetings: meeting_choice,
    })
}

/// Run the analysis, print previews and write every report file.
fn handle_generate_reports(session: &Session, request: &AnalysisRequest) -> Result<()> {
    println!("Generating reports...\n");
    let analysis = session.analyze(request)?;

    let mut console = ConsolePresenter {
        preview_rows: session.config().preview_rows,
    };
    let mut exporter = FileExporter::new(session.config().output_dir.clone());
    {
        let mut presenters: [&mut dyn Presenter; 2] = [&mut console, &mut exporter];
        output::present(&analysis, &mut presenters)?;
    }

    println!("Outputs saved to {}:", session.config().output_dir.display());
    for path in &exporter.written {
        println!("  {}", path.display());
    }
    println!();
    Ok(())
}

fn run_once(cli: &Cli, config: AnalysisConfig) -> Result<()> {
    let session = handle_load(&cli.workbook, config)?;
    handle_generate_reports(&session, &cli.request())
}

fn run_menu(cli: &Cli, config: AnalysisConfig) {
    let mut session: Option<Session> = None;
    let mut request = cli.request();
    loop {
        println!("Attendance Reports:");
        println!("[1] Load the workbook");
        println!("[2] Choose filters");
        println!("[3] Generate reports");
        println!("[4] Exit\n");
        match MenuChoice::parse(prompt("Enter choice: ").as_deref()) {
            MenuChoice::Load => match handle_load(&cli.workbook, config.clone()) {
                Ok(s) => session = Some(s),
                Err(e) => eprintln!("Failed to load workbook: {}\n", e),
            },
            MenuChoice::Filters => {
                let Some(s) = session.as_ref() else {
                    println!("Error: No workbook loaded. Please load it first (option 1).\n");
                    continue;
                };
                match handle_filters(s) {
                    Ok(r) => request = r,
                    Err(e) => eprintln!("Error: {}\n", e),
                }
            }
            MenuChoice::Generate => {
                let Some(s) = session.as_ref() else {
                    println!("Error: No workbook loaded. Please load it first (option 1).\n");
                    continue;
                };
                if let Err(e) = handle_generate_reports(s, &request) {
                    eprintln!("Error: {}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            MenuChoice::Exit => {
                println!("Exiting the program.");
                break;
            }
            MenuChoice::Invalid => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.interactive {
        if cli.workbook == Path::new("-") {
            eprintln!("Error: --interactive needs a workbook path; stdin is used for the menu");
            return ExitCode::FAILURE;
        }
        run_menu(&cli, config);
        return ExitCode::SUCCESS;
    }

    match run_once(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
