use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lens_core::{InvestigationSession, LensConfig, LensError, NavigationSignal, Navigator};
use lens_pipeline::{RunSnapshot, Schedule};
use lens_report::{canned_report, DisclosurePanels, InvestigationReport, SectionId};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;

mod intake;
mod render;
mod telemetry;

/// Exit code after Ctrl-C, as a shell would report it
const EXIT_INTERRUPTED: u8 = 130;
/// Exit code when the user's input has to change
const EXIT_USAGE: u8 = 2;

fn cli() -> Command {
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");
    let expand = Arg::new("expand")
        .long("expand")
        .action(ArgAction::Append)
        .value_parser(|s: &str| s.parse::<SectionId>())
        .help("Open a report section (summary, symptoms, evidence, causes, remediation, draft)");
    let expand_all = Arg::new("expand-all")
        .long("expand-all")
        .action(ArgAction::SetTrue)
        .help("Open every report section");

    Command::new("incident-lens")
        .version(lens_core::VERSION)
        .about("IncidentLens - guided incident investigation")
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("investigate")
                .about("Queue evidence files and run an investigation")
                .arg(
                    Arg::new("files")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Evidence files (logs, metrics, runbooks, screenshots)"),
                )
                .arg(config.clone())
                .arg(json.clone())
                .arg(expand.clone())
                .arg(expand_all.clone()),
        )
        .subcommand(
            Command::new("schedule")
                .about("Show the configured pipeline stages")
                .arg(config),
        )
        .subcommand(
            Command::new("report")
                .about("Print the canned report without running the pipeline")
                .arg(json)
                .arg(expand)
                .arg(expand_all),
        )
}

/// Logs every navigation signal with the page a web host would show
struct LogNavigator;

impl Navigator for LogNavigator {
    fn signal(&self, signal: NavigationSignal) {
        tracing::info!(%signal, route = signal.route(), "navigation");
    }
}

fn load_config(args: &ArgMatches) -> anyhow::Result<LensConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => LensConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(LensConfig::default()),
    }
}

fn panels_for(args: &ArgMatches, defaults: &[SectionId]) -> DisclosurePanels {
    if args.get_flag("expand-all") {
        return DisclosurePanels::new(&SectionId::ALL);
    }
    let mut panels = DisclosurePanels::new(defaults);
    for section in args.get_many::<SectionId>("expand").into_iter().flatten() {
        if !panels.is_open(*section) {
            panels.toggle(*section);
        }
    }
    panels
}

fn print_report(report: &InvestigationReport, panels: &DisclosurePanels) {
    println!("Investigation Results");
    println!("=====================");
    for line in render::report_lines(report, panels) {
        println!("{line}");
    }
}

/// Print the stage board on every transition until the run ends
async fn follow_progress(mut rx: watch::Receiver<RunSnapshot>, schedule: Schedule) {
    loop {
        let snapshot = rx.borrow_and_update().clone();
        println!();
        for line in render::progress_lines(&schedule, &snapshot) {
            println!("{line}");
        }
        if snapshot.status.is_terminal() || rx.changed().await.is_err() {
            break;
        }
    }
}

/// User errors become a message and [`EXIT_USAGE`], everything else propagates
fn exit_for(error: LensError) -> anyhow::Result<ExitCode> {
    if error.is_user_error() {
        eprintln!("incident-lens: {error}");
        return Ok(ExitCode::from(EXIT_USAGE));
    }
    Err(error.into())
}

async fn investigate(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;
    let paths: Vec<PathBuf> = args
        .get_many::<PathBuf>("files")
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    let files = intake::open_all(&paths)?;

    let mut session = match InvestigationSession::new(config) {
        Ok(session) => session.with_navigator(Arc::new(LogNavigator)),
        Err(e) => return exit_for(e),
    };
    session.add_evidence(files);

    println!("Evidence ({} files):", session.evidence().len());
    for line in render::evidence_lines(session.evidence()) {
        println!("{line}");
    }

    if let Err(e) = session.start_investigation() {
        return exit_for(e);
    }
    let printer = tokio::spawn(follow_progress(
        session.subscribe_progress(),
        session.schedule().clone(),
    ));

    let result = tokio::select! {
        result = session.wait_for_report() => Some(result),
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("listening for Ctrl-C")?;
            session.cancel();
            None
        }
    };
    if let Err(e) = printer.await {
        tracing::debug!(error = %e, "progress printer stopped");
    }

    let Some(result) = result else {
        eprintln!("Investigation cancelled");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    };
    match result {
        Ok(report) if args.get_flag("json") => {
            let doc = serde_json::json!({
                "session": session.id(),
                "evidence": session.evidence(),
                "report": &*report,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(report) => {
            println!();
            print_report(&report, &panels_for(args, &session.config().default_open_sections));
            Ok(ExitCode::SUCCESS)
        }
        Err(LensError::NoReport(reason)) => {
            eprintln!("Investigation stopped: {reason}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => exit_for(e),
    }
}

fn show_schedule(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;
    let schedule = config.schedule()?;
    println!("Pipeline stages:");
    for line in render::schedule_lines(&schedule, config.settle_delay_ms) {
        println!("{line}");
    }
    Ok(ExitCode::SUCCESS)
}

fn show_report(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let report = canned_report();
    if args.get_flag("json") {
        println!("{}", report.to_json_pretty()?);
    } else {
        print_report(&report, &panels_for(args, lens_report::DEFAULT_OPEN_SECTIONS));
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    telemetry::init(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("investigate", args)) => investigate(args).await,
        Some(("schedule", args)) => show_schedule(args),
        Some(("report", args)) => show_report(args),
        _ => Ok(ExitCode::FAILURE),
    }
}
