#![forbid(unsafe_code)]

mod cmd;
mod identity;
mod output;

use clap::{Parser, Subcommand};
use eventhub_core::config::{self, UserConfig};
use eventhub_core::moderation::Action;
use output::{CliError, OutputMode, Reported, render_error};
use std::env;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "eventhub: campus event registry",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this identity, usually an email (skips env resolution).
    #[arg(long = "as", global = true, value_name = "USER")]
    as_user: Option<String>,

    /// Role for this invocation: participant, organizer, or admin.
    #[arg(long, global = true)]
    role: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize an eventhub project",
        long_about = "Create .eventhub/ with a default config and an empty event list.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    eh init\n\n    # Initialize and add sample events\n    eh init --seed"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Add sample events",
        long_about = "Add the built-in sample events. Does nothing if any events exist.",
        after_help = "EXAMPLES:\n    eh seed\n\n    # Emit machine-readable output\n    eh seed --json"
    )]
    Seed,

    #[command(
        next_help_heading = "Setup",
        about = "Check storage health",
        long_about = "Verify storage is writable and the event list parses.",
        after_help = "EXAMPLES:\n    eh check\n\n    # Emit machine-readable output\n    eh check --json"
    )]
    Check,

    #[command(
        next_help_heading = "Browse",
        about = "List events",
        long_about = "List active upcoming events, with optional filters.",
        after_help = "EXAMPLES:\n    # Upcoming events\n    eh list\n\n    # Search within a category\n    eh list --search hackathon --category Technology\n\n    # Events I registered for\n    eh --as ana@campus.edu list --registered --all\n\n    # Emit machine-readable output\n    eh list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Show one event",
        long_about = "Show full details for a single event by ID.",
        after_help = "EXAMPLES:\n    eh show evt_1760857200000_k3j9x2m1a\n\n    # Emit machine-readable output\n    eh show evt_1760857200000_k3j9x2m1a --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Dashboard counts",
        long_about = "Show registration counts for the current identity, plus organizer and admin totals where the role allows.",
        after_help = "EXAMPLES:\n    eh --as ana@campus.edu stats\n\n    # Admin totals\n    eh --as dean@campus.edu --role admin stats --json"
    )]
    Stats,

    #[command(
        next_help_heading = "Browse",
        about = "Export all events as JSON",
        long_about = "Write every stored event as a JSON array in the storage format.",
        after_help = "EXAMPLES:\n    eh export > events.json\n\n    eh export --output backup.json"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Participate",
        about = "Register for an event",
        long_about = "Register the current identity for an active event with free seats.",
        after_help = "EXAMPLES:\n    eh --as ana@campus.edu register evt_1760857200000_k3j9x2m1a\n\n    # Emit machine-readable output\n    EVENTHUB_USER=ana@campus.edu eh register evt_1760857200000_k3j9x2m1a --json"
    )]
    Register(cmd::register::RegisterArgs),

    #[command(
        next_help_heading = "Organize",
        about = "Create an event",
        long_about = "Create an event organized by the current identity. Requires the organizer or admin role.",
        after_help = "EXAMPLES:\n    eh --as chess@campus.edu --role organizer create \\\n        --title \"Chess Open\" --description \"Rapid-format open tournament for all levels.\" \\\n        --date 2026-12-05 --start 14:00 --end 18:00 --venue \"Student Union\" \\\n        --category Social --seats 64"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Organize",
        about = "Cancel an active event",
        long_about = "Cancel an active event. Allowed for admins and the event's organizer.",
        after_help = "EXAMPLES:\n    eh --as chess@campus.edu --role organizer cancel evt_1760857200000_k3j9x2m1a"
    )]
    Cancel(cmd::moderate::TransitionArgs),

    #[command(
        next_help_heading = "Organize",
        about = "Delete an event",
        long_about = "Permanently remove an event. Allowed for admins and the event's organizer.",
        after_help = "EXAMPLES:\n    eh --as dean@campus.edu --role admin delete evt_1760857200000_k3j9x2m1a"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Moderate",
        about = "Approve a pending event",
        after_help = "EXAMPLES:\n    eh --role admin approve evt_1760857200000_k3j9x2m1a"
    )]
    Approve(cmd::moderate::TransitionArgs),

    #[command(
        next_help_heading = "Moderate",
        about = "Reject a pending event",
        after_help = "EXAMPLES:\n    eh --role admin reject evt_1760857200000_k3j9x2m1a"
    )]
    Reject(cmd::moderate::TransitionArgs),

    #[command(
        next_help_heading = "Moderate",
        about = "Mark an active event completed",
        after_help = "EXAMPLES:\n    eh --role admin complete evt_1760857200000_k3j9x2m1a"
    )]
    Complete(cmd::moderate::TransitionArgs),

    #[command(
        next_help_heading = "Moderate",
        about = "Reactivate a cancelled event",
        after_help = "EXAMPLES:\n    eh --role admin reinstate evt_1760857200000_k3j9x2m1a"
    )]
    Reinstate(cmd::moderate::TransitionArgs),

    #[command(
        next_help_heading = "Moderate",
        about = "Approve every pending event",
        after_help = "EXAMPLES:\n    eh --role admin approve-all --json"
    )]
    ApproveAll,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("EVENTHUB_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "eh=debug,eventhub_core=debug,info"
        } else {
            "eh=info,eventhub_core=warn,warn"
        })
    });

    let format = env::var("EVENTHUB_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, output: OutputMode, user_config: UserConfig) -> anyhow::Result<()> {
    let ctx = cmd::Context {
        cwd: env::current_dir()?,
        output,
        as_user: cli.as_user,
        role: cli.role,
        user_config,
    };

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &ctx.cwd),
        Commands::Seed => cmd::seed::run_seed(&ctx),
        Commands::Check => cmd::check::run_check(&ctx),
        Commands::List(ref args) => cmd::list::run_list(args, &ctx),
        Commands::Show(ref args) => cmd::show::run_show(args, &ctx),
        Commands::Stats => cmd::stats::run_stats(&ctx),
        Commands::Export(ref args) => cmd::export::run_export(args, &ctx),
        Commands::Register(ref args) => cmd::register::run_register(args, &ctx),
        Commands::Create(ref args) => cmd::create::run_create(args, &ctx),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, &ctx),
        Commands::Cancel(ref args) => cmd::moderate::run_transition(args, Action::Cancel, &ctx),
        Commands::Approve(ref args) => cmd::moderate::run_transition(args, Action::Approve, &ctx),
        Commands::Reject(ref args) => cmd::moderate::run_transition(args, Action::Reject, &ctx),
        Commands::Complete(ref args) => {
            cmd::moderate::run_transition(args, Action::Complete, &ctx)
        }
        Commands::Reinstate(ref args) => {
            cmd::moderate::run_transition(args, Action::Reinstate, &ctx)
        }
        Commands::ApproveAll => cmd::moderate::run_approve_all(&ctx),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Output mode only depends on user-level settings; project config is
    // loaded per command once the project root is known.
    let user_config = config::load_user_config().unwrap_or_else(|err| {
        eprintln!("warning: ignoring user config: {err:#}");
        UserConfig::default()
    });
    let output = OutputMode::from_resolved(&config::resolve_output_mode(
        cli.json,
        user_config.output.as_deref(),
    ));
    debug!(?output, command = ?cli.command, "starting");

    match run(cli, output, user_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<Reported>().is_some() => ExitCode::FAILURE,
        Err(err) => {
            if render_error(output, &CliError::new(format!("{err:#}"))).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
