use crate::demo::{
    run_analytics, run_demo, run_resume_check, AnalyticsArgs, DemoArgs, ResumeCheckArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Board API",
    about = "Run the job board HTTP service or explore it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the admin analytics report for the demo data set
    Analytics(AnalyticsArgs),
    /// Walk through the applicant, organization and admin flows on demo data
    Demo(DemoArgs),
    /// Resume upload helpers
    Resume {
        #[command(subcommand)]
        command: ResumeCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ResumeCommand {
    /// Check a local file against the resume upload policy
    Check(ResumeCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the in-memory board with demo organizations, jobs and applications
    #[arg(long)]
    pub(crate) demo_data: bool,
    /// Email for an admin account created at startup
    #[arg(long, env = "BOARD_ADMIN_EMAIL")]
    pub(crate) admin_email: Option<String>,
    /// Password for the startup admin account
    #[arg(long, env = "BOARD_ADMIN_PASSWORD", hide_env_values = true)]
    pub(crate) admin_password: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analytics(args) => run_analytics(args),
        Command::Demo(args) => run_demo(args),
        Command::Resume {
            command: ResumeCommand::Check(args),
        } => run_resume_check(args),
    }
}
