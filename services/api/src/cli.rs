use crate::demo::{run_demo, run_route, DemoArgs, RouteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use studio_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Studio Support Orchestrator",
    about = "Run the fitness-studio support intake service from the command line",
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
    /// Route a single ticket and print the resulting decision
    Route(RouteArgs),
    /// Run an offline end-to-end demo of the intake and roster flows
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Route(args) => run_route(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
