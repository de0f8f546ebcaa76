use crate::demo::{run_demo, run_ppdb_export, DemoArgs, ExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sekolah::auth::hash_password;
use sekolah::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Sekolah Back Office",
    about = "Run the school website back office and its PPDB tooling from the command line",
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
    /// Offline PPDB roster tooling
    Ppdb {
        #[command(subcommand)]
        command: PpdbCommand,
    },
    /// Account maintenance helpers
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    /// Run an end-to-end PPDB intake and bulk-administration demo
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PpdbCommand {
    /// Export a roster JSON file to the administrator CSV format
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Print the argon2 hash of a password
    HashPassword {
        /// Plain-text password to hash
        password: String,
    },
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
        Command::Ppdb {
            command: PpdbCommand::Export(args),
        } => run_ppdb_export(args),
        Command::Auth {
            command: AuthCommand::HashPassword { password },
        } => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }
        Command::Demo(args) => run_demo(args),
    }
}
