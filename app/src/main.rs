#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Args, Parser, Subcommand};
use command::{
    AskInput, AskStrategy, CommandStrategy, DialogAction, DialogInput, DialogStrategy, FileInput,
    FileStrategy, InitStrategy, VersionStrategy,
};
use jess_core::DialogId;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "jess")]
#[command(about = "Jess, an AI developer assistant", long_about = None)]
struct Cli {
    /// Read the API key from this file instead of the configured source
    #[arg(long, global = true, value_name = "PATH")]
    key_file: Option<PathBuf>,

    /// Log at info level to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, continue, show or delete dialogs
    Dialog(DialogArgs),
    /// Send a file with a prompt as a one-off request
    File {
        #[arg(short = 'i', long = "input", value_name = "PATH")]
        input: PathBuf,

        #[arg(short = 'p', long)]
        prompt: Option<String>,

        /// Ask for a refactoring of the file; replaces any --prompt
        #[arg(short = 'r', long)]
        refactor: bool,
    },
    /// Send a single message
    Ask {
        #[arg(short = 'm', long)]
        message: String,

        /// Use this dialog's stored history as context
        #[arg(long, value_name = "ID")]
        dialog: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DialogArgs {
    /// Print every stored dialog id
    #[arg(short = 'l', long)]
    list: bool,

    /// Continue (or start) a dialog interactively
    #[arg(
        short = 'c',
        long = "continue",
        value_name = "ID",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    resume: Option<String>,

    /// Print a dialog's history
    #[arg(short = 's', long, value_name = "ID")]
    show: Option<String>,

    /// Remove a dialog
    #[arg(short = 'd', long, value_name = "ID")]
    delete: Option<String>,
}

impl DialogArgs {
    fn into_action(self) -> anyhow::Result<DialogAction> {
        if self.list {
            return Ok(DialogAction::List);
        }
        if let Some(id) = self.resume {
            return Ok(DialogAction::Continue(DialogId::new(id)));
        }
        if let Some(id) = self.show {
            return Ok(DialogAction::Show(DialogId::new(id)));
        }
        if let Some(id) = self.delete {
            return Ok(DialogAction::Delete(DialogId::new(id)));
        }
        anyhow::bail!("one of --list, --continue, --show or --delete is required")
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Dialog(args) => {
            DialogStrategy
                .execute(DialogInput {
                    action: args.into_action()?,
                    key_file: cli.key_file,
                })
                .await
        }
        Commands::File {
            input,
            prompt,
            refactor,
        } => {
            FileStrategy
                .execute(FileInput {
                    path: input,
                    prompt,
                    refactor,
                    key_file: cli.key_file,
                })
                .await
        }
        Commands::Ask { message, dialog } => {
            AskStrategy
                .execute(AskInput {
                    message,
                    dialog: dialog.map(DialogId::new),
                    key_file: cli.key_file,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
