use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod cli_exec;

#[derive(Parser)]
#[command(name = "stageboard")]
#[command(about = "Edit a repository-hosted pipeline stage list", long_about = None)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug, Default)]
pub(crate) struct TargetArgs {
    /// Repository owner (defaults to the remembered one)
    #[arg(long, global = true)]
    pub(crate) owner: Option<String>,

    /// Repository name (defaults to the remembered one)
    #[arg(long, global = true)]
    pub(crate) repo: Option<String>,

    /// Branch holding the pipeline file
    #[arg(long, global = true)]
    pub(crate) branch: Option<String>,

    /// Path of the pipeline file inside the repository
    #[arg(long, global = true)]
    pub(crate) path: Option<String>,

    /// Access token (never written to disk)
    #[arg(long, env = "STAGEBOARD_TOKEN", hide_env_values = true, global = true)]
    pub(crate) token: Option<String>,

    /// Base URL of the hosting API
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,

    /// State directory (defaults to ./.stageboard)
    #[arg(long, global = true)]
    pub(crate) state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive stage editor (default)
    Edit,

    /// Load the pipeline file and list its stages
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the dropdown and badge preview of the current stages
    Preview {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the stage list with the stages in a local JSON file and commit it
    Apply {
        /// JSON array of stages, or a whole pipeline document
        #[arg(long)]
        stages_file: PathBuf,
        /// Write without asking; otherwise only show what would be written
        #[arg(long)]
        yes: bool,
    },

    /// Remove the remembered repository coordinates
    Forget,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Edit) => stageboard::tui::run(stageboard::tui::TuiRunOptions {
            owner: cli.target.owner,
            repo: cli.target.repo,
            branch: cli.target.branch,
            path: cli.target.path,
            token: cli.target.token,
            api_url: cli.target.api_url,
            state_dir: cli.target.state_dir,
        }),
        Some(command) => {
            stageboard::logging::init_stderr();
            cli_exec::handle_command(&cli.target, command)
        }
    }
}
