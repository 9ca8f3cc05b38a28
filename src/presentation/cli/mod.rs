pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::application::use_cases::SubtreeSyncEngine;
use crate::common::SyncError;
use crate::domain::entities::sync_settings::DEFAULT_PAPER_DIR;
use crate::domain::entities::{SyncOperation, SyncSettings};
use crate::domain::value_objects::BranchName;
use crate::infrastructure::{locate_project_root, GitCliExecutor, SettingsStore};
use crate::presentation::ui::{should_use_color, DisplayHelper};

use commands::{LinkCommand, PullCommand, PushCommand, StatusCommand, UnlinkCommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("EXPAPER_GIT_HASH"),
    " ",
    env!("EXPAPER_BUILD_DATE"),
    ")"
);

const AFTER_HELP: &str = "\
Run one expaper command at a time per project: concurrent runs against the
same repository are not supported and may leave the index locked.

Exit codes: 0 ok, 1 unknown git failure, 3 not a repository, 4 remote not
configured, 5 remote conflict, 6 prefix already linked, 7 dirty working tree,
8 conflicted, 9 network/auth, 10 invalid argument, 11 configuration,
12 prefix not linked, 13 push rejected.";

/// Output format options for the status command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// expaper - keep a research project's paper in sync with Overleaf
#[derive(Debug, Parser)]
#[command(name = "expaper")]
#[command(about = "Sync a project's paper directory with an Overleaf git repository")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Name of the git remote bound to the paper
    #[arg(long, global = true, env = "EXPAPER_REMOTE")]
    pub remote: Option<String>,

    /// Remote branch to sync with
    #[arg(long, global = true, env = "EXPAPER_BRANCH")]
    pub branch: Option<String>,

    /// Never let git prompt for credentials; fail instead
    #[arg(long, global = true, env = "EXPAPER_NON_INTERACTIVE")]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Link the paper directory to an Overleaf git repository
    #[command(alias = "link")]
    LinkOverleaf {
        /// Git URL of the Overleaf project
        url: String,

        /// Repoint an existing remote with a different URL
        #[arg(long)]
        replace_remote: bool,
    },

    /// Pull, push or inspect the linked paper
    Sync {
        #[command(subcommand)]
        action: SyncCommands,
    },

    /// Remove the remote binding; the paper content stays
    #[command(alias = "unlink")]
    UnlinkOverleaf,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Merge new Overleaf commits into the paper directory
    Pull {
        /// Keep the full remote history instead of one squash commit
        #[arg(long)]
        no_squash: bool,
    },

    /// Publish local paper commits to Overleaf
    Push,

    /// Show whether the paper is ahead, behind or diverged
    Status {
        /// Fetch the remote before comparing
        #[arg(long)]
        fetch: bool,

        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

impl Commands {
    fn operation(&self) -> SyncOperation {
        match self {
            Commands::LinkOverleaf { .. } => SyncOperation::Link,
            Commands::Sync { action } => match action {
                SyncCommands::Pull { .. } => SyncOperation::Pull,
                SyncCommands::Push => SyncOperation::Push,
                SyncCommands::Status { .. } => SyncOperation::Status,
            },
            Commands::UnlinkOverleaf => SyncOperation::Unlink,
        }
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the parsed command and return the process exit code. Sync
    /// failures are rendered here; anything else is left to the caller.
    pub async fn run(self) -> Result<i32> {
        let display = DisplayHelper::new(should_use_color(self.cli.no_color));
        colored::control::set_override(display.use_color);

        match self.handle_command(&display).await {
            Ok(()) => Ok(0),
            Err(err) => match err.downcast_ref::<SyncError>() {
                Some(sync_error) => {
                    display.sync_error(sync_error);
                    Ok(sync_error.exit_code())
                }
                None => Err(err),
            },
        }
    }

    async fn handle_command(&self, display: &DisplayHelper) -> Result<()> {
        let project_root = self.project_root()?;
        let settings = self.settings(&project_root)?;
        let interactive = settings.interactive_auth;
        let engine = SubtreeSyncEngine::new(
            Arc::new(GitCliExecutor::new().with_interactive_auth(interactive)),
            settings,
        );

        match &self.cli.command {
            Commands::LinkOverleaf {
                url,
                replace_remote,
            } => {
                LinkCommand::new(url.clone(), *replace_remote)
                    .execute(&engine, &project_root, display)
                    .await
            }
            Commands::Sync { action } => match action {
                SyncCommands::Pull { no_squash } => {
                    PullCommand::new(!no_squash)
                        .execute(&engine, &project_root, display)
                        .await
                }
                SyncCommands::Push => PushCommand.execute(&engine, &project_root, display).await,
                SyncCommands::Status { fetch, output } => {
                    StatusCommand::new(*fetch, *output)
                        .execute(&engine, &project_root, display)
                        .await
                }
            },
            Commands::UnlinkOverleaf => UnlinkCommand.execute(&engine, &project_root, display).await,
        }
    }

    /// Project root for this invocation, found upward from `-C` or the
    /// current directory.
    ///
    /// The walk runs before settings are loaded, so it looks for the default
    /// `paper/` directory. A project with a custom `paper_dir` is found
    /// through its `.expaper.yml` or its `experiments/` directory; without
    /// either, run from the project root or pass `-C`.
    fn project_root(&self) -> Result<PathBuf> {
        let start = match &self.cli.directory {
            Some(dir) => dir.clone(),
            None => env::current_dir()?,
        };
        let root = locate_project_root(&start, DEFAULT_PAPER_DIR);
        debug!(start = %start.display(), root = %root.display(), "located project root");
        Ok(root)
    }

    /// Settings file values, overridden by flags and environment
    fn settings(&self, project_root: &Path) -> Result<SyncSettings, SyncError> {
        let store = SettingsStore::new(project_root);
        let mut settings = store
            .load()
            .map_err(|err| SyncError::configuration(err.path(), err.to_string()))?;

        if let Some(remote) = &self.cli.remote {
            settings = settings.with_remote(remote.clone());
        }
        if let Some(branch) = &self.cli.branch {
            let branch = BranchName::new(branch).map_err(|err| {
                SyncError::invalid_argument(self.cli.command.operation(), "branch", branch, err)
            })?;
            settings = settings.with_branch(branch);
        }
        if self.cli.non_interactive {
            settings = settings.with_interactive_auth(false);
        }
        Ok(settings)
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
