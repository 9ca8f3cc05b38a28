use crate::common::SyncError;
use crate::domain::entities::{SyncState, SyncStatusSnapshot};
use colored::{ColoredString, Colorize};
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::env;
use std::time::Duration;

/// Whether stdout should be colored: not disabled by flag or `NO_COLOR`,
/// and attached to a terminal
pub fn should_use_color(no_color_flag: bool) -> bool {
    !no_color_flag
        && env::var_os("NO_COLOR").is_none()
        && atty::is(atty::Stream::Stdout)
        && Term::stdout().features().colors_supported()
}

/// Display utilities for the CLI interface
pub struct DisplayHelper {
    pub use_color: bool,
}

impl DisplayHelper {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "⚠".yellow().bold(), message);
        } else {
            eprintln!("[WARNING] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Print a failed operation to stderr, the hint lines dimmed
    pub fn sync_error(&self, error: &SyncError) {
        let message = error.to_string();
        let mut lines = message.lines();
        let headline = lines.next().unwrap_or_default();

        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), headline);
            for line in lines {
                eprintln!("{}", line.dimmed());
            }
        } else {
            eprintln!("[ERROR] {}", headline);
            for line in lines {
                eprintln!("{}", line);
            }
        }
    }

    pub fn format_path(&self, path: &str) -> String {
        if self.use_color {
            path.cyan().to_string()
        } else {
            format!("'{}'", path)
        }
    }

    pub fn format_url(&self, url: &str) -> String {
        if self.use_color {
            url.blue().underline().to_string()
        } else {
            url.to_string()
        }
    }

    pub fn format_branch(&self, branch: &str) -> String {
        if self.use_color {
            branch.green().to_string()
        } else {
            format!("'{}'", branch)
        }
    }

    pub fn format_command(&self, command: &str) -> String {
        if self.use_color {
            command.magenta().bold().to_string()
        } else {
            format!("`{}`", command)
        }
    }

    pub fn format_state(&self, state: SyncState) -> String {
        if !self.use_color {
            return state.as_str().to_string();
        }
        let label = state.as_str();
        let styled: ColoredString = match state {
            SyncState::Clean => label.green(),
            SyncState::Ahead | SyncState::Behind => label.cyan(),
            SyncState::Diverged => label.magenta(),
            SyncState::Dirty => label.yellow(),
            SyncState::Conflicted => label.red(),
            SyncState::Unlinked => label.dimmed(),
        };
        styled.bold().to_string()
    }

    /// Spinner for a network step. Hidden when git may prompt for
    /// credentials on the same terminal, or when output is not colored.
    pub fn create_spinner(&self, message: &str, enabled: bool) -> ProgressBar {
        if !enabled || !self.use_color {
            return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", ""])
            .template("{spinner:.green} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Human-readable status block
    pub fn print_snapshot(&self, snapshot: &SyncStatusSnapshot) {
        println!("{:<8} {}", "paper:", self.format_path(snapshot.prefix.as_str()));
        match &snapshot.remote {
            Some(remote) => println!(
                "{:<8} {} {}",
                "remote:",
                remote.name,
                self.format_url(&remote.display_url())
            ),
            None => println!("{:<8} (none)", "remote:"),
        }
        print!("{:<8} {}", "state:", self.format_state(snapshot.state));
        if snapshot.is_linked() && (snapshot.ahead > 0 || snapshot.behind > 0) {
            print!(" (ahead {}, behind {})", snapshot.ahead, snapshot.behind);
        }
        println!();

        if !snapshot.changes.is_empty() {
            println!("uncommitted:");
            for path in &snapshot.changes {
                println!("  {}", self.format_path(path));
            }
        }
    }

    /// Print a next-step suggestion matching the reported state
    pub fn print_hint(&self, snapshot: &SyncStatusSnapshot) {
        let hint = match snapshot.state {
            SyncState::Unlinked => "expaper link-overleaf <url>",
            SyncState::Ahead => "expaper sync push",
            SyncState::Behind | SyncState::Diverged => "expaper sync pull",
            SyncState::Dirty => "git commit",
            SyncState::Conflicted => "git add <files> && git commit",
            SyncState::Clean => return,
        };
        println!("next:    {}", self.format_command(hint));
    }
}
