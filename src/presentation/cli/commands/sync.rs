use anyhow::Result;
use std::path::Path;

use crate::application::use_cases::SubtreeSyncEngine;
use crate::domain::entities::SyncAction;
use crate::presentation::ui::DisplayHelper;

/// Handler for `sync pull`
pub struct PullCommand {
    pub squash: bool,
}

impl PullCommand {
    pub fn new(squash: bool) -> Self {
        Self { squash }
    }

    pub async fn execute(
        &self,
        engine: &SubtreeSyncEngine,
        project_root: &Path,
        display: &DisplayHelper,
    ) -> Result<()> {
        let settings = engine.settings();
        let spinner = display.create_spinner(
            &format!("Pulling {}/{}...", settings.remote, settings.branch),
            !settings.interactive_auth,
        );
        let result = engine.pull(project_root, self.squash).await;
        spinner.finish_and_clear();
        let outcome = result?;

        display.success(&format!(
            "Pulled {}/{} into {} (now {})",
            settings.remote,
            display.format_branch(settings.branch.as_str()),
            display.format_path(outcome.prefix.as_str()),
            display.format_state(outcome.snapshot.state),
        ));
        Ok(())
    }
}

/// Handler for `sync push`
pub struct PushCommand;

impl PushCommand {
    pub async fn execute(
        &self,
        engine: &SubtreeSyncEngine,
        project_root: &Path,
        display: &DisplayHelper,
    ) -> Result<()> {
        let settings = engine.settings();
        let spinner = display.create_spinner(
            &format!("Pushing to {}/{}...", settings.remote, settings.branch),
            !settings.interactive_auth,
        );
        let result = engine.push(project_root).await;
        spinner.finish_and_clear();
        let outcome = result?;

        if outcome.action == SyncAction::NothingToPush {
            display.info(&format!(
                "Nothing to push: no local commits under {}",
                display.format_path(outcome.prefix.as_str()),
            ));
        } else {
            display.success(&format!(
                "Pushed {} to {}/{}",
                display.format_path(outcome.prefix.as_str()),
                settings.remote,
                display.format_branch(settings.branch.as_str()),
            ));
        }
        Ok(())
    }
}
