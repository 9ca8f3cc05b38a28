use anyhow::Result;
use std::path::Path;

use crate::application::use_cases::{LinkRequest, SubtreeSyncEngine};

use crate::presentation::ui::DisplayHelper;

/// Handler for the link-overleaf command
pub struct LinkCommand {
    pub url: String,
    pub replace_remote: bool,
}

impl LinkCommand {
    pub fn new(url: String, replace_remote: bool) -> Self {
        Self { url, replace_remote }
    }

    pub async fn execute(
        &self,
        engine: &SubtreeSyncEngine,
        project_root: &Path,
        display: &DisplayHelper,
    ) -> Result<()> {
        let request = LinkRequest::new(self.url.clone()).with_replace_remote(self.replace_remote);
        let settings = engine.settings();

        let spinner = display.create_spinner(
            &format!("Adding {}/{} as a subtree...", settings.remote, settings.branch),
            !settings.interactive_auth,
        );
        let result = engine.link(project_root, &request).await;
        spinner.finish_and_clear();
        let outcome = result?;

        let remote = outcome
            .remote
            .as_ref()
            .map(|binding| format!(" ({})", display.format_url(&binding.display_url())))
            .unwrap_or_default();
        display.success(&format!(
            "Linked {} to {}{} on branch {}",
            display.format_path(outcome.prefix.as_str()),
            settings.remote,
            remote,
            display.format_branch(settings.branch.as_str()),
        ));
        display.info(&format!(
            "Edit on Overleaf, then run {}; commit locally, then run {}",
            display.format_command("expaper sync pull"),
            display.format_command("expaper sync push"),
        ));
        Ok(())
    }
}
