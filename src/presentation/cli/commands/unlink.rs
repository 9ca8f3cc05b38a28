use anyhow::Result;
use std::path::Path;

use crate::application::use_cases::SubtreeSyncEngine;
use crate::presentation::ui::DisplayHelper;

/// Handler for the unlink-overleaf command
pub struct UnlinkCommand;

impl UnlinkCommand {
    pub async fn execute(
        &self,
        engine: &SubtreeSyncEngine,
        project_root: &Path,
        display: &DisplayHelper,
    ) -> Result<()> {
        let outcome = engine.unlink(project_root).await?;

        let remote = outcome
            .remote
            .as_ref()
            .map(|binding| binding.name.as_str())
            .unwrap_or(engine.settings().remote.as_str());
        display.success(&format!(
            "Removed remote '{}'; {} and its history are kept",
            remote,
            display.format_path(outcome.prefix.as_str()),
        ));
        Ok(())
    }
}
