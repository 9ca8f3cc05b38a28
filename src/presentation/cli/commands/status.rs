use anyhow::Result;
use std::path::Path;

use crate::application::use_cases::SubtreeSyncEngine;
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::DisplayHelper;

/// Handler for `sync status`
pub struct StatusCommand {
    pub fetch: bool,
    pub output: OutputFormat,
}

impl StatusCommand {
    pub fn new(fetch: bool, output: OutputFormat) -> Self {
        Self { fetch, output }
    }

    pub async fn execute(
        &self,
        engine: &SubtreeSyncEngine,
        project_root: &Path,
        display: &DisplayHelper,
    ) -> Result<()> {
        let spinner = display.create_spinner(
            &format!("Fetching {}...", engine.settings().remote),
            self.fetch && !engine.settings().interactive_auth,
        );
        let result = engine.status(project_root, self.fetch).await;
        spinner.finish_and_clear();
        let snapshot = result?.snapshot;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&snapshot)?),
            OutputFormat::Text => {
                display.print_snapshot(&snapshot);
                display.print_hint(&snapshot);
            }
        }
        Ok(())
    }
}
