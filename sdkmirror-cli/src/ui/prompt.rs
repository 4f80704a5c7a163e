//! Interactive confirmation prompt.

use dialoguer::Confirm;
use sdkmirror::summary::PendingSummary;
use sdkmirror::traits::Confirmer;

/// Asks on the terminal before downloading. Defaults to "no".
#[derive(Debug, Default)]
pub struct ConsoleConfirmer;

impl Confirmer for ConsoleConfirmer {
    fn confirm(&self, summary: &PendingSummary) -> bool {
        // A closed or non-interactive terminal counts as a refusal
        Confirm::new()
            .with_prompt(prompt_text(summary))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

fn prompt_text(summary: &PendingSummary) -> String {
    format!("{}. Continue?", summary.describe())
}
