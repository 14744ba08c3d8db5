use crate::cli::actions::{inspect, verify, Action};
use anyhow::Result;
use std::io;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub fn execute(action: Action) -> Result<()> {
    let mut out = io::stdout().lock();
    match action {
        Action::Verify(args) => verify::execute(&args, &mut out),
        Action::Inspect(args) => inspect::execute(&args, &mut out),
    }
}
