use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use sbm_client::{ensure_absent, ensure_present, Outcome, Presenter, ReconcileError, ResourceClient};
use sbm_common::view::ErrorDialog;
use sbm_common::Resource;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::terminal::TerminalPresenter;

pub mod boot_config;
pub mod machine;
pub mod variable;

/// Desired state for `apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum State {
    Present,
    Absent,
}

/// Reads a text argument from a file, or stdin when the path is `-`.
pub fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .wrap_err("Failed to read from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))
}

/// Runs `ensure_present`/`ensure_absent` and prints the outcome.
pub async fn apply<R: Resource>(
    client: &ResourceClient,
    desired: Option<R>,
    key: &str,
    state: State,
    check: bool,
) -> Result<()> {
    debug!("Applying {} '{}' as {:?} (check: {})", R::KIND, key, state, check);
    let result = match (state, desired) {
        (State::Present, Some(record)) => ensure_present(client, &record, check).await,
        (State::Present, None) => {
            color_eyre::eyre::bail!("state 'present' needs the full {} definition", R::KIND)
        }
        (State::Absent, _) => ensure_absent(client, R::KIND, key, check).await,
    };

    let mut presenter = TerminalPresenter::stdio();
    match result {
        Ok(outcome) => {
            print_outcome(&mut presenter, &outcome, check)?;
            finish_output(&mut presenter)
        }
        Err(ReconcileError::Api(err)) => {
            presenter.show_error(ErrorDialog::from(&err));
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Surfaces any failed write to stdout as a command failure.
pub fn finish_output(presenter: &mut TerminalPresenter) -> Result<()> {
    presenter.finish().wrap_err("Failed to write output")
}

fn print_outcome(presenter: &mut TerminalPresenter, outcome: &Outcome, check: bool) -> Result<()> {
    let marker = match (outcome.changed, check) {
        (true, true) => "📝",
        (true, false) => "✅",
        (false, _) => "👌",
    };
    presenter
        .print_line(&format!("{} {}", marker, outcome.message))
        .wrap_err("Failed to write output")
}
