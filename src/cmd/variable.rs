use clap::{Args, Subcommand};
use color_eyre::eyre::{bail, Result};
use sbm_client::{Console, ResourceClient};
use sbm_common::{ResourceKind, Variable};
use std::path::PathBuf;

use crate::cmd::{apply, finish_output, read_text, State};
use crate::terminal::TerminalPresenter;

#[derive(Subcommand, Debug)]
pub enum VariableCommand {
    /// Lists variable keys.
    List,
    /// Prints a variable's value.
    Get {
        key: String,
        /// Print the JSON an edit form would submit.
        #[arg(long)]
        form: bool,
    },
    /// Creates or replaces a variable.
    Put(VariableArgs),
    /// Deletes a variable.
    Delete { key: String },
    /// Makes a variable present or absent, writing only on change.
    Apply {
        #[command(flatten)]
        variable: VariableArgs,
        #[arg(long, value_enum, default_value_t = State::Present)]
        state: State,
        /// Report what would change without writing.
        #[arg(long)]
        check: bool,
    },
}

#[derive(Args, Debug)]
pub struct VariableArgs {
    #[arg(long)]
    pub key: String,
    #[arg(long, conflicts_with = "value_file")]
    pub value: Option<String>,
    /// File holding the value, or `-` for stdin.
    #[arg(long)]
    pub value_file: Option<PathBuf>,
}

impl VariableArgs {
    fn into_variable(self) -> Result<Option<Variable>> {
        let value = match (self.value, self.value_file) {
            (Some(value), _) => Some(value),
            (None, Some(path)) => Some(read_text(&path)?),
            (None, None) => None,
        };
        Ok(value.map(|value| Variable { key: self.key, value }))
    }
}

pub async fn run(command: VariableCommand, client: ResourceClient) -> Result<()> {
    let mut console = Console::new(client, TerminalPresenter::stdio());
    match command {
        VariableCommand::List => console.load_list(ResourceKind::Variable).await?,
        VariableCommand::Get { key, form } => {
            console.presenter_mut().set_form_output(form);
            console.load_item(ResourceKind::Variable, &key).await?
        }
        VariableCommand::Put(args) => {
            let key = args.key.clone();
            let Some(variable) = args.into_variable()? else {
                bail!("variable '{}' needs --value or --value-file", key);
            };
            console.submit(&variable).await?;
        }
        VariableCommand::Delete { key } => console.remove(ResourceKind::Variable, &key).await?,
        VariableCommand::Apply { variable, state, check } => {
            let key = variable.key.clone();
            let desired = variable.into_variable()?;
            apply(console.client(), desired, &key, state, check).await?;
        }
    }
    finish_output(console.presenter_mut())
}
