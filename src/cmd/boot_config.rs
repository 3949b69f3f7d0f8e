use clap::{Args, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use sbm_client::{Console, Presenter, ResourceClient};
use sbm_common::template;
use sbm_common::view::ErrorDialog;
use sbm_common::{ApiError, BootConfig, ResourceKind};
use std::path::PathBuf;
use tracing::info;

use crate::cmd::{apply, finish_output, read_text, State};
use crate::terminal::TerminalPresenter;

#[derive(Subcommand, Debug)]
pub enum BootConfigCommand {
    /// Lists boot config titles.
    List,
    /// Prints a boot config.
    Get {
        title: String,
        /// Print the JSON an edit form would submit.
        #[arg(long)]
        form: bool,
    },
    /// Creates or replaces a boot config.
    Put(BootConfigArgs),
    /// Deletes a boot config.
    Delete { title: String },
    /// Makes a boot config present or absent, writing only on change.
    Apply {
        #[arg(long)]
        title: String,
        /// File holding the config body, or `-` for stdin. Required for `present`.
        #[arg(long)]
        config_file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = State::Present)]
        state: State,
        /// Report what would change without writing.
        #[arg(long)]
        check: bool,
    },
    /// Prints a boot config with variables substituted.
    Preview { title: String },
}

#[derive(Args, Debug)]
pub struct BootConfigArgs {
    #[arg(long)]
    pub title: String,
    /// File holding the config body, or `-` for stdin.
    #[arg(long)]
    pub config_file: PathBuf,
}

pub async fn run(command: BootConfigCommand, client: ResourceClient) -> Result<()> {
    let mut console = Console::new(client, TerminalPresenter::stdio());
    match command {
        BootConfigCommand::List => console.load_list(ResourceKind::BootConfig).await?,
        BootConfigCommand::Get { title, form } => {
            console.presenter_mut().set_form_output(form);
            console.load_item(ResourceKind::BootConfig, &title).await?
        }
        BootConfigCommand::Put(args) => {
            let record = BootConfig {
                title: args.title,
                config: read_text(&args.config_file)?,
            };
            console.submit(&record).await?;
        }
        BootConfigCommand::Delete { title } => console.remove(ResourceKind::BootConfig, &title).await?,
        BootConfigCommand::Apply {
            title,
            config_file,
            state,
            check,
        } => {
            let desired = config_file
                .map(|path| read_text(&path))
                .transpose()?
                .map(|config| BootConfig {
                    title: title.clone(),
                    config,
                });
            apply(console.client(), desired, &title, state, check).await?;
        }
        BootConfigCommand::Preview { title } => preview(&mut console, &title).await?,
    }
    finish_output(console.presenter_mut())
}

async fn preview(console: &mut Console<TerminalPresenter>, title: &str) -> Result<()> {
    let client = console.client().clone();
    let fetched = async {
        let boot_config = client.boot_config(title).await?;
        let vars = client.variable_map().await?;
        Ok::<_, ApiError>((boot_config, vars))
    }
    .await;
    let (boot_config, vars) = match fetched {
        Ok(found) => found,
        Err(err) => {
            console.presenter_mut().show_error(ErrorDialog::from(&err));
            return Err(err.into());
        }
    };
    info!("Rendering '{}' with {} variables", title, vars.len());
    let rendered = template::render(&boot_config.config, &vars)
        .wrap_err_with(|| format!("Failed to render boot config '{}'", title))?;
    console
        .presenter_mut()
        .print_block(&rendered)
        .wrap_err("Failed to write output")
}
