use clap::{Args, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use sbm_client::{Console, Presenter, ResourceClient};
use sbm_common::view::ErrorDialog;
use sbm_common::{Machine, ResourceKind, SwitchType, TimeBetween, DEFAULT_TIME_BETWEEN};

use crate::cmd::{apply, finish_output, State};
use crate::terminal::TerminalPresenter;

#[derive(Subcommand, Debug)]
pub enum MachineCommand {
    /// Lists machine hostnames.
    List,
    /// Prints a machine definition.
    Get {
        hostname: String,
        /// Print the JSON an edit form would submit.
        #[arg(long)]
        form: bool,
    },
    /// Creates or replaces a machine.
    Put(MachineArgs),
    /// Deletes a machine.
    Delete { hostname: String },
    /// Makes a machine present or absent, writing only on change.
    Apply {
        #[arg(long)]
        hostname: String,
        /// Required for `present`.
        #[arg(long)]
        default_boot: Option<String>,
        /// Required for `present`.
        #[arg(long)]
        alternate_boot: Option<String>,
        #[arg(long, value_enum, default_value_t = SwitchMode::Switched)]
        switch_type: SwitchMode,
        #[arg(long, default_value_t = DEFAULT_TIME_BETWEEN)]
        time_between: i64,
        #[arg(long, value_enum, default_value_t = State::Present)]
        state: State,
        /// Report what would change without writing.
        #[arg(long)]
        check: bool,
    },
    /// Prints the boot script the machine would receive next.
    BootTest { hostname: String },
}

#[derive(Args, Debug)]
pub struct MachineArgs {
    #[arg(long)]
    pub hostname: String,
    /// Boot config title used normally.
    #[arg(long)]
    pub default_boot: String,
    /// Boot config title used when switched over.
    #[arg(long)]
    pub alternate_boot: String,
    #[arg(long, value_enum, default_value_t = SwitchMode::Switched)]
    pub switch_type: SwitchMode,
    /// Seconds between boots for timed machines.
    #[arg(long, default_value_t = DEFAULT_TIME_BETWEEN)]
    pub time_between: i64,
}

/// Switch policies the server accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchMode {
    /// Boots the alternate config while the machine's flag is set.
    Switched,
    /// Flips between default and alternate on every boot.
    Alternating,
    /// Boots the alternate config when the last boot was under
    /// `time_between` seconds ago.
    Timed,
}

impl From<SwitchMode> for SwitchType {
    fn from(mode: SwitchMode) -> Self {
        match mode {
            SwitchMode::Switched => SwitchType::Switched,
            SwitchMode::Alternating => SwitchType::Alternating,
            SwitchMode::Timed => SwitchType::Timed,
        }
    }
}

impl From<MachineArgs> for Machine {
    fn from(args: MachineArgs) -> Self {
        let mut machine = Machine::new(args.hostname, args.default_boot, args.alternate_boot);
        machine.switch_type = SwitchType::from(args.switch_type);
        machine.time_between = TimeBetween::Seconds(args.time_between);
        machine
    }
}

pub async fn run(command: MachineCommand, client: ResourceClient) -> Result<()> {
    let mut console = Console::new(client, TerminalPresenter::stdio());
    match command {
        MachineCommand::List => console.load_list(ResourceKind::Machine).await?,
        MachineCommand::Get { hostname, form } => {
            console.presenter_mut().set_form_output(form);
            console.load_item(ResourceKind::Machine, &hostname).await?
        }
        MachineCommand::Put(args) => console.submit(&Machine::from(args)).await?,
        MachineCommand::Delete { hostname } => console.remove(ResourceKind::Machine, &hostname).await?,
        MachineCommand::Apply {
            hostname,
            default_boot,
            alternate_boot,
            switch_type,
            time_between,
            state,
            check,
        } => {
            let desired = default_boot.zip(alternate_boot).map(|(default_boot, alternate_boot)| {
                Machine::from(MachineArgs {
                    hostname: hostname.clone(),
                    default_boot,
                    alternate_boot,
                    switch_type,
                    time_between,
                })
            });
            apply(console.client(), desired, &hostname, state, check).await?;
        }
        MachineCommand::BootTest { hostname } => {
            let script = console.client().boot_test(&hostname).await;
            match script {
                Ok(script) => console
                    .presenter_mut()
                    .print_block(&script)
                    .wrap_err("Failed to write output")?,
                Err(err) => {
                    console.presenter_mut().show_error(ErrorDialog::from(&err));
                    return Err(err.into());
                }
            }
        }
    }
    finish_output(console.presenter_mut())
}
