// Command line console for the SBM network boot manager
use clap::{Parser, Subcommand};
use clap::CommandFactory; // Needed for print_help
use color_eyre::eyre::Result;
use sbm_client::{ClientConfig, ResourceClient};
use sbm_common::{ApiError, ResourceKind};
use tracing::{error, Level};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use std::io::stderr; // Logs go to stderr, command output to stdout

mod cmd;
mod terminal;

use cmd::boot_config::BootConfigCommand;
use cmd::machine::MachineCommand;
use cmd::variable::VariableCommand;

// Define the command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "SBM network boot manager console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SBM server URL (default: http://127.0.0.1:5000/)
    #[arg(long, global = true, env = "SBM_URI")]
    server: Option<String>,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manages boot configs.
    #[command(subcommand)]
    BootConfig(BootConfigCommand),
    /// Manages machines.
    #[command(subcommand)]
    Machine(MachineCommand),
    /// Manages variables.
    #[command(subcommand)]
    Variable(VariableCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ClientConfig::resolve(cli.server.as_deref())?;
    let client = ResourceClient::new(config);

    let result = match cli.command {
        Some(Commands::BootConfig(command)) => cmd::boot_config::run(command, client).await,
        Some(Commands::Machine(command)) => cmd::machine::run(command, client).await,
        Some(Commands::Variable(command)) => cmd::variable::run(command, client).await,
        None => {
            // Default invocation: report on the server, then show help.
            print_overview(&client).await;
            println!();
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = result {
        // Request failures were already shown by the presenter.
        if e.downcast_ref::<ApiError>().is_none() {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    // RUST_LOG takes precedence over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sbm={level},sbm_client={level},sbm_common={level},reqwest=warn,hyper=warn",
            level = log_level
        ))
    });
    let fmt_layer = fmt::layer().with_writer(stderr).with_target(false);
    registry().with(filter).with(fmt_layer).init();
}

async fn print_overview(client: &ResourceClient) {
    let base = client.base_url();
    // Collections are queried independently; one failing does not hide the others.
    let (boot_configs, machines, variables) = tokio::join!(
        client.list(ResourceKind::BootConfig),
        client.list(ResourceKind::Machine),
        client.list(ResourceKind::Variable),
    );
    let results = [
        (ResourceKind::BootConfig, boot_configs),
        (ResourceKind::Machine, machines),
        (ResourceKind::Variable, variables),
    ];

    if results.iter().all(|(_, result)| result.is_err()) {
        if let Some((_, Err(e))) = results.first() {
            println!("🔴 Could not reach SBM at {}: {}", base, e);
        }
        println!("    (Is SBM running? Is SBM_URI set correctly?)");
        return;
    }

    println!("✅ SBM is reachable at {}", base);
    for (kind, result) in results {
        let icon = match kind {
            ResourceKind::BootConfig => "📄",
            ResourceKind::Machine => "🖥️ ",
            ResourceKind::Variable => "🔧",
        };
        match result {
            Ok(items) => println!("  {} {} entries: {}", icon, kind, items.len()),
            Err(e) => println!("  🔴 {} entries unavailable: {}", kind, e),
        }
    }
}
