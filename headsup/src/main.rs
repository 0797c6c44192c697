mod core;
mod resources;
mod session;
mod store;

use std::path::PathBuf;

use anyhow::{bail, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use crate::core::{Config, HeadsUpSettings};
use crate::resources::{DefaultProvider, FixedDefault, PackageResources, Unavailable};
use crate::store::FileStore;
use headsup_ipc::{ChangeValue, Command, ItemKind, Response, SettingItem};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// headsup - heads up notification settings
#[derive(FromArgs)]
struct Cli {
    /// settings store file (default: $HEADSUP_STORE or the user config dir)
    #[argh(option)]
    store: Option<PathBuf>,
    /// directory holding package resource files
    #[argh(option)]
    resources: Option<PathBuf>,
    /// user id for per-user settings (default: current uid)
    #[argh(option)]
    user: Option<u32>,
    /// decay timeout default in milliseconds, instead of the systemui resource
    #[argh(option)]
    decay_default: Option<u64>,
    /// behave as if systemui were not installed
    #[argh(switch)]
    no_systemui: bool,
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Show(ShowCmd),
    Get(GetCmd),
    Set(SetCmd),
    Serve(ServeCmd),
    Version(VersionCmd),
}

/// Show every setting with its summary
#[derive(FromArgs)]
#[argh(subcommand, name = "show")]
struct ShowCmd {}

/// Show a single setting
#[derive(FromArgs)]
#[argh(subcommand, name = "get")]
struct GetCmd {
    /// item id (e.g., expanded, snooze-time)
    #[argh(positional)]
    item: String,
}

/// Change a setting
#[derive(FromArgs)]
#[argh(subcommand, name = "set")]
struct SetCmd {
    /// item id (e.g., expanded, snooze-time)
    #[argh(positional)]
    item: String,
    /// on/off for toggles, milliseconds for durations
    #[argh(positional)]
    value: String,
}

/// Read JSON commands from stdin, one per line
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
struct ServeCmd {}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    let subcmd = match cli.command {
        None => {
            // No subcommand - show help (simulate --help)
            let args: Vec<&str> = vec!["headsup", "--help"];
            if let Err(e) = Cli::from_args(&args[..1], &args[1..]) {
                println!("{}", e.output);
            }
            return Ok(());
        }
        Some(SubCommand::Version(_)) => {
            println!("headsup {}", VERSION);
            return Ok(());
        }
        Some(subcmd) => subcmd,
    };

    // stdout carries session responses, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new()
        .with_store_path(cli.store)
        .with_resources_dir(cli.resources)
        .with_user_id(cli.user);
    tracing::debug!("Using {:?}", config);

    let store = FileStore::open(&config.store_path, config.user_id)?;
    tracing::debug!("Settings store at {}", store.path().display());
    let defaults: Box<dyn DefaultProvider> = match (cli.no_systemui, cli.decay_default) {
        (true, _) => Box::new(Unavailable),
        (false, Some(millis)) => Box::new(FixedDefault(millis)),
        (false, None) => Box::new(PackageResources::systemui(&config.resources_dir)),
    };
    let mut settings = HeadsUpSettings::activate(store, defaults);

    if let SubCommand::Serve(_) = subcmd {
        let stdin = std::io::stdin();
        return session::run(&mut settings, stdin.lock(), std::io::stdout());
    }

    let cmd = to_command(subcmd)?;
    print_response(session::handle_command(&mut settings, cmd));
    Ok(())
}

fn to_command(subcmd: SubCommand) -> Result<Command> {
    match subcmd {
        SubCommand::Version(_) | SubCommand::Serve(_) => {
            unreachable!("handled in main")
        }
        SubCommand::Show(_) => Ok(Command::GetItems),
        SubCommand::Get(cmd) => Ok(Command::GetItem { item: cmd.item }),
        SubCommand::Set(cmd) => {
            let value = parse_value(&cmd.item, &cmd.value)?;
            Ok(Command::Change {
                item: cmd.item,
                value,
            })
        }
    }
}

fn parse_value(item: &str, value: &str) -> Result<ChangeValue> {
    // Unknown items pass through so the controller can reject them
    match SettingItem::parse(item).map(SettingItem::kind) {
        Some(ItemKind::Toggle) => Ok(ChangeValue::Bool(parse_toggle(value)?)),
        Some(ItemKind::Duration) | None => Ok(ChangeValue::Text(value.to_string())),
    }
}

fn parse_toggle(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        _ => bail!("Unknown toggle value: {} (use on or off)", s),
    }
}

fn print_response(response: Response) {
    match response {
        Response::Ok => {}
        Response::Error { message } => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Response::Items { items } => {
            for item in items {
                println!("{}", item);
            }
        }
        Response::Item { item } => println!("{}", item),
        Response::Changed { accepted, item } => match (accepted, item) {
            (true, Some(item)) => println!("{}", item),
            (true, None) => {}
            (false, _) => {
                eprintln!("Error: setting not available");
                std::process::exit(1);
            }
        },
    }
}
