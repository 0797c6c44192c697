use std::io::{BufRead, Write};

use anyhow::Result;

use headsup_ipc::{Command, Response, SettingItem};

use crate::core::HeadsUpSettings;
use crate::store::SettingsStore;

/// Serve line-delimited JSON commands until `quit` or end of input.
pub fn run<S, R, W>(settings: &mut HeadsUpSettings<S>, input: R, mut output: W) -> Result<()>
where
    S: SettingsStore,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (response, quit) = match serde_json::from_str::<Command>(&line) {
            Ok(Command::Quit) => (Response::Ok, true),
            Ok(cmd) => (handle_command(settings, cmd), false),
            Err(e) => (
                Response::Error {
                    message: format!("invalid command: {}", e),
                },
                false,
            ),
        };

        serde_json::to_writer(&mut output, &response)?;
        writeln!(output)?;
        output.flush()?;

        if quit {
            tracing::debug!("Session closed by client");
            break;
        }
    }

    Ok(())
}

pub fn handle_command<S: SettingsStore>(
    settings: &mut HeadsUpSettings<S>,
    cmd: Command,
) -> Response {
    match cmd {
        Command::Load => match settings.load() {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error {
                message: format!("{:#}", e),
            },
        },
        Command::GetItems => Response::Items {
            items: settings.snapshot().items(),
        },
        Command::GetItem { item } => match SettingItem::parse(&item) {
            None => Response::Error {
                message: format!("unknown item: {}", item),
            },
            Some(id) => match settings.snapshot().info(id) {
                Some(info) => Response::Item { item: info },
                None => Response::Error {
                    message: format!("item not available: {}", id),
                },
            },
        },
        Command::Change { item, value } => match settings.on_change(&item, &value) {
            Ok(accepted) => Response::Changed {
                accepted,
                item: if accepted {
                    SettingItem::parse(&item).and_then(|id| settings.snapshot().info(id))
                } else {
                    None
                },
            },
            Err(e) => Response::Error {
                message: format!("{:#}", e),
            },
        },
        Command::Quit => Response::Ok,
    }
}
