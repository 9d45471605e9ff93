// src/console.rs

//! Interactive command console.
//!
//! Reads one command per line and dispatches it to the [`Controller`].
//! `add` and `remove` prompt for their arguments on the following lines.
//! The loop ends on `quit`, on end of input, or when `shutdown` fires
//! (Ctrl-C); all three run the controller's quit sequence.

use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::controller::Controller;
use crate::errors::Result;

pub const PROMPT: &str = "Enter a command (status/start/stop/add/remove/quit): ";
pub const INVALID_COMMAND: &str = "Invalid command. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Start,
    Stop,
    Add,
    Remove,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(Command::Status),
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "add" => Ok(Command::Add),
            "remove" => Ok(Command::Remove),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// Run the console until `quit`, end of input or `shutdown`.
///
/// Generic over the reader and writer so tests can drive it with in-memory
/// buffers; production passes stdin/stdout.
pub async fn run_console<R, W>(
    mut controller: Controller,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        write_out(&mut output, &format!("\n{PROMPT}")).await?;
        let Some(line) = next_line(&mut lines, &shutdown).await? else {
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(_) if line.trim().is_empty() => continue,
            Err(err) => {
                debug!(error = %err, "rejected console input");
                write_line(&mut output, INVALID_COMMAND).await?;
                continue;
            }
        };
        debug!(?command, "console command");

        let reply = match command {
            Command::Status => Ok(controller.status()),
            Command::Start => controller.start(),
            Command::Stop => controller.stop().await,
            Command::Add => {
                write_out(&mut output, "Enter the URL to monitor: ").await?;
                let Some(url) = next_line(&mut lines, &shutdown).await? else {
                    break;
                };
                write_out(&mut output, "Enter the custom notification: ").await?;
                let Some(message) = next_line(&mut lines, &shutdown).await? else {
                    break;
                };
                controller.add(&url, &message)
            }
            Command::Remove => {
                write_out(&mut output, "Enter the URL to remove: ").await?;
                let Some(url) = next_line(&mut lines, &shutdown).await? else {
                    break;
                };
                controller.remove(&url)
            }
            Command::Quit => break,
        };

        match reply {
            Ok(text) => write_line(&mut output, &text).await?,
            Err(err) => write_line(&mut output, &format!("Error: {err}")).await?,
        }
    }

    controller.quit().await;
    write_line(&mut output, "Goodbye.").await?;
    Ok(())
}

/// `None` on end of input or shutdown.
async fn next_line<R>(lines: &mut Lines<R>, shutdown: &CancellationToken) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            info!("shutdown requested; leaving console");
            Ok(None)
        }
        line = lines.next_line() => {
            let line = line?;
            if line.is_none() {
                info!("console input closed; quitting");
            }
            Ok(line)
        }
    }
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    write_out(output, &format!("{text}\n")).await
}
