mod channel;
mod codec;
mod error;
mod logging;
mod platform;
mod settings;
mod system;
mod wallpaper;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::channel::{channel_name, Messenger, SYSTEM_CHANNEL, WALLPAPER_CHANNEL};
use crate::codec::{MethodCall, MethodResponse};
use crate::settings::BridgeSettings;
use crate::system::SystemHandler;
use crate::wallpaper::{apply_wallpaper, StyleMode, WallpaperHandler};

/// Desktop capabilities exposed over JSON method channels.
#[derive(Debug, Parser)]
#[command(name = "wallpaper_bridge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Invoke one method and print its result
    Call {
        /// Full channel name, or a suffix such as `wallpaper`
        channel: String,
        method: String,
        /// Arguments as JSON, e.g. '{"path": "C:\\images\\a.jpg"}'
        #[arg(long)]
        args: Option<String>,
    },
    /// Answer one JSON request per stdin line
    Serve,
    /// Apply a wallpaper directly
    Set {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = StyleMode::Fill)]
        style: StyleMode,
    },
    /// Print the settings file path, creating it with defaults if absent
    Config,
    /// List registered channels
    Channels,
}

/// One line of `serve` input.
#[derive(Debug, Deserialize)]
struct ServeRequest {
    channel: String,
    message: Value,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load();
    logging::init(&settings.log_filter);

    let messenger = build_messenger(&settings);
    match cli.command {
        Command::Call {
            channel,
            method,
            args,
        } => {
            let arguments = match args {
                Some(raw) => serde_json::from_str(&raw).context("--args is not valid JSON")?,
                None => Value::Null,
            };
            let channel = resolve_channel(&settings.channel_prefix, &channel);
            let value = call(&messenger, &channel, MethodCall::new(method, arguments))?;
            println!("{value}");
            Ok(())
        }
        Command::Serve => serve(&messenger, io::stdin().lock(), io::stdout().lock()),
        Command::Set { path, style } => {
            let path = std::path::absolute(&path)
                .with_context(|| format!("cannot resolve {}", path.display()))?;
            let Some(path) = path.to_str() else {
                bail!("path is not valid Unicode: {}", path.display());
            };
            apply_wallpaper(&platform::NativeDesktop, path, style)?;
            Ok(())
        }
        Command::Config => {
            let path = settings::settings_path()?;
            if !path.exists() {
                settings::save_to(&path, &BridgeSettings::default())?;
            }
            println!("{}", path.display());
            Ok(())
        }
        Command::Channels => {
            for name in messenger.channel_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn build_messenger(settings: &BridgeSettings) -> Messenger {
    let mut messenger = Messenger::new();
    messenger.register(
        channel_name(&settings.channel_prefix, WALLPAPER_CHANNEL),
        WallpaperHandler::new(platform::NativeDesktop),
    );
    messenger.register(
        channel_name(&settings.channel_prefix, SYSTEM_CHANNEL),
        SystemHandler::new(platform::NativeProxy::default()),
    );
    messenger
}

/// Expand a bare suffix like `wallpaper` into a full channel name.
fn resolve_channel(prefix: &str, channel: &str) -> String {
    if channel.contains('/') {
        channel.to_string()
    } else {
        channel_name(prefix, channel)
    }
}

/// Dispatch one call and return its success value.
fn call(messenger: &Messenger, channel: &str, method_call: MethodCall) -> Result<Value> {
    let Some(reply) = messenger.invoke(channel, &method_call) else {
        bail!("no handler registered for channel {channel}");
    };
    match reply? {
        MethodResponse::Success(value) => Ok(value),
        MethodResponse::Error {
            code,
            message,
            details,
        } => bail!(
            "{code}: {} (details: {details})",
            message.as_deref().unwrap_or("no message")
        ),
        MethodResponse::NotImplemented => {
            bail!("method {} is not implemented on {channel}", method_call.method)
        }
    }
}

/// Answer each non-blank input line with exactly one output line.
fn serve(messenger: &Messenger, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<ServeRequest>(&line) {
            Ok(request) => {
                let message = request.message.to_string().into_bytes();
                let reply = messenger.send(&request.channel, &message);
                let reply = codec::reply_to_value(reply.as_deref())?;
                json!({ "channel": request.channel, "reply": reply })
            }
            Err(err) => {
                warn!(error = %err, "malformed request line");
                json!({ "channel": null, "error": err.to_string() })
            }
        };
        writeln!(output, "{response}")?;
        output.flush()?;
    }
    Ok(())
}
