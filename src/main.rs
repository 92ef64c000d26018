// skybridge — CLI for driving an emulator's HTTP control server.
//
// Builds one client handle from config + flags and dispatches a single
// operation against it.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use skybridge::client::{EmuClient, ScreenFormat};
use skybridge::config::BridgeConfig;
use skybridge::sequence::{Action, MenuSelection};
use skybridge::tools;
use skybridge::util::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "skybridge", about = "Remote control for an emulator's HTTP control server")]
struct Cli {
    /// Control server host (overrides the config file).
    #[arg(long, env = "SKYBRIDGE_HOST")]
    host: Option<String>,

    /// Control server port (overrides the config file).
    #[arg(long, env = "SKYBRIDGE_PORT")]
    port: Option<u16>,

    /// Path to the bridge config JSON file.
    #[arg(long, default_value = "skybridge.json")]
    config: PathBuf,

    /// Show debug logs.
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the control server is reachable.
    Ping,
    /// Step the emulator forward by a number of frames.
    Step {
        #[arg(long, default_value_t = 1)]
        frames: u32,
    },
    /// Unpause the emulator and run at normal speed.
    Run,
    /// Capture the current screen (base64 PNG on stdout, or a file with --out).
    Screenshot {
        #[arg(long, default_value = "png", value_parser = ScreenFormat::from_str)]
        format: ScreenFormat,
        /// Embed emulation state in the image.
        #[arg(long)]
        embed_state: bool,
        /// Write the image to a file instead of printing base64.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Read bytes from emulated memory (hex addresses).
    Read {
        #[arg(required = true, value_parser = parse_hex_u32)]
        addresses: Vec<u32>,
        /// Memory map id (0 for default, 7 for ARM7, 9 for ARM9).
        #[arg(long, default_value_t = 0)]
        map: u32,
    },
    /// Write bytes to emulated memory as addr=value hex pairs.
    Write {
        #[arg(required = true, value_parser = parse_write_pair)]
        pairs: Vec<(u32, u8)>,
        #[arg(long, default_value_t = 0)]
        map: u32,
    },
    /// Set raw input levels as button=0|1 pairs.
    Input {
        #[arg(required = true, value_parser = parse_input_state)]
        states: Vec<(String, u8)>,
    },
    /// Press and release a button.
    Press {
        button: String,
        /// Hold duration in seconds.
        #[arg(long)]
        hold_time: Option<f64>,
    },
    /// Press several buttons one after another.
    PressSequence {
        #[arg(required = true)]
        buttons: Vec<String>,
        #[arg(long)]
        hold_time: Option<f64>,
        #[arg(long)]
        delay_between: Option<f64>,
    },
    /// Hold buttons down without releasing them.
    Hold {
        #[arg(required = true)]
        buttons: Vec<String>,
    },
    /// Release previously held buttons.
    Release {
        #[arg(required = true)]
        buttons: Vec<String>,
    },
    /// Release everything the emulator reports as held.
    ReleaseAll,
    /// Print the emulator status document.
    Status,
    /// Save the emulation state to a file.
    SaveState { path: PathBuf },
    /// Load an emulation state from a file.
    LoadState { path: PathBuf },
    /// Load a ROM file.
    LoadRom {
        path: PathBuf,
        /// Pause the emulator after loading.
        #[arg(long)]
        pause: bool,
    },
    /// Run a scripted action sequence from JSON.
    Sequence {
        /// Inline JSON array of action descriptors.
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,
        /// Path to a JSON file with the action list.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        delay_between: Option<f64>,
    },
    /// Perform a directional movement.
    Move {
        direction: String,
        #[arg(long, default_value_t = 1)]
        steps: u32,
        #[arg(long)]
        hold_time: Option<f64>,
        #[arg(long)]
        delay_between: Option<f64>,
    },
    /// Navigate menu selections from JSON.
    Menu {
        /// Inline JSON array of selection records.
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,
        /// Path to a JSON file with the selection list.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        delay_between: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = BridgeConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    let host = cli.host.as_deref().unwrap_or(&config.host);
    let port = cli.port.unwrap_or(config.port);

    let client = EmuClient::connect(host, port, Duration::from_secs(config.timeout_secs))?;
    let output = dispatch(&client, &config, cli.command)?;
    println!("{output}");
    Ok(())
}

fn dispatch(client: &EmuClient, config: &BridgeConfig, command: Command) -> Result<String> {
    match command {
        Command::Ping => {
            if client.ping()? {
                Ok("pong".to_string())
            } else {
                Ok("unexpected ping response".to_string())
            }
        }
        Command::Step { frames } => tools::step_frames(client, frames),
        Command::Run => tools::run_emulator(client),
        Command::Screenshot {
            format,
            embed_state,
            out,
        } => match out {
            Some(path) => tools::screenshot_to_file(client, format, embed_state, &path),
            None => tools::screenshot(client),
        },
        Command::Read { addresses, map } => tools::read_memory(client, &addresses, map),
        Command::Write { pairs, map } => tools::write_memory(client, &pairs, map),
        Command::Input { states } => tools::set_input(client, &states),
        Command::Press { button, hold_time } => {
            tools::press_button(client, &button, hold_time.unwrap_or(config.default_hold_time))
        }
        Command::PressSequence {
            buttons,
            hold_time,
            delay_between,
        } => tools::press_sequence(
            client,
            &buttons,
            hold_time.unwrap_or(config.default_hold_time),
            delay_between.unwrap_or(config.press_delay),
        ),
        Command::Hold { buttons } => tools::hold_buttons(client, &buttons),
        Command::Release { buttons } => tools::release_buttons(client, &buttons),
        Command::ReleaseAll => tools::release_all_buttons(client),
        Command::Status => tools::emulator_status(client),
        Command::SaveState { path } => tools::save_state(client, &path),
        Command::LoadState { path } => tools::load_state(client, &path),
        Command::LoadRom { path, pause } => tools::load_rom(client, &path, pause),
        Command::Sequence {
            json,
            file,
            delay_between,
        } => {
            let actions: Vec<Action> = parse_json_arg(json, file, "action list")?;
            info!("running sequence of {} action(s)", actions.len());
            tools::execute_sequence(
                client,
                &actions,
                delay_between.unwrap_or(config.default_delay),
            )
        }
        Command::Move {
            direction,
            steps,
            hold_time,
            delay_between,
        } => tools::directional_movement(
            client,
            &direction,
            steps,
            hold_time.unwrap_or(config.default_hold_time),
            delay_between.unwrap_or(config.press_delay),
        ),
        Command::Menu {
            json,
            file,
            delay_between,
        } => {
            let selections: Vec<MenuSelection> = parse_json_arg(json, file, "selection list")?;
            tools::navigate_menu(
                client,
                &selections,
                delay_between.unwrap_or(config.default_delay),
            )
        }
    }
}

/// Read a JSON payload from either an inline argument or a file.
fn parse_json_arg<T: serde::de::DeserializeOwned>(
    json: Option<String>,
    file: Option<PathBuf>,
    what: &str,
) -> Result<T> {
    let text = match (json, file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {} from {}", what, path.display()))?,
        _ => bail!("provide the {what} with either --json or --file"),
    };
    serde_json::from_str(&text).with_context(|| format!("invalid {what}"))
}

/// Parse a hex memory address, with or without an `0x` prefix.
fn parse_hex_u32(s: &str) -> Result<u32> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).with_context(|| format!("invalid hex address {s:?}"))
}

/// Parse an `addr=value` hex pair for memory writes.
fn parse_write_pair(s: &str) -> Result<(u32, u8)> {
    let Some((addr, value)) = s.split_once('=') else {
        bail!("expected addr=value, got {s:?}");
    };
    let addr = parse_hex_u32(addr)?;
    let value = u8::from_str_radix(value.trim_start_matches("0x"), 16)
        .with_context(|| format!("invalid hex byte value {value:?}"))?;
    Ok((addr, value))
}

/// Parse a `button=0|1` input level pair.
fn parse_input_state(s: &str) -> Result<(String, u8)> {
    let Some((button, level)) = s.split_once('=') else {
        bail!("expected button=0|1, got {s:?}");
    };
    match level {
        "0" => Ok((button.to_string(), 0)),
        "1" => Ok((button.to_string(), 1)),
        other => bail!("input level must be 0 or 1, got {other:?}"),
    }
}
