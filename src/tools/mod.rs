//! Exposure layer: each domain operation as an independently invocable
//! unit taking an explicit client handle and returning a human-readable
//! string (base64 PNG for screenshots).

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use tracing::info;

use crate::client::{EmuClient, ScreenFormat};
use crate::sequence::{self, Action, MenuSelection};

/// Press a button on the emulated controller.
pub fn press_button(client: &EmuClient, button: &str, hold_time: f64) -> Result<String> {
    client.press_button(button, hold_time)?;
    Ok(format!("Button {button} pressed for {hold_time} seconds"))
}

/// Press a sequence of buttons in order.
pub fn press_sequence(
    client: &EmuClient,
    buttons: &[String],
    hold_time: f64,
    delay_between: f64,
) -> Result<String> {
    sequence::press_sequence(client, buttons, hold_time, delay_between)
}

/// Hold down multiple buttons simultaneously.
pub fn hold_buttons(client: &EmuClient, buttons: &[String]) -> Result<String> {
    client.hold_buttons(buttons)?;
    Ok(format!("Buttons {} are being held down", buttons.join(", ")))
}

/// Release previously held buttons.
pub fn release_buttons(client: &EmuClient, buttons: &[String]) -> Result<String> {
    client.release_buttons(buttons)?;
    Ok(format!("Buttons {} have been released", buttons.join(", ")))
}

/// Release every button currently held down.
pub fn release_all_buttons(client: &EmuClient) -> Result<String> {
    let released = client.release_all_buttons()?;
    if !released.is_empty() {
        info!("released: {}", released.join(", "));
    }
    Ok("All buttons released".to_string())
}

/// Capture the current screen as a base64-encoded PNG.
pub fn screenshot(client: &EmuClient) -> Result<String> {
    let screen = client.get_screen(ScreenFormat::Png, false)?;
    let mut buffer = Cursor::new(Vec::new());
    screen
        .write_to(&mut buffer, ImageFormat::Png)
        .context("failed to encode screenshot as PNG")?;
    Ok(STANDARD.encode(buffer.into_inner()))
}

/// Capture the current screen and write it to a local file.
pub fn screenshot_to_file(
    client: &EmuClient,
    format: ScreenFormat,
    embed_state: bool,
    path: &Path,
) -> Result<String> {
    let screen = client.get_screen(format, embed_state)?;
    screen
        .save(path)
        .with_context(|| format!("failed to write screenshot to {}", path.display()))?;
    Ok(format!("Screenshot saved to {}", path.display()))
}

/// Step the emulator forward by a specific number of frames.
pub fn step_frames(client: &EmuClient, frames: u32) -> Result<String> {
    client.step(frames)?;
    Ok(format!("Stepped forward {frames} frames"))
}

/// Start or resume the emulator at normal speed.
pub fn run_emulator(client: &EmuClient) -> Result<String> {
    client.run()?;
    Ok("Emulator is now running".to_string())
}

/// Read bytes from emulated memory, reported as hex pairs.
pub fn read_memory(client: &EmuClient, addresses: &[u32], map_id: u32) -> Result<String> {
    let bytes = client.read_bytes(addresses, map_id)?;
    let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(hex.join(" "))
}

/// Write bytes to emulated memory.
pub fn write_memory(client: &EmuClient, pairs: &[(u32, u8)], map_id: u32) -> Result<String> {
    if client.write_bytes(pairs, map_id)? {
        Ok(format!("Wrote {} byte(s)", pairs.len()))
    } else {
        Ok("Write rejected by the emulator".to_string())
    }
}

/// Set raw input levels.
pub fn set_input(client: &EmuClient, states: &[(String, u8)]) -> Result<String> {
    if client.set_input(states)? {
        Ok(format!("Set {} input(s)", states.len()))
    } else {
        Ok("Input rejected by the emulator".to_string())
    }
}

/// Save the current game state to a file on the emulator host.
///
/// Relative paths are made absolute before being relayed, so the snapshot
/// lands where the caller expects rather than wherever the emulator's
/// working directory happens to be.
pub fn save_state(client: &EmuClient, path: &Path) -> Result<String> {
    let path = absolutize(path)?;
    client.save_state(&path)?;
    Ok(format!("Game state saved to {path}"))
}

/// Load a previously saved game state.
pub fn load_state(client: &EmuClient, path: &Path) -> Result<String> {
    let path = absolutize(path)?;
    client.load_state(&path)?;
    Ok(format!("Game state loaded from {path}"))
}

/// Load a ROM file into the emulator.
pub fn load_rom(client: &EmuClient, path: &Path, pause: bool) -> Result<String> {
    let path = absolutize(path)?;
    client.load_rom(&path, pause)?;
    Ok(format!("ROM loaded from {path}"))
}

/// Get the emulator status document as pretty-printed JSON.
pub fn emulator_status(client: &EmuClient) -> Result<String> {
    let status = client.get_status()?;
    serde_json::to_string_pretty(&status).context("failed to render status JSON")
}

/// Execute a scripted action sequence.
pub fn execute_sequence(
    client: &EmuClient,
    actions: &[Action],
    delay_between: f64,
) -> Result<String> {
    sequence::run_sequence(client, actions, delay_between)
}

/// Perform a directional movement.
pub fn directional_movement(
    client: &EmuClient,
    direction: &str,
    steps: u32,
    hold_time: f64,
    delay_between: f64,
) -> Result<String> {
    sequence::directional_movement(client, direction, steps, hold_time, delay_between)
}

/// Navigate through menu selections.
pub fn navigate_menu(
    client: &EmuClient,
    selections: &[MenuSelection],
    delay_between: f64,
) -> Result<String> {
    sequence::navigate_menu(client, selections, delay_between)
}

fn absolutize(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("could not resolve path {}", path.display()))?;
    Ok(absolute.display().to_string())
}
