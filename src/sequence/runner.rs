use anyhow::Result;
use tracing::debug;

use super::action::{Action, Direction, MenuSelection};
use crate::client::EmuClient;
use crate::util::sleep_secs;

/// Default hold duration for a single button press, in seconds.
pub const DEFAULT_HOLD_TIME: f64 = 0.2;
/// Default delay between consecutive presses, in seconds.
pub const DEFAULT_PRESS_DELAY: f64 = 0.1;
/// Default inter-action delay for a scripted sequence, in seconds.
pub const DEFAULT_SEQUENCE_DELAY: f64 = 0.5;

/// Execute an ordered action list against the control client.
///
/// Actions run strictly in order. After every action except the last,
/// and except when the action itself was a `Wait`, the interpreter sleeps
/// `delay_between` seconds. Returns one status line per action, joined
/// with newlines. A transport error aborts the remaining actions.
pub fn run_sequence(client: &EmuClient, actions: &[Action], delay_between: f64) -> Result<String> {
    let mut lines = Vec::with_capacity(actions.len());

    for (i, action) in actions.iter().enumerate() {
        debug!("sequence action {}/{}: {action:?}", i + 1, actions.len());
        match action {
            Action::Press { button, hold_time } => {
                let hold = hold_time.unwrap_or(DEFAULT_HOLD_TIME);
                client.press_button(button, hold)?;
                lines.push(format!("Pressed {button} for {hold}s"));
            }
            Action::Hold { buttons } => {
                client.hold_buttons(buttons)?;
                lines.push(format!("Holding buttons: {}", buttons.join(", ")));
            }
            Action::Release { buttons } => {
                client.release_buttons(buttons)?;
                lines.push(format!("Released buttons: {}", buttons.join(", ")));
            }
            Action::Wait { time } => {
                let wait = time.unwrap_or(delay_between);
                sleep_secs(wait);
                lines.push(format!("Waited for {wait}s"));
            }
        }

        // A wait substitutes for the inter-action delay.
        if i + 1 < actions.len() && !matches!(action, Action::Wait { .. }) {
            sleep_secs(delay_between);
        }
    }

    Ok(lines.join("\n"))
}

/// Press each listed button in order, with `delay_between` after every
/// press except the last.
pub fn press_sequence(
    client: &EmuClient,
    buttons: &[String],
    hold_time: f64,
    delay_between: f64,
) -> Result<String> {
    for (i, button) in buttons.iter().enumerate() {
        client.press_button(button, hold_time)?;
        if i + 1 < buttons.len() {
            sleep_secs(delay_between);
        }
    }

    Ok(format!("Button sequence {} executed", buttons.join(", ")))
}

/// Press a direction button `steps` times.
///
/// An unknown direction is reported as a descriptive result string rather
/// than an error, so a scripted caller can continue.
pub fn directional_movement(
    client: &EmuClient,
    direction: &str,
    steps: u32,
    hold_time: f64,
    delay_between: f64,
) -> Result<String> {
    let Ok(dir) = direction.parse::<Direction>() else {
        return Ok(format!(
            "Invalid direction: {direction}. Must be Up, Down, Left, or Right."
        ));
    };

    for i in 0..steps {
        client.press_button(dir.button(), hold_time)?;
        if i + 1 < steps {
            sleep_secs(delay_between);
        }
    }

    Ok(format!("Moved {dir} for {steps} steps"))
}

/// Walk through menu selections in order: move, optionally confirm, then
/// optionally linger.
///
/// Directional presses use a fixed 0.2 s hold and 0.1 s inter-press delay,
/// independent of `delay_between`. A selection with an absent or invalid
/// direction skips the movement sub-step and continues; there is no early
/// termination.
pub fn navigate_menu(
    client: &EmuClient,
    selections: &[MenuSelection],
    delay_between: f64,
) -> Result<String> {
    let mut lines = Vec::new();

    for selection in selections {
        let direction = selection
            .direction
            .as_deref()
            .and_then(|d| d.parse::<Direction>().ok());

        if let Some(dir) = direction {
            for _ in 0..selection.steps {
                client.press_button(dir.button(), DEFAULT_HOLD_TIME)?;
                sleep_secs(DEFAULT_PRESS_DELAY);
            }
            lines.push(format!("Moved {dir} {} times", selection.steps));
            sleep_secs(delay_between);
        }

        if selection.confirm {
            client.press_button(&selection.confirm_button, DEFAULT_HOLD_TIME)?;
            lines.push(format!("Pressed {} to confirm", selection.confirm_button));
            sleep_secs(delay_between);
        }

        if selection.delay_after > 0.0 {
            sleep_secs(selection.delay_after);
            lines.push(format!("Waited for {}s", selection.delay_after));
        }
    }

    Ok(lines.join("\n"))
}
