mod action;
mod runner;

pub use action::{Action, Direction, MenuSelection};
pub use runner::{
    DEFAULT_HOLD_TIME, DEFAULT_PRESS_DELAY, DEFAULT_SEQUENCE_DELAY, directional_movement,
    navigate_menu, press_sequence, run_sequence,
};
