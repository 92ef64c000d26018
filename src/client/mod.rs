mod emu;
mod http;
mod status;

pub use emu::{EmuClient, ScreenFormat};
pub use http::HttpTransport;
pub use status::pressed_inputs;
