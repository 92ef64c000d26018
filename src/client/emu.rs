use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use image::DynamicImage;
use serde_json::Value;
use tracing::{debug, info};

use super::http::HttpTransport;
use super::status::pressed_inputs;
use crate::util::sleep_secs;

/// Screenshot encoding requested from the `screen` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenFormat {
    #[default]
    Png,
    Jpg,
    Bmp,
}

impl ScreenFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenFormat::Png => "png",
            ScreenFormat::Jpg => "jpg",
            ScreenFormat::Bmp => "bmp",
        }
    }
}

impl FromStr for ScreenFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ScreenFormat::Png),
            "jpg" | "jpeg" => Ok(ScreenFormat::Jpg),
            "bmp" => Ok(ScreenFormat::Bmp),
            other => bail!("unsupported screen format: {other}"),
        }
    }
}

impl fmt::Display for ScreenFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the emulator's HTTP control server.
///
/// Stateless by design: every operation is one synchronous GET, and all
/// authoritative state (input levels, run mode, loaded ROM) lives on the
/// remote side.
pub struct EmuClient {
    transport: HttpTransport,
}

impl EmuClient {
    /// Create a client for the given base URL without contacting the server.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let transport = HttpTransport::new(base_url, timeout)?;
        Ok(Self { transport })
    }

    /// Create a client for `host:port` and verify the server is reachable.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = Self::new(format!("http://{host}:{port}"), timeout)?;
        client.ping()?;
        info!("connected to control server at {}", client.base_url());
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// GET an endpoint whose mutating convention is the literal body `"ok"`.
    fn ok_response(&self, endpoint: &str, params: &[(String, String)]) -> Result<bool> {
        let body = self.transport.get(endpoint, params)?.text()?;
        Ok(body == "ok")
    }

    /// Check that the control server is running.
    pub fn ping(&self) -> Result<bool> {
        let response = self
            .transport
            .get("ping", &[])
            .context("could not connect to the emulator control server")?;
        Ok(response.text()? == "pong")
    }

    /// Step the emulator forward by `frames` frames.
    pub fn step(&self, frames: u32) -> Result<bool> {
        self.ok_response("step", &[("frames".into(), frames.to_string())])
    }

    /// Unpause the emulator and run at normal speed.
    pub fn run(&self) -> Result<bool> {
        self.ok_response("run", &[])
    }

    /// Fetch a screenshot of the current screen.
    pub fn get_screen(&self, format: ScreenFormat, embed_state: bool) -> Result<DynamicImage> {
        let mut params = vec![("format".to_string(), format.as_str().to_string())];
        if embed_state {
            params.push(("embed_state".into(), "1".into()));
        }

        let bytes = self.transport.get("screen", &params)?.bytes()?;
        image::load_from_memory(&bytes).context("screen response was not a decodable image")
    }

    /// Read one byte per address from emulated memory.
    ///
    /// One `addr` parameter is sent per address. `map_id` selects the
    /// memory map (0 is the default map and is omitted from the request).
    pub fn read_bytes(&self, addresses: &[u32], map_id: u32) -> Result<Vec<u8>> {
        let mut params: Vec<(String, String)> = addresses
            .iter()
            .map(|addr| ("addr".to_string(), format!("{addr:x}")))
            .collect();
        if map_id != 0 {
            params.push(("map".into(), map_id.to_string()));
        }

        let body = self.transport.get("read_byte", &params)?.text()?;
        decode_hex_bytes(&body)
    }

    /// Write one byte per `(address, value)` pair to emulated memory.
    pub fn write_bytes(&self, pairs: &[(u32, u8)], map_id: u32) -> Result<bool> {
        let mut params: Vec<(String, String)> = pairs
            .iter()
            .map(|(addr, value)| (format!("{addr:x}"), format!("{value:02x}")))
            .collect();
        if map_id != 0 {
            params.push(("map".into(), map_id.to_string()));
        }

        self.ok_response("write_byte", &params)
    }

    /// Set input levels, one `button=0|1` parameter per entry.
    pub fn set_input(&self, states: &[(String, u8)]) -> Result<bool> {
        let params: Vec<(String, String)> = states
            .iter()
            .map(|(button, level)| (button.clone(), level.to_string()))
            .collect();
        self.ok_response("input", &params)
    }

    /// Fetch the emulator status document, passed through unmodified.
    pub fn get_status(&self) -> Result<Value> {
        self.transport
            .get("status", &[])?
            .json()
            .context("status response was not valid JSON")
    }

    /// Save the current emulation state to `path` on the emulator host.
    pub fn save_state(&self, path: &str) -> Result<bool> {
        self.ok_response("save", &[("path".into(), path.to_string())])
    }

    /// Load an emulation state from `path` on the emulator host.
    pub fn load_state(&self, path: &str) -> Result<bool> {
        self.ok_response("load", &[("path".into(), path.to_string())])
    }

    /// Load a ROM file, optionally leaving the emulator paused.
    pub fn load_rom(&self, path: &str, pause: bool) -> Result<bool> {
        let mut params = vec![("path".to_string(), path.to_string())];
        if pause {
            params.push(("pause".into(), "1".into()));
        }
        self.ok_response("load_rom", &params)
    }

    /// Press and release a button, holding it for `hold_time` seconds.
    ///
    /// The button is always restored to level 0 before returning; the hold
    /// is a wall-clock sleep, not frame-accurate.
    pub fn press_button(&self, button: &str, hold_time: f64) -> Result<bool> {
        self.set_input(&[(button.to_string(), 1)])?;
        sleep_secs(hold_time);
        self.set_input(&[(button.to_string(), 0)])
    }

    /// Hold a button down without releasing it.
    pub fn hold_button(&self, button: &str) -> Result<bool> {
        self.set_input(&[(button.to_string(), 1)])
    }

    /// Release a single button.
    pub fn release_button(&self, button: &str) -> Result<bool> {
        self.set_input(&[(button.to_string(), 0)])
    }

    /// Hold several buttons down in one batched input call.
    pub fn hold_buttons(&self, buttons: &[String]) -> Result<bool> {
        let states: Vec<(String, u8)> = buttons.iter().map(|b| (b.clone(), 1)).collect();
        self.set_input(&states)
    }

    /// Release several buttons in one batched input call.
    pub fn release_buttons(&self, buttons: &[String]) -> Result<bool> {
        let states: Vec<(String, u8)> = buttons.iter().map(|b| (b.clone(), 0)).collect();
        self.set_input(&states)
    }

    /// Release every button the emulator currently reports as held.
    ///
    /// Issues a single batched release covering exactly the held subset;
    /// skips the remote call entirely when nothing is held. Returns the
    /// released button names.
    pub fn release_all_buttons(&self) -> Result<Vec<String>> {
        let status = self.get_status()?;
        let held = pressed_inputs(&status);
        if held.is_empty() {
            debug!("release-all: nothing held");
            return Ok(held);
        }

        debug!("release-all: releasing {}", held.join(", "));
        let states: Vec<(String, u8)> = held.iter().map(|b| (b.clone(), 0)).collect();
        self.set_input(&states)?;
        Ok(held)
    }
}

/// Decode the `read_byte` body: consecutive hex digit pairs become bytes,
/// a trailing unpaired digit is dropped.
fn decode_hex_bytes(body: &str) -> Result<Vec<u8>> {
    body.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair).context("read_byte response was not UTF-8")?;
            u8::from_str_radix(digits, 16)
                .with_context(|| format!("read_byte response contained non-hex pair {digits:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_pairs() {
        assert_eq!(decode_hex_bytes("1a2b").unwrap(), vec![0x1a, 0x2b]);
    }

    #[test]
    fn decode_hex_drops_trailing_odd_digit() {
        assert_eq!(decode_hex_bytes("1a2").unwrap(), vec![0x1a]);
    }

    #[test]
    fn decode_hex_empty_body() {
        assert!(decode_hex_bytes("").unwrap().is_empty());
    }

    #[test]
    fn decode_hex_single_digit_body() {
        assert!(decode_hex_bytes("f").unwrap().is_empty());
    }

    #[test]
    fn decode_hex_rejects_non_hex_pair() {
        assert!(decode_hex_bytes("zz").is_err());
    }

    #[test]
    fn screen_format_parse() {
        assert_eq!("png".parse::<ScreenFormat>().unwrap(), ScreenFormat::Png);
        assert_eq!("JPG".parse::<ScreenFormat>().unwrap(), ScreenFormat::Jpg);
        assert_eq!("jpeg".parse::<ScreenFormat>().unwrap(), ScreenFormat::Jpg);
        assert_eq!("bmp".parse::<ScreenFormat>().unwrap(), ScreenFormat::Bmp);
        assert!("gif".parse::<ScreenFormat>().is_err());
    }
}
