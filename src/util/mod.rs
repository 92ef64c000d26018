pub mod logging;

use std::time::Duration;

/// Sleep for a wall-clock duration given in seconds.
///
/// Non-positive durations do not sleep at all.
pub fn sleep_secs(secs: f64) {
    if secs > 0.0 {
        std::thread::sleep(Duration::from_secs_f64(secs));
    }
}
