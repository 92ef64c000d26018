use serde_json::Value;

/// Extract the names of all inputs held at a level above zero from a
/// status payload.
///
/// The status document is owned by the emulator; this only looks at its
/// `inputs` object and tolerates it being absent or oddly shaped.
pub fn pressed_inputs(status: &Value) -> Vec<String> {
    let Some(inputs) = status.get("inputs").and_then(Value::as_object) else {
        return Vec::new();
    };

    inputs
        .iter()
        .filter(|(_, level)| level.as_f64().unwrap_or(0.0) > 0.0)
        .map(|(name, _)| name.clone())
        .collect()
}
