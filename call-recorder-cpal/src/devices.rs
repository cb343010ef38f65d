//! Input device enumeration through the default `cpal` host.

use cpal::traits::{DeviceTrait, HostTrait};

use call_recorder_core::models::error::CaptureError;

/// Names of the input devices the default host reports.
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::Unknown(format!("failed to list input devices: {}", e)))?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Name of the host's default input device, if there is one.
pub fn default_input_device_name() -> Option<String> {
    cpal::default_host().default_input_device().and_then(|d| d.name().ok())
}

/// Find an input device by name, or the default input when `name` is `None`.
///
/// A named device that is missing falls back to the default.
pub(crate) fn find_input_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
    let host = cpal::default_host();

    if let Some(name) = name {
        let found = host
            .input_devices()
            .ok()
            .and_then(|mut devices| devices.find(|d| d.name().map(|n| n == name).unwrap_or(false)));
        match found {
            Some(device) => return Ok(device),
            None => log::warn!("Input device '{}' not found, falling back to default", name),
        }
    }

    host.default_input_device().ok_or_else(|| {
        log::error!("No input device available");
        CaptureError::DeviceNotAvailable
    })
}
