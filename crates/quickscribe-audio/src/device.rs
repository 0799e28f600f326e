use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use quickscribe_foundation::DeviceError;

/// Input device enumeration and lookup on the default cpal host.
pub struct DeviceManager {
    host: Host,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Names of every input device the host exposes.
    pub fn input_device_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(devices) = self.host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name() {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn default_input_name(&self) -> Option<String> {
        self.host.default_input_device().and_then(|d| d.name().ok())
    }

    /// Open the named device, or the host default when no name is given.
    /// A specific name is matched exactly first, then as a case-insensitive
    /// substring; a name that matches nothing is an error rather than a
    /// silent fallback.
    pub fn open(&self, name: Option<&str>) -> Result<Device, DeviceError> {
        if let Some(wanted) = name {
            if let Some(device) = self.find(|n| n == wanted) {
                return Ok(device);
            }
            let lowered = wanted.to_lowercase();
            if let Some(device) = self.find(|n| n.to_lowercase().contains(&lowered)) {
                tracing::warn!(
                    target: "audio",
                    "device '{}' not found exactly; using closest match '{}'",
                    wanted,
                    device.name().unwrap_or_default()
                );
                return Ok(device);
            }
            return Err(DeviceError::NotFound {
                name: Some(wanted.to_string()),
            });
        }

        self.host
            .default_input_device()
            .ok_or(DeviceError::NoInputDevice)
    }

    fn find<F>(&self, pred: F) -> Option<Device>
    where
        F: Fn(&str) -> bool,
    {
        if let Ok(devices) = self.host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name() {
                    if pred(&name) {
                        return Some(device);
                    }
                }
            }
        }
        None
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless() -> bool {
        let manager = DeviceManager::new();
        manager.default_input_name().is_none() && manager.input_device_names().is_empty()
    }

    #[test]
    fn unknown_name_is_an_error_not_a_fallback() {
        let manager = DeviceManager::new();
        let result = manager.open(Some("no-such-device-xyz"));
        assert!(matches!(
            result,
            Err(DeviceError::NotFound { name: Some(_) })
        ));
    }

    #[test]
    fn default_open_succeeds_when_hardware_present() {
        if headless() {
            eprintln!("skipping default_open_succeeds_when_hardware_present: no input devices");
            return;
        }
        let manager = DeviceManager::new();
        assert!(manager.open(None).is_ok());
    }
}
