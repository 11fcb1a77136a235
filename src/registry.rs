//! Keyed store owning every registered device.

use indexmap::IndexMap;

use crate::device::Device;
use crate::error::SystemError;

/// Associative store mapping device ids to devices.
///
/// The registry owns its devices exclusively; lookups hand out references
/// scoped to the call. Enumeration is unbounded and yields devices in
/// registration order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: IndexMap<String, Device>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device under its id.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if the id is already taken; the existing device is
    /// left untouched.
    pub fn insert(&mut self, device: Device) -> Result<(), SystemError> {
        if self.devices.contains_key(device.id()) {
            return Err(SystemError::DuplicateKey {
                id: device.id().to_string(),
            });
        }
        self.devices.insert(device.id().to_string(), device);
        Ok(())
    }

    /// Looks up a device by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn get(&self, id: &str) -> Result<&Device, SystemError> {
        self.devices
            .get(id)
            .ok_or_else(|| SystemError::NotFound { id: id.to_string() })
    }

    /// Looks up a device by id for mutation.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Device, SystemError> {
        self.devices
            .get_mut(id)
            .ok_or_else(|| SystemError::NotFound { id: id.to_string() })
    }

    /// Iterates all devices in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device has been registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp(id: &str) -> Device {
        Device::new(id, "Lamp", 40.0, false, 5)
    }

    #[test]
    fn insert_then_get() {
        let mut registry = DeviceRegistry::new();
        registry.insert(lamp("d1")).unwrap();
        assert_eq!(registry.get("d1").unwrap().name(), "Lamp");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut registry = DeviceRegistry::new();
        registry.insert(lamp("d1")).unwrap();
        let duplicate = Device::new("d1", "Other", 900.0, false, 9);
        assert!(matches!(
            registry.insert(duplicate),
            Err(SystemError::DuplicateKey { .. })
        ));
        // Original entry untouched.
        assert_eq!(registry.get("d1").unwrap().name(), "Lamp");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = DeviceRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(SystemError::NotFound { .. })
        ));
    }

    #[test]
    fn enumeration_has_no_cap() {
        let mut registry = DeviceRegistry::new();
        for i in 0..500 {
            registry.insert(lamp(&format!("d{i}"))).unwrap();
        }
        assert_eq!(registry.devices().count(), 500);
    }

    #[test]
    fn enumeration_follows_registration_order() {
        let mut registry = DeviceRegistry::new();
        for id in ["b", "a", "c"] {
            registry.insert(lamp(id)).unwrap();
        }
        let ids: Vec<&str> = registry.devices().map(Device::id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
