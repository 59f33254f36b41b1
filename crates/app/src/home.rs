//! In-memory device store.

use std::future::Future;
use std::sync::{PoisonError, RwLock};

use homesim_domain::device::Device;
use homesim_domain::error::{HomeSimError, NotFoundError};
use homesim_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Every device of one simulated home, kept in insertion order.
#[derive(Debug, Default)]
pub struct Home {
    devices: RwLock<Vec<Device>>,
}

impl Home {
    /// Build a home from already validated devices.
    #[must_use]
    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(devices),
        }
    }
}

fn not_found(id: &DeviceId) -> HomeSimError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}

impl DeviceRepository for Home {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HomeSimError>> + Send {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = devices.iter_mut().find(|d| d.id == device.id) {
            *existing = device.clone();
        } else {
            devices.push(device.clone());
        }
        async { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeSimError>> + Send {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        let found = devices.iter().find(|d| &d.id == id).cloned();
        async { Ok(found) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeSimError>> + Send {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        let all = devices.clone();
        async { Ok(all) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HomeSimError>> + Send {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        let result = match devices.iter_mut().find(|d| d.id == device.id) {
            Some(existing) => {
                *existing = device.clone();
                Ok(device)
            }
            None => Err(not_found(&device.id)),
        };
        async { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> Device {
        Device::builder().id(id).build().unwrap()
    }

    #[tokio::test]
    async fn should_keep_insertion_order() {
        let home = Home::default();
        home.create(device("b")).await.unwrap();
        home.create(device("a")).await.unwrap();
        let ids: Vec<_> = home
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn should_return_none_for_unknown_device() {
        let home = Home::with_devices(vec![device("lamp")]);
        assert!(home.get_by_id(&DeviceId::from("fan")).await.unwrap().is_none());
        assert!(home.get_by_id(&DeviceId::from("lamp")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_fail_to_update_unknown_device() {
        let home = Home::default();
        let err = home.update(device("ghost")).await.unwrap_err();
        assert_eq!(err.to_string(), "Device not found: ghost");
    }
}
