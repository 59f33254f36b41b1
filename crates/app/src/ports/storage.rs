//! Storage port — where devices live between commands.
//!
//! Services read a device, mutate a copy, and write it back with
//! [`DeviceRepository::update`]; a failed command therefore never reaches
//! the store.

use std::future::Future;

use homesim_domain::device::Device;
use homesim_domain::error::HomeSimError;
use homesim_domain::id::DeviceId;

/// Repository for [`Device`] records.
pub trait DeviceRepository {
    /// Persist a new device.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HomeSimError>> + Send;

    /// Get a device by id.
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeSimError>> + Send;

    /// All devices, in insertion order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeSimError>> + Send;

    /// Replace a stored device.
    ///
    /// Implementations return [`HomeSimError::NotFound`] for unknown ids.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HomeSimError>> + Send;
}

impl<T: DeviceRepository + Send + Sync> DeviceRepository for std::sync::Arc<T> {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HomeSimError>> + Send {
        (**self).create(device)
    }

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeSimError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeSimError>> + Send {
        (**self).get_all()
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HomeSimError>> + Send {
        (**self).update(device)
    }
}
