//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_service;
pub mod schedule_service;

use homesim_domain::device::Device;
use homesim_domain::error::{HomeSimError, NotFoundError};
use homesim_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Look up a device by id, returning an error if not found.
async fn load_device<R: DeviceRepository>(
    repo: &R,
    id: &DeviceId,
) -> Result<Device, HomeSimError> {
    repo.get_by_id(id).await?.ok_or_else(|| {
        NotFoundError {
            entity: "Device",
            id: id.to_string(),
        }
        .into()
    })
}
