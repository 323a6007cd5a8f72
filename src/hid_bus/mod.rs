//! Host side HID bus: matches attached devices to registered drivers and runs their lifecycle

use core::default::Default;
use frunk::hlist::HList;
use frunk::{HCons, HNil};
use log::{error, info, warn};

use device::HidDevice;
use driver::{DriverHList, HidDriver};

use crate::HidError;

pub mod descriptor;
pub mod device;
pub mod driver;
pub mod prelude;

#[must_use = "this `HidBusBuilder` must be assigned or consumed by `::build()`"]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HidBusBuilder<DriverList> {
    driver_list: DriverList,
}

impl HidBusBuilder<HNil> {
    pub fn new() -> Self {
        Self { driver_list: HNil }
    }
}

impl Default for HidBusBuilder<HNil> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: HList> HidBusBuilder<D> {
    /// Registers a driver. Drivers are matched in registration order.
    pub fn add_driver<H: HidDriver>(self, driver: H) -> HidBusBuilder<HCons<H, D>> {
        HidBusBuilder {
            driver_list: self.driver_list.prepend(driver),
        }
    }
}

impl<D: DriverHList> HidBusBuilder<D> {
    pub fn build(self) -> HidBus<D> {
        HidBus {
            drivers: self.driver_list,
        }
    }
}

/// Registered HID drivers
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HidBus<D> {
    drivers: D,
}

impl<D: DriverHList> HidBus<D> {
    /// The driver that would bind a device with identity `id`, and the id table entry it matched
    pub fn match_driver(
        &self,
        id: &device::HidDeviceId,
    ) -> Option<(&dyn HidDriver, &device::HidDeviceId)> {
        self.drivers.find_match(id)
    }

    pub fn driver(&self, name: &str) -> Option<&dyn HidDriver> {
        self.drivers.find_name(name)
    }

    /// Binds the first matching driver to `hdev` and probes it
    ///
    /// On probe failure the device is left unbound. Returns the name of the bound driver.
    pub fn attach<'a>(&'a self, hdev: &mut HidDevice<'a>) -> Result<&'static str, HidError> {
        if let Some(name) = hdev.driver_name() {
            warn!("{}: already bound to {}", hdev.name(), name);
            return Err(HidError::AlreadyBound);
        }

        let (driver, id) = self.drivers.find_match(hdev.id()).ok_or_else(|| {
            warn!("{}: no matching driver", hdev.name());
            HidError::NoMatchingDriver
        })?;

        hdev.driver = Some(driver);
        match driver.probe(hdev, id) {
            Ok(()) => {
                info!("{}: bound to {}", hdev.name(), driver.name());
                Ok(driver.name())
            }
            Err(e) => {
                error!("{}: {} probe failed: {}", hdev.name(), driver.name(), e);
                hdev.hw_stop();
                hdev.driver = None;
                Err(e)
            }
        }
    }

    /// Runs the bound driver's remove and unbinds it
    pub fn detach(&self, hdev: &mut HidDevice<'_>) {
        if let Some(driver) = hdev.driver.take() {
            driver.remove(hdev);
            info!("{}: unbound from {}", hdev.name(), driver.name());
        }
    }
}
