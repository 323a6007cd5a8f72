//! Driver trait and the heterogeneous driver list held by the bus
use frunk::{HCons, HNil};
use log::trace;

use crate::hid_bus::device::{ConnectMask, HidDevice, HidDeviceId, RawEvent};
use crate::HidError;

/// A HID driver bound to devices through its id table
///
/// The defaults mirror a driver that only supplies a report fixup: probe parses the
/// descriptor and starts the hardware, remove stops it.
pub trait HidDriver {
    fn name(&self) -> &'static str;

    fn id_table(&self) -> &[HidDeviceId];

    /// Called once with the device supplied descriptor before it is parsed. May patch it in
    /// place or return a different descriptor altogether.
    fn report_fixup<'r>(&self, _hdev: &HidDevice<'_>, rdesc: &'r mut [u8]) -> &'r [u8] {
        rdesc
    }

    fn probe(&self, hdev: &mut HidDevice<'_>, _id: &HidDeviceId) -> Result<(), HidError> {
        hdev.parse()?;
        hdev.hw_start(ConnectMask::DEFAULT)
    }

    fn remove(&self, hdev: &mut HidDevice<'_>) {
        hdev.hw_stop();
    }

    fn raw_event(&self, _hdev: &mut HidDevice<'_>, _data: &mut [u8]) -> Result<RawEvent, HidError> {
        Ok(RawEvent::Continue)
    }
}

pub trait DriverHList {
    /// First driver, in registration order, with an id table entry matching `id`
    fn find_match(&self, id: &HidDeviceId) -> Option<(&dyn HidDriver, &HidDeviceId)>;
    fn find_name(&self, name: &str) -> Option<&dyn HidDriver>;
}

impl DriverHList for HNil {
    #[inline(always)]
    fn find_match(&self, _: &HidDeviceId) -> Option<(&dyn HidDriver, &HidDeviceId)> {
        None
    }
    #[inline(always)]
    fn find_name(&self, _: &str) -> Option<&dyn HidDriver> {
        None
    }
}

// The builder prepends, so the tail holds the earlier registrations
impl<Head: HidDriver, Tail: DriverHList> DriverHList for HCons<Head, Tail> {
    fn find_match(&self, id: &HidDeviceId) -> Option<(&dyn HidDriver, &HidDeviceId)> {
        self.tail.find_match(id).or_else(|| {
            let entry = self.head.id_table().iter().find(|entry| entry.matches(id))?;
            trace!("{:?} matched {}", id, self.head.name());
            Some((&self.head as &dyn HidDriver, entry))
        })
    }

    fn find_name(&self, name: &str) -> Option<&dyn HidDriver> {
        self.tail.find_name(name).or_else(|| {
            if self.head.name() == name {
                Some(&self.head as &dyn HidDriver)
            } else {
                None
            }
        })
    }
}
