//! Fallback driver binding any device, without report fixups
use crate::hid_bus::device::HidDeviceId;
use crate::hid_bus::driver::HidDriver;

const HID_GENERIC_DEVICES: &[HidDeviceId] = &[HidDeviceId::any()];

/// Register last, so specific drivers take precedence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenericDriver;

impl HidDriver for GenericDriver {
    fn name(&self) -> &'static str {
        "hid-generic"
    }

    fn id_table(&self) -> &[HidDeviceId] {
        HID_GENERIC_DEVICES
    }
}
