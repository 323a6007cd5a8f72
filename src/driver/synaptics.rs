//! Synaptics keyboard (06cb:2968) with a replacement report descriptor
//!
//! The keyboard interface reports the same oversized vendor usage range as the Acer variant.
//! Instead of patching it, the descriptor of interface 0 is swapped for a corrected table.
use log::{error, info, trace};

use crate::hid_bus::device::{ConnectMask, HidDevice, HidDeviceId, Quirks, RawEvent};
use crate::hid_bus::driver::HidDriver;
use crate::ids::*;
use crate::HidError;

pub const SYNAPTICS_DEVICES: &[HidDeviceId] = &[HidDeviceId::usb_device(
    USB_VENDOR_ID_SYNAPTICS,
    USB_DEVICE_ID_SYNAPTICS_KEYBOARD,
)
.with_driver_data(0x0)];

/// Corrected keyboard report descriptor, the vendor collection limited to 8 bit ranges
#[rustfmt::skip]
pub const SYNAPTICS_KBD_RDESC_FIXED: &[u8] = &[
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x06,       // Usage (Keyboard)
    0xA1, 0x01,       // Collection (Application)
    0x85, 0x01,       //     Report ID (1)
    0x75, 0x01,       //     Report Size (1)
    0x95, 0x08,       //     Report Count (8)
    0x05, 0x07,       //     Usage Page (Keyboard)
    0x19, 0xE0,       //     Usage Minimum (224)
    0x29, 0xE7,       //     Usage Maximum (231)
    0x15, 0x00,       //     Logical Minimum (0)
    0x25, 0x01,       //     Logical Maximum (1)
    0x81, 0x02,       //     Input (Data, Variable, Absolute)
    0x95, 0x01,       //     Report Count (1)
    0x75, 0x08,       //     Report Size (8)
    0x81, 0x01,       //     Input (Constant)
    0x95, 0x05,       //     Report Count (5)
    0x75, 0x01,       //     Report Size (1)
    0x05, 0x08,       //     Usage Page (LEDs)
    0x19, 0x01,       //     Usage Minimum (1)
    0x29, 0x05,       //     Usage Maximum (5)
    0x91, 0x02,       //     Output (Data, Variable, Absolute)
    0x95, 0x01,       //     Report Count (1)
    0x75, 0x03,       //     Report Size (3)
    0x91, 0x01,       //     Output (Constant)
    0x95, 0x06,       //     Report Count (6)
    0x75, 0x08,       //     Report Size (8)
    0x15, 0x00,       //     Logical Minimum (0)
    0x26, 0xFF, 0x00, //     Logical Maximum (255)
    0x05, 0x07,       //     Usage Page (Keyboard)
    0x19, 0x00,       //     Usage Minimum (0)
    0x2A, 0xFF, 0x00, //     Usage Maximum (255)
    0x81, 0x00,       //     Input (Data, Array)
    0xC0,             // End Collection
    0x05, 0x0C,       // Usage Page (Consumer)
    0x09, 0x01,       // Usage (Consumer Control)
    0xA1, 0x01,       // Collection (Application)
    0x85, 0x02,       //     Report ID (2)
    0x15, 0x00,       //     Logical Minimum (0)
    0x26, 0x3C, 0x02, //     Logical Maximum (572)
    0x19, 0x00,       //     Usage Minimum (0)
    0x2A, 0x3C, 0x02, //     Usage Maximum (572)
    0x75, 0x10,       //     Report Size (16)
    0x95, 0x01,       //     Report Count (1)
    0x81, 0x00,       //     Input (Data, Array)
    0xC0,             // End Collection
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x80,       // Usage (System Control)
    0xA1, 0x01,       // Collection (Application)
    0x85, 0x03,       //     Report ID (3)
    0x19, 0x81,       //     Usage Minimum (129)
    0x29, 0x83,       //     Usage Maximum (131)
    0x15, 0x00,       //     Logical Minimum (0)
    0x25, 0x01,       //     Logical Maximum (1)
    0x75, 0x01,       //     Report Size (1)
    0x95, 0x03,       //     Report Count (3)
    0x81, 0x02,       //     Input (Data, Variable, Absolute)
    0x95, 0x05,       //     Report Count (5)
    0x81, 0x01,       //     Input (Constant)
    0xC0,             // End Collection
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01,       // Usage (1)
    0xA1, 0x01,       // Collection (Application)
    0x85, 0x04,       //     Report ID (4)
    0x75, 0x08,       //     Report Size (8)
    0x95, 0x03,       //     Report Count (3)
    0x19, 0x00,       //     Usage Minimum (0)
    0x2A, 0xFF, 0x00, //     Usage Maximum (255)
    0x15, 0x00,       //     Logical Minimum (0)
    0x26, 0xFF, 0x00, //     Logical Maximum (255)
    0x81, 0x00,       //     Input (Data, Array)
    0xC0,             // End Collection
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x0C,       // Usage (Wireless Radio Controls)
    0xA1, 0x01,       // Collection (Application)
    0x85, 0x05,       //     Report ID (5)
    0x15, 0x00,       //     Logical Minimum (0)
    0x25, 0x01,       //     Logical Maximum (1)
    0x09, 0xC6,       //     Usage (Wireless Radio Button)
    0x95, 0x01,       //     Report Count (1)
    0x75, 0x01,       //     Report Size (1)
    0x81, 0x06,       //     Input (Data, Variable, Relative)
    0x95, 0x01,       //     Report Count (1)
    0x75, 0x07,       //     Report Size (7)
    0x81, 0x03,       //     Input (Constant, Variable)
    0xC0,             // End Collection
];

/// Returns the corrected descriptor for USB interface 0 and `rdesc` unchanged otherwise.
/// Devices not on a USB interface (`None`) are passed through.
pub fn replace_keyboard_rdesc(rdesc: &[u8], interface_number: Option<u8>) -> &[u8] {
    match interface_number {
        Some(0) => SYNAPTICS_KBD_RDESC_FIXED,
        _ => rdesc,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SynapticsDriver;

impl HidDriver for SynapticsDriver {
    fn name(&self) -> &'static str {
        "synaptics"
    }

    fn id_table(&self) -> &[HidDeviceId] {
        SYNAPTICS_DEVICES
    }

    fn report_fixup<'r>(&self, hdev: &HidDevice<'_>, rdesc: &'r mut [u8]) -> &'r [u8] {
        if hdev.usb_interface_number() == Some(0) {
            info!(
                "{}: replacing {} bytes keyboard report descriptor",
                hdev.name(),
                rdesc.len()
            );
        }
        replace_keyboard_rdesc(rdesc, hdev.usb_interface_number())
    }

    fn probe(&self, hdev: &mut HidDevice<'_>, id: &HidDeviceId) -> Result<(), HidError> {
        trace!("{}: synaptics probe", hdev.name());

        hdev.add_quirks(Quirks::from_bits_truncate(id.driver_data));

        hdev.parse().map_err(|e| {
            error!("{}: parse failed", hdev.name());
            e
        })?;

        hdev.hw_start(ConnectMask::DEFAULT).map_err(|e| {
            error!("{}: hw start failed", hdev.name());
            e
        })
    }

    fn remove(&self, hdev: &mut HidDevice<'_>) {
        trace!("{}: synaptics remove", hdev.name());
        hdev.hw_stop();
    }

    fn raw_event(&self, _hdev: &mut HidDevice<'_>, _data: &mut [u8]) -> Result<RawEvent, HidError> {
        Ok(RawEvent::Continue)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::acer::ACER_KBD_RDESC_ORIG;
    use crate::hid_bus::descriptor::check_usage_limits;

    #[test]
    fn interface_zero_gets_fixed_table() {
        let rdesc = ACER_KBD_RDESC_ORIG;
        assert_eq!(replace_keyboard_rdesc(&rdesc, Some(0)), SYNAPTICS_KBD_RDESC_FIXED);
    }

    #[test]
    fn input_length_is_ignored() {
        assert_eq!(replace_keyboard_rdesc(&[], Some(0)), SYNAPTICS_KBD_RDESC_FIXED);
        assert_eq!(
            replace_keyboard_rdesc(&[0xC0; 512], Some(0)),
            SYNAPTICS_KBD_RDESC_FIXED
        );
    }

    #[test]
    fn other_interfaces_pass_through() {
        let rdesc = ACER_KBD_RDESC_ORIG;
        for interface in [Some(1), Some(2), Some(0xff), None] {
            let out = replace_keyboard_rdesc(&rdesc, interface);
            assert_eq!(out, &rdesc[..]);
            assert_eq!(out.as_ptr(), rdesc.as_ptr());
        }
    }

    #[test]
    fn fixed_table_is_within_usage_limits() {
        assert_eq!(SYNAPTICS_KBD_RDESC_FIXED.len(), 172);
        assert_eq!(check_usage_limits(SYNAPTICS_KBD_RDESC_FIXED), Ok(()));
    }

    #[test]
    fn fixed_table_keeps_keyboard_collection() {
        assert_eq!(
            &SYNAPTICS_KBD_RDESC_FIXED[..67],
            &ACER_KBD_RDESC_ORIG[..67]
        );
    }

    #[test]
    fn no_quirks_by_default() {
        assert_eq!(
            Quirks::from_bits_truncate(SYNAPTICS_DEVICES[0].driver_data),
            Quirks::empty()
        );
    }
}
