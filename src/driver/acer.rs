//! Acer keyboards with an oversized usage range
//!
//! Acer keyboards, e.g. in the Acer SW5-012, use the Synaptics touchpad USB id
//! (06cb:2968, 06cb:2991) and report a descriptor that specifies an excessively large number of
//! usages and logical maximum (2^16), more than [`HID_MAX_USAGES`](crate::hid_bus::descriptor::HID_MAX_USAGES).
//! Patching the high bytes of both values down to `0x00FF` (2^8) lets the descriptor parse.
use log::info;

use crate::hid_bus::device::{HidDevice, HidDeviceId};
use crate::hid_bus::driver::HidDriver;
use crate::ids::*;

pub const ACER_KBD_RDESC_ORIG_SIZE: usize = 188;
pub const ACER_KBD_RDESC_CHECK_POS: usize = 150;
/// Usage Maximum (0xFFFF), Logical Minimum (0), Logical Maximum (0xFFFF)
pub const ACER_KBD_RDESC_CHECK_DATA: u64 = 0x2AFF_FF15_0026_FFFF;
pub const ACER_KBD_RDESC_FIX_POS1: usize = 152;
pub const ACER_KBD_RDESC_FIX_POS2: usize = 157;

pub const ACER_DEVICES: &[HidDeviceId] = &[
    HidDeviceId::usb_device(
        USB_VENDOR_ID_ACER_SYNAPTICS,
        USB_VENDOR_ID_ACER_SYNAPTICS_TP_2968,
    ),
    HidDeviceId::usb_device(
        USB_VENDOR_ID_ACER_SYNAPTICS,
        USB_VENDOR_ID_ACER_SYNAPTICS_TP_2991,
    ),
    HidDeviceId::usb_device(
        USB_VENDOR_ID_ACER_SYNAPTICS,
        USB_VENDOR_ID_ACER_SYNAPTICS_TP_74D9,
    ),
];

/// Patches the known bad descriptor in place. Returns `false`, leaving `rdesc` untouched, for
/// any other descriptor.
pub fn fixup_keyboard_rdesc(rdesc: &mut [u8]) -> bool {
    if rdesc.len() != ACER_KBD_RDESC_ORIG_SIZE {
        return false;
    }

    let check = rdesc
        .get(ACER_KBD_RDESC_CHECK_POS..ACER_KBD_RDESC_CHECK_POS + 8)
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map(u64::from_be_bytes);

    if check != Some(ACER_KBD_RDESC_CHECK_DATA) {
        return false;
    }

    rdesc[ACER_KBD_RDESC_FIX_POS1] = 0x00;
    rdesc[ACER_KBD_RDESC_FIX_POS2] = 0x00;
    true
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcerDriver;

impl HidDriver for AcerDriver {
    fn name(&self) -> &'static str {
        "acer"
    }

    fn id_table(&self) -> &[HidDeviceId] {
        ACER_DEVICES
    }

    fn report_fixup<'r>(&self, hdev: &HidDevice<'_>, rdesc: &'r mut [u8]) -> &'r [u8] {
        if fixup_keyboard_rdesc(rdesc) {
            info!("{}: fixing up acer keyboard report descriptor", hdev.name());
        }
        rdesc
    }
}

/// Report descriptor of the affected keyboards, as read from the device
#[cfg(test)]
#[rustfmt::skip]
pub(crate) const ACER_KBD_RDESC_ORIG: [u8; ACER_KBD_RDESC_ORIG_SIZE] = [
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
    0x09, 0x02,       //     Usage (2)
    0x15, 0x00,       //     Logical Minimum (0)
    0x25, 0x7F,       //     Logical Maximum (127)
    0x75, 0x08,       //     Report Size (8)
    0x95, 0x07,       //     Report Count (7)
    0xB1, 0x02,       //     Feature (Data, Variable, Absolute)
    0x09, 0x03,       //     Usage (3)
    0x91, 0x02,       //     Output (Data, Variable, Absolute)
    0x75, 0x08,       //     Report Size (8)
    0x95, 0x03,       //     Report Count (3)
    0x19, 0x00,       //     Usage Minimum (0)
    0x2A, 0xFF, 0xFF, //     Usage Maximum (65535)
    0x15, 0x00,       //     Logical Minimum (0)
    0x26, 0xFF, 0xFF, //     Logical Maximum (65535)
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
