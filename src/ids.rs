//! USB vendor and product identifiers of the supported keyboards

/// Acer keyboards (e.g. Acer SW5-012) report the Synaptics touchpad vendor id
pub const USB_VENDOR_ID_ACER_SYNAPTICS: u16 = 0x06cb;
pub const USB_VENDOR_ID_ACER_SYNAPTICS_TP_2968: u16 = 0x2968;
pub const USB_VENDOR_ID_ACER_SYNAPTICS_TP_2991: u16 = 0x2991;
pub const USB_VENDOR_ID_ACER_SYNAPTICS_TP_74D9: u16 = 0x74d9;

pub const USB_VENDOR_ID_SYNAPTICS: u16 = 0x06cb;
pub const USB_DEVICE_ID_SYNAPTICS_KEYBOARD: u16 = 0x2968;
