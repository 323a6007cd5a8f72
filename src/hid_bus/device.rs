//! HID device identity, quirks and the host side device handle
use bitflags::bitflags;
use core::fmt::Write;
use heapless::String;
use log::{error, info, trace};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::hid_bus::descriptor::check_usage_limits;
use crate::hid_bus::driver::HidDriver;
use crate::HidError;

/// Matches any vendor or product id
pub const HID_ANY_ID: u16 = 0xffff;

pub const HID_NAME_LEN: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Bus {
    Pci = 0x01,
    Usb = 0x03,
    Bluetooth = 0x05,
    Virtual = 0x06,
    I2c = 0x18,
    Any = 0xffff,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Quirks: u32 {
        const NOGET = 1 << 3;
        const BADPAD = 1 << 5;
        const MULTI_INPUT = 1 << 6;
        const ALWAYS_POLL = 1 << 10;
        const NO_INIT_REPORTS = 1 << 29;
        const NO_IGNORE = 1 << 30;
    }
}

bitflags! {
    /// Interfaces the transport connects once hardware is started
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ConnectMask: u32 {
        const HIDINPUT = 0x01;
        const HIDINPUT_FORCE = 0x02;
        const HIDRAW = 0x04;
        const HIDDEV = 0x08;
        const HIDDEV_FORCE = 0x10;
        const FF = 0x20;
        const DEFAULT = Self::HIDINPUT.bits()
            | Self::HIDRAW.bits()
            | Self::HIDDEV.bits()
            | Self::FF.bits();
    }
}

/// An entry of a driver id table, also used as the identity of an attached device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HidDeviceId {
    pub bus: Bus,
    pub vendor: u16,
    pub product: u16,
    /// Quirks applied by the driver on probe
    pub driver_data: u32,
}

impl HidDeviceId {
    pub const fn usb_device(vendor: u16, product: u16) -> Self {
        Self {
            bus: Bus::Usb,
            vendor,
            product,
            driver_data: 0,
        }
    }

    pub const fn any() -> Self {
        Self {
            bus: Bus::Any,
            vendor: HID_ANY_ID,
            product: HID_ANY_ID,
            driver_data: 0,
        }
    }

    #[must_use]
    pub const fn with_driver_data(mut self, driver_data: u32) -> Self {
        self.driver_data = driver_data;
        self
    }

    /// Whether this table entry matches the identity of a device
    pub fn matches(&self, device: &HidDeviceId) -> bool {
        (self.bus == Bus::Any || self.bus == device.bus)
            && (self.vendor == HID_ANY_ID || self.vendor == device.vendor)
            && (self.product == HID_ANY_ID || self.product == device.product)
    }
}

/// Low level transport of a device (USB, I2C, ...)
pub trait HidTransport {
    fn start(&mut self, connect_mask: ConnectMask) -> Result<(), HidError>;
    fn stop(&mut self);
}

/// Result of handing a raw input report to a driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawEvent {
    /// The report continues to the generic report handling
    Continue,
    /// The driver consumed the report
    Handled,
}

enum ReportDescriptor<'a> {
    Device(&'a mut [u8]),
    Fixed(&'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidDeviceBuilderError {
    ValueOverflow,
}

#[must_use = "this `HidDeviceBuilder` must be assigned or consumed by `::build()`"]
#[derive(Debug, Clone)]
pub struct HidDeviceBuilder {
    id: HidDeviceId,
    name: String<HID_NAME_LEN>,
    usb_interface: Option<u8>,
    quirks: Quirks,
}

impl HidDeviceBuilder {
    pub fn new(id: HidDeviceId) -> Self {
        let mut name = String::new();
        // "UUUU:VVVV:PPPP" always fits
        write!(
            name,
            "{:04X}:{:04X}:{:04X}",
            u16::from(id.bus),
            id.vendor,
            id.product
        )
        .ok();
        Self {
            id,
            name,
            usb_interface: None,
            quirks: Quirks::empty(),
        }
    }

    pub fn name(mut self, name: &str) -> Result<Self, HidDeviceBuilderError> {
        self.name.clear();
        self.name
            .push_str(name)
            .map_err(|_| HidDeviceBuilderError::ValueOverflow)?;
        Ok(self)
    }

    /// Interface number of the USB interface the device belongs to
    pub fn usb_interface(mut self, interface_number: u8) -> Self {
        self.usb_interface = Some(interface_number);
        self
    }

    pub fn quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn build<'a>(
        self,
        transport: &'a mut dyn HidTransport,
        rdesc: &'a mut [u8],
    ) -> HidDevice<'a> {
        HidDevice {
            id: self.id,
            name: self.name,
            usb_interface: self.usb_interface,
            quirks: self.quirks,
            rdesc: ReportDescriptor::Device(rdesc),
            parsed: false,
            started: false,
            transport,
            driver: None,
        }
    }
}

/// A device attached to the host, with the report descriptor it supplied
pub struct HidDevice<'a> {
    id: HidDeviceId,
    name: String<HID_NAME_LEN>,
    usb_interface: Option<u8>,
    quirks: Quirks,
    rdesc: ReportDescriptor<'a>,
    parsed: bool,
    started: bool,
    transport: &'a mut dyn HidTransport,
    pub(crate) driver: Option<&'a dyn HidDriver>,
}

impl<'a> HidDevice<'a> {
    pub fn id(&self) -> &HidDeviceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interface number when the device sits on a USB interface, `None` for other transports
    pub fn usb_interface_number(&self) -> Option<u8> {
        match self.id.bus {
            Bus::Usb => self.usb_interface,
            _ => None,
        }
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn add_quirks(&mut self, quirks: Quirks) {
        self.quirks |= quirks;
    }

    pub fn driver_name(&self) -> Option<&'static str> {
        self.driver.map(|d| d.name())
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The device supplied descriptor before parsing, the fixed up one afterwards
    pub fn report_descriptor(&self) -> &[u8] {
        match &self.rdesc {
            ReportDescriptor::Device(rdesc) => rdesc,
            ReportDescriptor::Fixed(rdesc) => rdesc,
        }
    }

    /// Applies the bound driver's report fixup and checks the resulting descriptor
    ///
    /// The fixup runs once, a repeated parse checks the already fixed descriptor.
    pub fn parse(&mut self) -> Result<(), HidError> {
        if self.parsed {
            return Ok(());
        }

        let previous = core::mem::replace(&mut self.rdesc, ReportDescriptor::Fixed(&[]));
        let rdesc: &'a [u8] = match previous {
            ReportDescriptor::Device(dev_rdesc) => match self.driver {
                Some(driver) => {
                    let len = dev_rdesc.len();
                    let rdesc = driver.report_fixup(self, dev_rdesc);
                    if rdesc.len() != len {
                        trace!(
                            "{}: report descriptor {} -> {} bytes",
                            self.name,
                            len,
                            rdesc.len()
                        );
                    }
                    rdesc
                }
                None => &*dev_rdesc,
            },
            ReportDescriptor::Fixed(rdesc) => rdesc,
        };
        self.rdesc = ReportDescriptor::Fixed(rdesc);

        check_usage_limits(rdesc).map_err(|e| {
            error!("{}: report descriptor rejected: {}", self.name, e);
            e
        })?;

        self.parsed = true;
        Ok(())
    }

    pub fn hw_start(&mut self, connect_mask: ConnectMask) -> Result<(), HidError> {
        if !self.parsed {
            return Err(HidError::NotParsed);
        }
        if self.started {
            return Ok(());
        }
        self.transport.start(connect_mask)?;
        self.started = true;
        info!(
            "{}: started, {} bytes report descriptor",
            self.name,
            self.report_descriptor().len()
        );
        Ok(())
    }

    pub fn hw_stop(&mut self) {
        if self.started {
            self.transport.stop();
            self.started = false;
            trace!("{}: stopped", self.name);
        }
    }

    /// Hands an input report to the bound driver
    pub fn raw_event(&mut self, data: &mut [u8]) -> Result<RawEvent, HidError> {
        if !self.started {
            return Err(HidError::NotStarted);
        }
        match self.driver {
            Some(driver) => driver.raw_event(self, data),
            None => Ok(RawEvent::Continue),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ids::*;

    #[test]
    fn usb_id_matches_device() {
        let entry = HidDeviceId::usb_device(
            USB_VENDOR_ID_ACER_SYNAPTICS,
            USB_VENDOR_ID_ACER_SYNAPTICS_TP_2991,
        );
        assert!(entry.matches(&HidDeviceId::usb_device(0x06cb, 0x2991)));
        assert!(!entry.matches(&HidDeviceId::usb_device(0x06cb, 0x2968)));
        assert!(!entry.matches(&HidDeviceId {
            bus: Bus::I2c,
            ..HidDeviceId::usb_device(0x06cb, 0x2991)
        }));
    }

    #[test]
    fn any_id_matches_everything() {
        let device = HidDeviceId {
            bus: Bus::Bluetooth,
            vendor: 0x1209,
            product: 0x0001,
            driver_data: 0,
        };
        assert!(HidDeviceId::any().matches(&device));
    }

    #[test]
    fn driver_data_does_not_affect_matching() {
        let entry = HidDeviceId::usb_device(0x06cb, 0x2968).with_driver_data(0x400);
        assert!(entry.matches(&HidDeviceId::usb_device(0x06cb, 0x2968)));
    }

    #[test]
    fn bus_from_raw() {
        assert_eq!(Bus::try_from(0x03u16).ok(), Some(Bus::Usb));
        assert!(Bus::try_from(0x02u16).is_err());
    }

    #[test]
    fn default_connect_mask() {
        assert_eq!(ConnectMask::DEFAULT.bits(), 0x2d);
    }

    #[test]
    fn name_overflow() {
        let long = [b'x'; HID_NAME_LEN + 1];
        assert_eq!(
            HidDeviceBuilder::new(HidDeviceId::any())
                .name(core::str::from_utf8(&long).unwrap())
                .err(),
            Some(HidDeviceBuilderError::ValueOverflow)
        );
    }

    #[test]
    fn default_name_from_id() {
        struct NullTransport;
        impl HidTransport for NullTransport {
            fn start(&mut self, _: ConnectMask) -> Result<(), HidError> {
                Ok(())
            }
            fn stop(&mut self) {}
        }

        let mut transport = NullTransport;
        let mut rdesc = [0xC0];
        let hdev = HidDeviceBuilder::new(HidDeviceId::usb_device(0x06cb, 0x2968))
            .usb_interface(1)
            .build(&mut transport, &mut rdesc);
        assert_eq!(hdev.name(), "0003:06CB:2968");
        assert_eq!(hdev.usb_interface_number(), Some(1));
    }
}
