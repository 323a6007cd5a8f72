//! Report descriptor fixups for Acer and Synaptics USB keyboards.
//!
//! Some Acer keyboards (e.g. in the Acer SW5-012) enumerate with the Synaptics touchpad USB id and
//! advertise a report descriptor whose usage and logical maximum ranges (2^16) exceed
//! [`HID_MAX_USAGES`](hid_bus::descriptor::HID_MAX_USAGES). A host parser rejects such a
//! descriptor and the keyboard is unusable. This library contains two drivers that repair the
//! descriptor before it is parsed:
//!
//! * [`AcerDriver`](driver::acer::AcerDriver) - patches two bytes of the known bad 188 byte descriptor in place
//! * [`SynapticsDriver`](driver::synaptics::SynapticsDriver) - replaces the descriptor of interface 0 with a
//!   corrected static table
//!
//! Drivers are registered on a [`HidBus`](hid_bus::HidBus), which matches attached devices against
//! each driver's id table and runs the probe/remove lifecycle:
//!
//! ```rust
//! use hid_rdesc_fixups::prelude::*;
//! use hid_rdesc_fixups::driver::acer::AcerDriver;
//! use hid_rdesc_fixups::driver::generic::GenericDriver;
//! use hid_rdesc_fixups::ids::*;
//!
//! struct Transport;
//!
//! impl HidTransport for Transport {
//!     fn start(&mut self, _connect_mask: ConnectMask) -> Result<(), HidError> {
//!         Ok(())
//!     }
//!     fn stop(&mut self) {}
//! }
//!
//! let bus = HidBusBuilder::new()
//!     .add_driver(AcerDriver)
//!     .add_driver(GenericDriver)
//!     .build();
//!
//! let mut rdesc = [0x05, 0x01, 0x09, 0x06, 0xA1, 0x01, 0xC0];
//! let mut transport = Transport;
//! let mut hdev = HidDeviceBuilder::new(HidDeviceId::usb_device(
//!     USB_VENDOR_ID_ACER_SYNAPTICS,
//!     USB_VENDOR_ID_ACER_SYNAPTICS_TP_2991,
//! ))
//! .name("Acer Keyboard")
//! .unwrap()
//! .usb_interface(0)
//! .build(&mut transport, &mut rdesc);
//!
//! assert_eq!(bus.attach(&mut hdev), Ok("acer"));
//! bus.detach(&mut hdev);
//! ```

#![no_std]

//Allow the use of std in tests
#[cfg(test)]
#[macro_use]
extern crate std;

use core::fmt;

pub mod driver;
pub mod hid_bus;
pub mod ids;
pub mod prelude;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidError {
    /// No registered driver has a matching id table entry
    NoMatchingDriver,
    /// The device already has a driver bound
    AlreadyBound,
    /// Hardware was started before the report descriptor was parsed
    NotParsed,
    /// An input report arrived before the hardware was started
    NotStarted,
    /// An item runs past the end of the report descriptor
    MalformedDescriptor { offset: usize },
    /// The item at `offset` takes the usage count (or report count) past `HID_MAX_USAGES`
    UsageLimitExceeded { offset: usize, count: u32 },
    /// The low level transport failed
    Transport,
}

impl fmt::Display for HidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HidError::NoMatchingDriver => write!(f, "no matching driver"),
            HidError::AlreadyBound => write!(f, "device already bound to a driver"),
            HidError::NotParsed => write!(f, "report descriptor not parsed"),
            HidError::NotStarted => write!(f, "hardware not started"),
            HidError::MalformedDescriptor { offset } => {
                write!(f, "truncated item at offset {}", offset)
            }
            HidError::UsageLimitExceeded { offset, count } => {
                write!(f, "{} usages at offset {} exceed the usage limit", count, offset)
            }
            HidError::Transport => write!(f, "transport error"),
        }
    }
}
