//! Prelude for registering drivers and attaching devices

pub use crate::hid_bus::device::{
    Bus, ConnectMask, HidDevice, HidDeviceBuilder, HidDeviceBuilderError, HidDeviceId,
    HidTransport, Quirks, RawEvent,
};
pub use crate::hid_bus::driver::HidDriver;
pub use crate::hid_bus::{HidBus, HidBusBuilder};
