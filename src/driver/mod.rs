//! Drivers for keyboards with broken report descriptors
pub mod acer;
pub mod generic;
pub mod synaptics;
