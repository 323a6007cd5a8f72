//! The HID fixup prelude.
//!
//! The purpose of this module is to alleviate imports of structs, traits and enums
//! required to register drivers and attach devices:
//!
//! ```
//! # #![allow(unused_imports)]
//! use hid_rdesc_fixups::prelude::*;
//! ```

pub use crate::hid_bus::prelude::*;
pub use crate::HidError;
