//! Report descriptor items and the usage limit check applied when a descriptor is parsed
use log::{error, trace};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use packed_struct::prelude::*;

use crate::HidError;

/// Maximum number of usages (and report count) a single field may declare
pub const HID_MAX_USAGES: u32 = 12288;

/// Prefix byte of a long item, followed by a data size byte and a tag byte
pub const LONG_ITEM_PREFIX: u8 = 0xFE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PrimitiveEnum)]
#[repr(u8)]
pub enum ItemType {
    Main = 0,
    Global = 1,
    Local = 2,
    Reserved = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MainTag {
    Input = 0x8,
    Output = 0x9,
    Collection = 0xA,
    Feature = 0xB,
    EndCollection = 0xC,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum GlobalTag {
    UsagePage = 0x0,
    LogicalMinimum = 0x1,
    LogicalMaximum = 0x2,
    PhysicalMinimum = 0x3,
    PhysicalMaximum = 0x4,
    UnitExponent = 0x5,
    Unit = 0x6,
    ReportSize = 0x7,
    ReportId = 0x8,
    ReportCount = 0x9,
    Push = 0xA,
    Pop = 0xB,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum LocalTag {
    Usage = 0x0,
    UsageMinimum = 0x1,
    UsageMaximum = 0x2,
    DesignatorIndex = 0x3,
    DesignatorMinimum = 0x4,
    DesignatorMaximum = 0x5,
    StringIndex = 0x7,
    StringMinimum = 0x8,
    StringMaximum = 0x9,
    Delimiter = 0xA,
}

/// Short item prefix byte
///
/// Defined in section 6.2.2.2 of [Device Class Definition for Human
/// Interface Devices (Hid) Version 1.11](<https://www.usb.org/sites/default/files/hid1_11.pdf>)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(bit_numbering = "lsb0", size_bytes = "1")]
pub struct ItemPrefix {
    #[packed_field(bits = "0..=1")]
    pub size: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "2..=3", ty = "enum")]
    pub item_type: ItemType,
    #[packed_field(bits = "4..=7")]
    pub tag: Integer<u8, packed_bits::Bits<4>>,
}

impl ItemPrefix {
    /// Number of data bytes following the prefix, a size of 3 encodes 4 bytes
    pub fn data_len(&self) -> usize {
        match *self.size {
            3 => 4,
            n => n as usize,
        }
    }

    pub fn tag(&self) -> u8 {
        *self.tag
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Item<'a> {
    /// Offset of the prefix byte within the descriptor
    pub offset: usize,
    pub prefix: ItemPrefix,
    pub data: &'a [u8],
    pub long: bool,
}

impl<'a> Item<'a> {
    /// Item data as an unsigned little endian value
    pub fn value(&self) -> u32 {
        self.data
            .iter()
            .take(4)
            .rev()
            .fold(0, |acc, b| (acc << 8) | u32::from(*b))
    }
}

/// Iterator over the items of a report descriptor
#[derive(Clone, Debug)]
pub struct Items<'a> {
    rdesc: &'a [u8],
    offset: usize,
}

pub fn items(rdesc: &[u8]) -> Items<'_> {
    Items { rdesc, offset: 0 }
}

impl<'a> Iterator for Items<'a> {
    type Item = Result<Item<'a>, HidError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let &byte = self.rdesc.get(offset)?;

        // stop after the first error
        self.offset = self.rdesc.len();

        let malformed = HidError::MalformedDescriptor { offset };

        let (prefix, data_start, data_len, long) = if byte == LONG_ITEM_PREFIX {
            match self.rdesc.get(offset + 1..offset + 3) {
                Some(header) => (
                    ItemPrefix {
                        size: 2.into(),
                        item_type: ItemType::Reserved,
                        tag: 0xF.into(),
                    },
                    offset + 3,
                    header[0] as usize,
                    true,
                ),
                None => return Some(Err(malformed)),
            }
        } else {
            match ItemPrefix::unpack(&[byte]) {
                Ok(prefix) => (prefix, offset + 1, prefix.data_len(), false),
                Err(_) => return Some(Err(malformed)),
            }
        };

        let data = match self.rdesc.get(data_start..data_start + data_len) {
            Some(data) => data,
            None => return Some(Err(malformed)),
        };

        self.offset = data_start + data_len;
        Some(Ok(Item {
            offset,
            prefix,
            data,
            long,
        }))
    }
}

/// Checks that no field of `rdesc` declares more than [`HID_MAX_USAGES`] usages
///
/// A host parser rejects such a descriptor outright, this reports the first offending item.
pub fn check_usage_limits(rdesc: &[u8]) -> Result<(), HidError> {
    let mut usage_index: u32 = 0;
    let mut usage_minimum: u32 = 0;

    for item in items(rdesc) {
        let item = item.map_err(|e| {
            error!("report descriptor: {}", e);
            e
        })?;

        if item.long {
            trace!("skipping long item at {}", item.offset);
            continue;
        }

        match item.prefix.item_type {
            ItemType::Main => {
                if MainTag::try_from(item.prefix.tag()).is_err() {
                    trace!("unknown main item {:#x} at {}", item.prefix.tag(), item.offset);
                }
                usage_index = 0;
                usage_minimum = 0;
            }
            ItemType::Global => {
                if matches!(
                    GlobalTag::try_from(item.prefix.tag()),
                    Ok(GlobalTag::ReportCount)
                ) && item.value() > HID_MAX_USAGES
                {
                    return Err(HidError::UsageLimitExceeded {
                        offset: item.offset,
                        count: item.value(),
                    });
                }
            }
            ItemType::Local => match LocalTag::try_from(item.prefix.tag()) {
                Ok(LocalTag::Usage) => {
                    usage_index += 1;
                    if usage_index > HID_MAX_USAGES {
                        return Err(HidError::UsageLimitExceeded {
                            offset: item.offset,
                            count: usage_index,
                        });
                    }
                }
                Ok(LocalTag::UsageMinimum) => usage_minimum = item.value(),
                Ok(LocalTag::UsageMaximum) => {
                    // the minimum stays in local state until the next main item
                    let range = match item.value().checked_sub(usage_minimum) {
                        Some(span) => u64::from(span) + 1,
                        None => 0,
                    };
                    let count = u64::from(usage_index) + range;
                    if count > u64::from(HID_MAX_USAGES) {
                        return Err(HidError::UsageLimitExceeded {
                            offset: item.offset,
                            count: u32::try_from(count).unwrap_or(u32::MAX),
                        });
                    }
                    usage_index = count as u32;
                }
                _ => {}
            },
            ItemType::Reserved => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use packed_struct::prelude::*;

    use super::*;

    #[test]
    fn usage_maximum_prefix() {
        let prefix = ItemPrefix::unpack(&[0x2A]).unwrap();
        assert_eq!(prefix.data_len(), 2);
        assert_eq!(prefix.item_type, ItemType::Local);
        assert_eq!(prefix.tag(), LocalTag::UsageMaximum as u8);
    }

    #[test]
    fn logical_maximum_prefix() {
        let prefix = ItemPrefix::unpack(&[0x26]).unwrap();
        assert_eq!(prefix.data_len(), 2);
        assert_eq!(prefix.item_type, ItemType::Global);
        assert_eq!(prefix.tag(), GlobalTag::LogicalMaximum as u8);
    }

    #[test]
    fn four_byte_item() {
        let rdesc = [0x27, 0xFF, 0xFF, 0x00, 0x00, 0xC0];
        let items: std::vec::Vec<_> = items(&rdesc).collect::<Result<_, _>>().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].value(), 0xFFFF);
        assert_eq!(items[1].offset, 5);
        assert!(items[1].data.is_empty());
    }

    #[test]
    fn long_item_is_skipped() {
        let rdesc = [0xFE, 0x02, 0x10, 0xAA, 0xBB, 0x09, 0x01];
        let items: std::vec::Vec<_> = items(&rdesc).collect::<Result<_, _>>().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].long);
        assert_eq!(items[0].data, &[0xAA, 0xBB]);
        assert_eq!(items[1].offset, 5);
    }

    #[test]
    fn truncated_item() {
        let rdesc = [0x05, 0x01, 0x26, 0xFF];
        let mut items = items(&rdesc);
        assert!(items.next().unwrap().is_ok());
        assert_eq!(
            items.next(),
            Some(Err(HidError::MalformedDescriptor { offset: 2 }))
        );
        assert_eq!(items.next(), None);
    }

    #[test]
    fn full_byte_range_is_accepted() {
        #[rustfmt::skip]
        let rdesc = [
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0xFF, 0x00,   // Usage Maximum (255)
            0x15, 0x00,         // Logical Minimum (0)
            0x26, 0xFF, 0x00,   // Logical Maximum (255)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(check_usage_limits(&rdesc), Ok(()));
    }

    #[test]
    fn oversized_usage_range_is_rejected() {
        #[rustfmt::skip]
        let rdesc = [
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0xFF, 0xFF,   // Usage Maximum (65535)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(
            check_usage_limits(&rdesc),
            Err(HidError::UsageLimitExceeded {
                offset: 2,
                count: 65536
            })
        );
    }

    #[test]
    fn main_item_resets_usages() {
        #[rustfmt::skip]
        let rdesc = [
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0x00, 0x20,   // Usage Maximum (8192)
            0x81, 0x00,         // Input (Data, Array)
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0x00, 0x20,   // Usage Maximum (8192)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(check_usage_limits(&rdesc), Ok(()));
    }

    #[test]
    fn oversized_report_count_is_rejected() {
        let rdesc = [0x96, 0x01, 0x30];
        assert_eq!(
            check_usage_limits(&rdesc),
            Err(HidError::UsageLimitExceeded {
                offset: 0,
                count: 0x3001
            })
        );
    }

    #[test]
    fn usage_maximum_without_minimum_counts_from_zero() {
        #[rustfmt::skip]
        let rdesc = [
            0x06, 0x00, 0xFF,   // Usage Page (Vendor Defined 0xFF00)
            0x2A, 0xFF, 0xFF,   // Usage Maximum (65535)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(
            check_usage_limits(&rdesc),
            Err(HidError::UsageLimitExceeded {
                offset: 3,
                count: 65536
            })
        );
    }

    #[test]
    fn usage_minimum_applies_to_every_maximum() {
        #[rustfmt::skip]
        let rdesc = [
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0x00, 0x18,   // Usage Maximum (6144)
            0x2A, 0x00, 0x18,   // Usage Maximum (6144)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(
            check_usage_limits(&rdesc),
            Err(HidError::UsageLimitExceeded {
                offset: 5,
                count: 12290
            })
        );
    }

    #[test]
    fn inverted_usage_range_adds_nothing() {
        #[rustfmt::skip]
        let rdesc = [
            0x1A, 0x00, 0x30,   // Usage Minimum (12288)
            0x2A, 0xFF, 0x2F,   // Usage Maximum (12287)
            0x09, 0x01,         // Usage (1)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(check_usage_limits(&rdesc), Ok(()));
    }

    #[test]
    fn unknown_main_item_resets_usages() {
        #[rustfmt::skip]
        let rdesc = [
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0x00, 0x20,   // Usage Maximum (8192)
            0x00,               // reserved main item
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0x00, 0x20,   // Usage Maximum (8192)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(check_usage_limits(&rdesc), Ok(()));
    }

    #[test]
    fn usage_range_at_limit() {
        #[rustfmt::skip]
        let at_limit = [
            0x19, 0x01,         // Usage Minimum (1)
            0x2A, 0x00, 0x30,   // Usage Maximum (12288)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(check_usage_limits(&at_limit), Ok(()));

        #[rustfmt::skip]
        let over_limit = [
            0x19, 0x00,         // Usage Minimum (0)
            0x2A, 0x00, 0x30,   // Usage Maximum (12288)
            0x81, 0x00,         // Input (Data, Array)
        ];
        assert_eq!(
            check_usage_limits(&over_limit),
            Err(HidError::UsageLimitExceeded {
                offset: 2,
                count: 12289
            })
        );
    }

    #[test]
    fn report_count_at_limit() {
        let rdesc = [0x96, 0x00, 0x30];
        assert_eq!(check_usage_limits(&rdesc), Ok(()));
    }
}
