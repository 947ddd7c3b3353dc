//! ODM Reserved Fuses
//!
//! A logical ODM word does not line up with the physical fuse dwords. Its low six bits occupy the top of one dword
//! and the remaining 26 bits the bottom of the next, so neighbouring ODM words share a physical dword:
//!
//! ```text
//! logical   [31 ............................ 6][5 ... 0]
//! physical  high dword bits [25 ........... 0]  low dword bits [31 .. 26]
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Register offsets of the sensed ODM reserved fuse words.
pub const RESERVED_ODM8: u32 = 0x16E8;
pub const RESERVED_ODM9: u32 = 0x16EC;
pub const RESERVED_ODM10: u32 = 0x16F0;
pub const RESERVED_ODM11: u32 = 0x16F4;

const LOW_WORD_MASK: u32 = 0x0000_003F;
const LOW_WORD_SHIFT: u32 = 26;
const HIGH_WORD_MASK: u32 = 0xFFFF_FFC0;
const HIGH_WORD_SHIFT: u32 = 6;

/// The two physical fuse dwords one copy of a logical word is burned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusePair {
    pub low: u32,
    pub high: u32,
}

impl FusePair {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// The bits of `value` that belong in the low dword, in position.
    pub const fn low_word(value: u32) -> u32 {
        (value & LOW_WORD_MASK) << LOW_WORD_SHIFT
    }

    /// The bits of `value` that belong in the high dword, in position.
    pub const fn high_word(value: u32) -> u32 {
        (value & HIGH_WORD_MASK) >> HIGH_WORD_SHIFT
    }

    /// The `(fuse address, word)` burns that store `value` in this copy, in burn order.
    pub const fn burns(&self, value: u32) -> [(u32, u32); 2] {
        [(self.low, Self::low_word(value)), (self.high, Self::high_word(value))]
    }
}

/// A logical ODM fuse word and where its copies live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OdmFuse {
    /// Offset of the sensed value in the fuse register space.
    pub register_offset: u32,
    pub primary: FusePair,
    pub redundant: FusePair,
}

/// ODM8 through ODM11 on T194.
pub const T194_ODM_FUSES: [OdmFuse; 4] = [
    OdmFuse { register_offset: RESERVED_ODM8, primary: FusePair::new(0x2E, 0x2F), redundant: FusePair::new(0x6E, 0x6F) },
    OdmFuse { register_offset: RESERVED_ODM9, primary: FusePair::new(0x2F, 0x30), redundant: FusePair::new(0x6F, 0x70) },
    OdmFuse {
        register_offset: RESERVED_ODM10,
        primary: FusePair::new(0x30, 0x31),
        redundant: FusePair::new(0x70, 0x71),
    },
    OdmFuse {
        register_offset: RESERVED_ODM11,
        primary: FusePair::new(0x31, 0x32),
        redundant: FusePair::new(0x71, 0x72),
    },
];

/// Looks up the table row for `register_offset`.
pub fn find(table: &[OdmFuse], register_offset: u32) -> Option<&OdmFuse> {
    table.iter().find(|fuse| fuse.register_offset == register_offset)
}
