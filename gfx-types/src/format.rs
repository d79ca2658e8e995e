//! Packed pixel and vertex formats.
//!
//! A [`Format`] is a single `u32` code laid out as
//! `0x00TTCCFF`: the scalar type in bits 16..24, the component layout in
//! bits 8..16 and [`FormatFlags`] in the low byte.

#![allow(missing_docs)]

use std::fmt;

/// Scalar type of each component.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatTypeFlags {
    U8 = 0x01,
    U16 = 0x02,
    U32 = 0x03,
    S8 = 0x04,
    S16 = 0x05,
    S32 = 0x06,
    F32 = 0x07,
}

impl FormatTypeFlags {
    pub const ALL: [Self; 7] = [
        Self::U8,
        Self::U16,
        Self::U32,
        Self::S8,
        Self::S16,
        Self::S32,
        Self::F32,
    ];

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| *ty as u8 == bits)
    }

    /// Size of one component in bytes.
    pub fn byte_size(self) -> u32 {
        match self {
            Self::U8 | Self::S8 => 1,
            Self::U16 | Self::S16 => 2,
            Self::U32 | Self::S32 | Self::F32 => 4,
        }
    }
}

/// Component layout.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatCompFlags {
    R = 0x01,
    Rg = 0x02,
    Rgb = 0x03,
    Rgba = 0x04,
}

impl FormatCompFlags {
    pub const ALL: [Self; 4] = [Self::R, Self::Rg, Self::Rgb, Self::Rgba];

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|comp| *comp as u8 == bits)
    }

    pub fn component_count(self) -> u32 {
        self as u32
    }
}

bitflags::bitflags! {
    /// Interpretation flags stored in the low byte of a [`Format`].
    #[repr(transparent)]
    pub struct FormatFlags: u8 {
        /// Integer components are normalized to `[0, 1]` (or `[-1, 1]`).
        const NORMALIZED = 0b0000_0001;
    }
}

/// A packed format code.
///
/// Codes can only be built from valid parts, so decoding never fails.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Format(u32);

impl Format {
    pub const F32_R: Self = Self::new(FormatTypeFlags::F32, FormatCompFlags::R, FormatFlags::empty());
    pub const F32_RG: Self = Self::new(FormatTypeFlags::F32, FormatCompFlags::Rg, FormatFlags::empty());
    pub const F32_RGB: Self = Self::new(FormatTypeFlags::F32, FormatCompFlags::Rgb, FormatFlags::empty());
    pub const F32_RGBA: Self = Self::new(FormatTypeFlags::F32, FormatCompFlags::Rgba, FormatFlags::empty());
    pub const U16_R: Self = Self::new(FormatTypeFlags::U16, FormatCompFlags::R, FormatFlags::empty());
    pub const U16_R_NORM: Self = Self::new(FormatTypeFlags::U16, FormatCompFlags::R, FormatFlags::NORMALIZED);
    pub const U32_R: Self = Self::new(FormatTypeFlags::U32, FormatCompFlags::R, FormatFlags::empty());
    pub const U8_R_NORM: Self = Self::new(FormatTypeFlags::U8, FormatCompFlags::R, FormatFlags::NORMALIZED);
    pub const U8_RG_NORM: Self = Self::new(FormatTypeFlags::U8, FormatCompFlags::Rg, FormatFlags::NORMALIZED);
    pub const U8_RGB_NORM: Self = Self::new(FormatTypeFlags::U8, FormatCompFlags::Rgb, FormatFlags::NORMALIZED);
    pub const U8_RGBA: Self = Self::new(FormatTypeFlags::U8, FormatCompFlags::Rgba, FormatFlags::empty());
    pub const U8_RGBA_NORM: Self = Self::new(FormatTypeFlags::U8, FormatCompFlags::Rgba, FormatFlags::NORMALIZED);
    pub const S8_RGB_NORM: Self = Self::new(FormatTypeFlags::S8, FormatCompFlags::Rgb, FormatFlags::NORMALIZED);
    pub const S16_R_NORM: Self = Self::new(FormatTypeFlags::S16, FormatCompFlags::R, FormatFlags::NORMALIZED);
    pub const S16_RG_NORM: Self = Self::new(FormatTypeFlags::S16, FormatCompFlags::Rg, FormatFlags::NORMALIZED);
    pub const S16_RGB_NORM: Self = Self::new(FormatTypeFlags::S16, FormatCompFlags::Rgb, FormatFlags::NORMALIZED);

    pub const fn new(ty: FormatTypeFlags, comp: FormatCompFlags, flags: FormatFlags) -> Self {
        Self((ty as u32) << 16 | (comp as u32) << 8 | flags.bits() as u32)
    }

    /// Validates a raw code produced by [`Format::raw`].
    pub fn from_raw(raw: u32) -> Option<Self> {
        if raw >> 24 != 0 {
            return None;
        }
        let ty = FormatTypeFlags::from_bits((raw >> 16) as u8)?;
        let comp = FormatCompFlags::from_bits((raw >> 8) as u8)?;
        let flags = FormatFlags::from_bits(raw as u8)?;
        Some(Self::new(ty, comp, flags))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn type_flags(self) -> FormatTypeFlags {
        match FormatTypeFlags::from_bits((self.0 >> 16) as u8) {
            Some(ty) => ty,
            None => unreachable!("corrupt format type bits in {:#x}", self.0),
        }
    }

    pub fn comp_flags(self) -> FormatCompFlags {
        match FormatCompFlags::from_bits((self.0 >> 8) as u8) {
            Some(comp) => comp,
            None => unreachable!("corrupt format component bits in {:#x}", self.0),
        }
    }

    pub fn flags(self) -> FormatFlags {
        FormatFlags::from_bits_truncate(self.0 as u8)
    }

    pub fn is_normalized(self) -> bool {
        self.flags().contains(FormatFlags::NORMALIZED)
    }

    pub fn component_count(self) -> u32 {
        self.comp_flags().component_count()
    }

    /// Size of a single component in bytes.
    pub fn comp_byte_size(self) -> u32 {
        self.type_flags().byte_size()
    }

    /// Size of a whole element (texel or vertex attribute) in bytes.
    pub fn byte_size(self) -> u32 {
        self.comp_byte_size() * self.component_count()
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Format({:?}, {:?}", self.type_flags(), self.comp_flags())?;
        if self.is_normalized() {
            f.write_str(", NORMALIZED")?;
        }
        f.write_str(")")
    }
}
