//! Preset Catalog
//!
//! This module provides the raw register tables of the SPU reverb unit:
//! - [`PresetRecord`] - the 32 sixteen-bit registers describing one room
//! - [`Preset`] - a named catalog entry with its declared working-area size
//! - [`CATALOG`] - the ten standard presets shipped with the unit's SDK
//!
//! Records are opaque data as far as this module is concerned: delay taps are
//! stored in the unit's native 4-sample address units and gains in signed
//! 1.15 fixed point. Decoding both into engine coefficients is the job of
//! [`ReverbParams::derive`](crate::params::ReverbParams::derive).
//!
//! # Example
//!
//! ```
//! use spuverb::prelude::*;
//!
//! for (index, preset) in CATALOG.iter().enumerate() {
//!     println!("{index}: {}", preset.name);
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Raw register dump of one reverb configuration.
///
/// Field names follow the unit's documented register mnemonics: `d*` are
/// source tap offsets, `m*` are write/read tap offsets, `v*` are gains.
/// Offsets are unsigned 4-sample address units; gains are signed 1.15
/// fixed point (`i16 / 32768`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRecord {
    /// All-pass filter 1 delay depth
    pub d_apf1: u16,
    /// All-pass filter 2 delay depth
    pub d_apf2: u16,
    /// Wall-reflection one-pole smoothing coefficient
    pub v_iir: i16,
    /// Comb filter 1 gain
    pub v_comb1: i16,
    /// Comb filter 2 gain
    pub v_comb2: i16,
    /// Comb filter 3 gain
    pub v_comb3: i16,
    /// Comb filter 4 gain
    pub v_comb4: i16,
    /// Wall reflection gain
    pub v_wall: i16,
    /// All-pass filter 1 gain
    pub v_apf1: i16,
    /// All-pass filter 2 gain
    pub v_apf2: i16,
    /// Same-side reflection write tap, left
    pub m_l_same: u16,
    /// Same-side reflection write tap, right
    pub m_r_same: u16,
    /// Comb filter 1 tap, left
    pub m_l_comb1: u16,
    /// Comb filter 1 tap, right
    pub m_r_comb1: u16,
    /// Comb filter 2 tap, left
    pub m_l_comb2: u16,
    /// Comb filter 2 tap, right
    pub m_r_comb2: u16,
    /// Same-side reflection source tap, left
    pub d_l_same: u16,
    /// Same-side reflection source tap, right
    pub d_r_same: u16,
    /// Cross-side reflection write tap, left
    pub m_l_diff: u16,
    /// Cross-side reflection write tap, right
    pub m_r_diff: u16,
    /// Comb filter 3 tap, left
    pub m_l_comb3: u16,
    /// Comb filter 3 tap, right
    pub m_r_comb3: u16,
    /// Comb filter 4 tap, left
    pub m_l_comb4: u16,
    /// Comb filter 4 tap, right
    pub m_r_comb4: u16,
    /// Cross-side reflection source tap, left
    pub d_l_diff: u16,
    /// Cross-side reflection source tap, right
    pub d_r_diff: u16,
    /// All-pass filter 1 tap, left
    pub m_l_apf1: u16,
    /// All-pass filter 1 tap, right
    pub m_r_apf1: u16,
    /// All-pass filter 2 tap, left
    pub m_l_apf2: u16,
    /// All-pass filter 2 tap, right
    pub m_r_apf2: u16,
    /// Input gain, left
    pub v_l_in: i16,
    /// Input gain, right
    pub v_r_in: i16,
}

impl PresetRecord {
    /// Build a record from the 32 registers in dump order.
    ///
    /// Gain registers are reinterpreted as signed; `0x8000` decodes to -1.0.
    pub const fn from_registers(regs: [u16; 32]) -> Self {
        Self {
            d_apf1: regs[0],
            d_apf2: regs[1],
            v_iir: regs[2] as i16,
            v_comb1: regs[3] as i16,
            v_comb2: regs[4] as i16,
            v_comb3: regs[5] as i16,
            v_comb4: regs[6] as i16,
            v_wall: regs[7] as i16,
            v_apf1: regs[8] as i16,
            v_apf2: regs[9] as i16,
            m_l_same: regs[10],
            m_r_same: regs[11],
            m_l_comb1: regs[12],
            m_r_comb1: regs[13],
            m_l_comb2: regs[14],
            m_r_comb2: regs[15],
            d_l_same: regs[16],
            d_r_same: regs[17],
            m_l_diff: regs[18],
            m_r_diff: regs[19],
            m_l_comb3: regs[20],
            m_r_comb3: regs[21],
            m_l_comb4: regs[22],
            m_r_comb4: regs[23],
            d_l_diff: regs[24],
            d_r_diff: regs[25],
            m_l_apf1: regs[26],
            m_r_apf1: regs[27],
            m_l_apf2: regs[28],
            m_r_apf2: regs[29],
            v_l_in: regs[30] as i16,
            v_r_in: regs[31] as i16,
        }
    }
}

/// A catalog entry: a register record plus the metadata the deriver needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Display name
    pub name: &'static str,
    /// Declared working-area size in bytes at the unit's native rate.
    ///
    /// Determines the minimum delay span the buffer must cover so that no
    /// two taps alias within one processing cycle.
    pub native_bytes: u32,
    /// The raw registers
    pub registers: PresetRecord,
}

impl Preset {
    const fn new(name: &'static str, native_bytes: u32, regs: [u16; 32]) -> Self {
        Self {
            name,
            native_bytes,
            registers: PresetRecord::from_registers(regs),
        }
    }
}

/// The ten standard presets, indexed the way the unit's SDK lists them.
pub const CATALOG: [Preset; 10] = [
    Preset::new(
        "Room",
        0x26C0,
        [
            0x007D, 0x005B, 0x6D80, 0x54B8, 0xBED0, 0x0000, 0x0000, 0xBA80,
            0x5800, 0x5300, 0x04D6, 0x0333, 0x03F0, 0x0227, 0x0374, 0x01EF,
            0x0334, 0x01B5, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
            0x0000, 0x0000, 0x01B4, 0x0136, 0x00B8, 0x005C, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Studio Small",
        0x1F40,
        [
            0x0033, 0x0025, 0x70F0, 0x4FA8, 0xBCE0, 0x4410, 0xC0F0, 0x9C00,
            0x5280, 0x4EC0, 0x03E4, 0x031B, 0x03A4, 0x02AF, 0x0372, 0x0266,
            0x031C, 0x025D, 0x025C, 0x018E, 0x022F, 0x0135, 0x01D2, 0x00B7,
            0x018F, 0x00B5, 0x00B4, 0x0080, 0x004C, 0x0026, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Studio Medium",
        0x4840,
        [
            0x00B1, 0x007F, 0x70F0, 0x4FA8, 0xBCE0, 0x4510, 0xBEF0, 0xB4C0,
            0x5280, 0x4EC0, 0x0904, 0x076B, 0x0824, 0x065F, 0x07A2, 0x0616,
            0x076C, 0x05ED, 0x05EC, 0x042E, 0x050F, 0x0305, 0x0462, 0x02B7,
            0x042F, 0x0265, 0x0264, 0x01B2, 0x0100, 0x0080, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Studio Large",
        0x6FE0,
        [
            0x00E3, 0x00A9, 0x6F60, 0x4FA8, 0xBCE0, 0x4510, 0xBEF0, 0xA680,
            0x5680, 0x52C0, 0x0DFB, 0x0B58, 0x0D09, 0x0A3C, 0x0BD9, 0x0973,
            0x0B59, 0x08DA, 0x08D9, 0x05E9, 0x07EC, 0x04B0, 0x06EF, 0x03D2,
            0x05EA, 0x031D, 0x031C, 0x0238, 0x0154, 0x00AA, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Hall",
        0xADE0,
        [
            0x01A5, 0x0139, 0x6000, 0x5000, 0x4C00, 0xB800, 0xBC00, 0xC000,
            0x6000, 0x5C00, 0x15BA, 0x11BB, 0x14C2, 0x10BD, 0x11BC, 0x0DC1,
            0x11C0, 0x0DC3, 0x0DC0, 0x09C1, 0x0BC4, 0x07C1, 0x0A00, 0x06CD,
            0x09C2, 0x05C1, 0x05C0, 0x041A, 0x0274, 0x013A, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Half Echo",
        0x3C00,
        [
            0x0017, 0x0013, 0x70F0, 0x4FA8, 0xBCE0, 0x4510, 0xBEF0, 0x8500,
            0x5F80, 0x54C0, 0x0371, 0x02AF, 0x02E5, 0x01DF, 0x02B0, 0x01D7,
            0x0358, 0x026A, 0x01D6, 0x011E, 0x012D, 0x00B1, 0x011F, 0x0059,
            0x01A0, 0x00E3, 0x0058, 0x0040, 0x0028, 0x0014, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Space Echo",
        0xF6C0,
        [
            0x033D, 0x0231, 0x7E00, 0x5000, 0xB400, 0xB000, 0x4C00, 0xB000,
            0x6000, 0x5400, 0x1ED6, 0x1A31, 0x1D14, 0x183B, 0x1BC2, 0x16B2,
            0x1A32, 0x15EF, 0x15EE, 0x1055, 0x1334, 0x0F2D, 0x11F6, 0x0C5D,
            0x1056, 0x0AE1, 0x0AE0, 0x07A2, 0x0464, 0x0232, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Chaos Echo",
        0x18040,
        [
            0x0001, 0x0001, 0x7FFF, 0x7FFF, 0x0000, 0x0000, 0x0000, 0x8100,
            0x0000, 0x0000, 0x1FFF, 0x0FFF, 0x1005, 0x0005, 0x0000, 0x0000,
            0x1005, 0x0005, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
            0x0000, 0x0000, 0x1004, 0x1002, 0x0004, 0x0002, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Delay",
        0x18040,
        [
            0x0001, 0x0001, 0x7FFF, 0x7FFF, 0x0000, 0x0000, 0x0000, 0x0000,
            0x0000, 0x0000, 0x1FFF, 0x0FFF, 0x1005, 0x0005, 0x0000, 0x0000,
            0x1005, 0x0005, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
            0x0000, 0x0000, 0x1004, 0x1002, 0x0004, 0x0002, 0x8000, 0x8000,
        ],
    ),
    Preset::new(
        "Off",
        0x10,
        [
            0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
            0x0000, 0x0000, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001,
            0x0000, 0x0000, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001,
            0x0000, 0x0000, 0x0001, 0x0001, 0x0001, 0x0001, 0x0000, 0x0000,
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_names() {
        assert_eq!(CATALOG.len(), 10);

        let mut names: Vec<&str> = CATALOG.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10, "preset names must be unique");
    }

    #[test]
    fn test_register_decoding() {
        let hall = &CATALOG[4];
        assert_eq!(hall.name, "Hall");
        assert_eq!(hall.registers.d_apf1, 0x01A5);
        assert_eq!(hall.registers.d_apf2, 0x0139);
        assert_eq!(hall.registers.m_l_same, 0x15BA);

        // Gain registers reinterpret as signed.
        assert_eq!(hall.registers.v_wall, 0xC000u16 as i16);
        assert!(hall.registers.v_wall < 0);
        assert_eq!(hall.registers.v_l_in, -32768);
    }

    #[test]
    fn test_native_sizes_cover_taps() {
        // The declared working area must hold the largest write tap of its
        // own record at the native rate.
        for preset in &CATALOG {
            let span = (preset.native_bytes >> 1) as u32;
            let r = &preset.registers;
            let max_tap = [
                r.m_l_same, r.m_r_same, r.m_l_diff, r.m_r_diff,
                r.m_l_comb1, r.m_r_comb1, r.m_l_comb2, r.m_r_comb2,
                r.m_l_comb3, r.m_r_comb3, r.m_l_comb4, r.m_r_comb4,
                r.m_l_apf1, r.m_r_apf1, r.m_l_apf2, r.m_r_apf2,
                r.d_l_same, r.d_r_same, r.d_l_diff, r.d_r_diff,
            ]
            .into_iter()
            .map(|t| (t as u32) << 2)
            .max()
            .unwrap();
            assert!(
                max_tap < span,
                "{}: tap 0x{max_tap:X} exceeds span 0x{span:X}",
                preset.name
            );
        }
    }

    #[test]
    fn test_record_is_serializable() {
        // Hosts persist raw records; the derived impls must stay in place.
        fn assert_serde<T: serde::Serialize + serde::de::DeserializeOwned>() {}
        assert_serde::<PresetRecord>();
    }
}
