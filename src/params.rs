//! Parameter Deriver
//!
//! Converts one raw [`Preset`](crate::preset::Preset) record plus a target
//! sample rate into the engine's working parameter set:
//!
//! - tap offsets scaled from 4-sample address units to absolute sample counts
//!   at the target rate (multiply by 4, then by the stretch factor, then
//!   truncate - in that order, so results are reproducible across rates)
//! - gains decoded from signed 1.15 fixed point
//! - the wall smoothing coefficient re-derived through its corner frequency
//!   so the filter keeps the unit's brightness at non-native rates
//! - a power-of-two delay buffer length enabling mask-based wraparound
//!
//! Derivation is pure: no allocation, no shared state, and deriving twice
//! from the same inputs yields bit-identical results.

use crate::preset::Preset;
use std::f32::consts::TAU;

/// Sample rate of the original unit's reverb processor in Hz.
pub const NATIVE_RATE: f32 = 22050.0;

/// Working parameters of the reverb network at one sample rate.
///
/// Offsets are absolute sample counts relative to the engine's write cursor,
/// stored signed because tap arithmetic subtracts depths before masking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    pub d_apf1: i32,
    pub d_apf2: i32,
    pub v_iir: f32,
    pub v_comb1: f32,
    pub v_comb2: f32,
    pub v_comb3: f32,
    pub v_comb4: f32,
    pub v_wall: f32,
    pub v_apf1: f32,
    pub v_apf2: f32,
    pub m_l_same: i32,
    pub m_r_same: i32,
    pub m_l_comb1: i32,
    pub m_r_comb1: i32,
    pub m_l_comb2: i32,
    pub m_r_comb2: i32,
    pub d_l_same: i32,
    pub d_r_same: i32,
    pub m_l_diff: i32,
    pub m_r_diff: i32,
    pub m_l_comb3: i32,
    pub m_r_comb3: i32,
    pub m_l_comb4: i32,
    pub m_r_comb4: i32,
    pub d_l_diff: i32,
    pub d_r_diff: i32,
    pub m_l_apf1: i32,
    pub m_r_apf1: i32,
    pub m_l_apf2: i32,
    pub m_r_apf2: i32,
    pub v_l_in: f32,
    pub v_r_in: f32,
    /// Power-of-two circular buffer length covering every tap at this rate.
    pub buffer_len: usize,
}

impl ReverbParams {
    /// Derive working parameters for `preset` at `sample_rate` Hz.
    ///
    /// The caller validates the rate; see
    /// [`ReverbEngine::new`](crate::engine::ReverbEngine::new).
    pub fn derive(preset: &Preset, sample_rate: f32) -> Self {
        let stretch = sample_rate / NATIVE_RATE;
        let r = &preset.registers;

        // 4-sample address units -> samples at the native rate -> stretched.
        // Truncation, not rounding: matches the unit's integer addressing.
        let tap = |raw: u16| -> i32 { (((raw as u32) << 2) as f32 * stretch) as i32 };

        let params = Self {
            d_apf1: tap(r.d_apf1),
            d_apf2: tap(r.d_apf2),
            v_iir: corrected_one_pole(gain(r.v_iir), sample_rate),
            v_comb1: gain(r.v_comb1),
            v_comb2: gain(r.v_comb2),
            v_comb3: gain(r.v_comb3),
            v_comb4: gain(r.v_comb4),
            v_wall: gain(r.v_wall),
            v_apf1: gain(r.v_apf1),
            v_apf2: gain(r.v_apf2),
            m_l_same: tap(r.m_l_same),
            m_r_same: tap(r.m_r_same),
            m_l_comb1: tap(r.m_l_comb1),
            m_r_comb1: tap(r.m_r_comb1),
            m_l_comb2: tap(r.m_l_comb2),
            m_r_comb2: tap(r.m_r_comb2),
            d_l_same: tap(r.d_l_same),
            d_r_same: tap(r.d_r_same),
            m_l_diff: tap(r.m_l_diff),
            m_r_diff: tap(r.m_r_diff),
            m_l_comb3: tap(r.m_l_comb3),
            m_r_comb3: tap(r.m_r_comb3),
            m_l_comb4: tap(r.m_l_comb4),
            m_r_comb4: tap(r.m_r_comb4),
            d_l_diff: tap(r.d_l_diff),
            d_r_diff: tap(r.d_r_diff),
            m_l_apf1: tap(r.m_l_apf1),
            m_r_apf1: tap(r.m_r_apf1),
            m_l_apf2: tap(r.m_l_apf2),
            m_r_apf2: tap(r.m_r_apf2),
            v_l_in: gain(r.v_l_in),
            v_r_in: gain(r.v_r_in),
            buffer_len: required_buffer_len(preset.native_bytes, stretch),
        };

        debug_assert!(
            params.buffer_len > params.max_tap_offset() as usize,
            "{}: buffer {} does not cover tap {}",
            preset.name,
            params.buffer_len,
            params.max_tap_offset()
        );

        params
    }

    /// Largest absolute tap address this parameter set reads or writes.
    pub fn max_tap_offset(&self) -> i32 {
        [
            self.m_l_same, self.m_r_same, self.m_l_diff, self.m_r_diff,
            self.m_l_comb1, self.m_r_comb1, self.m_l_comb2, self.m_r_comb2,
            self.m_l_comb3, self.m_r_comb3, self.m_l_comb4, self.m_r_comb4,
            self.m_l_apf1, self.m_r_apf1, self.m_l_apf2, self.m_r_apf2,
            self.d_l_same, self.d_r_same, self.d_l_diff, self.d_r_diff,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Decode a signed 1.15 fixed-point register to floating point.
#[inline]
pub fn gain(raw: i16) -> f32 {
    raw as f32 / 32768.0
}

/// Smallest power-of-two sample count covering a preset's working area.
///
/// The declared area is `native_bytes` of 16-bit words holding two address
/// units per sample pair, so its native sample span is `native_bytes / 2`.
fn required_buffer_len(native_bytes: u32, stretch: f32) -> usize {
    let span = ((native_bytes >> 1) as f32 * stretch).ceil() as usize;
    span.max(1).next_power_of_two()
}

/// Re-derive a one-pole smoothing coefficient for a new sample rate.
///
/// The recurrence `y += alpha * (x - y)` at the native rate has corner
/// frequency `-ln(1 - alpha) * rate / tau`; solving the same corner at the
/// target rate preserves perceived brightness. Degenerate coefficients
/// (outside the open unit interval) pass through untouched.
fn corrected_one_pole(alpha: f32, sample_rate: f32) -> f32 {
    if alpha <= 0.0 || alpha >= 1.0 {
        return alpha;
    }
    let corner_hz = -(1.0 - alpha).ln() * NATIVE_RATE / TAU;
    1.0 - (-TAU * corner_hz / sample_rate).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::CATALOG;
    use approx::assert_relative_eq;

    const RATES: [f32; 5] = [8000.0, 22050.0, 44100.0, 48000.0, 96000.0];

    #[test]
    fn test_buffer_len_power_of_two_and_covering() {
        for preset in &CATALOG {
            for rate in RATES {
                let params = ReverbParams::derive(preset, rate);
                assert!(
                    params.buffer_len.is_power_of_two(),
                    "{} @ {rate}: len {} not a power of two",
                    preset.name,
                    params.buffer_len
                );
                assert!(
                    params.buffer_len > params.max_tap_offset() as usize,
                    "{} @ {rate}: len {} does not exceed tap {}",
                    preset.name,
                    params.buffer_len,
                    params.max_tap_offset()
                );
            }
        }
    }

    #[test]
    fn test_derivation_is_idempotent() {
        for preset in &CATALOG {
            for rate in RATES {
                let a = ReverbParams::derive(preset, rate);
                let b = ReverbParams::derive(preset, rate);
                assert_eq!(a, b, "{} @ {rate}", preset.name);
            }
        }
    }

    #[test]
    fn test_tap_stretch_is_exact_at_rate_multiples() {
        // 44100 is exactly twice the native rate: every offset doubles.
        let native = ReverbParams::derive(&CATALOG[4], NATIVE_RATE);
        let doubled = ReverbParams::derive(&CATALOG[4], 2.0 * NATIVE_RATE);
        assert_eq!(doubled.m_l_same, native.m_l_same * 2);
        assert_eq!(doubled.m_r_comb4, native.m_r_comb4 * 2);
        assert_eq!(doubled.d_apf1, native.d_apf1 * 2);
    }

    #[test]
    fn test_gain_decoding() {
        assert_relative_eq!(gain(0x4000), 0.5);
        assert_relative_eq!(gain(-32768), -1.0);
        assert_eq!(gain(0), 0.0);
        // Hall input gain is 0x8000 = -1.0.
        let hall = ReverbParams::derive(&CATALOG[4], 48000.0);
        assert_relative_eq!(hall.v_l_in, -1.0);
    }

    #[test]
    fn test_one_pole_correction() {
        let alpha = gain(0x6000); // Hall vIIR, 0.75

        // Native rate round-trips through the corner frequency.
        assert_relative_eq!(
            corrected_one_pole(alpha, NATIVE_RATE),
            alpha,
            epsilon = 1e-6
        );

        // Same corner at a higher rate needs a smaller per-sample step.
        let at_48k = corrected_one_pole(alpha, 48000.0);
        assert!(at_48k > 0.0 && at_48k < alpha);

        // Degenerate coefficients pass through.
        assert_eq!(corrected_one_pole(0.0, 48000.0), 0.0);
        assert_eq!(corrected_one_pole(-0.25, 48000.0), -0.25);
    }

    #[test]
    fn test_off_preset_smallest_buffer() {
        let off = ReverbParams::derive(&CATALOG[9], NATIVE_RATE);
        assert_eq!(off.buffer_len, 8);
        assert_eq!(off.max_tap_offset(), 4);
    }
}
