//! Reverb Engine
//!
//! This module provides the real-time half of the crate:
//! - [`ReverbEngine`] - owns the circular delay buffer and per-sample state
//! - [`Controls`] - the per-block control values handed in by the host
//! - [`db_to_linear`] - decibel control mapping with a hard silence floor
//!
//! The engine processes one stereo frame at a time against a single mono
//! delay buffer; left and right channels interleave through the same buffer
//! at distinct tap offsets, exactly as the original unit's working memory
//! does. All tap addresses are fixed offsets relative to a write cursor that
//! advances once per frame, so advancing the cursor slides every delay line
//! forward at once.
//!
//! The block path is real-time safe: no allocation, no locks, no error paths.
//! The only diagnostic it can emit is a rate-limited warning when the host
//! selects a preset index outside the catalog, in which case the previous
//! parameters stay active.

use crate::params::ReverbParams;
use crate::preset::{Preset, CATALOG};

/// Rates at or below this are rejected at construction.
pub const MIN_SAMPLE_RATE: f32 = 1.0;

/// Per-sample smoothing step for the three level controls.
///
/// Deliberately tied to sample count rather than wall-clock time; the unit's
/// smoothing speed varies with sample rate and that behavior is preserved.
const SMOOTHING_COEFF: f32 = 0.001;

/// Controls at or below this many dB map to exactly zero gain.
const SILENCE_FLOOR_DB: f32 = -90.0;

/// Emit at most one invalid-preset warning per this many offending blocks.
const INVALID_PRESET_LOG_PERIOD: u64 = 512;

/// Convert a decibel control value to a linear gain.
///
/// Values at or below -90 dB return exactly `0.0`, skipping the `powf` for
/// silent controls and keeping denormals out of the smoothing recurrences.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    if db > SILENCE_FLOOR_DB {
        10.0_f32.powf(db * 0.05)
    } else {
        0.0
    }
}

/// Control values read once per processing block.
///
/// Defaults to 0 dB on every level and the first catalog preset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controls {
    /// Reverberated signal level in dB
    pub wet_db: f32,
    /// Unprocessed signal level in dB
    pub dry_db: f32,
    /// Overall output level in dB
    pub master_db: f32,
    /// Catalog index of the requested preset
    pub preset: usize,
}

/// A gain tracking its target by one exponential step per sample.
#[derive(Debug, Clone, Copy)]
struct Smoothed {
    current: f32,
    target: f32,
}

impl Smoothed {
    fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advance one step and return the smoothed value.
    #[inline]
    fn next(&mut self) -> f32 {
        self.current += SMOOTHING_COEFF * (self.target - self.current);
        self.current
    }
}

/// Error type for engine construction and preset selection.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Sample rate at construction was non-finite or at/below the minimum
    InvalidSampleRate(f32),
    /// Preset index outside the catalog range
    InvalidPreset(usize),
    /// Catalog handed to the engine holds no presets
    EmptyCatalog,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidSampleRate(rate) => {
                write!(f, "Invalid sample rate: {} Hz", rate)
            }
            EngineError::InvalidPreset(index) => {
                write!(f, "Preset index out of range: {}", index)
            }
            EngineError::EmptyCatalog => write!(f, "Preset catalog is empty"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Emulation of the SPU reverb unit at an arbitrary sample rate.
///
/// Each instance owns its buffer and parameters outright; multiple engines
/// are independent and may be driven by different callers. A single instance
/// expects serialized, non-reentrant calls from one audio thread.
pub struct ReverbEngine {
    sample_rate: f32,
    catalog: &'static [Preset],
    params: ReverbParams,
    active_preset: usize,
    /// Mono working memory shared by both channels, sized once for the
    /// worst-case catalog entry so preset switches never reallocate.
    buffer: Vec<f32>,
    /// `params.buffer_len - 1`; wraps tap addresses for the active preset.
    mask: i32,
    cursor: i32,
    dry: Smoothed,
    wet: Smoothed,
    master: Smoothed,
    invalid_selections: u64,
}

impl ReverbEngine {
    /// Create an engine over the standard catalog.
    pub fn new(sample_rate: f32) -> Result<Self, EngineError> {
        Self::with_catalog(sample_rate, &CATALOG)
    }

    /// Create an engine over a caller-supplied catalog.
    ///
    /// The delay buffer is allocated here, sized for the largest preset in
    /// the catalog at this rate, and never resized afterwards. Preset 0 is
    /// active after construction.
    pub fn with_catalog(
        sample_rate: f32,
        catalog: &'static [Preset],
    ) -> Result<Self, EngineError> {
        if !sample_rate.is_finite() || sample_rate <= MIN_SAMPLE_RATE {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let worst_case = catalog
            .iter()
            .map(|preset| ReverbParams::derive(preset, sample_rate).buffer_len)
            .max()
            .unwrap_or(1);
        let params = ReverbParams::derive(&catalog[0], sample_rate);

        Ok(Self {
            sample_rate,
            catalog,
            mask: params.buffer_len as i32 - 1,
            params,
            active_preset: 0,
            buffer: vec![0.0; worst_case],
            cursor: 0,
            dry: Smoothed::new(1.0),
            wet: Smoothed::new(1.0),
            master: Smoothed::new(1.0),
            invalid_selections: 0,
        })
    }

    /// Sample rate this engine was constructed for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Catalog index of the active preset.
    pub fn active_preset(&self) -> usize {
        self.active_preset
    }

    /// Working parameters of the active preset.
    pub fn params(&self) -> &ReverbParams {
        &self.params
    }

    /// Switch to another catalog preset.
    ///
    /// Re-derives parameters, zeroes the working memory and rewinds the
    /// cursor, discarding the reverb tail instantly. The smoothed level
    /// controls keep their state. On error the engine is left untouched.
    pub fn set_preset(&mut self, index: usize) -> Result<(), EngineError> {
        let preset = self
            .catalog
            .get(index)
            .ok_or(EngineError::InvalidPreset(index))?;
        self.params = ReverbParams::derive(preset, self.sample_rate);
        self.mask = self.params.buffer_len as i32 - 1;
        self.buffer.fill(0.0);
        self.cursor = 0;
        self.active_preset = index;
        self.invalid_selections = 0;
        Ok(())
    }

    /// Full reset: clear the buffer and snap all smoothed gains back to 1.0.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
        self.dry = Smoothed::new(1.0);
        self.wet = Smoothed::new(1.0);
        self.master = Smoothed::new(1.0);
    }

    /// Access the buffer cell at a signed offset from the write cursor.
    ///
    /// The single point where wraparound arithmetic happens: offsets are
    /// added as signed integers and masked, so negative relative offsets
    /// (e.g. an all-pass tap minus its depth) wrap correctly as long as
    /// their magnitude stays below the buffer length.
    #[inline]
    fn tap(&mut self, offset: i32) -> &mut f32 {
        let index = (self.cursor + offset) & self.mask;
        &mut self.buffer[index as usize]
    }

    /// Process one stereo frame and return the output pair.
    ///
    /// Statement order mirrors the unit's per-cycle schedule; several taps
    /// may alias within one frame (the all-pass stages re-read their delayed
    /// cell after storing, which is observable when the depth is zero), so
    /// reads and writes must not be reordered.
    pub fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        let p = self.params;

        let lin = p.v_l_in * left;
        let rin = p.v_r_in * right;

        // Same-side reflections: one-pole smoothed wall echo per channel.
        let prev = *self.tap(p.m_l_same - 1);
        let far = *self.tap(p.d_l_same);
        *self.tap(p.m_l_same) = (lin + far * p.v_wall - prev) * p.v_iir + prev;
        let prev = *self.tap(p.m_r_same - 1);
        let far = *self.tap(p.d_r_same);
        *self.tap(p.m_r_same) = (rin + far * p.v_wall - prev) * p.v_iir + prev;

        // Cross-side reflections: each channel fed from the opposite wall.
        let prev = *self.tap(p.m_l_diff - 1);
        let far = *self.tap(p.d_r_diff);
        *self.tap(p.m_l_diff) = (lin + far * p.v_wall - prev) * p.v_iir + prev;
        let prev = *self.tap(p.m_r_diff - 1);
        let far = *self.tap(p.d_l_diff);
        *self.tap(p.m_r_diff) = (rin + far * p.v_wall - prev) * p.v_iir + prev;

        // Early echo: four feed-forward comb taps per channel.
        let mut lout = p.v_comb1 * *self.tap(p.m_l_comb1)
            + p.v_comb2 * *self.tap(p.m_l_comb2)
            + p.v_comb3 * *self.tap(p.m_l_comb3)
            + p.v_comb4 * *self.tap(p.m_l_comb4);
        let mut rout = p.v_comb1 * *self.tap(p.m_r_comb1)
            + p.v_comb2 * *self.tap(p.m_r_comb2)
            + p.v_comb3 * *self.tap(p.m_r_comb3)
            + p.v_comb4 * *self.tap(p.m_r_comb4);

        // Late reverb, all-pass stage 1.
        lout -= p.v_apf1 * *self.tap(p.m_l_apf1 - p.d_apf1);
        *self.tap(p.m_l_apf1) = lout;
        lout = lout * p.v_apf1 + *self.tap(p.m_l_apf1 - p.d_apf1);
        rout -= p.v_apf1 * *self.tap(p.m_r_apf1 - p.d_apf1);
        *self.tap(p.m_r_apf1) = rout;
        rout = rout * p.v_apf1 + *self.tap(p.m_r_apf1 - p.d_apf1);

        // Late reverb, all-pass stage 2.
        lout -= p.v_apf2 * *self.tap(p.m_l_apf2 - p.d_apf2);
        *self.tap(p.m_l_apf2) = lout;
        lout = lout * p.v_apf2 + *self.tap(p.m_l_apf2 - p.d_apf2);
        rout -= p.v_apf2 * *self.tap(p.m_r_apf2 - p.d_apf2);
        *self.tap(p.m_r_apf2) = rout;
        rout = rout * p.v_apf2 + *self.tap(p.m_r_apf2 - p.d_apf2);

        // Slide every delay line forward one sample.
        self.cursor = (self.cursor + 1) & self.mask;

        let dry = self.dry.next();
        let wet = self.wet.next();
        let master = self.master.next();

        // Dry path uses the input-gain-scaled signal, coupling the dry level
        // to the preset's input gain fields.
        let out_l = (lout * wet + lin * dry) * master;
        let out_r = (rout * wet + rin * dry) * master;
        (out_l, out_r)
    }

    /// Process one block of interleaved-channel slices.
    ///
    /// A preset index differing from the active one triggers synchronous
    /// re-derivation and a buffer reset before the first frame; an
    /// out-of-range index is ignored (previous parameters stay active) and
    /// reported through the `log` facade, rate-limited by occurrence count.
    ///
    /// All four slices must be the same length; in release builds the block
    /// is processed up to the shortest slice.
    pub fn process_block(
        &mut self,
        controls: &Controls,
        left_in: &[f32],
        right_in: &[f32],
        left_out: &mut [f32],
        right_out: &mut [f32],
    ) {
        debug_assert_eq!(left_in.len(), right_in.len());
        debug_assert_eq!(left_in.len(), left_out.len());
        debug_assert_eq!(left_in.len(), right_out.len());

        if controls.preset != self.active_preset && self.set_preset(controls.preset).is_err() {
            if self.invalid_selections % INVALID_PRESET_LOG_PERIOD == 0 {
                log::warn!(
                    "ignoring out-of-range preset index {} (catalog holds {}), keeping \"{}\"",
                    controls.preset,
                    self.catalog.len(),
                    self.catalog[self.active_preset].name
                );
            }
            self.invalid_selections += 1;
        }

        self.dry.set_target(db_to_linear(controls.dry_db));
        self.wet.set_target(db_to_linear(controls.wet_db));
        self.master.set_target(db_to_linear(controls.master_db));

        let frames = left_in
            .len()
            .min(right_in.len())
            .min(left_out.len())
            .min(right_out.len());
        for i in 0..frames {
            let (l, r) = self.process_frame(left_in[i], right_in[i]);
            left_out[i] = l;
            right_out[i] = r;
        }
    }
}
