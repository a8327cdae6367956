//! Delay arena: one circular buffer carved into named delay lines.
//!
//! ```text
//!   capacity (power of two)
//!   ┌──────────┬─┬──────────────┬─┬──────┬─┬───────────── ─ ─
//!   │  ap1     │ │  ap2         │ │ del1 │ │   (unused)
//!   └──────────┴─┴──────────────┴─┴──────┴─┴───────────── ─ ─
//!   base 0       base len1+1      ...
//! ```
//!
//! Segments are declared as a list of [`Reserve`]s and resolved once, when the
//! layout is built, into `(base, length)` pairs. Each reservation is followed
//! by one spare slot so the `+1` look-ahead of an interpolated read never
//! reaches into the next segment. A layout that does not fit its capacity is
//! rejected at construction.
//!
//! All segments share one write pointer. [`DelayArena::start`] moves it back
//! by one slot per sample, so a value written at offset `0` is found at offset
//! `k` after `k` further calls to `start`. Reading the same line at its
//! [`TAIL`] therefore yields the sample written `length - 1` samples earlier.
//!
//! The per-sample work happens on a [`Context`], a short-lived cursor holding
//! an accumulator. Effects are written as a chain of reads and writes on it:
//!
//! ```
//! use saavy_console::dsp::arena::{ArenaLayout, DelayArena, Reserve, TAIL};
//! use saavy_console::dsp::codec::Float32;
//!
//! let layout = ArenaLayout::new(1024, &[Reserve::new("ap", 100)]).unwrap();
//! let ap = layout.segment(0);
//! let mut arena = DelayArena::<Float32>::new(layout);
//!
//! let kap = 0.6;
//! let mut ctx = arena.start();
//! ctx.load(0.25);
//! ctx.read(ap, TAIL, kap);
//! ctx.write_all_pass(ap, 0, -kap);
//! let out = ctx.store(0.0);
//! assert!(out.is_finite());
//! ```

use crate::dsp::codec::SampleCodec;
use crate::dsp::lfo::Lfo;
use crate::error::{ConsoleError, Result};

/// Offset selecting the last slot of a segment.
pub const TAIL: i32 = -1;

/// One delay line request: a tag for diagnostics and a length in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserve {
    pub name: &'static str,
    pub length: usize,
}

impl Reserve {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }
}

/// Resolved delay line inside an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    base: usize,
    length: usize,
}

impl Segment {
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    fn tap(&self, offset: i32) -> usize {
        if offset == TAIL {
            self.base + self.length - 1
        } else {
            assert!(offset >= 0, "segment offset {} is negative", offset);
            debug_assert!(
                offset as usize <= self.length,
                "offset {} past segment of length {}",
                offset,
                self.length
            );
            self.base + offset as usize
        }
    }
}

/// Segment table for one arena.
#[derive(Debug, Clone)]
pub struct ArenaLayout {
    capacity: usize,
    segments: Vec<Segment>,
    names: Vec<&'static str>,
}

impl ArenaLayout {
    /// Resolve `reserves` into segments inside a buffer of `capacity` slots.
    pub fn new(capacity: usize, reserves: &[Reserve]) -> Result<Self> {
        if !capacity.is_power_of_two() {
            return Err(ConsoleError::CapacityNotPowerOfTwo { capacity });
        }

        let mut segments = Vec::with_capacity(reserves.len());
        let mut names = Vec::with_capacity(reserves.len());
        let mut base = 0;
        for reserve in reserves {
            if reserve.length == 0 {
                return Err(ConsoleError::EmptySegment { name: reserve.name });
            }
            let end = base + reserve.length;
            if end > capacity {
                return Err(ConsoleError::ArenaOverflow {
                    name: reserve.name,
                    end,
                    capacity,
                });
            }
            segments.push(Segment {
                base,
                length: reserve.length,
            });
            names.push(reserve.name);
            base = end + 1;
        }

        Ok(Self {
            capacity,
            segments,
            names,
        })
    }

    /// Smallest power-of-two layout holding every reservation.
    pub fn fit(reserves: &[Reserve]) -> Result<Self> {
        let total: usize = reserves.iter().map(|r| r.length + 1).sum();
        Self::new(total.max(1).next_power_of_two(), reserves)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment by declaration index. Panics when out of range.
    pub fn segment(&self, index: usize) -> Segment {
        self.segments[index]
    }

    pub fn segment_by_name(&self, name: &str) -> Option<Segment> {
        self.names
            .iter()
            .position(|&n| n == name)
            .map(|i| self.segments[i])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Which of the arena's two LFOs to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoIndex {
    Lfo1 = 0,
    Lfo2 = 1,
}

pub const LFO_COUNT: usize = 2;

/// Circular buffer of coded samples plus its write pointer and LFOs.
pub struct DelayArena<C: SampleCodec> {
    buffer: Vec<C::Stored>,
    mask: usize,
    write_ptr: usize,
    layout: ArenaLayout,
    lfos: Option<[Lfo; LFO_COUNT]>,
}

impl<C: SampleCodec> DelayArena<C> {
    pub fn new(layout: ArenaLayout) -> Self {
        let capacity = layout.capacity();
        Self {
            buffer: vec![C::Stored::default(); capacity],
            mask: capacity - 1,
            write_ptr: 0,
            layout,
            lfos: None,
        }
    }

    /// Attach the two modulation LFOs sampled by every [`start`](Self::start).
    pub fn with_lfos(mut self, lfo1: Lfo, lfo2: Lfo) -> Self {
        self.lfos = Some([lfo1, lfo2]);
        self
    }

    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    pub fn segment(&self, index: usize) -> Segment {
        self.layout.segment(index)
    }

    /// `None` when the arena was built without LFOs.
    pub fn lfo_mut(&mut self, index: LfoIndex) -> Option<&mut Lfo> {
        self.lfos.as_mut().map(|lfos| &mut lfos[index as usize])
    }

    pub fn set_lfo_frequency(&mut self, index: LfoIndex, frequency: f32) {
        if let Some(lfos) = self.lfos.as_mut() {
            lfos[index as usize].set_frequency(frequency);
        }
    }

    pub fn set_lfo_normalized_frequency(&mut self, index: LfoIndex, normalized: f32) {
        if let Some(lfos) = self.lfos.as_mut() {
            lfos[index as usize].set_normalized_frequency(normalized);
        }
    }

    /// Zero the memory and rewind the write pointer.
    pub fn clear(&mut self) {
        self.buffer.fill(C::Stored::default());
        self.write_ptr = 0;
    }

    /// Clear memory and put the LFOs back at their initial phase.
    pub fn reset(&mut self) {
        self.clear();
        if let Some(lfos) = self.lfos.as_mut() {
            for lfo in lfos.iter_mut() {
                lfo.reset();
            }
        }
    }

    pub fn write_ptr(&self) -> usize {
        self.write_ptr
    }

    /// Advance one sample and open a context for it.
    ///
    /// Must be called exactly once per sample before any read or write.
    #[inline]
    pub fn start(&mut self) -> Context<'_, C> {
        self.write_ptr = self.write_ptr.wrapping_sub(1) & self.mask;

        let mut lfo_values = [0.0; LFO_COUNT];
        if let Some(lfos) = self.lfos.as_mut() {
            for (value, lfo) in lfo_values.iter_mut().zip(lfos.iter_mut()) {
                *value = lfo.process();
            }
        }

        Context {
            buffer: &mut self.buffer,
            mask: self.mask,
            write_ptr: self.write_ptr,
            accumulator: 0.0,
            previous_read: 0.0,
            lfo_values,
        }
    }
}

/// Per-sample cursor over an arena.
///
/// Borrows the arena for one sample. Every read adds into the accumulator,
/// every write stores the accumulator and then scales it.
pub struct Context<'a, C: SampleCodec> {
    buffer: &'a mut [C::Stored],
    mask: usize,
    write_ptr: usize,
    accumulator: f32,
    previous_read: f32,
    lfo_values: [f32; LFO_COUNT],
}

impl<C: SampleCodec> Context<'_, C> {
    #[inline]
    fn slot(&self, segment: Segment, offset: i32) -> usize {
        (self.write_ptr + segment.tap(offset)) & self.mask
    }

    #[inline]
    fn decode_at(&self, segment: Segment, integral: isize) -> f32 {
        let index = self
            .write_ptr
            .wrapping_add(segment.base)
            .wrapping_add(integral as usize)
            & self.mask;
        C::decode(self.buffer[index])
    }

    /// Replace the accumulator.
    #[inline]
    pub fn load(&mut self, value: f32) {
        self.accumulator = value;
    }

    /// Accumulate an external value.
    #[inline]
    pub fn add(&mut self, value: f32, scale: f32) {
        self.accumulator += value * scale;
    }

    /// Hand the accumulator out, then scale it.
    #[inline]
    pub fn store(&mut self, scale: f32) -> f32 {
        let value = self.accumulator;
        self.accumulator *= scale;
        value
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn previous_read(&self) -> f32 {
        self.previous_read
    }

    pub fn lfo_value(&self, index: LfoIndex) -> f32 {
        self.lfo_values[index as usize]
    }

    /// Read `segment` at `offset` (or its [`TAIL`]) and accumulate it scaled.
    #[inline]
    pub fn read(&mut self, segment: Segment, offset: i32, scale: f32) {
        let value = C::decode(self.buffer[self.slot(segment, offset)]);
        self.previous_read = value;
        self.accumulator += value * scale;
    }

    /// Store the accumulator at `offset` (or [`TAIL`]), then scale it.
    #[inline]
    pub fn write(&mut self, segment: Segment, offset: i32, scale: f32) {
        let index = self.slot(segment, offset);
        self.buffer[index] = C::encode(self.accumulator);
        self.accumulator *= scale;
    }

    /// [`write`](Self::write) then add back the last value read.
    ///
    /// Preceded by `read(seg, TAIL, g)` and called with `-g`, this is a
    /// Schroeder all-pass: `v = x + g·d`, `y = d - g·v`.
    #[inline]
    pub fn write_all_pass(&mut self, segment: Segment, offset: i32, scale: f32) {
        self.write(segment, offset, scale);
        self.accumulator += self.previous_read;
    }

    /// Linear interpolated read at a fractional offset.
    #[inline]
    pub fn interpolate(&mut self, segment: Segment, offset: f32, scale: f32) {
        let integral = offset.floor();
        let fractional = offset - integral;
        let a = self.decode_at(segment, integral as isize);
        let b = self.decode_at(segment, integral as isize + 1);
        let value = a + (b - a) * fractional;
        self.previous_read = value;
        self.accumulator += value * scale;
    }

    /// Interpolated read displaced by `amplitude` times an LFO's value.
    #[inline]
    pub fn interpolate_lfo(
        &mut self,
        segment: Segment,
        offset: f32,
        lfo: LfoIndex,
        amplitude: f32,
        scale: f32,
    ) {
        let offset = offset + amplitude * self.lfo_values[lfo as usize];
        self.interpolate(segment, offset, scale);
    }

    /// One-pole low-pass on the accumulator.
    #[inline]
    pub fn lp(&mut self, state: &mut f32, coefficient: f32) {
        *state += coefficient * (self.accumulator - *state);
        self.accumulator = *state;
    }

    /// One-pole high-pass on the accumulator.
    #[inline]
    pub fn hp(&mut self, state: &mut f32, coefficient: f32) {
        *state += coefficient * (self.accumulator - *state);
        self.accumulator -= *state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::codec::{Fixed16, Float32};

    fn two_lines() -> ArenaLayout {
        ArenaLayout::new(64, &[Reserve::new("a", 10), Reserve::new("b", 20)]).unwrap()
    }

    #[test]
    fn test_bases_are_cumulative_with_separator() {
        let layout = two_lines();
        assert_eq!(layout.segment(0).base(), 0);
        assert_eq!(layout.segment(1).base(), 11);
        assert_eq!(layout.segment_by_name("b"), Some(layout.segment(1)));
        assert_eq!(layout.segment_by_name("c"), None);
    }

    #[test]
    fn test_overflow_rejected_at_construction() {
        let err = ArenaLayout::new(32, &[Reserve::new("a", 20), Reserve::new("b", 20)]);
        assert!(matches!(err, Err(ConsoleError::ArenaOverflow { name: "b", .. })));
    }

    #[test]
    fn test_exact_fit_accepted() {
        // Last segment may end exactly on the capacity.
        let layout = ArenaLayout::new(32, &[Reserve::new("a", 15), Reserve::new("b", 16)]).unwrap();
        assert_eq!(layout.segment(1).base() + layout.segment(1).length(), 32);
    }

    #[test]
    fn test_capacity_must_be_power_of_two() {
        let err = ArenaLayout::new(100, &[Reserve::new("a", 10)]);
        assert!(matches!(err, Err(ConsoleError::CapacityNotPowerOfTwo { capacity: 100 })));
    }

    #[test]
    fn test_fit_rounds_up() {
        let layout = ArenaLayout::fit(&[Reserve::new("a", 100), Reserve::new("b", 100)]).unwrap();
        assert_eq!(layout.capacity(), 256);
    }

    #[test]
    fn test_start_wraps_write_pointer() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        {
            let _ctx = arena.start();
        }
        assert_eq!(arena.write_ptr(), 63);
    }

    #[test]
    fn test_written_sample_travels_one_slot_per_start() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        let line = arena.segment(1);

        let mut ctx = arena.start();
        ctx.load(0.75);
        ctx.write(line, 0, 0.0);

        for k in 1..=line.length() as i32 {
            let mut ctx = arena.start();
            ctx.read(line, k, 1.0);
            assert_eq!(ctx.store(0.0), 0.75, "offset {}", k);
            ctx.read(line, k - 1, 1.0);
            assert_eq!(ctx.store(0.0), 0.0, "offset {}", k - 1);
        }
    }

    #[test]
    fn test_tail_delays_by_length_minus_one() {
        let mut arena = DelayArena::<Fixed16>::new(two_lines());
        let line = arena.segment(0);

        let mut ctx = arena.start();
        ctx.load(0.5);
        ctx.write(line, 0, 0.0);

        for _ in 0..line.length() - 2 {
            let mut ctx = arena.start();
            ctx.read(line, TAIL, 1.0);
            assert_eq!(ctx.store(0.0), 0.0);
        }
        let mut ctx = arena.start();
        ctx.read(line, TAIL, 1.0);
        assert!((ctx.store(0.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_write_scales_accumulator() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        let line = arena.segment(0);
        let mut ctx = arena.start();
        ctx.load(0.5);
        ctx.write(line, 3, 0.5);
        assert_eq!(ctx.accumulator(), 0.25);
        ctx.load(0.0);
        ctx.read(line, 3, 2.0);
        assert_eq!(ctx.accumulator(), 1.0);
        assert_eq!(ctx.previous_read(), 0.5);
    }

    #[test]
    fn test_all_pass_adds_back_previous_read() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        let line = arena.segment(0);
        let mut ctx = arena.start();
        ctx.load(0.4);
        ctx.write(line, TAIL, 0.0);

        let g = 0.5;
        ctx.load(1.0);
        ctx.read(line, TAIL, g); // v = 1 + 0.5*0.4 = 1.2
        ctx.write_all_pass(line, 0, -g); // y = -0.5*1.2 + 0.4 = -0.2
        assert!((ctx.store(0.0) + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_interpolate_between_neighbours() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        let line = arena.segment(1);
        let mut ctx = arena.start();
        ctx.load(0.2);
        ctx.write(line, 4, 0.0);
        ctx.load(0.6);
        ctx.write(line, 5, 0.0);

        ctx.interpolate(line, 4.25, 1.0);
        assert!((ctx.store(0.0) - 0.3).abs() < 1e-6);
        assert!((ctx.previous_read() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_interpolate_lfo_displaces_offset() {
        let lfo1 = Lfo::new(4.0, 1.0, 1.0).with_phase(std::f32::consts::FRAC_PI_2);
        let lfo2 = Lfo::new(4.0, 1.0, 1.0);
        let mut arena = DelayArena::<Float32>::new(two_lines()).with_lfos(lfo1, lfo2);
        let line = arena.segment(1);

        let mut ctx = arena.start();
        // LFO 1 starts at its peak.
        assert!((ctx.lfo_value(LfoIndex::Lfo1) - 1.0).abs() < 1e-6);
        assert!(ctx.lfo_value(LfoIndex::Lfo2).abs() < 1e-6);

        ctx.load(0.9);
        ctx.write(line, 6, 0.0);
        ctx.interpolate_lfo(line, 4.0, LfoIndex::Lfo1, 2.0, 1.0);
        assert!((ctx.store(0.0) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_lp_and_hp_split_signal() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        let mut ctx = arena.start();
        let mut lp_state = 0.0;
        let mut hp_state = 0.0;

        ctx.load(1.0);
        ctx.lp(&mut lp_state, 0.25);
        assert!((ctx.accumulator() - 0.25).abs() < 1e-6);

        ctx.load(1.0);
        ctx.hp(&mut hp_state, 0.25);
        assert!((ctx.accumulator() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut arena = DelayArena::<Fixed16>::new(two_lines());
        let line = arena.segment(0);
        {
            let mut ctx = arena.start();
            ctx.load(0.5);
            ctx.write(line, 0, 0.0);
        }
        arena.reset();
        assert_eq!(arena.write_ptr(), 0);
        let mut ctx = arena.start();
        ctx.read(line, 1, 1.0);
        assert_eq!(ctx.store(0.0), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_negative_offset_panics() {
        let mut arena = DelayArena::<Float32>::new(two_lines());
        let line = arena.segment(0);
        let mut ctx = arena.start();
        ctx.read(line, -2, 1.0);
    }
}
