//! Sample storage formats for delay memory.

/*
Sample Coding
=============

Delay-based effects hold a lot of audio in memory. A one second stereo delay
at 48 kHz is 96 000 samples; a plate reverb tank is tens of thousands more.
Storing every slot as a 32-bit float is simple but wasteful, so each delay
arena picks a storage format and converts at the boundary:

    write:   f32 in [-1, 1]  ──encode──▶  stored word
    read:    stored word     ──decode──▶  f32

Formats
-------

  Float32   Passthrough. Encode clamps to [-1, 1] so a runaway feedback loop
            cannot store values that later blow up. Exact round trip.

  Fixed12   16-bit word, 12 fractional bits (scale 4096). Headroom up to
            ±8.0 at the cost of resolution. Good for diffusers.

  Fixed16   16-bit word, 15 fractional bits (scale 32768). Full-range signal
            with ~-90 dB quantization noise. The usual choice for tanks.

  Fixed32   32-bit word scaled by i32::MAX. Resolution beyond what f32 keeps,
            so the round trip is limited by f32 itself.

Fixed-point words are stored unsigned and reinterpreted as signed when
decoded, so every arena buffer is a plain slice of integers that is trivial
to zero.

Quantization
------------

Encoding is scale-then-round, so the round-trip error for an in-range value
is at most half a step:

    |decode(encode(x)) - x| <= 0.5 / scale

Rounding keeps the mapping monotonic: a larger input never decodes smaller.
*/

/// Runtime tag for a storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleFormat {
    Float32,
    Fixed12,
    Fixed16,
    Fixed32,
}

impl SampleFormat {
    /// Size of one stored slot in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Float32 | SampleFormat::Fixed32 => 4,
            SampleFormat::Fixed12 | SampleFormat::Fixed16 => 2,
        }
    }

    /// Largest round-trip error for an in-range value.
    pub fn max_error(self) -> f32 {
        match self {
            SampleFormat::Float32 => 0.0,
            SampleFormat::Fixed12 => 0.5 / Fixed12::SCALE,
            SampleFormat::Fixed16 => 0.5 / Fixed16::SCALE,
            // f32 carries 24 bits of mantissa, the word carries 31.
            SampleFormat::Fixed32 => f32::EPSILON,
        }
    }
}

/// Conversion between the normalized signal domain and a stored word.
///
/// Implementors are zero-sized markers; arenas are generic over them so the
/// conversion inlines into the read/write paths.
pub trait SampleCodec: Send + Sync + 'static {
    type Stored: Copy + Default + Send + Sync + 'static;

    const FORMAT: SampleFormat;

    fn encode(value: f32) -> Self::Stored;

    fn decode(stored: Self::Stored) -> f32;
}

/// 32-bit float passthrough with symmetric clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Float32;

/// 12 fractional bits in a 16-bit word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed12;

/// 15 fractional bits in a 16-bit word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed16;

/// Full-scale 32-bit word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed32;

impl Fixed12 {
    pub const SCALE: f32 = 4096.0;
}

impl Fixed16 {
    pub const SCALE: f32 = 32768.0;
}

impl Fixed32 {
    pub const SCALE: f64 = i32::MAX as f64;
}

#[inline]
fn clip16(value: f32) -> i16 {
    // NaN lands on 0, out-of-range values saturate.
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

impl SampleCodec for Float32 {
    type Stored = f32;

    const FORMAT: SampleFormat = SampleFormat::Float32;

    #[inline]
    fn encode(value: f32) -> f32 {
        value.clamp(-1.0, 1.0)
    }

    #[inline]
    fn decode(stored: f32) -> f32 {
        stored
    }
}

impl SampleCodec for Fixed12 {
    type Stored = u16;

    const FORMAT: SampleFormat = SampleFormat::Fixed12;

    #[inline]
    fn encode(value: f32) -> u16 {
        clip16(value * Self::SCALE) as u16
    }

    #[inline]
    fn decode(stored: u16) -> f32 {
        (stored as i16) as f32 / Self::SCALE
    }
}

impl SampleCodec for Fixed16 {
    type Stored = u16;

    const FORMAT: SampleFormat = SampleFormat::Fixed16;

    #[inline]
    fn encode(value: f32) -> u16 {
        clip16(value * Self::SCALE) as u16
    }

    #[inline]
    fn decode(stored: u16) -> f32 {
        (stored as i16) as f32 / Self::SCALE
    }
}

impl SampleCodec for Fixed32 {
    type Stored = u32;

    const FORMAT: SampleFormat = SampleFormat::Fixed32;

    #[inline]
    fn encode(value: f32) -> u32 {
        let clamped = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        ((clamped as f64 * Self::SCALE).round() as i32) as u32
    }

    #[inline]
    fn decode(stored: u32) -> f32 {
        ((stored as i32) as f64 / Self::SCALE) as f32
    }
}
