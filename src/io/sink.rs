#[cfg(feature = "rtrb")]
use rtrb::Producer;

/// Destination for interleaved 16-bit stereo frames.
///
/// `write` returns how many samples were accepted. Anything short of the
/// full slice is a dropped chunk; callers never retry.
pub trait AudioSink {
    fn write(&mut self, samples: &[i16]) -> usize;
}

/// Lock-free queue towards the device callback.
///
/// Writes are all-or-nothing: a chunk that doesn't fit is refused whole so
/// the consumer never sees half a chunk.
#[cfg(feature = "rtrb")]
pub struct RtrbSink {
    producer: Producer<i16>,
}

#[cfg(feature = "rtrb")]
impl RtrbSink {
    pub fn new(producer: Producer<i16>) -> Self {
        Self { producer }
    }

    /// Samples that can be written right now.
    pub fn free_slots(&self) -> usize {
        self.producer.slots()
    }

    pub fn into_inner(self) -> Producer<i16> {
        self.producer
    }
}

#[cfg(feature = "rtrb")]
impl AudioSink for RtrbSink {
    fn write(&mut self, samples: &[i16]) -> usize {
        match self.producer.write_chunk_uninit(samples.len()) {
            Ok(chunk) => chunk.fill_from_iter(samples.iter().copied()),
            Err(_) => 0,
        }
    }
}

/// Growable in-memory sink, optionally capped. Handy for offline rendering.
#[derive(Debug, Default)]
pub struct VecSink {
    samples: Vec<i16>,
    capacity: Option<usize>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `capacity` samples in total.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl AudioSink for VecSink {
    fn write(&mut self, samples: &[i16]) -> usize {
        let room = match self.capacity {
            Some(cap) => cap.saturating_sub(self.samples.len()),
            None => usize::MAX,
        };
        if samples.len() > room {
            return 0;
        }
        self.samples.extend_from_slice(samples);
        samples.len()
    }
}
