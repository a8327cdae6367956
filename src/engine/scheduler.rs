//! Multi-core channel rendering.
//!
//! Channels are split into contiguous ranges, one per core. Core 0 is the
//! calling thread; every other core is a worker thread parked on its own
//! status flag.
//!
//! ```text
//!               Init
//!                │ worker started
//!                ▼
//!   ┌────────▶  Idle ──────────────┐
//!   │            │ render() kicks  │ drop
//!   │            ▼                 ▼
//!   └── done ── Busy              Exit
//!                                  │ worker saw it
//!                                  ▼
//!                               Unknown   (terminal)
//! ```
//!
//! A chunk is: kick every idle worker to `Busy`, render shard 0 inline,
//! then spin until every worker is back to `Idle`. No lock is held across
//! the barrier; each shard's mutex is only ever taken by one side at a time
//! because ownership is handed over through the status flag.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::error::{ConsoleError, Result};

/// Spins before a waiter starts yielding its time slice.
const SPINS_BEFORE_YIELD: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoreStatus {
    Init = 0,
    Idle = 1,
    Busy = 2,
    Exit = 3,
    Unknown = 4,
}

impl CoreStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => CoreStatus::Init,
            1 => CoreStatus::Idle,
            2 => CoreStatus::Busy,
            3 => CoreStatus::Exit,
            _ => CoreStatus::Unknown,
        }
    }
}

/// Something that fills a mono buffer with one chunk of a channel.
pub trait ChannelSource: Send {
    fn render(&mut self, out: &mut [f32]);
}

impl<F> ChannelSource for F
where
    F: FnMut(&mut [f32]) + Send,
{
    fn render(&mut self, out: &mut [f32]) {
        self(out)
    }
}

struct Shard {
    sources: Vec<Box<dyn ChannelSource>>,
    buffers: Vec<Vec<f32>>,
    /// Set once a source panicked; the shard renders silence from then on.
    failed: bool,
}

impl Shard {
    /// Render every source. A panicking source fails the whole shard
    /// instead of unwinding through the barrier.
    fn render(&mut self, core: usize, frames: usize) {
        if !self.failed {
            let sources = &mut self.sources;
            let buffers = &mut self.buffers;
            let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
                for (source, buffer) in sources.iter_mut().zip(buffers.iter_mut()) {
                    source.render(&mut buffer[..frames]);
                }
            }));
            if rendered.is_err() {
                log::error!("channel source on core {} panicked, core silenced", core);
                self.failed = true;
            }
        }
        if self.failed {
            for buffer in &mut self.buffers {
                buffer[..frames].fill(0.0);
            }
        }
    }
}

struct Unit {
    status: AtomicU8,
    frames: AtomicUsize,
    shard: Mutex<Shard>,
}

impl Unit {
    fn new(shard: Shard) -> Self {
        Self {
            status: AtomicU8::new(CoreStatus::Init as u8),
            frames: AtomicUsize::new(0),
            shard: Mutex::new(shard),
        }
    }

    #[inline]
    fn status(&self) -> CoreStatus {
        CoreStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    #[inline]
    fn set_status(&self, status: CoreStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    #[inline]
    fn transition(&self, from: CoreStatus, to: CoreStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[inline]
fn backoff(spins: &mut u32) {
    if *spins < SPINS_BEFORE_YIELD {
        *spins += 1;
        std::hint::spin_loop();
    } else {
        thread::yield_now();
    }
}

fn worker_loop(core: usize, unit: Arc<Unit>) {
    unit.set_status(CoreStatus::Idle);
    let mut spins = 0;
    loop {
        match unit.status() {
            CoreStatus::Busy => {
                let frames = unit.frames.load(Ordering::Acquire);
                unit.shard.lock().render(core, frames);
                unit.set_status(CoreStatus::Idle);
                spins = 0;
            }
            CoreStatus::Exit => {
                unit.set_status(CoreStatus::Unknown);
                break;
            }
            _ => backoff(&mut spins),
        }
    }
}

/// Split `channels` into `cores` contiguous ranges, earlier cores taking
/// one extra channel when the split is uneven.
pub fn split_channels(channels: usize, cores: usize) -> Vec<Range<usize>> {
    let base = channels / cores;
    let extra = channels % cores;
    let mut start = 0;
    (0..cores)
        .map(|core| {
            let len = base + usize::from(core < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

pub struct CoreScheduler {
    units: Vec<Arc<Unit>>,
    workers: Vec<JoinHandle<()>>,
    ranges: Vec<Range<usize>>,
    chunk_size: usize,
    last_frames: usize,
}

impl CoreScheduler {
    /// Spawn `cores - 1` workers and hand each its slice of `sources`.
    pub fn new(
        sources: Vec<Box<dyn ChannelSource>>,
        cores: usize,
        chunk_size: usize,
    ) -> Result<Self> {
        let channels = sources.len();
        if cores == 0 || cores > channels {
            return Err(ConsoleError::InvalidConfig(format!(
                "{} cores for {} channels",
                cores, channels
            )));
        }
        if chunk_size == 0 {
            return Err(ConsoleError::InvalidConfig(
                "chunk size must be non-zero".into(),
            ));
        }

        let ranges = split_channels(channels, cores);
        let mut sources = sources.into_iter();
        let units: Vec<Arc<Unit>> = ranges
            .iter()
            .map(|range| {
                let shard = Shard {
                    sources: sources.by_ref().take(range.len()).collect(),
                    buffers: vec![vec![0.0; chunk_size]; range.len()],
                    failed: false,
                };
                Arc::new(Unit::new(shard))
            })
            .collect();

        let mut scheduler = Self {
            units,
            workers: Vec::with_capacity(cores - 1),
            ranges,
            chunk_size,
            last_frames: 0,
        };

        for core in 1..cores {
            let unit = Arc::clone(&scheduler.units[core]);
            let handle = thread::Builder::new()
                .name(format!("saavy-core-{}", core))
                .spawn(move || worker_loop(core, unit))
                .map_err(|source| ConsoleError::WorkerSpawn { core, source })?;
            scheduler.workers.push(handle);
            log::info!(
                "core {} renders channels {:?}",
                core,
                scheduler.ranges[core]
            );
        }
        scheduler.units[0].set_status(CoreStatus::Idle);
        scheduler.wait_idle();

        Ok(scheduler)
    }

    pub fn cores(&self) -> usize {
        self.units.len()
    }

    pub fn channel_count(&self) -> usize {
        self.ranges.last().map_or(0, |r| r.end)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Channel range owned by `core`.
    pub fn range(&self, core: usize) -> Range<usize> {
        self.ranges[core].clone()
    }

    pub fn status(&self, core: usize) -> CoreStatus {
        self.units[core].status()
    }

    /// Whether a source on `core` panicked. A failed core keeps taking part
    /// in the barrier but only renders silence.
    pub fn is_core_failed(&self, core: usize) -> bool {
        self.units[core].shard.lock().failed
    }

    fn wait_idle(&self) {
        for unit in &self.units[1..] {
            let mut spins = 0;
            loop {
                match unit.status() {
                    CoreStatus::Idle | CoreStatus::Unknown => break,
                    _ => backoff(&mut spins),
                }
            }
        }
    }

    /// Render `frames` samples of every channel. Returns once all cores
    /// are done.
    pub fn render(&mut self, frames: usize) {
        assert!(
            frames <= self.chunk_size,
            "{} frames exceed chunk size {}",
            frames,
            self.chunk_size
        );

        for unit in &self.units[1..] {
            unit.frames.store(frames, Ordering::Release);
            let kicked = unit.transition(CoreStatus::Idle, CoreStatus::Busy);
            debug_assert!(kicked, "worker not idle at chunk start");
        }

        self.units[0].shard.lock().render(0, frames);

        self.wait_idle();
        self.last_frames = frames;
    }

    /// Visit every channel's most recent chunk in channel order.
    pub fn for_each_channel(&self, mut f: impl FnMut(usize, &[f32])) {
        for (unit, range) in self.units.iter().zip(&self.ranges) {
            let shard = unit.shard.lock();
            for (channel, buffer) in range.clone().zip(&shard.buffers) {
                f(channel, &buffer[..self.last_frames]);
            }
        }
    }
}

impl Drop for CoreScheduler {
    fn drop(&mut self) {
        // Only units whose worker actually started; a failed spawn leaves the
        // rest in Init.
        for unit in &self.units[1..=self.workers.len()] {
            let mut spins = 0;
            while !(unit.transition(CoreStatus::Idle, CoreStatus::Exit)
                || unit.status() == CoreStatus::Unknown)
            {
                backoff(&mut spins);
            }
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("core worker panicked");
            }
        }
        log::info!("scheduler stopped ({} cores)", self.units.len());
    }
}
