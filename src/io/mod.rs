// Purpose - output boundary: sample format conversion and audio sinks

pub mod converter;
pub mod sink;

pub use converter::{float_to_q15, interleave_q15};
#[cfg(feature = "rtrb")]
pub use sink::RtrbSink;
pub use sink::{AudioSink, VecSink};
