#![warn(missing_docs)]
//! Draw-submission contract between the simulation core and whatever renders it.
//!
//! The core never talks to a graphics API. It hands vertex positions, named
//! attribute streams and (optionally) an index buffer to a [`RenderSink`], which
//! is free to upload them to a GPU, record them for tests, or log them.

mod draw;
mod sinks;

pub use draw::{AttributeStream, DrawCall, PrimitiveKind};
pub use sinks::{DrawRecord, RecordingSink, TracingSink};

/// Receiver for draw calls issued by emitters and terrain.
pub trait RenderSink {
    /// Submit one draw. Slices are only borrowed for the duration of the call.
    fn submit(&mut self, draw: DrawCall<'_>);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn submit(&mut self, draw: DrawCall<'_>) {
        (**self).submit(draw);
    }
}
