//! Reference sinks: one that records draws, one that logs them.

use crate::{DrawCall, PrimitiveKind, RenderSink};
use serde::Serialize;
use tracing::debug;

/// Summary of a submitted draw, kept by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawRecord {
    /// Submitter label.
    pub label: String,
    /// Primitive assembly mode.
    pub primitive: PrimitiveKind,
    /// Number of positions.
    pub vertices: usize,
    /// Number of indices, if indexed.
    pub indices: Option<usize>,
    /// Attribute stream names in submission order.
    pub streams: Vec<String>,
    /// First position, handy for spot checks.
    pub first_position: Option<[f32; 3]>,
    /// World translation of the draw's transform.
    pub translation: [f32; 3],
}

impl DrawRecord {
    fn from_draw(draw: &DrawCall<'_>) -> Self {
        Self {
            label: draw.label.to_string(),
            primitive: draw.primitive,
            vertices: draw.positions.len(),
            indices: draw.indices.map(<[u32]>::len),
            streams: draw.attributes.iter().map(|s| s.name.to_string()).collect(),
            first_position: draw.positions.first().map(|p| p.to_array()),
            translation: draw.transform.w_axis.truncate().to_array(),
        }
    }
}

/// Sink that keeps a summary of every draw; used by tests and the headless runner.
#[derive(Debug, Default)]
pub struct RecordingSink {
    draws: Vec<DrawRecord>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws recorded since the last [`RecordingSink::clear`].
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Draws with the given label.
    pub fn draws_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a DrawRecord> {
        self.draws.iter().filter(move |d| d.label == label)
    }

    /// Forget recorded draws (call between frames).
    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl RenderSink for RecordingSink {
    fn submit(&mut self, draw: DrawCall<'_>) {
        debug_assert!(draw.is_consistent(), "attribute stream length mismatch");
        self.draws.push(DrawRecord::from_draw(&draw));
    }
}

/// Sink that only logs draws at debug level.
#[derive(Debug, Default)]
pub struct TracingSink {
    submitted: u64,
}

impl TracingSink {
    /// Create a logging sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total draws seen.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl RenderSink for TracingSink {
    fn submit(&mut self, draw: DrawCall<'_>) {
        self.submitted += 1;
        debug!(
            label = draw.label,
            primitive = ?draw.primitive,
            vertices = draw.positions.len(),
            indices = draw.indices.map_or(0, <[u32]>::len),
            streams = draw.attributes.len(),
            "draw submitted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeStream;
    use glam::Vec3;

    #[test]
    fn recording_sink_summarizes_draws() {
        let positions = [Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ONE];
        let indices = [0, 1, 2];
        let life = [1.0_f32, 0.5, 0.0];
        let mut sink = RecordingSink::new();
        sink.submit(
            DrawCall::new("terrain", PrimitiveKind::Triangles, &positions)
                .with_indices(&indices)
                .with_attribute(AttributeStream::from_pod("life", 1, &life)),
        );

        let record = &sink.draws()[0];
        assert_eq!(record.vertices, 3);
        assert_eq!(record.indices, Some(3));
        assert_eq!(record.streams, vec!["life".to_string()]);
        assert_eq!(record.first_position, Some([1.0, 2.0, 3.0]));
        assert_eq!(record.translation, [0.0, 0.0, 0.0]);
        assert_eq!(sink.draws_labeled("terrain").count(), 1);

        let json = serde_json::to_string(record).expect("record serializes");
        assert!(json.contains("\"triangles\""));

        sink.clear();
        assert!(sink.draws().is_empty());
    }

    #[test]
    fn recording_sink_keeps_translation() {
        let positions = [Vec3::ZERO];
        let mut sink = RecordingSink::new();
        sink.submit(
            DrawCall::new("terrain", PrimitiveKind::Triangles, &positions)
                .with_transform(glam::Mat4::from_translation(Vec3::new(4.0, -2.0, 1.0))),
        );
        assert_eq!(sink.draws()[0].translation, [4.0, -2.0, 1.0]);
    }

    #[test]
    fn tracing_sink_counts_submissions() {
        let mut sink = TracingSink::new();
        sink.submit(DrawCall::new("lines", PrimitiveKind::Lines, &[]));
        sink.submit(DrawCall::new("lines", PrimitiveKind::Lines, &[]));
        assert_eq!(sink.submitted(), 2);
    }
}
