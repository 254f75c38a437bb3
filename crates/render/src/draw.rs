//! Draw call payloads.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// How the collaborator should assemble the submitted vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Indexed or sequential triangle list.
    Triangles,
    /// Line list (pairs of vertices).
    Lines,
    /// One camera-facing quad per instance, centered on each position.
    Billboards,
}

/// A named, tightly packed per-vertex (or per-instance) attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeStream<'a> {
    /// Attribute name as the collaborator binds it (e.g. `"normal"`).
    pub name: &'static str,
    /// Floats per element.
    pub components: usize,
    /// Flat float data, `components` floats per element.
    pub data: &'a [f32],
}

impl<'a> AttributeStream<'a> {
    /// Wrap any plain-old-data slice (e.g. `&[Vec4]`) as a float stream.
    pub fn from_pod<T: bytemuck::Pod>(name: &'static str, components: usize, data: &'a [T]) -> Self {
        Self {
            name,
            components,
            data: bytemuck::cast_slice(data),
        }
    }

    /// Number of elements in the stream.
    pub fn len(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.data.len() / self.components
        }
    }

    /// True when the stream holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One draw submission.
#[derive(Debug, Clone)]
pub struct DrawCall<'a> {
    /// Debug label identifying the submitter.
    pub label: &'static str,
    /// Vertex (or instance center) positions.
    pub positions: &'a [Vec3],
    /// Extra attribute streams, each with `positions.len()` elements.
    pub attributes: Vec<AttributeStream<'a>>,
    /// Optional index buffer into `positions`.
    pub indices: Option<&'a [u32]>,
    /// Primitive assembly mode.
    pub primitive: PrimitiveKind,
    /// Local-to-world transform applied to `positions`.
    pub transform: Mat4,
}

impl<'a> DrawCall<'a> {
    /// Start a draw with positions only.
    pub fn new(label: &'static str, primitive: PrimitiveKind, positions: &'a [Vec3]) -> Self {
        Self {
            label,
            positions,
            attributes: Vec::new(),
            indices: None,
            primitive,
            transform: Mat4::IDENTITY,
        }
    }

    /// Builder: place the geometry with `transform`.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: attach an attribute stream.
    pub fn with_attribute(mut self, stream: AttributeStream<'a>) -> Self {
        self.attributes.push(stream);
        self
    }

    /// Builder: attach an index buffer.
    pub fn with_indices(mut self, indices: &'a [u32]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Look up an attached stream by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeStream<'a>> {
        self.attributes.iter().find(|stream| stream.name == name)
    }

    /// True when every attribute stream matches the position count.
    pub fn is_consistent(&self) -> bool {
        self.attributes
            .iter()
            .all(|stream| stream.len() == self.positions.len())
    }
}
