//! Feature records and per-scale geometry resolution.
//!
//! A feature carries its type and a list of geometry layers. Each layer holds
//! the simplified point sequence used from its `min_scale` onwards, so the
//! geometry at a given scale is the last layer whose `min_scale` does not
//! exceed it. A feature has no geometry below its first layer's scale.
//!
//! Point data stays in the store's shared buffer; resolving a scale decodes
//! only the selected layer.

use crate::error::{MapQueryError, Result};
use bytes::{Buf, Bytes};
use geo::{Coord, Rect, coord};

pub(crate) const LAYER_HEADER_LEN: usize = 1 + 4;
pub(crate) const POINT_LEN: usize = 2 * 8;

/// A feature record borrowed from a store.
///
/// Cloning is cheap: the geometry bytes are reference counted, never copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    offset: u64,
    type_id: u32,
    layer_count: u8,
    first_scale: Option<u8>,
    layers: Bytes,
}

/// One geometry layer of a feature.
#[derive(Debug, Clone)]
pub struct GeometryLayer {
    pub min_scale: u8,
    points: Bytes,
}

impl GeometryLayer {
    pub fn len(&self) -> usize {
        self.points.len() / POINT_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        let mut buf = &self.points[..];
        std::iter::from_fn(move || {
            if buf.remaining() < POINT_LEN {
                return None;
            }
            let x = buf.get_f64();
            let y = buf.get_f64();
            Some(coord! { x: x, y: y })
        })
    }
}

struct Layers {
    buf: Bytes,
}

impl Iterator for Layers {
    type Item = GeometryLayer;

    fn next(&mut self) -> Option<GeometryLayer> {
        if self.buf.remaining() < LAYER_HEADER_LEN {
            return None;
        }
        let min_scale = self.buf.get_u8();
        let count = self.buf.get_u32() as usize;
        let len = (count * POINT_LEN).min(self.buf.len());
        let points = self.buf.split_to(len);
        Some(GeometryLayer { min_scale, points })
    }
}

impl Feature {
    /// Validate a record body and wrap it.
    ///
    /// `layers` is the layer section of the record: `layer_count` entries of
    /// `u8` min scale, `u32` point count and the points themselves.
    pub(crate) fn parse(
        offset: u64,
        type_id: u32,
        layer_count: u8,
        layers: Bytes,
    ) -> Result<Self> {
        let mut buf = &layers[..];
        let mut previous: Option<u8> = None;

        for index in 0..layer_count {
            if buf.remaining() < LAYER_HEADER_LEN {
                return Err(MapQueryError::InvalidFormat(format!(
                    "Feature at offset {}: layer {} header is truncated",
                    offset, index
                )));
            }
            let min_scale = buf.get_u8();
            let count = buf.get_u32() as usize;

            if let Some(prev) = previous
                && min_scale <= prev
            {
                return Err(MapQueryError::InvalidFormat(format!(
                    "Feature at offset {}: layer scales must be strictly ascending ({} after {})",
                    offset, min_scale, prev
                )));
            }
            if count == 0 {
                return Err(MapQueryError::InvalidFormat(format!(
                    "Feature at offset {}: layer {} has no points",
                    offset, index
                )));
            }
            if count
                .checked_mul(POINT_LEN)
                .is_none_or(|len| len > buf.remaining())
            {
                return Err(MapQueryError::InvalidFormat(format!(
                    "Feature at offset {}: layer {} declares {} points past the record end",
                    offset, index, count
                )));
            }
            for _ in 0..count * 2 {
                let value = buf.get_f64();
                if !value.is_finite() {
                    return Err(MapQueryError::InvalidFormat(format!(
                        "Feature at offset {}: non-finite coordinate in layer {}",
                        offset, index
                    )));
                }
            }
            previous = Some(min_scale);
        }

        if buf.has_remaining() {
            return Err(MapQueryError::InvalidFormat(format!(
                "Feature at offset {}: {} trailing bytes after layers",
                offset,
                buf.remaining()
            )));
        }

        let first_scale = layers.first().copied().filter(|_| layer_count > 0);

        Ok(Self {
            offset,
            type_id,
            layer_count,
            first_scale,
            layers,
        })
    }

    /// Byte offset of the record within its store.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn layer_count(&self) -> usize {
        usize::from(self.layer_count)
    }

    /// Lowest scale at which the feature has any geometry.
    pub fn first_scale(&self) -> Option<u8> {
        self.first_scale
    }

    pub fn layers(&self) -> impl Iterator<Item = GeometryLayer> {
        Layers {
            buf: self.layers.clone(),
        }
    }

    pub fn has_geometry_at(&self, scale: u8) -> bool {
        self.first_scale.is_some_and(|first| first <= scale)
    }

    fn layer_at(&self, scale: u8) -> Option<GeometryLayer> {
        self.layers()
            .take_while(|layer| layer.min_scale <= scale)
            .last()
    }

    /// Simplified point sequence at `scale`, or `None` when the feature has
    /// no geometry there.
    pub fn resolve_at_scale(&self, scale: u8) -> Option<Vec<Coord<f64>>> {
        self.layer_at(scale).map(|layer| layer.coords().collect())
    }

    /// Textual rendering of type and geometry at `scale`.
    ///
    /// Empty when the feature has no geometry at that scale. Two features
    /// with the same type and the same resolved points share a key.
    pub fn canonical_key(&self, scale: u8) -> String {
        let Some(layer) = self.layer_at(scale) else {
            return String::new();
        };

        let mut key = String::with_capacity(16 + layer.len() * 24);
        key.push_str(&format!("type={} [", self.type_id));
        for (i, c) in layer.coords().enumerate() {
            if i > 0 {
                key.push_str(", ");
            }
            key.push_str(&format!("({} {})", c.x, c.y));
        }
        key.push(']');
        key
    }

    /// Bounding rectangle of every point in every layer.
    pub fn envelope(&self) -> Option<Rect<f64>> {
        let mut bounds: Option<(Coord<f64>, Coord<f64>)> = None;
        for layer in self.layers() {
            for c in layer.coords() {
                bounds = Some(match bounds {
                    None => (c, c),
                    Some((min, max)) => (
                        coord! { x: min.x.min(c.x), y: min.y.min(c.y) },
                        coord! { x: max.x.max(c.x), y: max.y.max(c.y) },
                    ),
                });
            }
        }
        bounds.map(|(min, max)| Rect::new(min, max))
    }
}
