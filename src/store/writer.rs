//! Builder for feature store files.

use crate::error::{MapQueryError, Result};
use crate::scales::ScaleRange;
use crate::store::feature::{LAYER_HEADER_LEN, POINT_LEN};
use crate::store::header::{DataHeader, HEADER_LEN};
use bytes::{BufMut, Bytes, BytesMut};
use geo::{Coord, Rect};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const RECORD_LEN_FIELD: usize = 4;
const RECORD_FIXED_LEN: usize = 4 + 1;

/// Accumulates feature records and emits a complete store.
///
/// Records are written in insertion order; that order is the store's
/// storage order.
#[derive(Debug)]
pub struct StoreWriter {
    header: DataHeader,
    records: BytesMut,
    count: u32,
}

impl StoreWriter {
    pub fn new(bounds: Rect<f64>, scale_range: ScaleRange) -> Result<Self> {
        Ok(Self {
            header: DataHeader::new(bounds, scale_range)?,
            records: BytesMut::new(),
            count: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append a feature and return the storage offset of its record.
    ///
    /// `layers` lists `(min_scale, points)` pairs in strictly ascending
    /// scale order; every layer needs at least one point.
    pub fn add_feature(&mut self, type_id: u32, layers: &[(u8, Vec<Coord<f64>>)]) -> Result<u64> {
        let layer_count = u8::try_from(layers.len()).map_err(|_| {
            MapQueryError::InvalidInput(format!("Too many geometry layers: {}", layers.len()))
        })?;

        let mut body_len = RECORD_FIXED_LEN;
        let mut previous: Option<u8> = None;
        for (index, (min_scale, points)) in layers.iter().enumerate() {
            if let Some(prev) = previous
                && *min_scale <= prev
            {
                return Err(MapQueryError::InvalidInput(format!(
                    "Layer scales must be strictly ascending ({} after {})",
                    min_scale, prev
                )));
            }
            if points.is_empty() {
                return Err(MapQueryError::InvalidInput(format!(
                    "Layer {} has no points",
                    index
                )));
            }
            if points.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(MapQueryError::InvalidInput(format!(
                    "Layer {} has non-finite coordinates",
                    index
                )));
            }
            if u32::try_from(points.len()).is_err() {
                return Err(MapQueryError::InvalidInput(format!(
                    "Layer {} has too many points: {}",
                    index,
                    points.len()
                )));
            }
            body_len += LAYER_HEADER_LEN + points.len() * POINT_LEN;
            previous = Some(*min_scale);
        }

        let body_len = u32::try_from(body_len).map_err(|_| {
            MapQueryError::InvalidInput(format!("Record too large: {} bytes", body_len))
        })?;
        let count = self.count.checked_add(1).ok_or_else(|| {
            MapQueryError::InvalidInput("Store holds too many features".to_string())
        })?;

        let offset = (HEADER_LEN + self.records.len()) as u64;

        let buf = &mut self.records;
        buf.reserve(RECORD_LEN_FIELD + body_len as usize);
        buf.put_u32(body_len);
        buf.put_u32(type_id);
        buf.put_u8(layer_count);
        for (min_scale, points) in layers {
            buf.put_u8(*min_scale);
            buf.put_u32(points.len() as u32);
            for c in points {
                buf.put_f64(c.x);
                buf.put_f64(c.y);
            }
        }

        self.count = count;
        Ok(offset)
    }

    /// Encode the header followed by every record.
    pub fn finish(self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.records.len());
        self.header.with_feature_count(self.count).encode(&mut buf);
        buf.extend_from_slice(&self.records);
        buf.freeze()
    }

    /// Write the finished store to `path`, replacing any existing file.
    pub fn write_to<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let path = path.as_ref();
        let count = self.count;
        let data = self.finish();

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&data)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        log::debug!(
            "Wrote feature store {} ({} features, {} bytes)",
            path.display(),
            count,
            data.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rect;
    use crate::store::FeatureStore;
    use geo::coord;
    use tempfile::NamedTempFile;

    fn writer() -> StoreWriter {
        StoreWriter::new(
            rect(0.0, 0.0, 10.0, 10.0),
            ScaleRange::new(0, 17).unwrap(),
        )
        .unwrap()
    }

    fn line(points: &[(f64, f64)]) -> Vec<Coord<f64>> {
        points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect()
    }

    #[test]
    fn test_offsets_advance_by_record_size() {
        let mut w = writer();
        let a = w.add_feature(1, &[(0, line(&[(0.0, 0.0), (1.0, 1.0)]))]).unwrap();
        let b = w.add_feature(1, &[(0, line(&[(2.0, 2.0)]))]).unwrap();
        assert_eq!(a, HEADER_LEN as u64);
        let first_record = RECORD_LEN_FIELD + RECORD_FIXED_LEN + LAYER_HEADER_LEN + 2 * POINT_LEN;
        assert_eq!(b, a + first_record as u64);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_rejects_unordered_layers() {
        let mut w = writer();
        let result = w.add_feature(
            1,
            &[(5, line(&[(0.0, 0.0)])), (3, line(&[(1.0, 1.0)]))],
        );
        assert!(result.is_err());
        assert!(w.is_empty());
    }

    #[test]
    fn test_rejects_empty_and_non_finite_layers() {
        let mut w = writer();
        assert!(w.add_feature(1, &[(5, Vec::new())]).is_err());
        assert!(w.add_feature(1, &[(5, line(&[(f64::NAN, 0.0)]))]).is_err());
        assert!(w.is_empty());
    }

    #[test]
    fn test_feature_without_layers_is_allowed() {
        let mut w = writer();
        w.add_feature(9, &[]).unwrap();
        let store = FeatureStore::from_bytes(w.finish()).unwrap();
        let feature = store.iter().next().unwrap();
        assert_eq!(feature.type_id(), 9);
        assert_eq!(feature.first_scale(), None);
    }

    #[test]
    fn test_write_to_and_reopen() {
        let mut w = writer();
        let offset = w
            .add_feature(
                4,
                &[
                    (2, line(&[(0.0, 0.0), (10.0, 10.0)])),
                    (11, line(&[(0.0, 0.0), (3.0, 7.0), (10.0, 10.0)])),
                ],
            )
            .unwrap();

        let file = NamedTempFile::new().unwrap();
        w.write_to(file.path()).unwrap();

        let store = FeatureStore::open(file.path()).unwrap();
        assert_eq!(store.header().feature_count(), 1);
        assert_eq!(store.header().bounds(), rect(0.0, 0.0, 10.0, 10.0));

        let feature = store.feature_at(offset).unwrap();
        assert_eq!(feature.layer_count(), 2);
        assert_eq!(feature.resolve_at_scale(5).unwrap().len(), 2);
        assert_eq!(feature.resolve_at_scale(11).unwrap().len(), 3);
    }
}
