//! Store header: magic, version, dataset bounds and scale range.

use crate::error::{MapQueryError, Result};
use crate::geometry::{RectExt, rect};
use crate::scales::ScaleRange;
use bytes::{Buf, BufMut, BytesMut};
use geo::Rect;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const MAGIC: &[u8; 4] = b"MQFS";
pub const FORMAT_VERSION: u16 = 1;

const MAGIC_LEN: usize = 4;
const VERSION_LEN: usize = 2;
const BOUNDS_LEN: usize = 4 * 8;
const SCALES_LEN: usize = 2;
const COUNT_LEN: usize = 4;

/// Encoded size of the header in bytes. Records start right after it.
pub const HEADER_LEN: usize = MAGIC_LEN + VERSION_LEN + BOUNDS_LEN + SCALES_LEN + COUNT_LEN;

/// Dataset-wide metadata read once when a store is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataHeader {
    bounds: Rect<f64>,
    scale_range: ScaleRange,
    feature_count: u32,
}

impl DataHeader {
    pub fn new(bounds: Rect<f64>, scale_range: ScaleRange) -> Result<Self> {
        if !bounds.is_finite() {
            return Err(MapQueryError::InvalidInput(format!(
                "Dataset bounds must be finite, got: {:?}",
                bounds
            )));
        }
        Ok(Self {
            bounds,
            scale_range,
            feature_count: 0,
        })
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn scale_range(&self) -> ScaleRange {
        self.scale_range
    }

    pub fn feature_count(&self) -> u32 {
        self.feature_count
    }

    pub(crate) fn with_feature_count(mut self, count: u32) -> Self {
        self.feature_count = count;
        self
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(HEADER_LEN);
        buf.put_slice(MAGIC);
        buf.put_u16(FORMAT_VERSION);
        buf.put_f64(self.bounds.min().x);
        buf.put_f64(self.bounds.min().y);
        buf.put_f64(self.bounds.max().x);
        buf.put_f64(self.bounds.max().y);
        buf.put_u8(self.scale_range.lower);
        buf.put_u8(self.scale_range.upper);
        buf.put_u32(self.feature_count);
    }

    /// Decode a header from the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        // A partial header counts as nothing read.
        if data.len() < HEADER_LEN {
            return Err(header_error(
                0,
                format!("expected {} header bytes, found {}", HEADER_LEN, data.len()),
            ));
        }

        let mut buf = &data[..HEADER_LEN];

        let mut magic = [0u8; MAGIC_LEN];
        buf.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(header_error(0, format!("bad magic {:?}", magic)));
        }

        let version = buf.get_u16();
        if version != FORMAT_VERSION {
            return Err(header_error(
                MAGIC_LEN,
                format!("unsupported format version {}", version),
            ));
        }

        let (min_x, min_y, max_x, max_y) = (buf.get_f64(), buf.get_f64(), buf.get_f64(), buf.get_f64());
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite())
            || min_x > max_x
            || min_y > max_y
        {
            return Err(header_error(
                MAGIC_LEN + VERSION_LEN,
                format!(
                    "invalid bounds [{}, {}] - [{}, {}]",
                    min_x, min_y, max_x, max_y
                ),
            ));
        }

        let (lower, upper) = (buf.get_u8(), buf.get_u8());
        let scale_range = ScaleRange::new(lower, upper).map_err(|e| {
            header_error(MAGIC_LEN + VERSION_LEN + BOUNDS_LEN, e.to_string())
        })?;

        let feature_count = buf.get_u32();

        Ok(Self {
            bounds: rect(min_x, min_y, max_x, max_y),
            scale_range,
            feature_count,
        })
    }
}

fn header_error(size: usize, reason: String) -> MapQueryError {
    MapQueryError::HeaderRead {
        size: size as i64,
        reason,
    }
}

/// Read only the header of the store at `path`.
pub fn read_data_header<P: AsRef<Path>>(path: P) -> Result<DataHeader> {
    let file = File::open(path.as_ref())?;
    let mut data = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut data)?;
    DataHeader::decode(&data)
}
