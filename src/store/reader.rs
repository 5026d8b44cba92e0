//! Read-only feature store opened from a file or an in-memory buffer.

use crate::error::{MapQueryError, Result};
use crate::store::feature::Feature;
use crate::store::header::{DataHeader, HEADER_LEN};
use bytes::{Buf, Bytes};
use std::path::Path;

const RECORD_LEN_FIELD: usize = 4;
const RECORD_FIXED_LEN: usize = 4 + 1;

/// An immutable collection of feature records.
///
/// Every record is validated once when the store is opened; afterwards the
/// store is never mutated, so any number of queries may read it at once.
#[derive(Debug)]
pub struct FeatureStore {
    header: DataHeader,
    data: Bytes,
    features: Vec<Feature>,
}

impl FeatureStore {
    /// Open and validate the store file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let store = Self::from_bytes(Bytes::from(data))?;
        log::info!(
            "Opened feature store {} ({} features, {} bytes, scales {}..={})",
            path.display(),
            store.len(),
            store.size_bytes(),
            store.header.scale_range().lower,
            store.header.scale_range().upper
        );
        Ok(store)
    }

    /// Validate a store held in memory.
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let header = DataHeader::decode(&data)?;

        // The declared count is untrusted until every record has been read.
        let max_records = (data.len() - HEADER_LEN) / (RECORD_LEN_FIELD + RECORD_FIXED_LEN);
        let mut features = Vec::with_capacity(max_records.min(header.feature_count() as usize));
        let mut offset = HEADER_LEN;
        while offset < data.len() {
            let (feature, next) = decode_record(&data, offset)?;
            features.push(feature);
            offset = next;
        }

        if features.len() != header.feature_count() as usize {
            return Err(MapQueryError::InvalidFormat(format!(
                "Header declares {} features, store holds {}",
                header.feature_count(),
                features.len()
            )));
        }

        Ok(Self {
            header,
            data,
            features,
        })
    }

    pub fn header(&self) -> &DataHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// All features in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub(crate) fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Visit every record with its storage offset, in storage order.
    pub fn for_each_raw<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Feature, u64) -> Result<()>,
    {
        for feature in &self.features {
            visit(feature, feature.offset())?;
        }
        Ok(())
    }

    /// The feature whose record starts at `offset`.
    pub fn feature_at(&self, offset: u64) -> Option<&Feature> {
        self.features
            .binary_search_by_key(&offset, Feature::offset)
            .ok()
            .map(|index| &self.features[index])
    }
}

fn decode_record(data: &Bytes, offset: usize) -> Result<(Feature, usize)> {
    let mut buf = &data[offset..];
    if buf.remaining() < RECORD_LEN_FIELD {
        return Err(MapQueryError::UnexpectedEof);
    }
    let body_len = buf.get_u32() as usize;

    let body_start = offset + RECORD_LEN_FIELD;
    let body_end = body_start
        .checked_add(body_len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            MapQueryError::InvalidFormat(format!(
                "Record at offset {} extends past the end of the store",
                offset
            ))
        })?;
    if body_len < RECORD_FIXED_LEN {
        return Err(MapQueryError::InvalidFormat(format!(
            "Record at offset {} is too short ({} bytes)",
            offset, body_len
        )));
    }

    let mut body = data.slice(body_start..body_end);
    let type_id = body.get_u32();
    let layer_count = body.get_u8();
    let feature = Feature::parse(offset as u64, type_id, layer_count, body)?;

    Ok((feature, body_end))
}
