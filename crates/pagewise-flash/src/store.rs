use alloc::{collections::BTreeMap, vec, vec::Vec};

use embedded_storage::Storage;
use log::{debug, warn};
use pagewise_core::settings::{KeyValueStore, MAX_BLOB_BYTES, StoredValue};

const KV_MAGIC: u32 = 0x564B_5750; // "PWKV"
const KV_VERSION: u8 = 1;
const HEADER_LEN: usize = 11;
const CHECKSUM_LEN: usize = 4;
const ENTRY_HEADER_LEN: usize = 7;

const KIND_INT: u8 = 0;
const KIND_BOOL: u8 = 1;
const KIND_BLOB: u8 = 2;

/// Byte range reserved for the snapshot record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlashRegion {
    pub offset: u32,
    pub len: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashKvError<E> {
    Storage(E),
    RegionOutOfBounds,
    RegionFull,
    ValueTooLarge,
}

/// Typed key-value store persisted as one checksummed snapshot.
///
/// Layout: magic (u32 LE), version (u8), entry count (u16 LE), payload length
/// (u32 LE), payload, FNV-1a checksum (u32 LE) over everything before it. Each
/// payload entry is key (u32 LE), kind (u8), value length (u16 LE), value.
///
/// All reads are served from RAM; every write rewrites the whole record.
#[derive(Debug)]
pub struct FlashKvStore<S> {
    storage: S,
    region: FlashRegion,
    cache: BTreeMap<u32, StoredValue>,
}

impl<S: Storage> FlashKvStore<S> {
    /// Loads the snapshot in `region`. A blank or damaged record yields an empty store.
    pub fn open(mut storage: S, region: FlashRegion) -> Result<Self, FlashKvError<S::Error>> {
        let region_end = region.offset as usize + region.len as usize;
        if region_end > storage.capacity() || (region.len as usize) < HEADER_LEN + CHECKSUM_LEN {
            return Err(FlashKvError::RegionOutOfBounds);
        }

        let cache = read_snapshot(&mut storage, region)?;
        debug!(
            "flash-kv: open offset=0x{:x} len={} entries={}",
            region.offset,
            region.len,
            cache.len()
        );
        Ok(Self {
            storage,
            region,
            cache,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.cache.len()
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn put(&mut self, key: u32, value: StoredValue) -> Result<(), FlashKvError<S::Error>> {
        if self.cache.get(&key) == Some(&value) {
            return Ok(());
        }

        let previous = self.cache.insert(key, value);
        if let Err(err) = self.persist() {
            match previous {
                Some(previous) => {
                    self.cache.insert(key, previous);
                }
                None => {
                    self.cache.remove(&key);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), FlashKvError<S::Error>> {
        let record = encode_snapshot(&self.cache)?;
        if record.len() > self.region.len as usize {
            warn!(
                "flash-kv: snapshot bytes={} exceeds region len={}",
                record.len(),
                self.region.len
            );
            return Err(FlashKvError::RegionFull);
        }

        self.storage
            .write(self.region.offset, &record)
            .map_err(FlashKvError::Storage)
    }
}

impl<S: Storage> KeyValueStore for FlashKvStore<S> {
    type Error = FlashKvError<S::Error>;

    fn exists(&self, key: u32) -> bool {
        self.cache.contains_key(&key)
    }

    fn read_int(&mut self, key: u32) -> Result<Option<i32>, Self::Error> {
        Ok(match self.cache.get(&key) {
            Some(StoredValue::Int(value)) => Some(*value),
            _ => None,
        })
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<(), Self::Error> {
        self.put(key, StoredValue::Int(value))
    }

    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, Self::Error> {
        Ok(match self.cache.get(&key) {
            Some(StoredValue::Bool(value)) => Some(*value),
            _ => None,
        })
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), Self::Error> {
        self.put(key, StoredValue::Bool(value))
    }

    fn read_blob(&mut self, key: u32) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(match self.cache.get(&key) {
            Some(StoredValue::Blob(value)) => Some(value.clone()),
            _ => None,
        })
    }

    fn write_blob(&mut self, key: u32, value: &[u8]) -> Result<(), Self::Error> {
        if value.len() > MAX_BLOB_BYTES {
            return Err(FlashKvError::ValueTooLarge);
        }
        self.put(key, StoredValue::Blob(value.to_vec()))
    }
}

fn read_snapshot<S: Storage>(
    storage: &mut S,
    region: FlashRegion,
) -> Result<BTreeMap<u32, StoredValue>, FlashKvError<S::Error>> {
    let mut header = [0u8; HEADER_LEN];
    storage
        .read(region.offset, &mut header)
        .map_err(FlashKvError::Storage)?;

    if header.iter().all(|b| *b == 0xFF) {
        debug!("flash-kv: blank region offset=0x{:x}", region.offset);
        return Ok(BTreeMap::new());
    }

    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if magic != KV_MAGIC {
        warn!("flash-kv: bad magic 0x{:08x}, starting empty", magic);
        return Ok(BTreeMap::new());
    }

    if header[4] != KV_VERSION {
        warn!("flash-kv: unsupported version {}, starting empty", header[4]);
        return Ok(BTreeMap::new());
    }

    let count = u16::from_le_bytes([header[5], header[6]]);
    let payload_len = u32::from_le_bytes([header[7], header[8], header[9], header[10]]) as usize;
    let record_len = HEADER_LEN + payload_len + CHECKSUM_LEN;
    if record_len > region.len as usize {
        warn!(
            "flash-kv: payload len={} overflows region, starting empty",
            payload_len
        );
        return Ok(BTreeMap::new());
    }

    let mut record = vec![0u8; record_len];
    storage
        .read(region.offset, &mut record)
        .map_err(FlashKvError::Storage)?;

    let checksum_start = HEADER_LEN + payload_len;
    let expected = u32::from_le_bytes([
        record[checksum_start],
        record[checksum_start + 1],
        record[checksum_start + 2],
        record[checksum_start + 3],
    ]);
    if checksum32(&record[..checksum_start]) != expected {
        warn!("flash-kv: checksum mismatch, starting empty");
        return Ok(BTreeMap::new());
    }

    match decode_entries(&record[HEADER_LEN..checksum_start], count) {
        Some(entries) => Ok(entries),
        None => {
            warn!("flash-kv: malformed entries, starting empty");
            Ok(BTreeMap::new())
        }
    }
}

fn decode_entries(mut payload: &[u8], count: u16) -> Option<BTreeMap<u32, StoredValue>> {
    let mut entries = BTreeMap::new();

    for _ in 0..count {
        if payload.len() < ENTRY_HEADER_LEN {
            return None;
        }
        let key = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let kind = payload[4];
        let len = u16::from_le_bytes([payload[5], payload[6]]) as usize;
        let value = payload.get(ENTRY_HEADER_LEN..ENTRY_HEADER_LEN + len)?;

        let value = match (kind, len) {
            (KIND_INT, 4) => {
                StoredValue::Int(i32::from_le_bytes([value[0], value[1], value[2], value[3]]))
            }
            (KIND_BOOL, 1) => StoredValue::Bool(value[0] != 0),
            (KIND_BLOB, _) => StoredValue::Blob(value.to_vec()),
            _ => return None,
        };
        entries.insert(key, value);
        payload = &payload[ENTRY_HEADER_LEN + len..];
    }

    payload.is_empty().then_some(entries)
}

fn encode_snapshot<E>(entries: &BTreeMap<u32, StoredValue>) -> Result<Vec<u8>, FlashKvError<E>> {
    let count = u16::try_from(entries.len()).map_err(|_| FlashKvError::RegionFull)?;

    let mut payload = Vec::new();
    for (key, value) in entries {
        let scalar: [u8; 4];
        let (kind, bytes): (u8, &[u8]) = match value {
            StoredValue::Int(value) => {
                scalar = value.to_le_bytes();
                (KIND_INT, &scalar)
            }
            StoredValue::Bool(value) => {
                scalar = [u8::from(*value), 0, 0, 0];
                (KIND_BOOL, &scalar[..1])
            }
            StoredValue::Blob(value) => (KIND_BLOB, value.as_slice()),
        };
        let len = u16::try_from(bytes.len()).map_err(|_| FlashKvError::ValueTooLarge)?;
        payload.extend_from_slice(&key.to_le_bytes());
        payload.push(kind);
        payload.extend_from_slice(&len.to_le_bytes());
        payload.extend_from_slice(bytes);
    }

    let payload_len = u32::try_from(payload.len()).map_err(|_| FlashKvError::RegionFull)?;
    let mut record = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    record.extend_from_slice(&KV_MAGIC.to_le_bytes());
    record.push(KV_VERSION);
    record.extend_from_slice(&count.to_le_bytes());
    record.extend_from_slice(&payload_len.to_le_bytes());
    record.extend_from_slice(&payload);
    let checksum = checksum32(&record);
    record.extend_from_slice(&checksum.to_le_bytes());
    Ok(record)
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

#[cfg(test)]
mod tests;
