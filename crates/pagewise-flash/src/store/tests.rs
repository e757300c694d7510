use embedded_storage::ReadStorage;

use super::*;

const REGION: FlashRegion = FlashRegion {
    offset: 0x100,
    len: 256,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RamFlashError {
    OutOfBounds,
    WriteRejected,
}

struct RamFlash {
    bytes: Vec<u8>,
    reject_writes: bool,
    writes: usize,
}

impl RamFlash {
    fn blank(capacity: usize) -> Self {
        Self {
            bytes: vec![0xFF; capacity],
            reject_writes: false,
            writes: 0,
        }
    }
}

impl ReadStorage for RamFlash {
    type Error = RamFlashError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let end = start + bytes.len();
        let source = self
            .bytes
            .get(start..end)
            .ok_or(RamFlashError::OutOfBounds)?;
        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for RamFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.reject_writes {
            return Err(RamFlashError::WriteRejected);
        }
        let start = offset as usize;
        let end = start + bytes.len();
        self.bytes
            .get_mut(start..end)
            .ok_or(RamFlashError::OutOfBounds)?
            .copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

#[test]
fn blank_region_opens_empty() {
    let store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    assert_eq!(store.entry_count(), 0);
    assert!(!store.exists(100));
}

#[test]
fn region_past_capacity_is_rejected() {
    let result = FlashKvStore::open(RamFlash::blank(128), REGION);
    assert!(matches!(result, Err(FlashKvError::RegionOutOfBounds)));
}

#[test]
fn values_survive_reopen() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    store.write_int(100, 7).unwrap();
    store.write_int(101, -2).unwrap();
    store.write_bool(102, true).unwrap();
    store.write_blob(200, b"Hola mundo").unwrap();

    let mut reopened = FlashKvStore::open(store.into_inner(), REGION).unwrap();
    assert_eq!(reopened.entry_count(), 4);
    assert_eq!(reopened.read_int(100), Ok(Some(7)));
    assert_eq!(reopened.read_int(101), Ok(Some(-2)));
    assert_eq!(reopened.read_bool(102), Ok(Some(true)));
    assert_eq!(reopened.read_blob(200), Ok(Some(b"Hola mundo".to_vec())));
}

#[test]
fn mismatched_kind_reads_as_missing() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    store.write_bool(102, true).unwrap();
    assert_eq!(store.read_int(102), Ok(None));
    assert!(store.exists(102));
}

#[test]
fn unchanged_value_is_not_rewritten() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    store.write_int(100, 3).unwrap();
    store.write_int(100, 3).unwrap();
    assert_eq!(store.into_inner().writes, 1);
}

#[test]
fn corrupted_record_starts_empty() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    store.write_int(100, 42).unwrap();

    let mut flash = store.into_inner();
    let payload_byte = REGION.offset as usize + HEADER_LEN + ENTRY_HEADER_LEN;
    flash.bytes[payload_byte] ^= 0x5A;

    let store = FlashKvStore::open(flash, REGION).unwrap();
    assert_eq!(store.entry_count(), 0);
}

#[test]
fn oversized_snapshot_is_refused_and_cache_rolled_back() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    store.write_int(100, 1).unwrap();

    let blob = [b'x'; 300];
    assert_eq!(store.write_blob(200, &blob), Err(FlashKvError::RegionFull));
    assert!(!store.exists(200));

    let mut reopened = FlashKvStore::open(store.into_inner(), REGION).unwrap();
    assert_eq!(reopened.read_int(100), Ok(Some(1)));
    assert!(!reopened.exists(200));
}

#[test]
fn failed_write_keeps_previous_value() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    store.write_int(100, 1).unwrap();

    let mut flash = store.into_inner();
    flash.reject_writes = true;
    let mut store = FlashKvStore::open(flash, REGION).unwrap();

    assert_eq!(
        store.write_int(100, 2),
        Err(FlashKvError::Storage(RamFlashError::WriteRejected))
    );
    assert_eq!(store.read_int(100), Ok(Some(1)));
}

#[test]
fn checksum_matches_reference_fnv1a() {
    assert_eq!(checksum32(b""), 0x811C_9DC5);
    assert_eq!(checksum32(b"a"), 0xE40C_292C);
}

#[test]
fn blob_size_limit_matches_shared_cap() {
    let mut store = FlashKvStore::open(RamFlash::blank(1024), REGION).unwrap();
    let blob = vec![b'x'; MAX_BLOB_BYTES + 1];
    assert_eq!(store.write_blob(200, &blob), Err(FlashKvError::ValueTooLarge));

    let blob = vec![b'x'; MAX_BLOB_BYTES];
    assert_eq!(store.write_blob(200, &blob), Err(FlashKvError::RegionFull));
}
