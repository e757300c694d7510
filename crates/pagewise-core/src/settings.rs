//! Persisted reader state over an integer-keyed store.

use alloc::{collections::BTreeMap, vec::Vec};

use log::warn;

use crate::{
    paginator::ReadingCursor,
    render::{FontSize, Theme},
    text_utils::trim_at_nul,
};

pub const KEY_PAGE: u32 = 100;
pub const KEY_FONT: u32 = 101;
pub const KEY_THEME: u32 = 102;
pub const KEY_SELECTED_BOOK: u32 = 103;
pub const KEY_DOCUMENT: u32 = 200;
/// Per-book saved page lives at `KEY_BOOK_PAGE_BASE + book_index`.
pub const KEY_BOOK_PAGE_BASE: u32 = 1000;
/// Largest blob a store has to accept; record lengths are `u16`.
pub const MAX_BLOB_BYTES: usize = u16::MAX as usize;

/// Best-effort typed key-value persistence.
pub trait KeyValueStore {
    type Error;

    fn exists(&self, key: u32) -> bool;

    fn read_int(&mut self, key: u32) -> Result<Option<i32>, Self::Error>;
    fn write_int(&mut self, key: u32, value: i32) -> Result<(), Self::Error>;

    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, Self::Error>;
    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), Self::Error>;

    fn read_blob(&mut self, key: u32) -> Result<Option<Vec<u8>>, Self::Error>;
    fn write_blob(&mut self, key: u32, value: &[u8]) -> Result<(), Self::Error>;
}

/// Typed slot value, shared by the in-memory and flash-backed stores.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoredValue {
    Int(i32),
    Bool(bool),
    Blob(Vec<u8>),
}

/// Store kept entirely in RAM. Reads of a key holding another type return `None`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<u32, StoredValue>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: u32) -> Option<&StoredValue> {
        self.values.get(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = core::convert::Infallible;

    fn exists(&self, key: u32) -> bool {
        self.values.contains_key(&key)
    }

    fn read_int(&mut self, key: u32) -> Result<Option<i32>, Self::Error> {
        Ok(match self.values.get(&key) {
            Some(StoredValue::Int(value)) => Some(*value),
            _ => None,
        })
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<(), Self::Error> {
        self.values.insert(key, StoredValue::Int(value));
        Ok(())
    }

    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, Self::Error> {
        Ok(match self.values.get(&key) {
            Some(StoredValue::Bool(value)) => Some(*value),
            _ => None,
        })
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), Self::Error> {
        self.values.insert(key, StoredValue::Bool(value));
        Ok(())
    }

    fn read_blob(&mut self, key: u32) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(match self.values.get(&key) {
            Some(StoredValue::Blob(value)) => Some(value.clone()),
            _ => None,
        })
    }

    fn write_blob(&mut self, key: u32, value: &[u8]) -> Result<(), Self::Error> {
        self.values.insert(key, StoredValue::Blob(value.to_vec()));
        Ok(())
    }
}

pub fn book_page_key(book_index: u16) -> u32 {
    KEY_BOOK_PAGE_BASE + u32::from(book_index)
}

pub fn page_to_stored(page: usize) -> i32 {
    i32::try_from(page).unwrap_or(i32::MAX)
}

pub fn page_from_stored(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Reads an int, treating store errors as a missing key.
pub fn read_int_or_none<S: KeyValueStore>(store: &mut S, key: u32) -> Option<i32> {
    match store.read_int(key) {
        Ok(value) => value,
        Err(_) => {
            warn!("persist: read failed key={} kind=int", key);
            None
        }
    }
}

/// Restores `{page, font, theme}`; every missing or unreadable field falls back to its default.
pub fn load_cursor<S: KeyValueStore>(store: &mut S) -> ReadingCursor {
    let page = read_int_or_none(store, KEY_PAGE)
        .map(page_from_stored)
        .unwrap_or(0);

    let font = match read_int_or_none(store, KEY_FONT) {
        Some(raw) => {
            let font = FontSize::from_index_lenient(raw);
            if i32::from(font.index()) != raw {
                warn!("persist: font index {} out of range, using {:?}", raw, font);
            }
            font
        }
        None => FontSize::default(),
    };

    let dark = store.read_bool(KEY_THEME).ok().flatten().unwrap_or(false);

    ReadingCursor {
        page,
        font,
        theme: Theme::from_dark(dark),
    }
}

/// Restores a delivered document, dropping everything from the first NUL onwards.
pub fn load_document_blob<S: KeyValueStore>(store: &mut S) -> Option<Vec<u8>> {
    if !store.exists(KEY_DOCUMENT) {
        return None;
    }

    match store.read_blob(KEY_DOCUMENT) {
        Ok(Some(mut blob)) => {
            let len = trim_at_nul(&blob).len();
            blob.truncate(len);
            Some(blob)
        }
        Ok(None) => None,
        Err(_) => {
            warn!("persist: read failed key={} kind=blob", KEY_DOCUMENT);
            None
        }
    }
}
