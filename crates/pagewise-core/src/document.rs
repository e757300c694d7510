//! Text buffer ownership and resource loading.

use alloc::vec::Vec;

use heapless::Vec as HeaplessVec;
use log::{debug, info};

use crate::error::ReaderError;

pub const MAX_STATIC_RESOURCES: usize = 8;

/// Immutable text buffer. The length is authoritative; there is no sentinel byte.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
    bytes: Vec<u8>,
}

impl Document {
    pub const fn empty() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Opaque handle returned by a [`ResourceLoader`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResourceHandle(pub u32);

/// Synchronous access to bundled text resources.
pub trait ResourceLoader {
    type Error;

    /// `None` when no resource exists for `id`.
    fn handle(&self, id: u32) -> Option<ResourceHandle>;

    fn size(&self, handle: ResourceHandle) -> usize;

    /// Fills `out` and returns the number of bytes copied.
    fn load(&self, handle: ResourceHandle, out: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Resource loader over blobs compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    entries: HeaplessVec<(u32, &'static [u8]), MAX_STATIC_RESOURCES>,
}

impl StaticResources {
    pub const fn new() -> Self {
        Self {
            entries: HeaplessVec::new(),
        }
    }

    /// Registers `bytes` under `id`. Returns `false` once the table is full.
    pub fn insert(&mut self, id: u32, bytes: &'static [u8]) -> bool {
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == id) {
            slot.1 = bytes;
            return true;
        }
        self.entries.push((id, bytes)).is_ok()
    }

    fn bytes(&self, handle: ResourceHandle) -> Option<&'static [u8]> {
        self.entries
            .iter()
            .find(|(key, _)| *key == handle.0)
            .map(|(_, bytes)| *bytes)
    }
}

impl ResourceLoader for StaticResources {
    type Error = ReaderError;

    fn handle(&self, id: u32) -> Option<ResourceHandle> {
        self.entries
            .iter()
            .any(|(key, _)| *key == id)
            .then_some(ResourceHandle(id))
    }

    fn size(&self, handle: ResourceHandle) -> usize {
        self.bytes(handle).map_or(0, <[u8]>::len)
    }

    fn load(&self, handle: ResourceHandle, out: &mut [u8]) -> Result<usize, Self::Error> {
        let bytes = self
            .bytes(handle)
            .ok_or(ReaderError::ResourceUnavailable)?;
        let len = bytes.len().min(out.len());
        out[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }
}

/// Exclusive owner of the active document.
#[derive(Debug, Default)]
pub struct DocumentStore {
    document: Document,
    revision: u32,
}

impl DocumentStore {
    pub const fn new() -> Self {
        Self {
            document: Document::empty(),
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Bumped on every replacement; cached page counts from an older revision are stale.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Takes ownership of a complete buffer and installs it.
    pub fn load(&mut self, source: impl Into<Vec<u8>>) -> &Document {
        self.replace(Document::from_bytes(source));
        &self.document
    }

    /// Reads resource `id` in one step. On failure the active document is left untouched.
    pub fn load_resource<L: ResourceLoader>(
        &mut self,
        loader: &L,
        id: u32,
    ) -> Result<&Document, ReaderError> {
        let handle = loader.handle(id).ok_or_else(|| {
            debug!("document: resource missing id={}", id);
            ReaderError::ResourceUnavailable
        })?;

        let size = loader.size(handle);
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| ReaderError::AllocationFailure)?;
        buffer.resize(size, 0);

        let read = loader
            .load(handle, &mut buffer)
            .map_err(|_| ReaderError::ResourceUnavailable)?;
        if read != size {
            debug!(
                "document: short read id={} expected={} read={}",
                id, size, read
            );
            return Err(ReaderError::ResourceUnavailable);
        }

        info!("document: loaded resource id={} bytes={}", id, size);
        self.replace(Document::from_bytes(buffer));
        Ok(&self.document)
    }

    /// Swaps in `document` and returns the previous one.
    pub fn replace(&mut self, document: Document) -> Document {
        self.revision = self.revision.wrapping_add(1);
        debug!(
            "document: replace revision={} bytes={}",
            self.revision,
            document.len()
        );
        core::mem::replace(&mut self.document, document)
    }

    /// Installs the empty document used when no text could be loaded.
    pub fn clear(&mut self) -> Document {
        self.replace(Document::empty())
    }
}
