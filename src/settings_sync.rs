use log::warn;
use pagewise_core::{
    paginator::ReadingCursor,
    settings::{
        KEY_DOCUMENT, KEY_FONT, KEY_PAGE, KEY_SELECTED_BOOK, KEY_THEME, KeyValueStore,
        book_page_key, page_to_stored,
    },
};

/// Where the active document came from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DocumentOrigin {
    #[default]
    Nothing,
    Book(u16),
    Delivered,
}

impl DocumentOrigin {
    /// Value stored under the selected-book key; delivered text is `-1`.
    fn stored(self) -> Option<i32> {
        match self {
            Self::Nothing => None,
            Self::Book(index) => Some(i32::from(index)),
            Self::Delivered => Some(-1),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PersistedState {
    pub cursor: ReadingCursor,
    pub origin: DocumentOrigin,
}

/// Writes only the fields that changed since the last successful save.
///
/// A delivered document is written before the position that points at it. Until
/// that blob is stored, page and selected book are left alone and any older blob
/// is cleared.
pub(crate) struct SettingsSyncState {
    last_saved: Option<PersistedState>,
    document_pending: bool,
}

impl SettingsSyncState {
    pub(crate) const fn new() -> Self {
        Self {
            last_saved: None,
            document_pending: false,
        }
    }

    /// The active document was delivered and still has to reach the store.
    pub(crate) fn document_replaced(&mut self) {
        self.document_pending = true;
    }

    pub(crate) fn document_pending(&self) -> bool {
        self.document_pending
    }

    /// Returns `false` if any write failed; failed fields are retried on the next commit.
    /// `document` is the delivered text, `None` when a catalog book is active.
    pub(crate) fn commit<S: KeyValueStore>(
        &mut self,
        store: &mut S,
        current: PersistedState,
        document: Option<&[u8]>,
    ) -> bool {
        if !self.document_pending && self.last_saved == Some(current) {
            return true;
        }
        self.save(store, self.last_saved, current, document)
    }

    /// Unconditional write of every field, used at shutdown.
    pub(crate) fn flush_all<S: KeyValueStore>(
        &mut self,
        store: &mut S,
        current: PersistedState,
        document: Option<&[u8]>,
    ) -> bool {
        self.save(store, None, current, document)
    }

    fn save<S: KeyValueStore>(
        &mut self,
        store: &mut S,
        previous: Option<PersistedState>,
        current: PersistedState,
        document: Option<&[u8]>,
    ) -> bool {
        let document_saved = self.write_document(store, document);
        let saved = write_fields(store, previous, current, document_saved);
        if saved && document_saved {
            self.last_saved = Some(current);
        }
        saved && document_saved
    }

    fn write_document<S: KeyValueStore>(
        &mut self,
        store: &mut S,
        document: Option<&[u8]>,
    ) -> bool {
        if !self.document_pending {
            return true;
        }
        // A catalog book replaced the delivered text before it was stored.
        let Some(bytes) = document else {
            self.document_pending = false;
            return true;
        };

        if store.write_blob(KEY_DOCUMENT, bytes).is_ok() {
            self.document_pending = false;
            return true;
        }

        warn!(
            "persist: write failed key={} bytes={}, clearing stored document",
            KEY_DOCUMENT,
            bytes.len()
        );
        logged(store.write_blob(KEY_DOCUMENT, &[]), KEY_DOCUMENT);
        false
    }
}

fn write_fields<S: KeyValueStore>(
    store: &mut S,
    previous: Option<PersistedState>,
    current: PersistedState,
    with_position: bool,
) -> bool {
    let mut saved = true;
    let cursor = current.cursor;

    let page_changed =
        previous.is_none_or(|p| p.cursor.page != cursor.page || p.origin != current.origin);
    if with_position && page_changed {
        let page = page_to_stored(cursor.page);
        saved &= logged(store.write_int(KEY_PAGE, page), KEY_PAGE);
        if let DocumentOrigin::Book(index) = current.origin {
            let key = book_page_key(index);
            saved &= logged(store.write_int(key, page), key);
        }
    }

    if previous.is_none_or(|p| p.cursor.font != cursor.font) {
        saved &= logged(
            store.write_int(KEY_FONT, i32::from(cursor.font.index())),
            KEY_FONT,
        );
    }

    if previous.is_none_or(|p| p.cursor.theme != cursor.theme) {
        saved &= logged(
            store.write_bool(KEY_THEME, cursor.theme.is_dark()),
            KEY_THEME,
        );
    }

    if with_position
        && previous.is_none_or(|p| p.origin != current.origin)
        && let Some(value) = current.origin.stored()
    {
        saved &= logged(
            store.write_int(KEY_SELECTED_BOOK, value),
            KEY_SELECTED_BOOK,
        );
    }

    saved
}

fn logged<E>(result: Result<(), E>, key: u32) -> bool {
    if result.is_err() {
        warn!("persist: write failed key={}", key);
        return false;
    }
    true
}
