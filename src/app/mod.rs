//! Event-driven reader: owns the engine and talks to the loader, store and renderer.

use log::{debug, info, warn};
use pagewise_core::{
    ReaderError,
    assembler::{Fragment, FragmentSource},
    catalog::BookCatalog,
    document::{Document, ResourceLoader},
    engine::{ReaderConfig, ReaderEngine},
    input::{InputEvent, InputProvider},
    render::Renderer,
    settings::{
        KEY_SELECTED_BOOK, KeyValueStore, book_page_key, load_cursor, load_document_blob,
        page_from_stored, read_int_or_none,
    },
};

use crate::settings_sync::{DocumentOrigin, PersistedState, SettingsSyncState};

pub struct ReaderApp<L, S, R>
where
    L: ResourceLoader,
    S: KeyValueStore,
    R: Renderer,
{
    engine: ReaderEngine,
    catalog: BookCatalog,
    loader: L,
    store: S,
    renderer: R,
    origin: DocumentOrigin,
    sync: SettingsSyncState,
    last_notice: Option<ReaderError>,
}

impl<L, S, R> ReaderApp<L, S, R>
where
    L: ResourceLoader,
    S: KeyValueStore,
    R: Renderer,
{
    /// Nothing is loaded or rendered until [`ReaderApp::start`].
    pub fn new(
        config: ReaderConfig,
        catalog: BookCatalog,
        loader: L,
        store: S,
        renderer: R,
    ) -> Self {
        Self {
            engine: ReaderEngine::new(config),
            catalog,
            loader,
            store,
            renderer,
            origin: DocumentOrigin::Nothing,
            sync: SettingsSyncState::new(),
            last_notice: None,
        }
    }

    pub fn engine(&self) -> &ReaderEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    pub fn origin(&self) -> DocumentOrigin {
        self.origin
    }

    /// Most recent non-fatal error, kept until the next one replaces it.
    pub fn last_notice(&self) -> Option<ReaderError> {
        self.last_notice
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_parts(self) -> (L, S, R) {
        (self.loader, self.store, self.renderer)
    }

    fn note(&mut self, error: ReaderError) {
        debug!("reader: notice {}", error);
        self.last_notice = Some(error);
    }
}

include!("library.rs");
include!("input.rs");
include!("transfer.rs");
include!("view.rs");
