impl<L, S, R> ReaderApp<L, S, R>
where
    L: ResourceLoader,
    S: KeyValueStore,
    R: Renderer,
{
    /// Restores the persisted cursor and document, then renders the first frame.
    pub fn start(&mut self) {
        let mut cursor = load_cursor(&mut self.store);
        let selected = read_int_or_none(&mut self.store, KEY_SELECTED_BOOK);

        let delivered = match selected {
            Some(index) if index >= 0 => None,
            _ => load_document_blob(&mut self.store).filter(|blob| !blob.is_empty()),
        };

        match delivered {
            Some(blob) => {
                info!("reader: restored delivered document bytes={}", blob.len());
                self.engine.replace_document(Document::from_bytes(blob));
                self.origin = DocumentOrigin::Delivered;
            }
            None => {
                if selected.is_some_and(|raw| raw < 0) {
                    // The saved page belonged to a delivered document that is gone.
                    cursor.page = 0;
                }
                let index = selected
                    .and_then(|raw| u16::try_from(raw).ok())
                    .filter(|index| *index < self.catalog.len())
                    .unwrap_or(0);
                match self.install_book(index) {
                    Ok(Some(page)) => cursor.page = page,
                    Ok(None) => {}
                    Err(err) => self.note(err),
                }
            }
        }

        self.engine.restore_cursor(cursor);
        debug!(
            "reader: started origin={:?} page={} total={}",
            self.origin,
            self.engine.cursor().page,
            self.engine.total_pages()
        );
        self.render_all();
        self.persist();
    }

    /// Switches to a catalog book, keeping the current book's position under its own key.
    pub fn open_book(&mut self, index: u16) -> Result<(), ReaderError> {
        if index >= self.catalog.len() {
            warn!(
                "reader: open_book index={} out of range len={}",
                index,
                self.catalog.len()
            );
            return Err(ReaderError::ResourceUnavailable);
        }

        self.persist();

        let installed = self.install_book(index);
        let mut cursor = self.engine.cursor();
        cursor.page = match installed {
            Ok(page) => page.unwrap_or(0),
            Err(err) => {
                self.note(err);
                0
            }
        };
        self.engine.restore_cursor(cursor);

        self.render_page();
        self.persist();
        installed.map(|_| ())
    }

    /// Loads catalog entry `index` and returns the page saved for it, if any.
    /// On failure the empty document is active.
    fn install_book(&mut self, index: u16) -> Result<Option<usize>, ReaderError> {
        self.origin = DocumentOrigin::Book(index);

        let Some(resource_id) = self.catalog.get(index).map(|entry| entry.resource_id) else {
            warn!("reader: catalog empty, no book to open");
            self.engine.replace_document(Document::empty());
            self.origin = DocumentOrigin::Nothing;
            return Err(ReaderError::ResourceUnavailable);
        };

        self.engine.load_resource(&self.loader, resource_id)?;
        info!(
            "reader: opened book index={} bytes={}",
            index,
            self.engine.document().len()
        );

        Ok(read_int_or_none(&mut self.store, book_page_key(index)).map(page_from_stored))
    }
}
