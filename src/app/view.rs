impl<L, S, R> ReaderApp<L, S, R>
where
    L: ResourceLoader,
    S: KeyValueStore,
    R: Renderer,
{
    fn render_page(&mut self) {
        self.renderer.set_text(self.engine.current_text());
    }

    fn render_all(&mut self) {
        let cursor = self.engine.cursor();
        let (fg, bg) = cursor.theme.colors();
        self.renderer.set_font(cursor.font);
        self.renderer.set_colors(fg, bg);
        self.render_page();
    }

    fn persisted_state(&self) -> PersistedState {
        PersistedState {
            cursor: self.engine.cursor(),
            origin: self.origin,
        }
    }

    fn persist(&mut self) {
        let current = self.persisted_state();
        let document =
            (self.origin == DocumentOrigin::Delivered).then(|| self.engine.document().as_bytes());
        if !self.sync.commit(&mut self.store, current, document) {
            debug!("persist: commit incomplete, retrying on next change");
        }
    }

    /// Writes the full reading state once more, including a delivered document that
    /// could not be stored yet. Returns whether every write succeeded.
    pub fn shutdown(&mut self) -> bool {
        let current = self.persisted_state();
        let document =
            (self.origin == DocumentOrigin::Delivered).then(|| self.engine.document().as_bytes());
        let saved = self.sync.flush_all(&mut self.store, current, document);
        info!(
            "reader: shutdown page={} font={:?} saved={} document_pending={}",
            current.cursor.page,
            current.cursor.font,
            saved,
            self.sync.document_pending()
        );
        saved
    }
}
