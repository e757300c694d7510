impl<L, S, R> ReaderApp<L, S, R>
where
    L: ResourceLoader,
    S: KeyValueStore,
    R: Renderer,
{
    /// Feeds one companion fragment. A finished transfer becomes the active document,
    /// is written to the store and shown from page 0.
    pub fn handle_fragment(&mut self, fragment: &Fragment) -> Result<(), ReaderError> {
        let effect = match self.engine.accept_fragment(fragment) {
            Ok(effect) => effect,
            Err(err) => {
                warn!(
                    "transfer: fragment index={} rejected err={}",
                    fragment.index, err
                );
                self.note(err);
                return Err(err);
            }
        };

        if let Some(notice) = effect.notice {
            self.note(notice);
        }
        if !effect.finalized {
            return Ok(());
        }

        self.origin = DocumentOrigin::Delivered;
        self.sync.document_replaced();

        self.render_page();
        self.persist();
        Ok(())
    }
}
