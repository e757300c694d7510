impl<L, S, R> ReaderApp<L, S, R>
where
    L: ResourceLoader,
    S: KeyValueStore,
    R: Renderer,
{
    /// Applies one logical input. Returns whether anything visible changed.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let cursor = self.engine.cursor();

        let changed = match event {
            InputEvent::PageForward => self.engine.next_page(),
            InputEvent::PageBack => self.engine.prev_page(),
            InputEvent::JumpToStart => self.engine.jump_to_start(),
            InputEvent::CycleFontSize => self.engine.cycle_font() != cursor.font,
            InputEvent::IncreaseFontSize => self.engine.increase_font(),
            InputEvent::DecreaseFontSize => self.engine.decrease_font(),
            InputEvent::ToggleTheme => self.engine.toggle_theme() != cursor.theme,
        };

        if !changed {
            debug!("reader: input {:?} ignored at page={}", event, cursor.page);
            return false;
        }

        let next = self.engine.cursor();
        if next.font != cursor.font {
            self.renderer.set_font(next.font);
        }
        if next.theme != cursor.theme {
            let (fg, bg) = next.theme.colors();
            self.renderer.set_colors(fg, bg);
        }
        debug!(
            "reader: input {:?} page={} total={}",
            event,
            next.page,
            self.engine.total_pages()
        );

        self.render_page();
        self.persist();
        true
    }

    /// Drains pending fragments, then pending input. A source error stops that source
    /// until the next call.
    pub fn poll<IN, FS>(&mut self, input: &mut IN, fragments: &mut FS)
    where
        IN: InputProvider,
        FS: FragmentSource,
    {
        loop {
            match fragments.poll_fragment() {
                Ok(Some(fragment)) => {
                    if let Err(err) = self.handle_fragment(&fragment) {
                        debug!("transfer: continuing drain after err={}", err);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("transfer: fragment source failed, draining stopped");
                    break;
                }
            }
        }

        loop {
            match input.poll_event() {
                Ok(Some(event)) => {
                    self.handle_input(event);
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("reader: input source failed, draining stopped");
                    break;
                }
            }
        }
    }
}
