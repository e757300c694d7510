//! Input abstraction layer.

/// Logical actions consumed by the reader app.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    PageForward,
    PageBack,
    CycleFontSize,
    IncreaseFontSize,
    DecreaseFontSize,
    JumpToStart,
    ToggleTheme,
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}

/// Input source that never produces events, for builds without buttons wired up.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoInput;

impl InputProvider for NoInput {
    type Error = core::convert::Infallible;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        Ok(None)
    }
}
