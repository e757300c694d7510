//! Display-facing types and the renderer sink.

use crate::error::ReaderError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub const COUNT: u8 = 3;

    pub const fn index(self) -> u8 {
        match self {
            Self::Small => 0,
            Self::Medium => 1,
            Self::Large => 2,
        }
    }

    pub const fn from_index(index: u8) -> Result<Self, ReaderError> {
        match index {
            0 => Ok(Self::Small),
            1 => Ok(Self::Medium),
            2 => Ok(Self::Large),
            _ => Err(ReaderError::InvalidFontIndex(index)),
        }
    }

    /// Out-of-range selectors fall back to [`FontSize::Medium`].
    pub fn from_index_lenient(index: i32) -> Self {
        u8::try_from(index)
            .ok()
            .and_then(|index| Self::from_index(index).ok())
            .unwrap_or_default()
    }

    pub const fn cycled(self) -> Self {
        match self {
            Self::Small => Self::Medium,
            Self::Medium => Self::Large,
            Self::Large => Self::Small,
        }
    }

    pub const fn larger(self) -> Self {
        match self {
            Self::Small => Self::Medium,
            Self::Medium | Self::Large => Self::Large,
        }
    }

    pub const fn smaller(self) -> Self {
        match self {
            Self::Small | Self::Medium => Self::Small,
            Self::Large => Self::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// `(foreground, background)`.
    pub const fn colors(self) -> (Color, Color) {
        match self {
            Self::Light => (Color::Black, Color::White),
            Self::Dark => (Color::White, Color::Black),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Black,
    White,
}

/// Side-effecting display sink. The engine never reads anything back.
pub trait Renderer {
    fn set_text(&mut self, text: &str);
    fn set_font(&mut self, font: FontSize);
    fn set_colors(&mut self, foreground: Color, background: Color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_index_is_reported_and_lenient_lookup_defaults_to_medium() {
        assert_eq!(
            FontSize::from_index(3),
            Err(ReaderError::InvalidFontIndex(3))
        );
        assert_eq!(FontSize::from_index_lenient(-1), FontSize::Medium);
        assert_eq!(FontSize::from_index_lenient(7), FontSize::Medium);
        assert_eq!(FontSize::from_index_lenient(2), FontSize::Large);
    }

    #[test]
    fn cycling_wraps_and_stepping_saturates() {
        assert_eq!(FontSize::Large.cycled(), FontSize::Small);
        assert_eq!(FontSize::Large.larger(), FontSize::Large);
        assert_eq!(FontSize::Small.smaller(), FontSize::Small);
    }

    #[test]
    fn dark_theme_inverts_colors() {
        assert_eq!(Theme::Dark.colors(), (Color::White, Color::Black));
        assert_eq!(Theme::from_dark(false).toggled(), Theme::Dark);
    }
}
