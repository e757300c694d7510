//! Static list of bundled texts.

use heapless::{String, Vec};
use log::debug;

use crate::text_utils::truncate_on_char_boundary;

pub const CATALOG_MAX_TITLES: usize = 8;
pub const CATALOG_TITLE_BYTES: usize = 32;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BookEntry {
    pub title: String<CATALOG_TITLE_BYTES>,
    pub resource_id: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatalogLoadResult {
    pub loaded: u16,
    pub truncated: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BookCatalog {
    entries: Vec<BookEntry, CATALOG_MAX_TITLES>,
}

impl BookCatalog {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a catalog from `(title, resource_id)` pairs. Titles longer than
    /// [`CATALOG_TITLE_BYTES`] and entries past [`CATALOG_MAX_TITLES`] are cut.
    pub fn from_entries<'a, I>(entries: I) -> (Self, CatalogLoadResult)
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut catalog = Self::new();
        let mut truncated = false;

        for (title, resource_id) in entries {
            let fitted = truncate_on_char_boundary(title.trim(), CATALOG_TITLE_BYTES);
            truncated |= fitted.len() != title.trim().len();

            let mut stored = String::new();
            let _ = stored.push_str(fitted);
            if catalog
                .entries
                .push(BookEntry {
                    title: stored,
                    resource_id,
                })
                .is_err()
            {
                truncated = true;
                break;
            }
        }

        let result = CatalogLoadResult {
            loaded: catalog.entries.len() as u16,
            truncated,
        };
        debug!(
            "catalog: loaded={} truncated={}",
            result.loaded, result.truncated
        );
        (catalog, result)
    }

    pub fn len(&self) -> u16 {
        self.entries.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&BookEntry> {
        self.entries.get(index as usize)
    }

    pub fn title_at(&self, index: u16) -> Option<&str> {
        self.get(index).map(|entry| entry.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_exposed_in_order() {
        let (catalog, result) = BookCatalog::from_entries([("Book.txt", 1), ("Another.txt", 2)]);
        assert_eq!(
            result,
            CatalogLoadResult {
                loaded: 2,
                truncated: false
            }
        );
        assert_eq!(catalog.title_at(1), Some("Another.txt"));
        assert_eq!(catalog.get(0).map(|entry| entry.resource_id), Some(1));
        assert_eq!(catalog.title_at(2), None);
    }

    #[test]
    fn overlong_titles_and_extra_entries_are_cut() {
        let long = "An extremely long title that does not fit on the watch";
        let many = (0..10).map(|index| (long, index));
        let (catalog, result) = BookCatalog::from_entries(many);

        assert!(result.truncated);
        assert_eq!(result.loaded as usize, CATALOG_MAX_TITLES);
        assert_eq!(
            catalog.title_at(0).map(str::len),
            Some(CATALOG_TITLE_BYTES)
        );
    }
}
