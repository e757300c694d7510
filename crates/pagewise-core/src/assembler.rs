//! Reassembly of a document delivered as indexed fragments.
//!
//! Index `0` always starts a fresh transfer. Non-zero fragments are appended in
//! arrival order; gaps and reordering are logged but not rejected.

use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::{document::Document, error::ReaderError, settings::MAX_BLOB_BYTES};

pub const DEFAULT_CHUNK_BYTES: usize = 512;
/// Capped so a delivered document always fits one persisted blob.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = MAX_BLOB_BYTES;

/// One message from the companion channel.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fragment {
    pub index: u32,
    pub text: Vec<u8>,
    pub finished: bool,
}

impl Fragment {
    pub fn new(index: u32, text: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            text: text.into(),
            finished: false,
        }
    }

    /// Last text-carrying fragment of a transfer.
    pub fn last(index: u32, text: impl Into<Vec<u8>>) -> Self {
        Self {
            finished: true,
            ..Self::new(index, text)
        }
    }

    /// Text-less "transfer complete" message.
    pub fn finished_marker() -> Self {
        Self {
            index: 0,
            text: Vec::new(),
            finished: true,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.finished && self.text.is_empty()
    }
}

/// Parsed fragments arriving from the phone.
pub trait FragmentSource {
    type Error;

    fn poll_fragment(&mut self) -> Result<Option<Fragment>, Self::Error>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AssemblyState {
    #[default]
    Idle,
    Assembling {
        next_index: u32,
    },
    Finalized,
    /// A transfer was aborted; its remaining fragments are dropped until the next index `0`.
    Discarding,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChunkOutcome {
    /// A new transfer began. `recovered` is set when it began on a non-zero index.
    Started { recovered: bool },
    Appended,
    /// Fragment belonged to an aborted transfer.
    Dropped,
    /// Finished marker with no transfer in progress.
    Ignored,
    Finalized { document: Document, recovered: bool },
}

impl ChunkOutcome {
    pub fn notice(&self) -> Option<ReaderError> {
        match self {
            Self::Started { recovered: true } | Self::Finalized { recovered: true, .. } => {
                Some(ReaderError::OutOfRangeChunk)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChunkAssembler {
    state: AssemblyState,
    partial: Vec<u8>,
    max_bytes: usize,
}

impl ChunkAssembler {
    pub const fn new(max_bytes: usize) -> Self {
        Self {
            state: AssemblyState::Idle,
            partial: Vec::new(),
            max_bytes,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn partial_len(&self) -> usize {
        self.partial.len()
    }

    pub fn push(&mut self, fragment: &Fragment) -> Result<ChunkOutcome, ReaderError> {
        if fragment.is_marker() {
            return Ok(self.finish_marker());
        }

        let index = fragment.index;
        let mut recovered = false;
        let state = self.state;
        match state {
            _ if index == 0 => self.start(),
            AssemblyState::Assembling { next_index } => {
                if index != next_index {
                    debug!(
                        "transfer: out-of-order fragment expected={} got={} appended=true",
                        next_index, index
                    );
                }
            }
            AssemblyState::Discarding => {
                debug!("transfer: drop fragment index={} reason=aborted", index);
                if fragment.finished {
                    self.state = AssemblyState::Idle;
                }
                return Ok(ChunkOutcome::Dropped);
            }
            AssemblyState::Idle | AssemblyState::Finalized => {
                warn!(
                    "transfer: fragment index={} without transfer start, starting fresh",
                    index
                );
                recovered = true;
                self.start();
            }
        }

        self.append(&fragment.text)?;
        let started = index == 0 || recovered;
        self.state = AssemblyState::Assembling {
            next_index: index.saturating_add(1),
        };

        if fragment.finished {
            return Ok(self.finalize(recovered));
        }

        Ok(if started {
            ChunkOutcome::Started { recovered }
        } else {
            ChunkOutcome::Appended
        })
    }

    fn finish_marker(&mut self) -> ChunkOutcome {
        match self.state {
            AssemblyState::Assembling { .. } => self.finalize(false),
            AssemblyState::Discarding => {
                self.state = AssemblyState::Idle;
                ChunkOutcome::Dropped
            }
            AssemblyState::Idle | AssemblyState::Finalized => {
                debug!("transfer: finished marker ignored state={:?}", self.state);
                ChunkOutcome::Ignored
            }
        }
    }

    fn start(&mut self) {
        if !self.partial.is_empty() {
            debug!(
                "transfer: restart discarding partial bytes={}",
                self.partial.len()
            );
        }
        self.partial.clear();
        self.state = AssemblyState::Assembling { next_index: 0 };
    }

    fn append(&mut self, text: &[u8]) -> Result<(), ReaderError> {
        let needed = self.partial.len().saturating_add(text.len());
        if needed > self.max_bytes || self.partial.try_reserve(text.len()).is_err() {
            warn!(
                "transfer: abort needed_bytes={} max_bytes={}",
                needed, self.max_bytes
            );
            self.partial = Vec::new();
            self.state = AssemblyState::Discarding;
            return Err(ReaderError::AllocationFailure);
        }

        self.partial.extend_from_slice(text);
        Ok(())
    }

    fn finalize(&mut self, recovered: bool) -> ChunkOutcome {
        let bytes = core::mem::take(&mut self.partial);
        info!("transfer: finalized bytes={}", bytes.len());
        self.state = AssemblyState::Finalized;
        ChunkOutcome::Finalized {
            document: Document::from_bytes(bytes),
            recovered,
        }
    }
}

impl Default for ChunkAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

/// Companion-side splitting: `chunk_bytes`-sized fragments, the last one flagged finished.
pub fn split_into_fragments(text: &[u8], chunk_bytes: usize) -> Vec<Fragment> {
    if text.is_empty() {
        return alloc::vec![Fragment::finished_marker()];
    }

    let chunk_bytes = if chunk_bytes == 0 {
        DEFAULT_CHUNK_BYTES
    } else {
        chunk_bytes
    };
    let total = text.len().div_ceil(chunk_bytes);

    text.chunks(chunk_bytes)
        .enumerate()
        .map(|(index, chunk)| Fragment {
            index: index as u32,
            text: chunk.to_vec(),
            finished: index + 1 == total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finalized_bytes(outcome: ChunkOutcome) -> Vec<u8> {
        match outcome {
            ChunkOutcome::Finalized { document, .. } => document.as_bytes().to_vec(),
            other => panic!("expected finalized document, got {other:?}"),
        }
    }

    #[test]
    fn fragments_are_joined_on_finish() {
        let mut assembler = ChunkAssembler::default();
        assert_eq!(
            assembler.push(&Fragment::new(0, "AB")),
            Ok(ChunkOutcome::Started { recovered: false })
        );
        assert_eq!(
            assembler.push(&Fragment::new(1, "CD")),
            Ok(ChunkOutcome::Appended)
        );

        let outcome = assembler.push(&Fragment::finished_marker()).unwrap();
        assert_eq!(finalized_bytes(outcome), b"ABCD");
        assert_eq!(assembler.state(), AssemblyState::Finalized);
    }

    #[test]
    fn index_zero_restarts_mid_transfer() {
        let mut assembler = ChunkAssembler::default();
        assembler.push(&Fragment::new(0, "old ")).unwrap();
        assembler.push(&Fragment::new(1, "text")).unwrap();

        assembler.push(&Fragment::new(0, "X")).unwrap();
        assert_eq!(assembler.partial_len(), 1);

        let outcome = assembler.push(&Fragment::finished_marker()).unwrap();
        assert_eq!(finalized_bytes(outcome), b"X");
    }

    #[test]
    fn index_zero_after_finalize_starts_new_document() {
        let mut assembler = ChunkAssembler::default();
        assembler.push(&Fragment::last(0, "first")).unwrap();

        let outcome = assembler.push(&Fragment::last(0, "X")).unwrap();
        assert_eq!(finalized_bytes(outcome), b"X");
    }

    #[test]
    fn last_fragment_carries_text_and_finish_flag() {
        let mut assembler = ChunkAssembler::default();
        assembler.push(&Fragment::new(0, "Hola ")).unwrap();
        let outcome = assembler.push(&Fragment::last(1, "mundo")).unwrap();
        assert_eq!(finalized_bytes(outcome), b"Hola mundo");
    }

    #[test]
    fn non_zero_first_fragment_starts_fresh_with_notice() {
        let mut assembler = ChunkAssembler::default();
        let outcome = assembler.push(&Fragment::new(3, "late")).unwrap();
        assert_eq!(outcome, ChunkOutcome::Started { recovered: true });
        assert_eq!(outcome.notice(), Some(ReaderError::OutOfRangeChunk));

        let outcome = assembler.push(&Fragment::last(4, "r")).unwrap();
        assert_eq!(outcome.notice(), None);
        assert_eq!(finalized_bytes(outcome), b"later");
    }

    #[test]
    fn out_of_order_fragments_are_appended_in_arrival_order() {
        let mut assembler = ChunkAssembler::default();
        assembler.push(&Fragment::new(0, "a")).unwrap();
        assembler.push(&Fragment::new(2, "c")).unwrap();
        assembler.push(&Fragment::new(1, "b")).unwrap();

        let outcome = assembler.push(&Fragment::finished_marker()).unwrap();
        assert_eq!(finalized_bytes(outcome), b"acb");
    }

    #[test]
    fn finished_marker_without_transfer_is_ignored() {
        let mut assembler = ChunkAssembler::default();
        assert_eq!(
            assembler.push(&Fragment::finished_marker()),
            Ok(ChunkOutcome::Ignored)
        );
        assert_eq!(assembler.state(), AssemblyState::Idle);
    }

    #[test]
    fn overflow_aborts_and_drops_rest_of_transfer() {
        let mut assembler = ChunkAssembler::new(6);
        assembler.push(&Fragment::new(0, "abcd")).unwrap();
        assert_eq!(
            assembler.push(&Fragment::new(1, "efgh")),
            Err(ReaderError::AllocationFailure)
        );
        assert_eq!(assembler.state(), AssemblyState::Discarding);
        assert_eq!(assembler.partial_len(), 0);

        assert_eq!(
            assembler.push(&Fragment::new(2, "ij")),
            Ok(ChunkOutcome::Dropped)
        );
        assert_eq!(
            assembler.push(&Fragment::finished_marker()),
            Ok(ChunkOutcome::Dropped)
        );
        assert_eq!(assembler.state(), AssemblyState::Idle);

        let outcome = assembler.push(&Fragment::last(0, "ok")).unwrap();
        assert_eq!(finalized_bytes(outcome), b"ok");
    }

    #[test]
    fn default_cap_accepts_a_document_of_exactly_max_blob_size() {
        let text = vec![b'a'; MAX_BLOB_BYTES];
        let mut assembler = ChunkAssembler::default();

        let mut last = None;
        for fragment in split_into_fragments(&text, DEFAULT_CHUNK_BYTES) {
            last = Some(assembler.push(&fragment).unwrap());
        }
        assert_eq!(finalized_bytes(last.unwrap()).len(), MAX_BLOB_BYTES);

        assert_eq!(
            assembler.push(&Fragment::last(0, vec![b'a'; MAX_BLOB_BYTES + 1])),
            Err(ReaderError::AllocationFailure)
        );
    }

    #[test]
    fn split_marks_only_the_last_fragment_finished() {
        let fragments = split_into_fragments(b"abcdefgh", 3);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], Fragment::new(0, "abc"));
        assert_eq!(fragments[1], Fragment::new(1, "def"));
        assert_eq!(fragments[2], Fragment::last(2, "gh"));

        assert_eq!(split_into_fragments(b"", 3), [Fragment::finished_marker()]);
    }

    #[test]
    fn split_then_push_rebuilds_text() {
        let text = "En un lugar de la Mancha, de cuyo nombre no quiero acordarme".as_bytes();
        let mut assembler = ChunkAssembler::default();
        let mut result = None;
        for fragment in split_into_fragments(text, 7) {
            if let ChunkOutcome::Finalized { document, .. } = assembler.push(&fragment).unwrap() {
                result = Some(document);
            }
        }
        assert_eq!(result.unwrap().as_bytes(), text);
    }
}
