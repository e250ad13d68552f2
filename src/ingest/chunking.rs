//! Deterministic sliding-window chunker.
//!
//! The window is measured in characters, not bytes, so multi-byte text never
//! splits inside a UTF-8 sequence. Consecutive chunks overlap by a configured
//! number of characters; the cursor advances by `chunk_size - overlap`, which
//! is strictly positive and guarantees both termination and full coverage of
//! the input.

use super::types::ChunkingError;

/// A contiguous window of document text with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The substring covered by this window.
    pub text: String,
    /// Character offset of the window start within the document.
    pub start: usize,
    /// Ordinal position of this chunk within the document.
    pub index: usize,
}

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// Empty text yields an empty vector. Text shorter than `chunk_size` yields a
/// single chunk equal to the whole text. The final chunk may be shorter than
/// `chunk_size`; no padding is applied.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge {
            chunk_size,
            overlap,
        });
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every character boundary, with the text end appended so
    // that boundaries[i]..boundaries[j] always slices on valid boundaries.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    boundaries.push(text.len());
    let total_chars = boundaries.len() - 1;

    let step = chunk_size - overlap;
    let mut chunks = Vec::with_capacity(total_chars.div_ceil(step));
    let mut cursor = 0usize;

    loop {
        let end = (cursor + chunk_size).min(total_chars);
        chunks.push(Chunk {
            text: text[boundaries[cursor]..boundaries[end]].to_string(),
            start: cursor,
            index: chunks.len(),
        });
        if end == total_chars {
            break;
        }
        cursor += step;
    }

    Ok(chunks)
}
