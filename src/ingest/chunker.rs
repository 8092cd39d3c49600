//! Fixed-size text chunking with overlap

/// A slice of a document ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Position of the chunk within its document
    pub index: u32,
    pub text: String,
}

/// Splits text into windows of `chunk_size` characters, consecutive windows
/// sharing `overlap` characters
///
/// Sizes are counted in `char`s, so multi-byte text is never split inside a
/// code point.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Returns `None` unless `0 < chunk_size` and `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Option<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return None;
        }
        Some(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0u32;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            let piece = text[boundaries[start]..boundaries[end]].trim();

            if !piece.is_empty() {
                chunks.push(TextChunk {
                    index,
                    text: piece.to_string(),
                });
                index += 1;
            }

            if end >= char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}
