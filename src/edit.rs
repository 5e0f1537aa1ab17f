use crate::span::ByteSpan;
use thiserror::Error;
use tree_sitter::{InputEdit, Point};

/// Offset-only description of one replacement, expressed against the
/// document *before* the edit.
///
/// This is what the anchor tracker consumes: it never needs the inserted
/// text, only how many bytes went in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
    /// Byte length of the text that replaced `[start, end)`
    pub inserted_len: usize,
}

impl TextEdit {
    pub fn new(start: usize, end: usize, inserted_len: usize) -> Self {
        Self {
            start,
            end,
            inserted_len,
        }
    }

    pub fn deleted_len(&self) -> usize {
        self.end - self.start
    }

    /// Net change in document length caused by this edit.
    pub fn delta(&self) -> isize {
        self.inserted_len as isize - self.deleted_len() as isize
    }
}

/// The edit primitive the command layer produces: byte-span replacement.
///
/// All structural operations (wrap, unwrap, swap, delete, insert) compile
/// down to batches of these.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Replacement does nothing until applied"]
pub struct Replacement {
    pub byte_start: usize,
    pub byte_end: usize,
    pub new_text: String,
}

impl Replacement {
    pub fn new(byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
        }
    }

    pub fn replace(span: ByteSpan, new_text: impl Into<String>) -> Self {
        Self::new(span.start, span.end, new_text)
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    pub fn delete(span: ByteSpan) -> Self {
        Self::new(span.start, span.end, String::new())
    }

    pub fn span(&self) -> ByteSpan {
        ByteSpan::new(self.byte_start, self.byte_end)
    }

    pub fn text_edit(&self) -> TextEdit {
        TextEdit::new(self.byte_start, self.byte_end, self.new_text.len())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("Invalid byte range: [{byte_start}, {byte_end}) in document of length {doc_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        doc_len: usize,
    },

    #[error("Overlapping edits: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Byte offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

/// Result of splicing a batch of replacements into a document.
#[derive(Debug, Clone)]
pub struct AppliedBatch {
    /// Document text after every replacement
    pub text: String,
    /// Offset edits, in the order they were spliced (descending start)
    pub text_edits: Vec<TextEdit>,
    /// The same edits with row/column points, ready for `Tree::edit`
    pub input_edits: Vec<InputEdit>,
}

/// Apply a batch of non-overlapping replacements to `text`.
///
/// Every replacement is expressed against the original text. They are
/// spliced bottom-to-top so earlier offsets stay valid, and the returned
/// edit lists follow that same order, which is also the order a tree must
/// be edited in before an incremental reparse.
pub fn apply_replacements(
    text: &str,
    replacements: &[Replacement],
) -> Result<AppliedBatch, EditError> {
    for replacement in replacements {
        validate(text, replacement)?;
    }

    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by(|a, b| {
        b.byte_start
            .cmp(&a.byte_start)
            .then(b.byte_end.cmp(&a.byte_end))
    });

    // Sorted descending: for disjoint regions the lower edit ends at or
    // before the higher one starts.
    for window in ordered.windows(2) {
        let (later, earlier) = (window[0], window[1]);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::Overlap {
                first_start: earlier.byte_start,
                first_end: earlier.byte_end,
                second_start: later.byte_start,
                second_end: later.byte_end,
            });
        }
    }

    let mut new_text = text.to_string();
    let mut text_edits = Vec::with_capacity(ordered.len());
    let mut input_edits = Vec::with_capacity(ordered.len());

    for replacement in ordered {
        // Everything before byte_end is untouched by the edits already
        // spliced, so points computed on the original text are still valid.
        let start_position = point_at(text, replacement.byte_start);
        let old_end_position = point_at(text, replacement.byte_end);
        let new_end_position = advance(start_position, &replacement.new_text);

        input_edits.push(InputEdit {
            start_byte: replacement.byte_start,
            old_end_byte: replacement.byte_end,
            new_end_byte: replacement.byte_start + replacement.new_text.len(),
            start_position,
            old_end_position,
            new_end_position,
        });
        text_edits.push(replacement.text_edit());

        new_text.replace_range(replacement.byte_start..replacement.byte_end, &replacement.new_text);
    }

    Ok(AppliedBatch {
        text: new_text,
        text_edits,
        input_edits,
    })
}

fn validate(text: &str, replacement: &Replacement) -> Result<(), EditError> {
    if replacement.byte_start > replacement.byte_end || replacement.byte_end > text.len() {
        return Err(EditError::InvalidByteRange {
            byte_start: replacement.byte_start,
            byte_end: replacement.byte_end,
            doc_len: text.len(),
        });
    }

    for offset in [replacement.byte_start, replacement.byte_end] {
        if !text.is_char_boundary(offset) {
            return Err(EditError::NotCharBoundary { offset });
        }
    }

    Ok(())
}

/// Row/column (in bytes) of a byte offset.
pub fn point_at(text: &str, offset: usize) -> Point {
    let prefix = &text.as_bytes()[..offset.min(text.len())];
    match prefix.iter().rposition(|&b| b == b'\n') {
        Some(newline) => Point {
            row: prefix.iter().filter(|&&b| b == b'\n').count(),
            column: prefix.len() - newline - 1,
        },
        None => Point {
            row: 0,
            column: prefix.len(),
        },
    }
}

/// Point reached after writing `inserted` starting at `start`.
pub fn advance(start: Point, inserted: &str) -> Point {
    match inserted.rfind('\n') {
        Some(last_newline) => Point {
            row: start.row + inserted.matches('\n').count(),
            column: inserted.len() - last_newline - 1,
        },
        None => Point {
            row: start.row,
            column: start.column + inserted.len(),
        },
    }
}
