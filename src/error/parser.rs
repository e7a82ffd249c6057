use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("unexpected end of descriptor at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("bad magic number {found:#010x}, not a compiled type descriptor")]
    BadMagic { found: u32 },

    #[error("unknown constant pool tag {tag} at offset {offset}")]
    UnknownConstantTag { tag: u8, offset: usize },

    #[error("constant pool index {index} is invalid or of the wrong kind (expected {expected})")]
    BadConstantIndex { index: u16, expected: &'static str },

    #[error("unknown annotation element tag '{tag}' at offset {offset}")]
    UnknownElementTag { tag: char, offset: usize },

    #[error("annotation values nested deeper than {limit} at offset {offset}")]
    NestingTooDeep { offset: usize, limit: usize },
}

impl ParserError {
    pub fn unexpected_eof(offset: usize, needed: usize) -> Self {
        Self::UnexpectedEof { offset, needed }
    }

    pub fn bad_constant_index(index: u16, expected: &'static str) -> Self {
        Self::BadConstantIndex { index, expected }
    }
}
