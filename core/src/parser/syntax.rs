use core::ops::Range;

/// Byte range into program source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }

    /// Moves the span forward by `offset` bytes.
    pub fn shifted(&self, offset: usize) -> Span {
        Span::new(self.0.start + offset, self.0.end + offset)
    }

    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

/// Where an instruction came from in the program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Span of the instruction (address through last operand).
    pub span: Span,
    /// 1-based line number.
    pub line: usize,
}
