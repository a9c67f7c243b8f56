/// A rendered line of one listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Line<L> {
    pub index: usize,
    pub element: L,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("line {line} is outside a listing of {len} lines")]
    OutOfBounds { line: usize, len: usize },
}

/// Zero-based ordering over the lines of one listing, built once.
///
/// Positions match the server's notion of line number for the listing. A
/// listing appended later by pagination gets its own index.
#[derive(Clone, Debug)]
pub struct LineIndex<L> {
    lines: Vec<Line<L>>,
}

impl<L> LineIndex<L> {
    pub fn build(elements: impl IntoIterator<Item = L>) -> Self {
        let lines = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| Line { index, element })
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn resolve(&self, n: usize) -> Result<&Line<L>, ResolveError> {
        self.lines.get(n).ok_or(ResolveError::OutOfBounds {
            line: n,
            len: self.lines.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line<L>> {
        self.lines.iter()
    }
}

impl<L: PartialEq> LineIndex<L> {
    /// Reverse lookup from a rendered element (e.g. the `li` that was clicked).
    pub fn position_of(&self, element: &L) -> Option<usize> {
        self.lines.iter().position(|l| &l.element == element)
    }
}
