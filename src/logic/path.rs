/// A dot-delimited relationship path, e.g. `lines.items`: traverse `lines`,
/// then for each result traverse `items`.
///
/// Parsing is total — every string, including the empty one, yields a head
/// and a (possibly empty) rest. The segment list is carried through the
/// whole duplication recursion; nested levels receive the rest as a slice
/// and never re-join it into a string.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationPath {
    segments: Vec<String>,
}

impl RelationPath {
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw.split('.').map(str::to_string).collect(),
        }
    }

    /// `(head, rest)`: the relationship to traverse now and the segments
    /// passed down to the next recursion level.
    pub fn split(&self) -> (&str, &[String]) {
        // split('.') always yields at least one segment
        (&self.segments[0], &self.segments[1..])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}
