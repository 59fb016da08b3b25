//! Operation paths: how to reach a sub-value from the comparison root.

use std::fmt;

/// One step into a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// Position in a list, tuple or byte string.
    Index(usize),
    /// Key of a mapping.
    Key(String),
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Index(i) => write!(f, "[{}]", i),
            Accessor::Key(k) => write!(f, "[{:?}]", k),
        }
    }
}

/// Ordered accessors from the root. The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OpPath(Vec<Accessor>);

impl OpPath {
    pub fn root() -> Self {
        OpPath::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.0
    }

    pub fn push(&mut self, accessor: Accessor) {
        self.0.push(accessor);
    }

    pub fn pop(&mut self) -> Option<Accessor> {
        self.0.pop()
    }

    /// A copy of this path extended by one accessor.
    pub fn child(&self, accessor: Accessor) -> Self {
        let mut path = self.clone();
        path.push(accessor);
        path
    }
}

impl fmt::Display for OpPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        for accessor in &self.0 {
            write!(f, "{}", accessor)?;
        }
        Ok(())
    }
}

impl FromIterator<Accessor> for OpPath {
    fn from_iter<I: IntoIterator<Item = Accessor>>(iter: I) -> Self {
        OpPath(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path: OpPath = [Accessor::Key("items".into()), Accessor::Index(2)]
            .into_iter()
            .collect();
        assert_eq!(path.to_string(), "[\"items\"][2]");
        assert_eq!(OpPath::root().to_string(), "<root>");
    }

    #[test]
    fn test_child_leaves_parent_untouched() {
        let parent = OpPath::root().child(Accessor::Key("a".into()));
        let child = parent.child(Accessor::Index(0));
        assert_eq!(parent.accessors().len(), 1);
        assert_eq!(child.accessors().len(), 2);
    }
}
