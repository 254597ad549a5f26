//! Sweep tokens for flood fills and set membership tests.
//!
//! Each traversal asks for a fresh token and stamps the cells (or groups) it
//! visits. A cell counts as visited when its stamp equals the current token, so
//! no array ever has to be cleared between traversals. Three independent
//! stamp arrays exist because several searches nest: a group walk may tag
//! liberties while a region walk is still marking cells.
//!
//! A `Marks` belongs to one board instance or one classification run. Two runs
//! never share one.

#[derive(Clone, Debug, Default)]
pub struct Marks {
    counter: u32,
    cells: Vec<u32>,
    tags: Vec<u32>,
    groups: Vec<u32>,
}

impl Marks {
    pub fn new(area: usize) -> Self {
        Self {
            counter: 0,
            cells: vec![0; area],
            tags: vec![0; area],
            groups: Vec::new(),
        }
    }

    /// Returns a token that no stamp currently holds.
    pub fn fresh(&mut self) -> u32 {
        if self.counter == u32::MAX {
            // Wrapped: old stamps could collide with new tokens.
            self.cells.fill(0);
            self.tags.fill(0);
            self.groups.fill(0);
            self.counter = 0;
        }
        self.counter += 1;
        self.counter
    }

    /// Last token `p` was stamped with.
    pub fn cell(&self, p: usize) -> u32 {
        self.cells[p]
    }

    /// Stamps `p` and reports whether it was unstamped for this token.
    pub fn visit(&mut self, p: usize, token: u32) -> bool {
        if self.cells[p] == token {
            return false;
        }
        self.cells[p] = token;
        true
    }

    pub fn tag(&self, p: usize) -> u32 {
        self.tags[p]
    }

    pub fn set_tag(&mut self, p: usize, token: u32) {
        self.tags[p] = token;
    }

    /// Tags `p` and reports whether it was untagged for this token.
    pub fn tag_new(&mut self, p: usize, token: u32) -> bool {
        if self.tags[p] == token {
            return false;
        }
        self.tags[p] = token;
        true
    }

    /// Last token group `g` was stamped with, 0 if never.
    pub fn group(&self, g: usize) -> u32 {
        self.groups.get(g).copied().unwrap_or(0)
    }

    /// Stamps group `g`, growing the array as the arena grows.
    pub fn visit_group(&mut self, g: usize, token: u32) -> bool {
        if g >= self.groups.len() {
            self.groups.resize(g + 1, 0);
        }
        if self.groups[g] == token {
            return false;
        }
        self.groups[g] = token;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tokens_differ() {
        let mut marks = Marks::new(4);
        let a = marks.fresh();
        let b = marks.fresh();
        assert_ne!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn test_visit_once_per_token() {
        let mut marks = Marks::new(4);
        let t = marks.fresh();
        assert!(marks.visit(2, t));
        assert!(!marks.visit(2, t));
        let t2 = marks.fresh();
        assert!(marks.visit(2, t2));
    }

    #[test]
    fn test_tags_independent_of_cells() {
        let mut marks = Marks::new(4);
        let t = marks.fresh();
        marks.visit(1, t);
        assert!(marks.tag_new(1, t));
        assert!(!marks.tag_new(1, t));
        assert_eq!(marks.cell(1), t);
    }

    #[test]
    fn test_group_marks_grow() {
        let mut marks = Marks::new(1);
        let t = marks.fresh();
        assert_eq!(marks.group(10), 0);
        assert!(marks.visit_group(10, t));
        assert!(!marks.visit_group(10, t));
        assert_eq!(marks.group(10), t);
    }
}
