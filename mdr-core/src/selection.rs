//! Cursor and selection model

/// A cursor position in a document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A selection between an anchor and a cursor position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub cursor: Position,
}

impl Selection {
    /// Create an empty selection at a single position
    pub fn caret(position: Position) -> Self {
        Self {
            anchor: position,
            cursor: position,
        }
    }

    /// Get the selection as (start, end) in document order
    pub fn range(&self) -> (Position, Position) {
        if (self.anchor.line, self.anchor.character) <= (self.cursor.line, self.cursor.character) {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_forward_selection() {
        let sel = Selection {
            anchor: Position::new(5, 0),
            cursor: Position::new(10, 3),
        };
        assert_eq!(sel.range(), (Position::new(5, 0), Position::new(10, 3)));
    }

    #[test]
    fn test_range_backward_selection() {
        let sel = Selection {
            anchor: Position::new(10, 3),
            cursor: Position::new(5, 0),
        };
        assert_eq!(sel.range(), (Position::new(5, 0), Position::new(10, 3)));
    }

    #[test]
    fn test_range_same_line() {
        let sel = Selection {
            anchor: Position::new(2, 8),
            cursor: Position::new(2, 1),
        };
        assert_eq!(sel.range(), (Position::new(2, 1), Position::new(2, 8)));
    }

    #[test]
    fn test_caret_is_empty() {
        let sel = Selection::caret(Position::new(7, 7));
        assert!(sel.is_empty());
        assert_eq!(sel.range(), (Position::new(7, 7), Position::new(7, 7)));
    }
}
