// src/attempt/cursor.rs

/// Result of [`Cursor::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved to this index.
    Moved(usize),
    /// Already on the last question; the caller should grade the attempt.
    Complete,
}

/// Current question index within an ordered, non-empty question sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// Returns `None` for an empty sequence, which has no valid index.
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 {
            None
        } else {
            Some(Self { index: 0, len })
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    pub fn next(&mut self) -> Step {
        if self.is_last() {
            Step::Complete
        } else {
            self.index += 1;
            Step::Moved(self.index)
        }
    }

    /// Moves back one question, staying at 0 on the first one.
    pub fn previous(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }
}
