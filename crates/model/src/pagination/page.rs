use crate::pagination::cursor::Cursor;

/// One page of a remote collection plus the cursor of the page after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, next: Option<Cursor>) -> Self {
        Page { rows, next }
    }

    /// A page with no successor.
    pub fn last(rows: Vec<T>) -> Self {
        Page { rows, next: None }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            next: self.next,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}
