use std::slice;

/// An ordered, append-only buffer of the items a producer emitted during one
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator<T> {
    items: Vec<T>,
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Accumulator<T> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an item after every item pushed so far.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Tests whether nothing was buffered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the buffered items in arrival order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the accumulator, yielding the items in arrival order.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Accumulator<T>
where
    T: AsRef<[u8]>,
{
    /// Joins every buffered chunk, in arrival order, into one byte sequence.
    pub fn concat(&self) -> Vec<u8> {
        let total = self.items.iter().map(|chunk| chunk.as_ref().len()).sum();
        let mut output = Vec::with_capacity(total);
        for chunk in &self.items {
            output.extend_from_slice(chunk.as_ref());
        }
        output
    }
}

impl<T> Extend<T> for Accumulator<T> {
    fn extend<I>(&mut self, iterable: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.extend(iterable);
    }
}

impl<'acc, T> IntoIterator for &'acc Accumulator<T> {
    type Item = &'acc T;
    type IntoIter = slice::Iter<'acc, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

