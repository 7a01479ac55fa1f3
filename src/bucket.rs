//! Draining an item producer into one aggregated result.

use crate::{
    accumulator::Accumulator,
    callback::{adapt, Complete, PendingFuture},
    producer::{Event, Producer},
};
use std::mem;

/// An item emitted by a producer drained with [`bucket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<V> {
    /// A textual chunk.
    Text(String),
    /// A binary chunk.
    Binary(Vec<u8>),
    /// Any other value.
    Value(V),
}

impl<V> From<String> for Item<V> {
    fn from(text: String) -> Self {
        Item::Text(text)
    }
}

impl<'text, V> From<&'text str> for Item<V> {
    fn from(text: &'text str) -> Self {
        Item::Text(text.to_owned())
    }
}

impl<V> From<Vec<u8>> for Item<V> {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Binary(bytes)
    }
}

impl<'bytes, V> From<&'bytes [u8]> for Item<V> {
    fn from(bytes: &'bytes [u8]) -> Self {
        Item::Binary(bytes.to_vec())
    }
}

/// The aggregated output of a drained producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket<V> {
    /// Every item was textual: their concatenation. Also the result of a
    /// producer that emitted nothing.
    Text(String),
    /// Every item was a chunk, at least one of them binary: the concatenation
    /// of their bytes, text contributing its UTF-8 encoding.
    Binary(Vec<u8>),
    /// Some item was not a chunk: every item, untouched, in emission order.
    Items(Vec<Item<V>>),
}

impl<V> Bucket<V> {
    /// Classifies and joins drained items.
    pub fn from_items(items: Vec<Item<V>>) -> Self {
        let mut has_binary = false;
        for item in &items {
            match item {
                Item::Text(_) => (),
                Item::Binary(_) => has_binary = true,
                Item::Value(_) => return Bucket::Items(items),
            }
        }

        if has_binary {
            let mut bytes = Vec::new();
            for item in items {
                match item {
                    Item::Text(text) => bytes.extend_from_slice(text.as_bytes()),
                    Item::Binary(chunk) => bytes.extend_from_slice(&chunk),
                    Item::Value(_) => (),
                }
            }
            Bucket::Binary(bytes)
        } else {
            let mut text = String::new();
            for item in items {
                if let Item::Text(chunk) = item {
                    text.push_str(&chunk);
                }
            }
            Bucket::Text(text)
        }
    }

    /// The concatenated text, if every item was textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Bucket::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The concatenated bytes, if every item was a chunk. Textual buckets
    /// yield their UTF-8 encoding.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Bucket::Text(text) => Some(text.as_bytes()),
            Bucket::Binary(bytes) => Some(bytes),
            Bucket::Items(_) => None,
        }
    }

    /// The raw items, if some item was not a chunk.
    pub fn into_items(self) -> Option<Vec<Item<V>>> {
        match self {
            Bucket::Items(items) => Some(items),
            _ => None,
        }
    }
}

impl<V> FromIterator<Item<V>> for Bucket<V> {
    fn from_iter<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = Item<V>>,
    {
        Self::from_items(iterable.into_iter().collect())
    }
}

enum Drain<'cb, V, E> {
    Running {
        items: Accumulator<Item<V>>,
        complete: Complete<'cb, (Bucket<V>,), E>,
    },
    Done,
}

impl<'cb, V, E> Drain<'cb, V, E> {
    fn handle(&mut self, event: Event<Item<V>, E>) {
        match (mem::replace(self, Drain::Done), event) {
            (Drain::Running { mut items, complete }, Event::Data(item)) => {
                items.push(item);
                *self = Drain::Running { items, complete };
            },
            (Drain::Running { items, complete }, Event::Error(failure)) => {
                tracing::debug!(
                    buffered = items.len(),
                    "producer failed, discarding buffered items"
                );
                complete(Err(failure));
            },
            (Drain::Running { items, complete }, Event::End) => {
                tracing::debug!(items = items.len(), "producer ended");
                complete(Ok((Bucket::from_items(items.into_items()),)));
            },
            (Drain::Done, event) => {
                tracing::trace!(
                    terminal = event.is_terminal(),
                    "ignoring event after completion"
                );
            },
        }
    }
}

fn drain<'cb, P, V>(
    producer: P,
    complete: Complete<'cb, (Bucket<V>,), P::Error>,
) where
    P: Producer<'cb, Item = Item<V>>,
    V: 'cb,
    P::Error: 'cb,
{
    tracing::trace!("draining producer");
    let mut state = Drain::Running { items: Accumulator::new(), complete };
    producer.subscribe(Box::new(move |event| state.handle(event)));
}

/// Fully drains `producer` and completes with the aggregated [`Bucket`].
///
/// With a `complete` callback, the callback receives the outcome and `None`
/// is returned. Without one, a future for the bucket is returned.
///
/// Items are kept in emission order. On [`Event::End`], textual items are
/// concatenated into [`Bucket::Text`], chunks with some binary one into
/// [`Bucket::Binary`], and anything else is returned as [`Bucket::Items`];
/// no items at all yield an empty [`Bucket::Text`]. On [`Event::Error`], the
/// operation fails with the producer's failure. Events following the terminal
/// one are ignored.
///
/// # Examples
///
/// ```
/// use settle::{bucket, producer::Emitter, Bucket, Complete, Item};
///
/// let source = Emitter::<Item<()>, String>::new();
/// let complete: Complete<(Bucket<()>,), String> =
///     Box::new(|result: Result<(Bucket<()>,), String>| {
///         assert_eq!(result, Ok((Bucket::Text("foobar".into()),)));
///     });
/// assert!(bucket(source.clone(), Some(complete)).is_none());
///
/// source.data(Item::from("foo"));
/// source.data(Item::from("bar"));
/// source.end();
/// ```
pub fn bucket<'cb, P, V>(
    producer: P,
    complete: Option<Complete<'cb, (Bucket<V>,), P::Error>>,
) -> Option<PendingFuture<Bucket<V>, P::Error>>
where
    P: Producer<'cb, Item = Item<V>>,
    V: 'cb,
    P::Error: 'cb,
{
    adapt(drain::<P, V>).call(producer, complete)
}
