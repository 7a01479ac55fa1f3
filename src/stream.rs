//! This module bridges producers and [`Stream`]s.
//!
//! # Examples
//!
//! ```
//! use futures::StreamExt;
//! use settle::{producer::Emitter, stream::into_stream};
//!
//! # futures::executor::block_on(async {
//! let source = Emitter::<u32, String>::new();
//! let events = into_stream(source.clone());
//! source.data(1);
//! source.data(2);
//! source.end();
//! source.data(3);
//!
//! let collected: Vec<_> = events.collect().await;
//! assert_eq!(collected, vec![Ok(1), Ok(2)]);
//! # });
//! ```

use crate::{
    accumulator::Accumulator,
    bucket::{Bucket, Item},
    producer::{Event, Producer},
};
use futures::{
    channel::mpsc,
    stream::{FusedStream, Stream, TryStream},
};
use pin_project::pin_project;
use std::{future::Future, pin::Pin, task};

/// Events of a producer as a [`Stream`]: every data item as `Ok`, a failure
/// as one final `Err`. The stream ends after the producer's terminal event.
#[pin_project]
#[derive(Debug)]
pub struct Events<T, E> {
    #[pin]
    receiver: mpsc::UnboundedReceiver<Result<T, E>>,
}

impl<T, E> Stream for Events<T, E> {
    type Item = Result<T, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        ctx: &mut task::Context<'_>,
    ) -> task::Poll<Option<Self::Item>> {
        self.project().receiver.poll_next(ctx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.receiver.size_hint()
    }
}

impl<T, E> FusedStream for Events<T, E> {
    fn is_terminated(&self) -> bool {
        self.receiver.is_terminated()
    }
}

/// Subscribes to `producer` and exposes its events as a [`Stream`].
///
/// Events are buffered without bound until polled. Events after the first
/// terminal one are ignored. If the producer is dropped without a terminal
/// event, the stream simply ends.
pub fn into_stream<'cb, P>(producer: P) -> Events<P::Item, P::Error>
where
    P: Producer<'cb>,
    P::Item: 'cb,
    P::Error: 'cb,
{
    let (sender, receiver) = mpsc::unbounded();
    producer.subscribe(Box::new(move |event| {
        if sender.is_closed() {
            tracing::trace!("ignoring event after end of stream");
            return;
        }
        let sent = match event {
            Event::Data(item) => sender.unbounded_send(Ok(item)),
            Event::Error(failure) => {
                let sent = sender.unbounded_send(Err(failure));
                sender.close_channel();
                sent
            },
            Event::End => {
                sender.close_channel();
                Ok(())
            },
        };
        if sent.is_err() {
            tracing::trace!("stream receiver dropped, discarding event");
        }
    }));
    Events { receiver }
}

/// Future returned by [`bucket_stream`].
#[pin_project]
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct BucketStream<S, V> {
    #[pin]
    stream: S,
    items: Option<Accumulator<Item<V>>>,
}

impl<S, V> Future for BucketStream<S, V>
where
    S: TryStream<Ok = Item<V>>,
{
    type Output = Result<Bucket<V>, S::Error>;

    /// # Panics
    /// Panics if polled again after yielding its output.
    fn poll(
        self: Pin<&mut Self>,
        ctx: &mut task::Context<'_>,
    ) -> task::Poll<Self::Output> {
        let mut this = self.project();
        loop {
            let items = match this.items.as_mut() {
                Some(items) => items,
                None => panic!("BucketStream polled after completion"),
            };
            match this.stream.as_mut().try_poll_next(ctx) {
                task::Poll::Pending => break task::Poll::Pending,
                task::Poll::Ready(Some(Ok(item))) => items.push(item),
                task::Poll::Ready(Some(Err(failure))) => {
                    this.items.take();
                    break task::Poll::Ready(Err(failure));
                },
                task::Poll::Ready(None) => {
                    let items = this.items.take().unwrap_or_default();
                    break task::Poll::Ready(Ok(Bucket::from_items(
                        items.into_items(),
                    )));
                },
            }
        }
    }
}

/// Drains a fallible stream of items into a [`Bucket`], with the same
/// classification as [`bucket`](crate::bucket). The first `Err` ends the
/// drain with that failure.
pub fn bucket_stream<S, V>(stream: S) -> BucketStream<S, V>
where
    S: TryStream<Ok = Item<V>>,
{
    BucketStream { stream, items: Some(Accumulator::new()) }
}
