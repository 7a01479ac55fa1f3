//! This module implements the one-shot channel behind futures produced for
//! callers that did not pass a completion callback.

use std::{cell::Cell, fmt, future::Future, pin::Pin, rc::Rc, task};

/// An error that might happen when a [`PendingFuture`] settles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    /// The operation completed with a failure, carried verbatim.
    #[error("operation failed: {0}")]
    Failed(E),
    /// Every resolver was dropped before the operation completed.
    #[error("operation abandoned before completion")]
    Abandoned,
}

impl<E> Error<E> {
    /// Tests whether the operation itself failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Error::Failed(_))
    }

    /// Tests whether the operation was abandoned.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Abandoned)
    }

    /// Attempts to extract the failure the operation completed with.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Error::Failed(failure) => Some(failure),
            Error::Abandoned => None,
        }
    }
}

/// Creates a connected resolver and future pair.
///
/// The first call to [`Resolver::settle`] (through any clone) decides the
/// future's output; later calls are ignored.
///
/// # Examples
///
/// ```
/// use settle::callback::pending;
///
/// # futures::executor::block_on(async {
/// let (resolver, future) = pending::channel::<u32, String>();
/// assert!(resolver.resolve(42));
/// assert!(!resolver.reject("too late".to_owned()));
/// assert_eq!(future.await.unwrap(), 42);
/// # });
/// ```
pub fn channel<T, E>() -> (Resolver<T, E>, PendingFuture<T, E>) {
    let channel = Channel::init_connected();
    (Resolver::new(channel.clone()), PendingFuture::new(channel))
}

struct ChannelInner<T, E> {
    connected: Cell<bool>,
    settled: Cell<bool>,
    waker: Cell<Option<task::Waker>>,
    data: Cell<Option<Result<T, E>>>,
}

impl<T, E> fmt::Debug for ChannelInner<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        let waker = self.waker.take();
        let data = self.data.take();
        let result = fmtr
            .debug_struct("pending::Channel")
            .field("connected", &self.connected)
            .field("settled", &self.settled)
            .field("waker", &waker)
            .field("data", &data)
            .finish();
        self.waker.set(waker);
        self.data.set(data);
        result
    }
}

impl<T, E> ChannelInner<T, E> {
    fn init_connected() -> Self {
        Self {
            connected: Cell::new(true),
            settled: Cell::new(false),
            waker: Cell::new(None),
            data: Cell::new(None),
        }
    }
}

#[derive(Debug)]
struct Channel<T, E> {
    inner: Rc<ChannelInner<T, E>>,
}

impl<T, E> Channel<T, E> {
    fn init_connected() -> Self {
        Self { inner: Rc::new(ChannelInner::init_connected()) }
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.get()
    }

    fn disconnect(&self) -> bool {
        self.inner.connected.replace(false)
    }

    fn notify(&self) {
        if let Some(waker) = self.inner.waker.take() {
            waker.wake();
        }
    }
}

impl<T, E> Clone for Channel<T, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

/// The settling side of a [`PendingFuture`]. Cloning it yields another handle
/// to the same future; the first settlement through any handle wins.
#[derive(Debug)]
pub struct Resolver<T, E> {
    channel: Channel<T, E>,
}

impl<T, E> Resolver<T, E> {
    fn new(channel: Channel<T, E>) -> Self {
        Self { channel }
    }

    /// Settles the future with `result`. Returns whether this call settled it;
    /// `false` means an earlier call already did and `result` was discarded.
    pub fn settle(&self, result: Result<T, E>) -> bool {
        if self.channel.inner.settled.replace(true) {
            return false;
        }
        self.channel.inner.data.set(Some(result));
        self.channel.notify();
        true
    }

    /// Settles the future successfully with `data`.
    pub fn resolve(&self, data: T) -> bool {
        self.settle(Ok(data))
    }

    /// Settles the future with `failure`.
    pub fn reject(&self, failure: E) -> bool {
        self.settle(Err(failure))
    }

    /// Tests whether the future has already been settled.
    pub fn is_settled(&self) -> bool {
        self.channel.inner.settled.get()
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self { channel: self.channel.clone() }
    }
}

impl<T, E> Drop for Resolver<T, E> {
    fn drop(&mut self) {
        if Rc::strong_count(&self.channel.inner) <= 2 {
            self.channel.disconnect();
            self.channel.notify();
        }
    }
}

/// A future settled by a [`Resolver`], returned by adapted operations when no
/// completion callback was passed.
///
/// It outputs the operation's primary success value, [`Error::Failed`] with
/// the operation's failure, or [`Error::Abandoned`] when every resolver is
/// dropped unsettled. It stays pending for as long as a resolver is alive and
/// nothing settled it.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct PendingFuture<T, E> {
    channel: Channel<T, E>,
}

impl<T, E> PendingFuture<T, E> {
    fn new(channel: Channel<T, E>) -> Self {
        Self { channel }
    }

    fn receive(&self) -> Option<Result<T, Error<E>>> {
        match self.channel.inner.data.take() {
            Some(Ok(data)) => Some(Ok(data)),
            Some(Err(failure)) => Some(Err(Error::Failed(failure))),
            None if self.channel.inner.settled.get() => {
                panic!("PendingFuture polled after completion")
            },
            None if self.channel.is_connected() => None,
            None => Some(Err(Error::Abandoned)),
        }
    }

    fn subscribe(&self, waker: &task::Waker) {
        let mut stored = self.channel.inner.waker.take();
        match &stored {
            Some(current) if current.will_wake(waker) => (),
            _ => stored = Some(waker.clone()),
        }
        self.channel.inner.waker.set(stored);
    }
}

impl<T, E> Future for PendingFuture<T, E> {
    type Output = Result<T, Error<E>>;

    /// # Panics
    /// Panics if polled again after yielding its output.
    fn poll(
        self: Pin<&mut Self>,
        ctx: &mut task::Context<'_>,
    ) -> task::Poll<Self::Output> {
        match self.receive() {
            Some(output) => task::Poll::Ready(output),
            None => {
                self.subscribe(ctx.waker());
                task::Poll::Pending
            },
        }
    }
}

impl<T, E> Drop for PendingFuture<T, E> {
    fn drop(&mut self) {
        self.channel.disconnect();
    }
}
