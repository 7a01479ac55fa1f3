//! This module defines the observer interface of external processes, plus a
//! reference process driven by hand.
//!
//! A process exposes two output channels (standard output and standard error)
//! that only carry data, and two terminal events: `error` (e.g. the process
//! failed to start) and `close` (carrying the exit code). Unlike item
//! producers, a process may emit both terminal events for the same run.

use crate::producer::ObserverList;
use std::{fmt, rc::Rc};

/// The type of observers receiving output chunks.
pub type ChunkObserver<'cb> = Box<dyn FnMut(Vec<u8>) + 'cb>;

/// The type of observers receiving process failures.
pub type ErrorObserver<'cb, E> = Box<dyn FnMut(E) + 'cb>;

/// The type of observers receiving exit codes.
pub type CloseObserver<'cb> = Box<dyn FnMut(i32) + 'cb>;

/// An external process observed through events.
pub trait ProcessHandle<'cb> {
    /// Failures carried by the `error` event.
    type Error;

    /// Subscribes to chunks written to standard output.
    fn on_stdout(&mut self, observer: ChunkObserver<'cb>);

    /// Subscribes to chunks written to standard error.
    fn on_stderr(&mut self, observer: ChunkObserver<'cb>);

    /// Subscribes to the `error` event.
    fn on_error(&mut self, observer: ErrorObserver<'cb, Self::Error>);

    /// Subscribes to the `close` event.
    fn on_close(&mut self, observer: CloseObserver<'cb>);
}

struct Channels<'cb, E> {
    stdout: ObserverList<'cb, Vec<u8>>,
    stderr: ObserverList<'cb, Vec<u8>>,
    error: ObserverList<'cb, E>,
    close: ObserverList<'cb, i32>,
}

/// A process whose events are emitted by hand. Clones share observers, so one
/// clone can be handed to a supervisor while another emits.
///
/// Like [`Emitter`](crate::producer::Emitter), it does not enforce any event
/// order: a run may both fail and close, or write output after closing.
pub struct ProcessEmitter<'cb, E> {
    channels: Rc<Channels<'cb, E>>,
}

impl<'cb, E> fmt::Debug for ProcessEmitter<'cb, E> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("ProcessEmitter")
            .field("stdout_observers", &self.channels.stdout.len())
            .field("stderr_observers", &self.channels.stderr.len())
            .field("error_observers", &self.channels.error.len())
            .field("close_observers", &self.channels.close.len())
            .finish()
    }
}

impl<'cb, E> Default for ProcessEmitter<'cb, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cb, E> Clone for ProcessEmitter<'cb, E> {
    fn clone(&self) -> Self {
        Self { channels: self.channels.clone() }
    }
}

impl<'cb, E> ProcessEmitter<'cb, E> {
    /// Creates a process without observers.
    pub fn new() -> Self {
        Self {
            channels: Rc::new(Channels {
                stdout: ObserverList::new(),
                stderr: ObserverList::new(),
                error: ObserverList::new(),
                close: ObserverList::new(),
            }),
        }
    }

    /// Writes a chunk to standard output.
    pub fn write_stdout(&self, chunk: impl Into<Vec<u8>>) {
        self.channels.stdout.deliver(chunk.into());
    }

    /// Writes a chunk to standard error.
    pub fn write_stderr(&self, chunk: impl Into<Vec<u8>>) {
        self.channels.stderr.deliver(chunk.into());
    }

    /// Emits the `error` event.
    pub fn fail(&self, failure: E)
    where
        E: Clone,
    {
        self.channels.error.deliver(failure);
    }

    /// Emits the `close` event with the process' exit code.
    pub fn close(&self, exit_code: i32) {
        self.channels.close.deliver(exit_code);
    }
}

impl<'cb, E> ProcessHandle<'cb> for ProcessEmitter<'cb, E> {
    type Error = E;

    fn on_stdout(&mut self, observer: ChunkObserver<'cb>) {
        self.channels.stdout.push(observer);
    }

    fn on_stderr(&mut self, observer: ChunkObserver<'cb>) {
        self.channels.stderr.push(observer);
    }

    fn on_error(&mut self, observer: ErrorObserver<'cb, E>) {
        self.channels.error.push(observer);
    }

    fn on_close(&mut self, observer: CloseObserver<'cb>) {
        self.channels.close.push(observer);
    }
}
