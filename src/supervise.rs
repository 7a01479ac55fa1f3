//! Observing an external process to completion.

use crate::{
    accumulator::Accumulator,
    callback::{adapt, guard, Complete, OnceGuard, PendingFuture},
    process::ProcessHandle,
};
use std::{cell::RefCell, rc::Rc};

/// Outcome of a supervised process run that closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessResult {
    /// The exit code carried by the `close` event.
    pub exit_code: i32,
    /// Everything written to standard output, in arrival order.
    pub stdout: Vec<u8>,
    /// Everything written to standard error, in arrival order.
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    /// Tests whether the process exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Splits the result into exit code, standard output and standard error.
    pub fn into_parts(self) -> (i32, Vec<u8>, Vec<u8>) {
        (self.exit_code, self.stdout, self.stderr)
    }
}

#[derive(Debug, Default)]
struct Capture {
    stdout: Accumulator<Vec<u8>>,
    stderr: Accumulator<Vec<u8>>,
}

type Guarded<'cb, E> = OnceGuard<Complete<'cb, (ProcessResult,), E>, ()>;

fn watch<'cb, P>(
    mut process: P,
    complete: Complete<'cb, (ProcessResult,), P::Error>,
) where
    P: ProcessHandle<'cb>,
    P::Error: 'cb,
{
    let complete: Rc<Guarded<'cb, P::Error>> = Rc::new(guard(complete));
    let capture = Rc::new(RefCell::new(Capture::default()));

    process.on_stdout({
        let complete = complete.clone();
        let capture = capture.clone();
        Box::new(move |chunk| {
            if complete.has_fired() {
                tracing::trace!("ignoring stdout written after completion");
            } else {
                capture.borrow_mut().stdout.push(chunk);
            }
        })
    });

    process.on_stderr({
        let complete = complete.clone();
        let capture = capture.clone();
        Box::new(move |chunk| {
            if complete.has_fired() {
                tracing::trace!("ignoring stderr written after completion");
            } else {
                capture.borrow_mut().stderr.push(chunk);
            }
        })
    });

    process.on_error({
        let complete = complete.clone();
        let capture = capture.clone();
        Box::new(move |failure| {
            if complete.has_fired() {
                tracing::debug!("ignoring process error after completion");
                return;
            }
            let discarded = capture.replace(Capture::default());
            tracing::debug!(
                stdout_chunks = discarded.stdout.len(),
                stderr_chunks = discarded.stderr.len(),
                "process failed, discarding captured output"
            );
            complete.fire(Err(failure));
        })
    });

    process.on_close(Box::new(move |exit_code| {
        if complete.has_fired() {
            tracing::debug!(exit_code, "ignoring process close after completion");
            return;
        }
        let captured = capture.replace(Capture::default());
        let result = ProcessResult {
            exit_code,
            stdout: captured.stdout.concat(),
            stderr: captured.stderr.concat(),
        };
        tracing::debug!(
            exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "process closed"
        );
        complete.fire(Ok((result,)));
    }));
}

/// Observes `process` until its first terminal event and completes with the
/// exit code and captured output.
///
/// With a `complete` callback, the callback receives the outcome and `None`
/// is returned. Without one, a future for the [`ProcessResult`] is returned.
/// The result is the single success value on both protocols: the callback
/// receives `Ok((result,))` rather than the exit code and both outputs as
/// separate values, since a future only carries the first success value and
/// would otherwise lose the captured output. [`ProcessResult::into_parts`]
/// splits it back into the three values.
///
/// Standard output and standard error are buffered separately, each in its
/// own arrival order. The completion runs exactly once: whichever of `error`
/// and `close` is observed first decides the outcome, and the other is
/// ignored. On `error`, the buffered output is discarded.
///
/// # Examples
///
/// ```
/// use settle::{process::ProcessEmitter, supervise};
///
/// # futures::executor::block_on(async {
/// let process = ProcessEmitter::<String>::new();
/// let future = supervise(process.clone(), None).unwrap();
/// process.write_stdout("hello ");
/// process.write_stdout("world");
/// process.close(0);
/// process.fail("closed twice".to_owned());
///
/// let result = future.await.unwrap();
/// assert_eq!(result.exit_code, 0);
/// assert_eq!(result.stdout, b"hello world");
/// # });
/// ```
///
/// With a callback:
///
/// ```
/// use settle::{process::ProcessEmitter, supervise, Complete, ProcessResult};
///
/// let process = ProcessEmitter::<String>::new();
/// let complete: Complete<(ProcessResult,), String> =
///     Box::new(|result: Result<(ProcessResult,), String>| {
///         let (result,) = result.unwrap();
///         let (exit_code, stdout, stderr) = result.into_parts();
///         assert_eq!(exit_code, 2);
///         assert!(stdout.is_empty());
///         assert_eq!(stderr, b"usage: ls [path]");
///     });
/// supervise(process.clone(), Some(complete));
/// process.write_stderr("usage: ls [path]");
/// process.close(2);
/// ```
pub fn supervise<'cb, P>(
    process: P,
    complete: Option<Complete<'cb, (ProcessResult,), P::Error>>,
) -> Option<PendingFuture<ProcessResult, P::Error>>
where
    P: ProcessHandle<'cb>,
    P::Error: 'cb,
{
    adapt(watch::<P>).call(process, complete)
}
