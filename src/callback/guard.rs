//! This module implements a guard that lets a function run only once, no
//! matter how many event sources call it.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;

/// Whether a [`OnceGuard`] has fired, plus the memoized result of its only
/// run.
#[derive(Debug)]
pub struct GuardState<R> {
    fired: Cell<bool>,
    running: Cell<bool>,
    result: RefCell<Option<R>>,
}

impl<R> GuardState<R> {
    fn init_unfired() -> Self {
        Self {
            fired: Cell::new(false),
            running: Cell::new(false),
            result: RefCell::new(None),
        }
    }

    /// Marks the state as fired. Returns whether it was already fired.
    fn mark_fired(&self) -> bool {
        self.fired.replace(true)
    }

    fn record(&self, result: R) {
        *self.result.borrow_mut() = Some(result);
    }
}

/// Clears the `running` flag when the first run returns or unwinds.
struct Running<'state>(&'state Cell<bool>);

impl<'state> Running<'state> {
    fn start(flag: &'state Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl<'state> Drop for Running<'state> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Wraps a function so that only its first invocation takes effect.
///
/// Arguments are passed as a single value; use a tuple for more than one.
///
/// # Examples
///
/// ```
/// use settle::guard;
///
/// let add = guard(|(a, b): (u32, u32)| a + b);
/// assert_eq!(add.call((1, 2)), 3);
/// assert_eq!(add.call((10, 20)), 3);
/// ```
pub fn guard<F, A, R>(function: F) -> OnceGuard<F, R>
where
    F: FnOnce(A) -> R,
{
    OnceGuard::new(function)
}

/// A function that runs at most once. See [`guard`].
pub struct OnceGuard<F, R> {
    function: Cell<Option<F>>,
    state: GuardState<R>,
}

impl<F, R> fmt::Debug for OnceGuard<F, R>
where
    R: fmt::Debug,
{
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("OnceGuard").field("state", &self.state).finish()
    }
}

impl<F, R> OnceGuard<F, R> {
    /// Wraps `function`, which has not fired yet.
    pub fn new(function: F) -> Self {
        Self {
            function: Cell::new(Some(function)),
            state: GuardState::init_unfired(),
        }
    }

    /// Tests whether the function already ran (or is running).
    pub fn has_fired(&self) -> bool {
        self.state.fired.get()
    }

    /// Borrows the memoized result, if the first run has returned.
    pub fn result(&self) -> Option<Ref<'_, R>> {
        Ref::filter_map(self.state.result.borrow(), Option::as_ref).ok()
    }

    /// Runs the function with `args` if this is the first invocation, and
    /// reports whether it did. Later invocations discard their arguments.
    ///
    /// The guard is marked as fired before the function runs, so an
    /// invocation from inside the function itself is also discarded.
    pub fn fire<A>(&self, args: A) -> bool
    where
        F: FnOnce(A) -> R,
    {
        if self.state.mark_fired() {
            return false;
        }
        match self.function.take() {
            Some(function) => {
                let result = {
                    let _running = Running::start(&self.state.running);
                    function(args)
                };
                self.state.record(result);
                true
            },
            None => false,
        }
    }

    /// Runs the function with `args` on the first invocation, then returns the
    /// result of that first run. `None` is returned when no result exists:
    /// when called from inside the running function, or after the first run
    /// panicked.
    pub fn try_call<A>(&self, args: A) -> Option<R>
    where
        F: FnOnce(A) -> R,
        R: Clone,
    {
        self.fire(args);
        self.state.result.borrow().clone()
    }

    /// Runs the function with `args` on the first invocation, then returns the
    /// result of that first run.
    ///
    /// # Panics
    /// Panics if called from inside the running function, since its result
    /// does not exist yet. Also panics if the first run panicked, since it
    /// never produced a result.
    pub fn call<A>(&self, args: A) -> R
    where
        F: FnOnce(A) -> R,
        R: Clone,
    {
        match self.try_call(args) {
            Some(result) => result,
            None if self.state.running.get() => panic!(
                "guarded function re-entered before its first run returned"
            ),
            None => {
                panic!("guarded function has no result, its first run panicked")
            },
        }
    }
}
