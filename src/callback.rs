//! This module defines the completion adapter: it turns an operation taking a
//! trailing error-first callback into one that callers may also await.

pub mod guard;
pub mod pending;

pub use guard::{guard, GuardState, OnceGuard};
pub use pending::{Error, PendingFuture, Resolver};

/// The type of completion callbacks: called once with either the success
/// values (as a tuple) or the failure.
pub type Complete<'cb, V, E> = Box<dyn FnOnce(Result<V, E>) + 'cb>;

/// Success values of an error-first callback, as a tuple. Futures only carry
/// the first of them, see [`Adapted::call_future`].
pub trait Values {
    /// The primary success value.
    type First;

    /// Drops everything but the primary success value.
    fn into_first(self) -> Self::First;
}

impl Values for () {
    type First = ();

    fn into_first(self) -> Self::First {}
}

macro_rules! tuple_values {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first $(, $rest)*> Values for ($first, $($rest,)*) {
            type First = $first;

            #[allow(non_snake_case, unused_variables)]
            fn into_first(self) -> Self::First {
                let ($first, $($rest,)*) = self;
                $first
            }
        }
    };
}

tuple_values!(T0);
tuple_values!(T0, T1);
tuple_values!(T0, T1, T2);
tuple_values!(T0, T1, T2, T3);
tuple_values!(T0, T1, T2, T3, T4);

/// Wraps an operation whose last parameter is a completion callback. See
/// [`Adapted`] for the ways it can then be called.
///
/// `op` receives its arguments as a single value; use a tuple for more than
/// one.
///
/// # Examples
///
/// ```
/// use settle::callback::{adapt, Complete};
///
/// fn divide((a, b): (i32, i32), complete: Complete<(i32, i32), String>) {
///     if b == 0 {
///         complete(Err("division by zero".to_owned()));
///     } else {
///         complete(Ok((a / b, a % b)));
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let divide = adapt(divide);
///
/// divide.call_with((7, 2), Box::new(|result: Result<(i32, i32), String>| {
///     assert_eq!(result, Ok((3, 1)));
/// }));
///
/// let quotient = divide.call_future((7, 2)).await;
/// assert_eq!(quotient, Ok(3));
/// # });
/// ```
pub fn adapt<'cb, F, A, V, E>(op: F) -> Adapted<F>
where
    F: Fn(A, Complete<'cb, V, E>),
{
    Adapted { op }
}

/// An operation adapted to complete through either a callback or a future.
#[derive(Debug, Clone, Copy)]
pub struct Adapted<F> {
    op: F,
}

impl<F> Adapted<F> {
    /// Unwraps the original operation.
    pub fn into_inner(self) -> F {
        self.op
    }

    /// Calls the operation with an explicit completion callback, unmodified.
    /// The callback is the only notification path; no future is created.
    ///
    /// A panic raised by the operation itself propagates to the caller.
    pub fn call_with<'cb, A, V, E>(
        &self,
        args: A,
        complete: Complete<'cb, V, E>,
    ) where
        F: Fn(A, Complete<'cb, V, E>),
    {
        tracing::trace!("adapted call completing through callback");
        (self.op)(args, complete);
    }

    /// Calls the operation with a synthesized completion callback and returns
    /// a future for its outcome right away.
    ///
    /// The future rejects with the failure, or resolves with only the
    /// **first** success value: an operation completing with `Ok((a, b))`
    /// resolves to `a`. Callers needing every value must pass a callback.
    ///
    /// A panic raised by the operation itself propagates to the caller
    /// instead of rejecting the future.
    pub fn call_future<'cb, A, V, E>(
        &self,
        args: A,
    ) -> PendingFuture<V::First, E>
    where
        F: Fn(A, Complete<'cb, V, E>),
        V: Values + 'cb,
        V::First: 'cb,
        E: 'cb,
    {
        tracing::trace!("adapted call completing through future");
        let (resolver, future) = pending::channel();
        let complete: Complete<'cb, V, E> = Box::new(move |result| {
            resolver.settle(result.map(Values::into_first));
        });
        (self.op)(args, complete);
        future
    }

    /// Calls the operation, deciding the completion protocol from `complete`:
    /// `Some` callback behaves as [`Adapted::call_with`] and returns `None`;
    /// no callback behaves as [`Adapted::call_future`] and returns the future.
    pub fn call<'cb, A, V, E>(
        &self,
        args: A,
        complete: Option<Complete<'cb, V, E>>,
    ) -> Option<PendingFuture<V::First, E>>
    where
        F: Fn(A, Complete<'cb, V, E>),
        V: Values + 'cb,
        V::First: 'cb,
        E: 'cb,
    {
        match complete {
            Some(complete) => {
                self.call_with(args, complete);
                None
            },
            None => Some(self.call_future(args)),
        }
    }
}
