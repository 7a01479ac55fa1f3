//! Adapters that let a callback-based asynchronous operation complete through
//! either an error-first callback or a future, running its completion logic
//! at most once no matter how many event sources could trigger it.
//!
//! Everything in this crate is single-threaded: operations are driven by
//! whoever delivers the producer events, and futures are settled when the
//! terminal event arrives.
//!
//! # Examples
//!
//! ```
//! use settle::{bucket, producer::Emitter, Bucket, Item};
//!
//! # futures::executor::block_on(async {
//! let source = Emitter::<Item<()>, String>::new();
//! let future = bucket(source.clone(), None).unwrap();
//! source.data(Item::from("foo"));
//! source.data(Item::from("bar"));
//! source.end();
//! assert_eq!(future.await.unwrap(), Bucket::Text("foobar".into()));
//! # });
//! ```

#![warn(missing_docs)]
#![cfg_attr(feature = "feature-doc-cfg", feature(doc_cfg))]

#[doc(hidden)]
#[cfg(feature = "macros")]
pub use futures;

mod accumulator;

pub mod callback;

pub mod producer;

pub mod process;

mod bucket;

mod supervise;

#[cfg(feature = "stream")]
#[cfg_attr(feature = "feature-doc-cfg", doc(cfg(feature = "stream")))]
pub mod stream;

pub use accumulator::Accumulator;
pub use bucket::{bucket, Bucket, Item};
pub use callback::{adapt, guard, Complete, Error, PendingFuture};
pub use supervise::{supervise, ProcessResult};

#[cfg(feature = "macros")]
#[cfg_attr(feature = "feature-doc-cfg", doc(cfg(feature = "macros")))]
pub use settle_macros::test;
