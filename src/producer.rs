//! This module defines the observer interface of item producers, plus a
//! reference producer driven by hand.
//!
//! A well-behaved producer emits [`Event::Data`] any number of times, then at
//! most one terminal event: [`Event::Error`] or [`Event::End`].

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    mem,
    rc::Rc,
};

/// An event emitted by an item producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T, E> {
    /// One emitted item.
    Data(T),
    /// The producer failed. Terminal.
    Error(E),
    /// The producer finished. Terminal.
    End,
}

impl<T, E> Event<T, E> {
    /// Tests whether this event ends the producer's output.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Data(_))
    }
}

/// The type of observers subscribed to producers.
pub type Observer<'cb, T, E> = Box<dyn FnMut(Event<T, E>) + 'cb>;

/// A source of [`Event`]s which delivers them to subscribed observers.
pub trait Producer<'cb> {
    /// Items carried by [`Event::Data`].
    type Item;
    /// Failures carried by [`Event::Error`].
    type Error;

    /// Subscribes an observer to every event emitted from now on.
    fn subscribe(self, observer: Observer<'cb, Self::Item, Self::Error>);
}

type BoxedObserver<'cb, X> = Box<dyn FnMut(X) + 'cb>;

/// Observers of one kind of event, delivered in subscription order.
///
/// Values delivered while a delivery is running are queued and reach every
/// observer once the running one finishes, in delivery order.
pub(crate) struct ObserverList<'cb, X> {
    list: RefCell<Vec<BoxedObserver<'cb, X>>>,
    queue: RefCell<VecDeque<X>>,
    delivering: Cell<bool>,
}

impl<'cb, X> ObserverList<'cb, X> {
    pub(crate) fn new() -> Self {
        Self {
            list: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            delivering: Cell::new(false),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub(crate) fn push(&self, observer: BoxedObserver<'cb, X>) {
        self.list.borrow_mut().push(observer);
    }

    fn next_queued(&self) -> Option<X> {
        self.queue.borrow_mut().pop_front()
    }

    /// Delivers `value` to every observer. Observers subscribed during the
    /// delivery are kept, after the existing ones, but do not receive `value`.
    /// A panicking observer keeps every subscription in place.
    pub(crate) fn deliver(&self, value: X)
    where
        X: Clone,
    {
        self.queue.borrow_mut().push_back(value);
        if self.delivering.replace(true) {
            return;
        }

        let mut delivery = Delivery { observers: self, taken: Vec::new() };
        while let Some(value) = self.next_queued() {
            delivery.taken = mem::take(&mut *self.list.borrow_mut());
            if let Some((last, init)) = delivery.taken.split_last_mut() {
                for observer in init {
                    observer(value.clone());
                }
                last(value);
            }
            delivery.restore();
        }
    }
}

/// Observers taken out of an [`ObserverList`] for one delivery. They go back
/// into the list even if an observer panics.
struct Delivery<'list, 'cb, X> {
    observers: &'list ObserverList<'cb, X>,
    taken: Vec<BoxedObserver<'cb, X>>,
}

impl<'list, 'cb, X> Delivery<'list, 'cb, X> {
    fn restore(&mut self) {
        let taken = mem::take(&mut self.taken);
        let mut list = self.observers.list.borrow_mut();
        let subscribed_meanwhile = mem::replace(&mut *list, taken);
        list.extend(subscribed_meanwhile);
    }
}

impl<'list, 'cb, X> Drop for Delivery<'list, 'cb, X> {
    fn drop(&mut self) {
        self.restore();
        self.observers.delivering.set(false);
    }
}

/// A producer whose events are emitted by hand. Clones share observers, so
/// one clone can be handed to a consumer while another emits.
///
/// Events go to every observer in subscription order. An event emitted by an
/// observer is delivered to everyone after the current event. An observer
/// subscribed while an event is being delivered receives events from the next
/// one on.
/// The emitter does not enforce the producer contract: it will happily emit
/// data after the end, or several terminal events.
pub struct Emitter<'cb, T, E> {
    observers: Rc<ObserverList<'cb, Event<T, E>>>,
}

impl<'cb, T, E> fmt::Debug for Emitter<'cb, T, E> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        fmtr.debug_struct("Emitter")
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl<'cb, T, E> Default for Emitter<'cb, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cb, T, E> Clone for Emitter<'cb, T, E> {
    fn clone(&self) -> Self {
        Self { observers: self.observers.clone() }
    }
}

impl<'cb, T, E> Emitter<'cb, T, E> {
    /// Creates an emitter without observers.
    pub fn new() -> Self {
        Self { observers: Rc::new(ObserverList::new()) }
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Delivers `event` to every observer.
    pub fn emit(&self, event: Event<T, E>)
    where
        T: Clone,
        E: Clone,
    {
        self.observers.deliver(event);
    }

    /// Emits one item.
    pub fn data(&self, item: T)
    where
        T: Clone,
        E: Clone,
    {
        self.emit(Event::Data(item));
    }

    /// Emits a failure.
    pub fn error(&self, failure: E)
    where
        T: Clone,
        E: Clone,
    {
        self.emit(Event::Error(failure));
    }

    /// Emits the end of the output.
    pub fn end(&self)
    where
        T: Clone,
        E: Clone,
    {
        self.emit(Event::End);
    }
}

impl<'cb, T, E> Producer<'cb> for Emitter<'cb, T, E> {
    type Item = T;
    type Error = E;

    fn subscribe(self, observer: Observer<'cb, T, E>) {
        self.observers.push(observer);
    }
}
