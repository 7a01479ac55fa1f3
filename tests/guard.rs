use settle::callback::{guard, OnceGuard};
use std::{
    cell::{Cell, RefCell},
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

#[test]
fn runs_only_on_first_call() {
    let calls = Cell::new(0);
    let counted = guard(|()| {
        calls.set(calls.get() + 1);
        calls.get()
    });

    assert_eq!(counted.call(()), 1);
    assert_eq!(counted.call(()), 1);
    assert_eq!(counted.call(()), 1);
    assert_eq!(calls.get(), 1);
}

#[test]
fn later_arguments_are_discarded() {
    let add = guard(|(a, b): (u32, u32)| a + b);
    assert!(!add.has_fired());
    assert_eq!(add.call((1, 2)), 3);
    assert!(add.has_fired());
    assert_eq!(add.call((100, 200)), 3);
    assert_eq!(add.try_call((5, 5)), Some(3));
    assert_eq!(add.result().as_deref(), Some(&3));
}

#[test]
fn fire_reports_whether_it_ran() {
    let seen = RefCell::new(Vec::new());
    let record = guard(|value: &'static str| seen.borrow_mut().push(value));

    assert!(record.fire("error"));
    assert!(!record.fire("close"));
    assert!(!record.fire("close"));
    assert_eq!(*seen.borrow(), vec!["error"]);
}

#[test]
fn shared_between_event_sources() {
    let outcome = Rc::new(RefCell::new(Vec::new()));
    let complete = Rc::new(guard({
        let outcome = outcome.clone();
        move |result: Result<i32, String>| outcome.borrow_mut().push(result)
    }));

    let on_error = {
        let complete = complete.clone();
        move |failure: String| complete.fire(Err(failure))
    };
    let on_close = {
        let complete = complete.clone();
        move |code: i32| complete.fire(Ok(code))
    };

    assert!(on_close(0));
    assert!(!on_error("spawn failed".to_owned()));
    assert!(!on_close(1));
    assert_eq!(*outcome.borrow(), vec![Ok(0)]);
}

type Reentrant = OnceGuard<Box<dyn FnOnce(u32) -> u32>, u32>;

fn reentrant_guard(inspect: impl FnOnce(&Reentrant) + 'static) -> Rc<Reentrant> {
    let slot: Rc<RefCell<Option<Rc<Reentrant>>>> = Rc::new(RefCell::new(None));
    let function: Box<dyn FnOnce(u32) -> u32> = Box::new({
        let slot = slot.clone();
        move |value| {
            let inner = slot.borrow().clone();
            if let Some(inner) = inner {
                inspect(&inner);
            }
            value + 1
        }
    });
    let guarded = Rc::new(OnceGuard::new(function));
    *slot.borrow_mut() = Some(guarded.clone());
    guarded
}

#[test]
fn reentrant_call_does_not_run_twice() {
    let guarded = reentrant_guard(|inner| {
        assert!(inner.has_fired());
        assert!(!inner.fire(10));
        assert_eq!(inner.try_call(20), None);
    });

    assert_eq!(guarded.call(1), 2);
    assert_eq!(guarded.call(5), 2);
}

#[test]
#[should_panic(expected = "re-entered")]
fn reentrant_call_panics() {
    let guarded = reentrant_guard(|inner| {
        inner.call(10);
    });
    guarded.call(1);
}

#[test]
#[should_panic(expected = "its first run panicked")]
fn call_after_panicked_run_reports_the_panic() {
    let explosive = guard(|(): ()| -> u32 { panic!("boom") });

    let first = panic::catch_unwind(AssertUnwindSafe(|| explosive.call(())));
    assert!(first.is_err());
    assert!(explosive.has_fired());
    assert_eq!(explosive.try_call(()), None);
    assert!(explosive.result().is_none());

    explosive.call(());
}
