mod common;

use settle::{
    process::ProcessEmitter,
    supervise,
    Accumulator,
    Complete,
    Error,
    ProcessResult,
};
use std::{cell::RefCell, rc::Rc};

type Outcomes = Rc<RefCell<Vec<Result<(ProcessResult,), String>>>>;

fn recording<'cb>(
    outcomes: &Outcomes,
) -> Complete<'cb, (ProcessResult,), String> {
    let outcomes = outcomes.clone();
    Box::new(move |result: Result<(ProcessResult,), String>| {
        outcomes.borrow_mut().push(result)
    })
}

#[settle::test]
async fn captures_output_until_close() {
    common::init_logging();
    let process = ProcessEmitter::<String>::new();
    let future = supervise(process.clone(), None).expect("no callback given");

    process.write_stdout("ok\n");
    process.write_stderr(b"warning: ".to_vec());
    process.write_stdout("done\n");
    process.write_stderr("deprecated flag\n");
    process.close(0);

    let result = future.await.expect("process closed");
    assert!(result.success());
    assert_eq!(
        result.into_parts(),
        (0, b"ok\ndone\n".to_vec(), b"warning: deprecated flag\n".to_vec())
    );
}

#[settle::test]
async fn close_without_output_is_empty() {
    let process = ProcessEmitter::<String>::new();
    let future = supervise(process.clone(), None).expect("no callback given");
    process.close(0);

    let result = future.await.expect("process closed");
    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());
}

#[settle::test]
async fn nonzero_exit_is_still_success() {
    let process = ProcessEmitter::<String>::new();
    let future = supervise(process.clone(), None).expect("no callback given");
    process.write_stderr("not found\n");
    process.close(127);

    let result = future.await.expect("process closed");
    assert!(!result.success());
    assert_eq!(result.exit_code, 127);
    assert_eq!(result.stderr, b"not found\n");
}

#[test]
fn error_then_close_completes_once_with_failure() {
    common::init_logging();
    let outcomes = Outcomes::default();
    let process = ProcessEmitter::<String>::new();
    assert!(supervise(process.clone(), Some(recording(&outcomes))).is_none());

    process.write_stdout("partial");
    process.fail("spawn ENOENT".to_owned());
    process.close(1);

    assert_eq!(*outcomes.borrow(), vec![Err("spawn ENOENT".to_owned())]);
}

#[test]
fn close_then_error_completes_once_with_result() {
    let outcomes = Outcomes::default();
    let process = ProcessEmitter::<String>::new();
    supervise(process.clone(), Some(recording(&outcomes)));

    process.write_stdout("hi");
    process.close(0);
    process.fail("late failure".to_owned());
    process.close(2);

    let expected = ProcessResult {
        exit_code: 0,
        stdout: b"hi".to_vec(),
        stderr: Vec::new(),
    };
    assert_eq!(*outcomes.borrow(), vec![Ok((expected,))]);
}

#[test]
fn callback_receives_result_as_single_value() {
    let outcomes = Outcomes::default();
    let process = ProcessEmitter::<String>::new();
    supervise(process.clone(), Some(recording(&outcomes)));

    process.write_stdout("out");
    process.write_stderr("err");
    process.close(3);

    let (result,) = outcomes.borrow_mut().remove(0).expect("process closed");
    assert_eq!(result.into_parts(), (3, b"out".to_vec(), b"err".to_vec()));
    assert!(outcomes.borrow().is_empty());
}

#[settle::test]
async fn future_rejects_on_error() {
    let process = ProcessEmitter::<String>::new();
    let future = supervise(process.clone(), None).expect("no callback given");
    process.fail("killed".to_owned());

    assert_eq!(future.await, Err(Error::Failed("killed".to_owned())));
}

#[settle::test]
async fn output_after_close_is_ignored() {
    let process = ProcessEmitter::<String>::new();
    let future = supervise(process.clone(), None).expect("no callback given");
    process.write_stdout("before");
    process.close(0);
    process.write_stdout("after");
    process.write_stderr("after");

    let result = future.await.expect("process closed");
    assert_eq!(result.stdout, b"before");
    assert!(result.stderr.is_empty());
}

#[settle::test]
async fn dropped_process_abandons_future() {
    let process = ProcessEmitter::<String>::new();
    let future = supervise(process, None).expect("no callback given");

    assert_eq!(future.await, Err(Error::Abandoned));
}

#[test]
fn accumulator_concatenates_in_order() {
    let mut chunks = Accumulator::new();
    assert!(chunks.is_empty());
    assert_eq!(chunks.concat(), Vec::<u8>::new());

    chunks.push(b"ab".to_vec());
    chunks.extend([b"c".to_vec(), Vec::new(), b"de".to_vec()]);
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks.concat(), b"abcde");
    assert_eq!(
        (&chunks).into_iter().map(Vec::len).collect::<Vec<_>>(),
        vec![2, 1, 0, 2]
    );
}
