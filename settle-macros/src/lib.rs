use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemFn};

mod error;
mod test_fn;

/// Marks an async function as a test, run to completion on a single-threaded
/// executor.
///
/// ```ignore
/// #[settle::test]
/// async fn resolves() {
///     let (resolver, future) = settle::callback::pending::channel::<u8, ()>();
///     resolver.resolve(1);
///     assert_eq!(future.await.unwrap(), 1);
/// }
/// ```
#[proc_macro_attribute]
pub fn test(raw_args: TokenStream, raw_input: TokenStream) -> TokenStream {
    let args = proc_macro2::TokenStream::from(raw_args);
    let function = parse_macro_input!(raw_input as ItemFn);

    match test_fn::validate(&args, &function) {
        Ok(()) => test_fn::expand(function).into(),
        Err(error) => error.into_compile_error().into(),
    }
}
