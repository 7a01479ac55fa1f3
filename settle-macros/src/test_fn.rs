use crate::error;
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{spanned::Spanned, ItemFn};

/// Checks that `function` can be driven as an async test, reporting every
/// problem found.
pub fn validate(args: &TokenStream, function: &ItemFn) -> syn::Result<()> {
    let mut error_dump = error::Dump::new();

    if !args.is_empty() {
        error_dump.append(syn::Error::new(
            args.span(),
            "`#[settle::test]` takes no arguments",
        ));
    }

    if function.sig.asyncness.is_none() {
        error_dump.append(syn::Error::new(
            function.sig.fn_token.span(),
            "test function must be async, write `async fn`",
        ));
    }

    if !function.sig.inputs.is_empty() {
        error_dump.append(syn::Error::new(
            function.sig.inputs.span(),
            "test function cannot take parameters",
        ));
    }

    if !function.sig.generics.params.is_empty() {
        error_dump.append(syn::Error::new(
            function.sig.generics.span(),
            "test function cannot be generic",
        ));
    }

    error_dump.into_result()
}

/// Turns the async function into a synchronous `#[test]` blocking on its
/// body.
pub fn expand(function: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, mut sig, block } = function;
    sig.asyncness = None;
    let body = block.to_token_stream();

    quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis #sig {
            ::settle::futures::executor::block_on(async move #body)
        }
    }
}
