use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

/// Test attribute used across `rxcore`.
///
/// Sync tests expand to `#[test]`, async tests to `#[tokio::test]`. Both get a
/// `tracing-subscriber` test writer installed first so scheduler and subject
/// events show up under `RUST_LOG=rxcore=trace`.
///
/// `#[rxcore_macro::test(local)]` selects the current-thread tokio flavor and
/// `#[rxcore_macro::test(shared)]` the multi-thread flavor.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let tokio_args = if raw_args.is_empty() {
    proc_macro2::TokenStream::new()
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxcore_macro::test flavor args are only supported for async tests",
        )
        .to_compile_error(),
      );
    }

    let flavor = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      ident.to_string()
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      lit.value()
    } else {
      String::new()
    };

    match flavor.as_str() {
      "local" => quote!(flavor = "current_thread"),
      "shared" => quote!(flavor = "multi_thread"),
      _ => {
        return TokenStream::from(
          syn::Error::new(
            raw_args.span(),
            "rxcore_macro::test only accepts `local` or `shared` as flavor",
          )
          .to_compile_error(),
        );
      }
    }
  };

  let harness = match (is_async, tokio_args.is_empty()) {
    (false, _) => quote!(#[test]),
    (true, true) => quote!(#[tokio::test]),
    (true, false) => quote!(#[tokio::test(#tokio_args)]),
  };

  let ItemFn { attrs, vis, sig, block } = input;
  let expanded = quote! {
    #harness
    #(#attrs)*
    #vis #sig {
      let _ = ::tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(::tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
      #block
    }
  };

  TokenStream::from(expanded)
}
