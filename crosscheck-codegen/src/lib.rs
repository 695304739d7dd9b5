use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use quote::quote_spanned;

/// Turns `fn name(backend: &SimulatedBackend) { .. }` into a `#[test]` that starts a simulated
/// backend configured by the given function and stops it once the body returns or panics.
#[proc_macro_attribute]
pub fn simulated_backend_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    let signature = &input.sig;
    let block = &input.block;
    let attributes = &input.attrs;
    let test_name = &signature.ident;
    let inputs = &signature.inputs;

    if args.len() != 1 {
        return quote! {
            compile_error!("A backend configuration function should be passed to the macro");
        }
        .into();
    }

    let configuration_function;
    if let syn::NestedMeta::Meta(syn::Meta::Path(function_path)) = &args[0] {
        configuration_function = function_path;
    } else {
        return quote! {
            compile_error!("The argument should be a configuration function!");
        }
        .into();
    }

    if let Err(stream) = validate_signature(signature) {
        return stream.into();
    }

    let output = quote! {
        #[test]
        #(#attributes)*
        fn #test_name() {
            fn __crosscheck_test_body(#inputs) #block

            let mut __crosscheck_configuration = crosscheck::SimulatedBackendConfiguration::new();
            #configuration_function(&mut __crosscheck_configuration);

            let __crosscheck_backend =
                match crosscheck::SimulatedBackend::start(__crosscheck_configuration) {
                    Ok(backend) => backend,
                    Err(e) => panic!("Simulated backend error: {}", e),
                };

            __crosscheck_test_body(&__crosscheck_backend);
        }
    };

    TokenStream::from(output)
}

fn validate_signature(signature: &syn::Signature) -> Result<(), proc_macro2::TokenStream> {
    let span: Span = signature.ident.span();

    if signature.inputs.len() != 1 {
        return Err(quote_spanned! {span=>
            compile_error!("The test should take exactly one `&SimulatedBackend` argument!");
        });
    }

    if signature.asyncness.is_some() {
        return Err(quote_spanned! {span=>
            compile_error!("Async tests are not supported!");
        });
    }

    Ok(())
}
