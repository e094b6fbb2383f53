//! Procedural macros for route-guards
//!
//! This crate provides the `#[route_guard]` attribute macro, which registers a
//! guard type in the compile-time guard registry.

use darling::{FromMeta, ast::NestedMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse_macro_input};

/// Arguments for the `#[route_guard]` attribute
#[derive(Debug, FromMeta)]
struct RouteGuardArgs {
    /// Logical guard file path (e.g., "routes/admin/-guard.rs")
    path: String,
    /// Optional: where to send requests this guard rejects
    #[darling(default)]
    redirect: Option<String>,
}

/// Register a guard type for a route.
///
/// The type must implement `Guard<Parts>`. Unit structs are used as is;
/// other structs are built with `Default::default()`.
///
/// # Example
///
/// ```ignore
/// #[route_guard(path = "routes/dashboard/-guard.rs", redirect = "/")]
/// pub struct DashboardGuard;
///
/// #[async_trait]
/// impl Guard<Parts> for DashboardGuard {
///     async fn check(&self, parts: &Parts) -> Result<bool, BoxError> {
///         Ok(parts.headers.contains_key("x-session"))
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn route_guard(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    let args = match RouteGuardArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    let input = parse_macro_input!(item as DeriveInput);
    let expanded = impl_route_guard(&args, &input);

    TokenStream::from(expanded)
}

fn impl_route_guard(args: &RouteGuardArgs, input: &DeriveInput) -> TokenStream2 {
    let struct_name = &input.ident;
    let path = &args.path;

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "route_guard does not support generics")
            .to_compile_error();
    }

    let construct = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Unit => quote! { #struct_name },
            _ => quote! { <#struct_name as ::core::default::Default>::default() },
        },
        _ => {
            return syn::Error::new_spanned(input, "route_guard only supports structs")
                .to_compile_error();
        }
    };

    let with_redirect = args.redirect.as_ref().map(|target| {
        quote! { .with_redirect(#target) }
    });

    let module_fn = format_ident!("__route_guard_module_{}", struct_name);

    quote! {
        #input

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #module_fn() -> ::route_guards::guard::GuardModule<::route_guards::http::Parts> {
            ::route_guards::guard::GuardModule::new(#construct) #with_redirect
        }

        ::route_guards::inventory::submit! {
            ::route_guards::http::GuardRegistration::new(#path, #module_fn)
        }
    }
}
