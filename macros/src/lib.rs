//! Derive macros for reducer-kit
//!
//! Writing a `Lens` or `CasePath` by hand is two closures of pure
//! boilerplate per field or variant. These derives generate them.
//!
//! # Available Macros
//!
//! - `#[derive(Lenses)]` - One `<field>_lens()` constructor per struct field
//! - `#[derive(CasePaths)]` - One `<variant>_case()` constructor per enum variant
//!
//! # Example
//!
//! ```ignore
//! use reducer_kit_macros::{CasePaths, Lenses};
//!
//! #[derive(Lenses, Clone, Debug)]
//! struct AppState {
//!     count: i64,
//!     favorite_primes: Vec<i64>,
//! }
//!
//! #[derive(CasePaths, Clone, Debug)]
//! enum AppAction {
//!     Counter(CounterAction),
//!     FavoritePrimes(FavoritePrimesAction),
//! }
//!
//! let reducer = favorite_primes_reducer().pullback(
//!     AppState::favorite_primes_lens(),
//!     AppAction::favorite_primes_case(),
//!     |_env: &AppEnvironment| (),
//! );
//! ```
//!
//! Generated code names `::reducer_kit_core`, so the deriving crate must
//! depend on it directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Error, Fields, Generics, Ident, parse_macro_input, parse_quote};

/// Derive macro for state structs
///
/// Generates an associated function `<field>_lens()` returning a
/// `reducer_kit_core::Lens<Self, FieldType>` for every named field. Reading
/// through the lens clones the field, so field types must be `Clone`.
///
/// # Attributes
///
/// - `#[lens(skip)]` - Generate nothing for this field
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to an enum, a union, or a tuple struct
/// - The struct has lifetime parameters
///
/// # Example
///
/// ```ignore
/// #[derive(Lenses, Clone, Debug, PartialEq)]
/// struct CounterViewState {
///     count: i64,
///     favorite_primes: Vec<i64>,
///     #[lens(skip)]
///     scratch: String,
/// }
///
/// let lens = CounterViewState::count_lens();
/// ```
#[proc_macro_derive(Lenses, attributes(lens))]
pub fn derive_lenses(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_lenses(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Derive macro for action enums
///
/// Generates an associated function `<variant_in_snake_case>_case()`
/// returning a `reducer_kit_core::CasePath<Self, Payload>` for every
/// variant. The payload is:
///
/// - `()` for a unit variant
/// - the field type for a variant with exactly one field
/// - a tuple of the field types, in declaration order, otherwise
///
/// # Attributes
///
/// - `#[case(skip)]` - Generate nothing for this variant
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to a struct or a union
/// - The enum has lifetime parameters
///
/// # Example
///
/// ```ignore
/// #[derive(CasePaths, Clone, Debug)]
/// enum CounterViewAction {
///     Counter(CounterAction),
///     PrimeModal(PrimeModalAction),
/// }
///
/// let case = CounterViewAction::prime_modal_case();
/// assert!(case.extract(CounterViewAction::Counter(CounterAction::Incr)).is_none());
/// ```
#[proc_macro_derive(CasePaths, attributes(case))]
pub fn derive_case_paths(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_case_paths(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_lenses(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return Err(Error::new_spanned(name, "#[derive(Lenses)] can only be used on structs"));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(Error::new_spanned(
            name,
            "#[derive(Lenses)] requires a struct with named fields",
        ));
    };

    let generics = static_generics(&input.generics)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut accessors = Vec::new();
    for field in &fields.named {
        if is_skipped(&field.attrs, "lens")? {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        let plain = unraw(ident);
        let method = format_ident!("{plain}_lens");
        let doc = format!("Lens focusing on `{plain}`");

        accessors.push(quote! {
            #[doc = #doc]
            #[must_use]
            pub fn #method() -> ::reducer_kit_core::Lens<Self, #ty>
            where
                #ty: ::core::clone::Clone,
            {
                ::reducer_kit_core::Lens::new(
                    |root: &Self| ::core::clone::Clone::clone(&root.#ident),
                    |root: &mut Self, value: #ty| root.#ident = value,
                )
            }
        });
    }

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            #(#accessors)*
        }
    })
}

fn expand_case_paths(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(Error::new_spanned(name, "#[derive(CasePaths)] can only be used on enums"));
    };

    let generics = static_generics(&input.generics)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut accessors = Vec::new();
    for variant in &data_enum.variants {
        if is_skipped(&variant.attrs, "case")? {
            continue;
        }
        let variant_name = &variant.ident;
        let method = format_ident!("{}_case", snake_case(&unraw(variant_name)));
        let doc = format!("Case path into `{name}::{variant_name}`");

        let types: Vec<_> = variant.fields.iter().map(|f| &f.ty).collect();
        let bindings: Vec<Ident> = variant
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| f.ident.clone().unwrap_or_else(|| format_ident!("field_{i}")))
            .collect();

        let pattern = match &variant.fields {
            Fields::Unit => quote! { Self::#variant_name },
            Fields::Unnamed(_) => quote! { Self::#variant_name(#(#bindings),*) },
            Fields::Named(_) => quote! { Self::#variant_name { #(#bindings),* } },
        };

        // The payload expression doubles as the embed closure's pattern
        let (payload_ty, payload) = match types.as_slice() {
            [] => (quote! { () }, quote! { () }),
            [single] => {
                let binding = &bindings[0];
                (quote! { #single }, quote! { #binding })
            },
            _ => (quote! { (#(#types),*) }, quote! { (#(#bindings),*) }),
        };

        accessors.push(quote! {
            #[doc = #doc]
            #[must_use]
            #[allow(unreachable_patterns, clippy::match_wildcard_for_single_variants)]
            pub fn #method() -> ::reducer_kit_core::CasePath<Self, #payload_ty> {
                ::reducer_kit_core::CasePath::new(
                    |root: Self| match root {
                        #pattern => ::core::option::Option::Some(#payload),
                        _ => ::core::option::Option::None,
                    },
                    |#payload: #payload_ty| #pattern,
                )
            }
        });
    }

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            #(#accessors)*
        }
    })
}

/// Lens and case path closures must be `'static`, so every type parameter is too
fn static_generics(generics: &Generics) -> syn::Result<Generics> {
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(Error::new_spanned(
            lifetime,
            "lenses and case paths cannot borrow; remove the lifetime parameter",
        ));
    }

    let mut generics = generics.clone();
    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        where_clause.predicates.push(parse_quote!(#param: 'static));
    }
    Ok(generics)
}

/// Whether `attrs` holds `#[<name>(skip)]`
fn is_skipped(attrs: &[Attribute], name: &str) -> syn::Result<bool> {
    let mut skipped = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skipped = true;
                Ok(())
            } else {
                Err(meta.error(format!("unsupported #[{name}] option, expected `skip`")))
            }
        })?;
    }
    Ok(skipped)
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map_or_else(|| name.clone(), str::to_owned)
}

/// `NthPrimeResponse` -> `nth_prime_response`, `HTTPStatus` -> `http_status`
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) => p.is_uppercase() && next.is_some_and(char::is_lowercase),
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
