//! Derive macros for the `scpi-core` crate.
//!
//! ```ignore
//! #[derive(ScpiError)]
//! #[derive(ScpiEnum)]
//! ```
//!
//! `ScpiError` builds the code/message tables of the error enum from
//! `#[error(code = …, message = b"…")]` attributes. `ScpiEnum` builds
//! mnemonic conversions for choice parameters from
//! `#[scpi(mnemonic = b"…")]` attributes.

extern crate proc_macro;

use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, Lit, LitByteStr, LitInt, Meta, MetaList,
    NestedMeta,
};

/// Walk a `#[attr(name = value, ...)]` list and return the byte-string value
/// of `property`, if present.
fn attr_bstr(meta: &Meta, attr: &str, property: &str) -> Option<LitByteStr> {
    attr_values(meta, attr).into_iter().find_map(|nv| match nv {
        Meta::NameValue(nv) if nv.path.is_ident(property) => match &nv.lit {
            Lit::ByteStr(s) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    })
}

/// Walk a `#[attr(name = value, ...)]` list and return the integer value of
/// `property`, if present.
fn attr_int(meta: &Meta, attr: &str, property: &str) -> Option<LitInt> {
    attr_values(meta, attr).into_iter().find_map(|nv| match nv {
        Meta::NameValue(nv) if nv.path.is_ident(property) => match &nv.lit {
            Lit::Int(i) => Some(i.clone()),
            _ => None,
        },
        _ => None,
    })
}

/// True if the list contains a bare `property` path, e.g. `#[error(custom)]`.
fn attr_flag(meta: &Meta, attr: &str, property: &str) -> bool {
    attr_values(meta, attr)
        .into_iter()
        .any(|nv| matches!(nv, Meta::Path(p) if p.is_ident(property)))
}

fn attr_values(meta: &Meta, attr: &str) -> Vec<Meta> {
    match meta {
        Meta::List(MetaList { path, nested, .. }) if path.is_ident(attr) => nested
            .iter()
            .filter_map(|n| match n {
                NestedMeta::Meta(meta) => Some(meta.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Derive the code/message tables for a SCPI error enum.
///
/// Each plain variant carries `#[error(code = <i16>, message = b"...")]`.
/// A single tuple variant `(i16, &'static [u8])` may be marked
/// `#[error(custom)]` to pass its own code and message through.
#[proc_macro_derive(ScpiError, attributes(error))]
pub fn derive_scpi_error(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let variants = match input.data {
        Data::Enum(ref data) => &data.variants,
        _ => panic!("ScpiError can only be derived for enums"),
    };

    let mut message_arms = Vec::new();
    let mut code_arms = Vec::new();
    let mut from_code_arms = Vec::new();

    for variant in variants {
        let variant_name = &variant.ident;
        for attr in variant.attrs.iter() {
            let meta = attr.parse_meta().unwrap();
            if let Some(message) = attr_bstr(&meta, "error", "message") {
                message_arms.push(quote! {
                    #name::#variant_name => #message
                });
            }
            if let Some(code) = attr_int(&meta, "error", "code") {
                code_arms.push(quote! {
                    #name::#variant_name => #code
                });
                from_code_arms.push(quote! {
                    #code => Some(#name::#variant_name)
                });
            }
            if attr_flag(&meta, "error", "custom") {
                message_arms.push(quote! {
                    #name::#variant_name(_, msg) => msg
                });
                code_arms.push(quote! {
                    #name::#variant_name(code, _) => code
                });
            }
        }
    }

    let expanded = quote! {
        impl #name {
            #[doc = "Returns the error message for this error code"]
            pub fn get_message(self) -> &'static [u8] {
                match self {
                    #(#message_arms),*
                }
            }

            #[doc = "Returns the numeric error/event code"]
            pub fn get_code(self) -> i16 {
                match self {
                    #(#code_arms),*
                }
            }

            #[doc = "Returns the error corresponding to a numeric code, if any"]
            pub fn get_error(code: i16) -> Option<Self> {
                match code {
                    #(#from_code_arms),*,
                    _ => None
                }
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}

/// Derive mnemonic conversions for a choice-parameter enum.
///
/// Each variant carries `#[scpi(mnemonic = b"UPPERlower")]`; the generated
/// `from_mnemonic` accepts the short or long form, case-insensitively.
/// Variants must be unit variants or hold a single field implementing
/// [Default].
#[proc_macro_derive(ScpiEnum, attributes(scpi))]
pub fn derive_scpi_enum(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let variants = match input.data {
        Data::Enum(ref data) => &data.variants,
        _ => panic!("ScpiEnum can only be derived for enums"),
    };

    let mut from_arms = Vec::new();
    let mut to_arms = Vec::new();

    for variant in variants {
        let variant_name = &variant.ident;
        for attr in variant.attrs.iter() {
            let meta = attr.parse_meta().unwrap();
            if let Some(mnemonic) = attr_bstr(&meta, "scpi", "mnemonic") {
                match &variant.fields {
                    Fields::Unit => {
                        from_arms.push(quote! {
                            x if scpi_core::parser::pattern::match_pattern(#mnemonic, x, None) =>
                                Some(#name::#variant_name)
                        });
                        to_arms.push(quote! {
                            #name::#variant_name => #mnemonic
                        });
                    }
                    Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                        from_arms.push(quote! {
                            x if scpi_core::parser::pattern::match_pattern(#mnemonic, x, None) =>
                                Some(#name::#variant_name(Default::default()))
                        });
                        to_arms.push(quote! {
                            #name::#variant_name(..) => #mnemonic
                        });
                    }
                    _ => panic!("ScpiEnum variants must be unit or a single default-able field"),
                }
            }
        }
    }

    let expanded = quote! {
        impl scpi_core::option::ScpiEnum for #name {
            fn from_mnemonic(s: &[u8]) -> Option<#name> {
                match s {
                    #(#from_arms),*,
                    _ => None
                }
            }

            fn mnemonic(&self) -> &'static [u8] {
                match self {
                    #(#to_arms),*
                }
            }
        }

        impl<'a> core::convert::TryFrom<scpi_core::parser::lexer::Token<'a>> for #name {
            type Error = scpi_core::error::Error;

            fn try_from(value: scpi_core::parser::lexer::Token<'a>) -> scpi_core::error::Result<Self> {
                if let scpi_core::parser::lexer::Token::ProgramMnemonic(s) = value {
                    <Self as scpi_core::option::ScpiEnum>::from_mnemonic(s)
                        .ok_or_else(|| scpi_core::error::ErrorCode::IllegalParameterValue.into())
                } else {
                    Err(scpi_core::error::ErrorCode::DataTypeError.into())
                }
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}
