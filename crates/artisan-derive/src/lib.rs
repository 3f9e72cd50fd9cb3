// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, FieldsNamed, GenericArgument,
    LitInt, LitStr, PathArguments, Type,
};

/// Primitive field types and the names they are described under.
const PRIMITIVES: &[(&str, &str)] = &[
    ("bool", "bool"),
    ("u8", "u8"),
    ("u16", "u16"),
    ("u32", "u32"),
    ("u64", "u64"),
    ("i8", "i8"),
    ("i16", "i16"),
    ("i32", "i32"),
    ("i64", "i64"),
    ("f32", "f32"),
    ("f64", "f64"),
    ("char", "char"),
    ("String", "string"),
];

/// `#[derive(Artisan)]`: implements `Describe`, `ToValue` and `FromValue`.
///
/// Supports structs with named fields and enums whose variants are unit or
/// have named fields.
///
/// Field types:
/// - primitives (`bool`, integers up to 64 bits, `f32`, `f64`, `char`) and `String`
/// - `Vec<T>`: sequence
/// - `[T; N]`: fixed-length array
/// - `Option<T>`: optional field (outermost only)
/// - `Box<T>`: indirect reference, the way to express recursion
/// - any other type implementing `Describe`: embedded inline
///
/// Attributes:
/// - `#[artisan(rename = "Name")]` on the type
/// - `#[artisan(ordinal = N)]` on fields
/// - `#[artisan(tag = N)]` on enum variants
///
/// Example:
/// ```ignore
/// use artisan_extensions::Artisan;
///
/// #[derive(Artisan)]
/// #[artisan(rename = "Reading")]
/// struct SensorReading {
///     #[artisan(ordinal = 1)]
///     id: u32,
///     #[artisan(ordinal = 0)]
///     stamp: u64,
///     samples: Vec<f64>,
///     next: Option<Box<SensorReading>>,
/// }
/// ```
#[proc_macro_derive(Artisan, attributes(artisan))]
pub fn derive_artisan(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Collected `#[artisan(...)]` options.
#[derive(Default)]
struct Options {
    rename: Option<String>,
    ordinal: Option<u32>,
    tag: Option<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    Type,
    Field,
    Variant,
}

fn parse_options(attrs: &[Attribute], position: Position) -> syn::Result<Options> {
    let mut options = Options::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("artisan")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && position == Position::Type {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
                Ok(())
            } else if meta.path.is_ident("ordinal") && position == Position::Field {
                let ordinal: LitInt = meta.value()?.parse()?;
                options.ordinal = Some(ordinal.base10_parse()?);
                Ok(())
            } else if meta.path.is_ident("tag") && position == Position::Variant {
                let tag: LitInt = meta.value()?.parse()?;
                options.tag = Some(tag.base10_parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported artisan attribute here"))
            }
        })?;
    }
    Ok(options)
}

/// Types referenced by a field, by how they must be described.
#[derive(Default)]
struct References {
    inline: Vec<Type>,
    indirect: Vec<Type>,
}

struct FieldInfo {
    ident: syn::Ident,
    name: String,
    optional: bool,
    raw: TokenStream2,
}

fn core_path() -> TokenStream2 {
    quote! { ::artisan_extensions::__private::artisan_core }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic types are not supported",
        ));
    }

    let options = parse_options(&input.attrs, Position::Type)?;
    let type_name = options
        .rename
        .unwrap_or_else(|| input.ident.unraw().to_string());
    let mut refs = References::default();

    let (raw_type, to_value, from_value) = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => {
                let fields = collect_fields(named, &mut refs)?;
                expand_struct(&type_name, &fields)
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only structs with named fields are supported",
                ))
            }
        },
        Data::Enum(data) => {
            if data.variants.is_empty() {
                return Err(syn::Error::new_spanned(input, "enum has no variants"));
            }
            let mut variants = Vec::new();
            for variant in &data.variants {
                let options = parse_options(&variant.attrs, Position::Variant)?;
                let fields = match &variant.fields {
                    Fields::Named(named) => collect_fields(named, &mut refs)?,
                    Fields::Unit => Vec::new(),
                    Fields::Unnamed(_) => {
                        return Err(syn::Error::new_spanned(
                            variant,
                            "tuple variants are not supported; use named fields",
                        ))
                    }
                };
                let unit = matches!(variant.fields, Fields::Unit);
                variants.push((variant.ident.clone(), options.tag, unit, fields));
            }
            expand_enum(&type_name, &variants)
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs and enums are supported",
            ))
        }
    };

    let core = core_path();
    let ident = &input.ident;
    let inline = &refs.inline;
    let indirect = &refs.indirect;

    Ok(quote! {
        impl #core::Describe for #ident {
            fn type_name() -> &'static str {
                #type_name
            }

            fn raw_type() -> #core::RawType {
                #raw_type
            }

            fn describe_nested(model: &mut #core::TypeModel) -> #core::Result<()> {
                #( <#inline as #core::Describe>::describe_into(model)?; )*
                let _ = model;
                Ok(())
            }

            fn describe_indirect(model: &mut #core::TypeModel) -> #core::Result<()> {
                #( model.describe_deferred::<#indirect>()?; )*
                let _ = model;
                Ok(())
            }
        }

        impl #core::ToValue for #ident {
            fn to_value(&self) -> #core::Value {
                #to_value
            }
        }

        impl #core::FromValue for #ident {
            fn from_value(
                value: &#core::Value,
            ) -> ::std::result::Result<Self, #core::ValueError> {
                #from_value
            }
        }
    })
}

fn collect_fields(named: &FieldsNamed, refs: &mut References) -> syn::Result<Vec<FieldInfo>> {
    let core = core_path();
    let mut fields = Vec::new();
    for field in &named.named {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let options = parse_options(&field.attrs, Position::Field)?;

        let (optional, ty) = match generic_argument(&field.ty, "Option") {
            Some(inner) => (true, inner),
            None => (false, &field.ty),
        };
        let kind = map_type(ty, refs)?;
        let ordinal = match options.ordinal {
            Some(n) => quote! { ::std::option::Option::Some(#n) },
            None => quote! { ::std::option::Option::None },
        };
        let name = ident.unraw().to_string();

        fields.push(FieldInfo {
            ident: ident.clone(),
            name: name.clone(),
            optional,
            raw: quote! {
                #core::RawField {
                    name: ::std::string::String::from(#name),
                    ty: #kind,
                    optional: #optional,
                    ordinal: #ordinal,
                }
            },
        });
    }
    Ok(fields)
}

/// `T` if `ty` is `wrapper<T>`.
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn primitive_name(ty: &Type) -> Option<&'static str> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if !segment.arguments.is_none() {
        return None;
    }
    PRIMITIVES
        .iter()
        .find(|(rust, _)| segment.ident == rust)
        .map(|(_, described)| *described)
}

/// Raw kind expression for a field type.
fn map_type(ty: &Type, refs: &mut References) -> syn::Result<TokenStream2> {
    let core = core_path();

    if let Some(name) = primitive_name(ty) {
        return Ok(quote! { #core::RawKind::Named(::std::string::String::from(#name)) });
    }

    if generic_argument(ty, "Option").is_some() {
        return Err(syn::Error::new_spanned(
            ty,
            "Option is only supported as the outermost field type",
        ));
    }

    if let Some(inner) = generic_argument(ty, "Vec") {
        let element = map_type(inner, refs)?;
        return Ok(quote! {
            #core::RawKind::Sequence(::std::boxed::Box::new(#element), ::std::option::Option::None)
        });
    }

    if let Some(inner) = generic_argument(ty, "Box") {
        if primitive_name(inner).is_some() {
            return Err(syn::Error::new_spanned(
                ty,
                "Box is an indirect reference and needs a described type",
            ));
        }
        refs.indirect.push(inner.clone());
        return Ok(quote! {
            #core::RawKind::Indirect(::std::string::String::from(
                <#inner as #core::Describe>::type_name(),
            ))
        });
    }

    match ty {
        Type::Array(array) => {
            let element = map_type(&array.elem, refs)?;
            let len = &array.len;
            Ok(quote! {
                #core::RawKind::Array(::std::boxed::Box::new(#element), (#len) as usize)
            })
        }
        Type::Path(_) => {
            refs.inline.push(ty.clone());
            Ok(quote! {
                #core::RawKind::Named(::std::string::String::from(
                    <#ty as #core::Describe>::type_name(),
                ))
            })
        }
        _ => Err(syn::Error::new_spanned(
            ty,
            "Unsupported type. Supported types: primitives, String, Vec<T>, [T; N], Option<T>, Box<T>, described types.",
        )),
    }
}

fn expand_struct(type_name: &str, fields: &[FieldInfo]) -> (TokenStream2, TokenStream2, TokenStream2) {
    let core = core_path();
    let raw_fields = fields.iter().map(|f| &f.raw);
    let raw_type = quote! {
        #core::RawType::structure(#type_name, ::std::vec![#( #raw_fields ),*])
    };

    let inserts = fields.iter().map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        quote! {
            fields.insert(
                ::std::string::String::from(#name),
                #core::ToValue::to_value(&self.#ident),
            );
        }
    });
    let to_value = quote! {
        #[allow(unused_mut)]
        let mut fields = ::std::collections::BTreeMap::new();
        #( #inserts )*
        #core::Value::Struct(fields)
    };

    let takes = fields.iter().map(|f| take_field(f, quote! { fields }));
    let from_value = quote! {
        match value {
            #core::Value::Struct(fields) => {
                let _ = fields;
                ::std::result::Result::Ok(Self { #( #takes ),* })
            }
            other => ::std::result::Result::Err(#core::ValueError::TypeMismatch {
                expected: ::std::string::String::from(#type_name),
                found: ::std::string::String::from(other.kind_name()),
            }),
        }
    };

    (raw_type, to_value, from_value)
}

fn take_field(field: &FieldInfo, map: TokenStream2) -> TokenStream2 {
    let core = core_path();
    let ident = &field.ident;
    let name = &field.name;
    if field.optional {
        quote! { #ident: #core::take_optional(#map, #name)? }
    } else {
        quote! { #ident: #core::take_field(#map, #name)? }
    }
}

type VariantInfo = (syn::Ident, Option<u8>, bool, Vec<FieldInfo>);

fn expand_enum(type_name: &str, variants: &[VariantInfo]) -> (TokenStream2, TokenStream2, TokenStream2) {
    let core = core_path();

    let raw_variants = variants.iter().map(|(ident, tag, _, fields)| {
        let name = ident.unraw().to_string();
        let raw_fields = fields.iter().map(|f| &f.raw);
        let tag = match tag {
            Some(n) => quote! { ::std::option::Option::Some(#n) },
            None => quote! { ::std::option::Option::None },
        };
        quote! {
            #core::RawVariant {
                name: ::std::string::String::from(#name),
                tag: #tag,
                fields: ::std::vec![#( #raw_fields ),*],
            }
        }
    });
    let raw_type = quote! {
        #core::RawType::union(#type_name, ::std::vec![#( #raw_variants ),*])
    };

    let to_arms = variants.iter().map(|(ident, _, unit, fields)| {
        let name = ident.unraw().to_string();
        if *unit {
            return quote! {
                Self::#ident => #core::Value::unit_variant(#name),
            };
        }
        let bindings: Vec<_> = fields.iter().map(|f| &f.ident).collect();
        let names = fields.iter().map(|f| &f.name);
        quote! {
            Self::#ident { #( #bindings ),* } => {
                #[allow(unused_mut)]
                let mut fields = ::std::collections::BTreeMap::new();
                #(
                    fields.insert(
                        ::std::string::String::from(#names),
                        #core::ToValue::to_value(#bindings),
                    );
                )*
                #core::Value::Variant {
                    name: ::std::string::String::from(#name),
                    fields,
                }
            }
        }
    });
    let to_value = quote! {
        match self {
            #( #to_arms )*
        }
    };

    let from_arms = variants.iter().map(|(ident, _, unit, fields)| {
        let name = ident.unraw().to_string();
        if *unit {
            return quote! { #name => ::std::result::Result::Ok(Self::#ident), };
        }
        let takes = fields.iter().map(|f| take_field(f, quote! { fields }));
        quote! {
            #name => ::std::result::Result::Ok(Self::#ident { #( #takes ),* }),
        }
    });
    let from_value = quote! {
        match value {
            #core::Value::Variant { name, fields } => {
                let _ = fields;
                match name.as_str() {
                    #( #from_arms )*
                    other => ::std::result::Result::Err(
                        #core::ValueError::UnknownVariant(::std::string::String::from(other)),
                    ),
                }
            }
            other => ::std::result::Result::Err(#core::ValueError::TypeMismatch {
                expected: ::std::string::String::from(#type_name),
                found: ::std::string::String::from(other.kind_name()),
            }),
        }
    };

    (raw_type, to_value, from_value)
}
