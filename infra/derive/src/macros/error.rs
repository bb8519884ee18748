use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, Type, Variant};

const CONTEXT_FIELD: &str = "context";
const INTERNAL_VARIANT: &str = "Internal";

struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg: Vec<&'a Attribute>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext = format_ident!("{name}Ext");

    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(name, "keyed_error can only be applied to enums")
            .to_compile_error();
    };

    let variants = match data.variants.iter().map(analyse).collect::<Result<Vec<_>, _>>() {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error(),
    };

    if let Some(v) = variants.iter().find(|v| v.source.is_some() && !v.has_context) {
        return syn::Error::new_spanned(
            v.ident,
            "keyed_error variants with a source need `context: Option<Cow<'static, str>>`",
        )
        .to_compile_error();
    }

    let derives = missing_derives(&input);
    let context_arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        let cfg = &v.cfg;
        quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });
    let conversions = variants.iter().filter_map(|v| source_conversion(name, &ext, v));
    let internal = variants
        .iter()
        .find(|v| v.ident == INTERNAL_VARIANT)
        .map(|v| internal_conversion(name, v));

    quote! {
        #derives
        #input

        #[allow(dead_code)]
        pub type Result<T, E = #name> = ::std::result::Result<T, E>;

        pub trait #ext<T> {
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#context_arms)*
                        _ => {},
                    }
                    err
                })
            }
        }

        #(#conversions)*
        #internal

        #[allow(dead_code)]
        fn format_context(
            context: &Option<::std::borrow::Cow<'static, str>>,
        ) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| {
                ::std::borrow::Cow::Owned(format!(" ({c})"))
            })
        }
    }
}

fn analyse(variant: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "keyed_error requires named fields so source and context can be wired",
        ));
    };

    let has_context = context_field(fields)?.is_some();
    let source = fields
        .named
        .iter()
        .find(|f| is_source(f))
        .and_then(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)));

    Ok(ErrorVariant {
        ident: &variant.ident,
        source,
        has_context,
        cfg: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).collect(),
    })
}

fn context_field(fields: &FieldsNamed) -> syn::Result<Option<&Field>> {
    let Some(field) =
        fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == CONTEXT_FIELD))
    else {
        return Ok(None);
    };

    if is_optional_cow(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>"))
    }
}

fn is_source(field: &Field) -> bool {
    field.ident.as_ref().is_some_and(|i| i == "source")
        || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
}

fn source_conversion(name: &Ident, ext: &Ident, v: &ErrorVariant<'_>) -> Option<TokenStream> {
    if v.ident == INTERNAL_VARIANT {
        return None;
    }
    let (field, ty) = v.source?;
    let ident = v.ident;
    let cfg = &v.cfg;

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self {
                Self::#ident { #field, context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #ty> {
            #[inline]
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn internal_conversion(name: &Ident, v: &ErrorVariant<'_>) -> TokenStream {
    let cfg = &v.cfg;
    quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: ::std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: ::std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut derived = FxHashSet::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                derived.insert(last.ident.to_string());
            }
            Ok(())
        });
    }

    let mut missing = Vec::new();
    if !derived.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !derived.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }

    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

/// Matches `Option<Cow<'static, str>>`, with or without path prefixes.
fn is_optional_cow(ty: &Type) -> bool {
    let Some(inner) = single_generic(ty, "Option") else {
        return false;
    };
    let Type::Path(path) = inner else {
        return false;
    };
    let Some(seg) = path.path.segments.last() else {
        return false;
    };
    if seg.ident != "Cow" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return false;
    };
    let mut args = args.args.iter();
    let lifetime_ok = matches!(args.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|s| s.ident == "str")
    );
    lifetime_ok && str_ok
}

fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let seg = path.path.segments.last()?;
    if seg.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
