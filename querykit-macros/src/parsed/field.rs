use std::sync::OnceLock;

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use regex::Regex;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Error, Field, GenericArgument, Ident, LitStr, PathArguments, Result, Type};

/// How a wire key must look: an identifier, optionally dotted to address a
/// nested field.
const WIRE_KEY_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.]*$";

pub(crate) struct ParsedField {
    pub(crate) ident: Ident,
    /// Logical name (the identifier without any `r#` prefix).
    pub(crate) name: String,
    pub(crate) registry: Option<RegistryEntry>,
}

pub(crate) struct RegistryEntry {
    pub(crate) wire_key: String,
    /// Span of the explicit `key = "..."`, or of the field identifier.
    pub(crate) key_span: proc_macro2::Span,
    /// `T` in `FieldState<T>`.
    pub(crate) inner: Type,
    pub(crate) required: bool,
}

#[derive(Default)]
struct FieldOptions {
    key: Option<LitStr>,
    skip: bool,
    required: bool,
}

impl ParsedField {
    pub(crate) fn from_field(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "Queryable requires named fields"))?;
        let name = ident.unraw().to_string();

        let mut options = FieldOptions::default();
        for attr in &field.attrs {
            if attr.path().is_ident("query") {
                Self::parse_field_attr(attr, &mut options)?;
            }
        }

        if options.skip {
            if options.key.is_some() || options.required {
                return Err(Error::new(
                    ident.span(),
                    "#[query(skip)] cannot be combined with `key` or `required`",
                ));
            }
            return Ok(Self {
                ident,
                name,
                registry: None,
            });
        }

        let inner = unwrap_field_state(&field.ty).ok_or_else(|| {
            Error::new(
                field.ty.span(),
                "registered fields must have type `FieldState<T>`; mark the field #[query(skip)] to leave it out of the registry",
            )
        })?;

        let (wire_key, key_span) = match &options.key {
            Some(lit) => (lit.value(), lit.span()),
            None => (name.clone(), ident.span()),
        };
        validate_wire_key(&wire_key, key_span)?;

        Ok(Self {
            ident,
            name,
            registry: Some(RegistryEntry {
                wire_key,
                key_span,
                inner: inner.clone(),
                required: options.required,
            }),
        })
    }

    fn parse_field_attr(attr: &Attribute, options: &mut FieldOptions) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                options.key = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("required") {
                options.required = true;
            } else {
                let option = meta.path.get_ident().map(ToString::to_string).unwrap_or_default();
                return Err(meta.error(format!(
                    "unknown query option `{option}`, expected `key`, `skip` or `required`"
                )));
            }
            Ok(())
        })
    }

    /// `FieldDescriptor { .. }` for registered fields.
    pub(crate) fn to_descriptor_tokens(&self) -> Option<TokenStream2> {
        let entry = self.registry.as_ref()?;
        let name = &self.name;
        let wire_key = &entry.wire_key;
        let inner = &entry.inner;
        let optional = !entry.required;
        Some(quote! {
            ::querykit::types::FieldDescriptor {
                name: #name,
                wire_key: #wire_key,
                field_type: <#inner as ::querykit::decode::FromWire>::FIELD_TYPE,
                element_type: <#inner as ::querykit::decode::FromWire>::ELEMENT_TYPE,
                optional: #optional,
                validate: <#inner as ::querykit::decode::FromWire>::validate,
            }
        })
    }

    /// Initializer for this field inside the generated `decode`.
    pub(crate) fn decode_tokens(&self) -> TokenStream2 {
        let ident = &self.ident;
        match &self.registry {
            Some(entry) => {
                let wire_key = &entry.wire_key;
                let inner = &entry.inner;
                let decoder = if entry.required {
                    quote! { ::querykit::decode::decode_required_field }
                } else {
                    quote! { ::querykit::decode::decode_field }
                };
                quote! { #ident: #decoder::<#inner>(record, #wire_key)? }
            }
            None => quote! { #ident: ::std::default::Default::default() },
        }
    }
}

fn wire_key_regex(span: proc_macro2::Span) -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(regex) = PATTERN.get() {
        return Ok(regex);
    }
    let regex = Regex::new(WIRE_KEY_PATTERN).map_err(|err| Error::new(span, err.to_string()))?;
    Ok(PATTERN.get_or_init(|| regex))
}

fn validate_wire_key(key: &str, span: proc_macro2::Span) -> Result<()> {
    if key.is_empty() {
        return Err(Error::new(span, "wire key must not be empty"));
    }
    if !wire_key_regex(span)?.is_match(key) {
        return Err(Error::new(
            span,
            format!("invalid wire key `{key}`: expected letters, digits, `_` or `.`, not starting with a digit"),
        ));
    }
    Ok(())
}

fn unwrap_field_state(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let segment = path.path.segments.last()?;
            if segment.ident != "FieldState" {
                return None;
            }
            match &segment.arguments {
                PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first()? {
                    GenericArgument::Type(inner) => Some(inner),
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    }
}
