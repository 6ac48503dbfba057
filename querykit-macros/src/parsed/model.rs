use std::collections::HashMap;

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Visibility};

use super::ParsedField;

pub(crate) struct ParsedModel {
    name: Ident,
    vis: Visibility,
    endpoint: Option<LitStr>,
    fields: Vec<ParsedField>,
}

impl ParsedModel {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(Error::new(
                input.generics.params.first().map_or(input.ident.span(), |param| param.span()),
                "Queryable cannot be derived for generic types",
            ));
        }

        let mut endpoint = None;
        for attr in &input.attrs {
            if attr.path().is_ident("query") {
                Self::parse_container_attr(attr, &mut endpoint)?;
            }
        }

        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => {
                    let mut parsed = Vec::new();
                    for field in &named.named {
                        parsed.push(ParsedField::from_field(field)?);
                    }
                    parsed
                }
                _ => return Err(Error::new(input.ident.span(), "Queryable requires named fields")),
            },
            _ => return Err(Error::new(input.ident.span(), "Queryable can only be derived for structs")),
        };

        Self::check_unique_wire_keys(&fields)?;

        Ok(Self {
            name: input.ident.clone(),
            vis: input.vis.clone(),
            endpoint,
            fields,
        })
    }

    fn parse_container_attr(attr: &Attribute, endpoint: &mut Option<LitStr>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("endpoint") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(Error::new(value.span(), "endpoint must not be empty"));
                }
                *endpoint = Some(value);
                Ok(())
            } else {
                let option = meta.path.get_ident().map(ToString::to_string).unwrap_or_default();
                Err(meta.error(format!("unknown query option `{option}`, expected `endpoint`")))
            }
        })
    }

    fn check_unique_wire_keys(fields: &[ParsedField]) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for field in fields {
            let Some(entry) = &field.registry else { continue };
            if let Some(previous) = seen.insert(entry.wire_key.as_str(), field.name.as_str()) {
                return Err(Error::new(
                    entry.key_span,
                    format!("duplicate wire key `{}` (already used by field `{previous}`)", entry.wire_key),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let vis = &self.vis;
        let model_lit = LitStr::new(&name.to_string(), name.span());
        let fields_ident = format_ident!("{}Fields", name);

        let endpoint_tokens = match &self.endpoint {
            Some(lit) => quote! { ::std::option::Option::Some(#lit) },
            None => quote! { ::std::option::Option::None },
        };

        let descriptor_fields = self.fields.iter().filter_map(ParsedField::to_descriptor_tokens);
        let decode_inits = self.fields.iter().map(ParsedField::decode_tokens);
        let path_fields = self.fields.iter().map(|field| {
            let ident = &field.ident;
            quote! { pub #ident: ::querykit::field::Field<#name> }
        });
        let path_inits = self.fields.iter().map(|field| {
            let ident = &field.ident;
            let field_name = &field.name;
            quote! { #ident: ::querykit::field::Field::new(#field_name) }
        });
        let fields_doc = format!("Field references for [`{name}`].");

        quote! {
            #[doc = #fields_doc]
            #[derive(Debug, Clone, Copy)]
            #vis struct #fields_ident {
                #(#path_fields,)*
            }

            impl ::querykit::types::Queryable for #name {
                type Fields = #fields_ident;

                fn descriptor() -> &'static ::querykit::types::ModelDescriptor {
                    static DESCRIPTOR: ::std::sync::OnceLock<::querykit::types::ModelDescriptor> =
                        ::std::sync::OnceLock::new();
                    DESCRIPTOR.get_or_init(|| ::querykit::types::ModelDescriptor {
                        model: #model_lit,
                        endpoint: #endpoint_tokens,
                        fields: ::std::vec![#(#descriptor_fields),*],
                    })
                }

                fn fields() -> Self::Fields {
                    #fields_ident {
                        #(#path_inits,)*
                    }
                }

                #[allow(unused_variables)]
                fn decode(
                    record: &::querykit::RawRecord,
                ) -> ::std::result::Result<Self, ::querykit::errors::DecodeError> {
                    ::std::result::Result::Ok(Self {
                        #(#decode_inits,)*
                    })
                }
            }

            ::querykit::inventory::submit! {
                ::querykit::registry::ModelRegistration {
                    type_name: #model_lit,
                    endpoint: #endpoint_tokens,
                    descriptor_fn: <#name as ::querykit::types::Queryable>::descriptor,
                }
            }
        }
    }
}
