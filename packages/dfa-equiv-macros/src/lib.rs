//! Procedural macros for `dfa-equiv-lib`.
//!
//! The only macro is [`config!`], which turns a compact struct description
//! with per-field defaults into a config struct, a `Partial*` twin used for
//! deserializing TOML files where every field is optional, and a set of
//! getters and builder methods.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Expr, GenericArgument, Ident, PathArguments, Token, Type, Visibility,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    token,
};

/// One `name: Type = default` or `name: Type (PartialType = default)` entry.
struct ConfigField {
    name: Ident,
    ty: Type,
    default_value: Expr,
    /// Set for nested config sections, which deserialize from their own
    /// partial struct.
    nested_partial: Option<Type>,
}

impl Parse for ConfigField {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let ty: Type = input.parse()?;

        if !input.peek(token::Paren) {
            input.parse::<Token![=]>()?;
            return Ok(ConfigField {
                name,
                ty,
                default_value: input.parse()?,
                nested_partial: None,
            });
        }

        let content;
        syn::parenthesized!(content in input);
        let nested: Type = content.parse()?;
        content.parse::<Token![=]>()?;

        Ok(ConfigField {
            name,
            ty,
            default_value: content.parse()?,
            nested_partial: Some(nested),
        })
    }
}

struct ConfigInput {
    vis: Visibility,
    name: Ident,
    fields: Punctuated<ConfigField, Token![,]>,
}

impl Parse for ConfigInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let vis: Visibility = input.parse()?;
        input.parse::<Token![struct]>()?;
        let name: Ident = input.parse()?;

        let body;
        syn::braced!(body in input);
        let fields = body.parse_terminated(ConfigField::parse, Token![,])?;

        Ok(ConfigInput { vis, name, fields })
    }
}

/// Returns true for `Option<T>` so optional fields are not wrapped twice in
/// the partial struct.
fn is_option(ty: &Type) -> bool {
    let Type::Path(tp) = ty else {
        return false;
    };

    match tp.path.segments.last() {
        Some(seg) if seg.ident == "Option" => match &seg.arguments {
            PathArguments::AngleBracketed(args) => {
                args.args.len() == 1 && matches!(args.args[0], GenericArgument::Type(_))
            }
            _ => false,
        },
        _ => false,
    }
}

/// Generates a config struct.
///
/// ```ignore
/// config! {
///     pub struct RenderConfig {
///         output_dir: std::path::PathBuf = "dfa_images".into(),
///         logger: LoggerConfig (Option<PartialLoggerConfig> = LoggerConfig::default()),
///     }
/// }
/// ```
///
/// The expansion refers to `crate::config::IntoOr`, so the macro must be
/// invoked from inside `dfa-equiv-lib`.
#[proc_macro]
pub fn config(input: TokenStream) -> TokenStream {
    let ConfigInput { vis, name, fields } = parse_macro_input!(input as ConfigInput);
    let partial_name = format_ident!("Partial{}", name);

    let mut struct_fields = Vec::new();
    let mut partial_fields = Vec::new();
    let mut from_partial = Vec::new();
    let mut defaults = Vec::new();
    let mut accessors = Vec::new();

    for field in fields.iter() {
        let ConfigField {
            name: field_name,
            ty,
            default_value,
            nested_partial,
        } = field;

        struct_fields.push(quote! { #field_name: #ty });

        let partial_ty = match nested_partial {
            Some(nested) => quote! { #nested },
            None if is_option(ty) => quote! { #ty },
            None => quote! { Option<#ty> },
        };
        partial_fields.push(quote! {
            #[serde(default)]
            #field_name: #partial_ty
        });

        from_partial.push(quote! { #field_name: partial.#field_name.into_or(#default_value) });
        defaults.push(quote! { #field_name: #default_value });

        let with_name = format_ident!("with_{}", field_name);
        let set_name = format_ident!("set_{}", field_name);
        let get_name = format_ident!("get_{}", field_name);
        accessors.push(quote! {
            pub fn #with_name(mut self, #field_name: #ty) -> Self {
                self.#field_name = #field_name;
                self
            }

            pub fn #set_name(&mut self, #field_name: #ty) {
                self.#field_name = #field_name;
            }

            pub fn #get_name(&self) -> &#ty {
                &self.#field_name
            }
        });
    }

    let expanded = quote! {
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        #vis struct #name {
            #( #struct_fields, )*
        }

        #[derive(Debug, Clone, Default, serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        #vis struct #partial_name {
            #( #partial_fields, )*
        }

        impl #name {
            pub fn from_partial(partial: #partial_name) -> Self {
                use crate::config::IntoOr;

                Self {
                    #( #from_partial, )*
                }
            }

            /// Parses a TOML document. Missing keys take their defaults.
            pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
                Ok(Self::from_partial(toml::from_str(content)?))
            }

            pub fn from_file<P: AsRef<std::path::Path>>(file_path: P) -> anyhow::Result<Self> {
                let canonic_path = std::fs::canonicalize(file_path)?;
                let content = std::fs::read_to_string(canonic_path)?;
                Self::from_toml_str(&content)
            }

            pub fn from_optional_file<P: AsRef<std::path::Path>>(
                file_path: Option<P>,
            ) -> anyhow::Result<Self> {
                match file_path {
                    Some(p) => Self::from_file(p),
                    None => Ok(Self::default()),
                }
            }

            #( #accessors )*
        }

        impl Default for #name {
            fn default() -> Self {
                #name {
                    #( #defaults, )*
                }
            }
        }

        impl crate::config::IntoOr<#name> for Option<#partial_name> {
            fn into_or(self, or: #name) -> #name {
                match self {
                    Some(t) => #name::from_partial(t),
                    None => or,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
