use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, GenericArgument, ItemFn, LitStr, PathArguments,
    ReturnType, Type, parse_macro_input,
};

/// Proc macro attribute implementing `hamster::ErrorLike` for an error type.
///
/// The message is the type's `Display` output and the name is the variant
/// name for enums, or the type name for structs. Codes and names can be set
/// per variant, or on the type, with `#[error_like(code = 42)]` and
/// `#[error_like(name = "Timeout")]`; these helper attributes are removed from
/// the emitted item. On an enum, `#[error_like(code = .., name = "..")]` sets
/// the default for variants that do not set their own.
///
/// Place it above any `#[derive]` so derives never see the helper attributes.
///
/// See the main [`hamster`] crate documentation for the reporting side.
///
/// [`hamster`]: https://docs.rs/hamster
#[proc_macro_attribute]
pub fn error_like(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    match generate_error_like_impl(args.into(), &mut input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Proc macro attribute routing a function's failures to a `hamster::Hamster`.
///
/// The argument is an expression evaluating to anything that auto-derefs to a
/// `Hamster`. A function returning `Result<T, E>` is rewritten to return
/// `Option<T>`; an `Err` or a panic is reported and becomes `None`. Any other
/// function returning `T` becomes `Option<T>`, with only panics reported.
///
/// ```ignore
/// #[hamster::capture(reporter())]
/// fn load(path: &str) -> Result<Settings, SettingsError> {
///     // ...
/// }
///
/// let settings: Option<Settings> = load("app.toml");
/// ```
#[proc_macro_attribute]
pub fn capture(args: TokenStream, input: TokenStream) -> TokenStream {
    let reporter = parse_macro_input!(args as Expr);
    let input = parse_macro_input!(input as ItemFn);

    match generate_capture_impl(&reporter, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Settings read from `#[error_like(...)]`.
#[derive(Default)]
struct ErrorLikeArgs {
    code: Option<Expr>,
    name: Option<LitStr>,
}

impl ErrorLikeArgs {
    fn parse_nested(&mut self, meta: syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("code") {
            self.code = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expected `code = <integer>` or `name = \"...\"`"))
        }
    }

    /// Collects and strips the helper attributes.
    fn take_from(attrs: &mut Vec<Attribute>) -> syn::Result<Self> {
        let mut args = Self::default();
        let mut result = Ok(());
        attrs.retain(|attr| {
            if !attr.path().is_ident("error_like") {
                return true;
            }
            if let Err(err) = attr.parse_nested_meta(|meta| args.parse_nested(meta)) {
                result = Err(err);
            }
            false
        });
        result.map(|()| args)
    }
}

fn generate_error_like_impl(
    args: proc_macro2::TokenStream,
    input: &mut DeriveInput,
) -> syn::Result<proc_macro2::TokenStream> {
    let mut item_args = ErrorLikeArgs::default();
    if !args.is_empty() {
        let parser = syn::meta::parser(|meta| item_args.parse_nested(meta));
        syn::parse::Parser::parse2(parser, args)?;
    }

    let name = input.ident.clone();
    let (name_body, code_body) = match &mut input.data {
        Data::Enum(data) => {
            let mut name_arms = Vec::new();
            let mut code_arms = Vec::new();
            for variant in &mut data.variants {
                let ident = &variant.ident;
                let args = ErrorLikeArgs::take_from(&mut variant.attrs)?;
                let label = args
                    .name
                    .or_else(|| item_args.name.clone())
                    .map(|lit| lit.value())
                    .unwrap_or_else(|| ident.to_string());
                name_arms.push(quote! { Self::#ident { .. } => #label, });
                if let Some(code) = args.code.or_else(|| item_args.code.clone()) {
                    code_arms.push(quote! { Self::#ident { .. } => ::core::option::Option::Some(#code), });
                }
            }

            let name_body = if name_arms.is_empty() {
                quote! { ::core::option::Option::None }
            } else {
                quote! {
                    ::core::option::Option::Some(::std::string::String::from(match self { #(#name_arms)* }))
                }
            };
            let code_body = if code_arms.is_empty() {
                quote! { ::core::option::Option::None }
            } else {
                quote! {
                    match self { #(#code_arms)* _ => ::core::option::Option::None }
                }
            };
            (name_body, code_body)
        }
        Data::Struct(data) => {
            for field in &mut data.fields {
                if field.attrs.iter().any(|attr| attr.path().is_ident("error_like")) {
                    return Err(syn::Error::new_spanned(
                        field,
                        "error_like settings belong on the type or its variants",
                    ));
                }
            }
            let label = item_args
                .name
                .as_ref()
                .map(LitStr::value)
                .unwrap_or_else(|| name.to_string());
            let name_body = quote! { ::core::option::Option::Some(::std::string::String::from(#label)) };
            let code_body = match &item_args.code {
                Some(code) => quote! { ::core::option::Option::Some(#code) },
                None => quote! { ::core::option::Option::None },
            };
            (name_body, code_body)
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &name,
                "error_like can only be applied to enums and structs",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        // First, emit the item without its helper attributes
        #input

        impl #impl_generics hamster::ErrorLike for #name #ty_generics #where_clause {
            fn message(&self) -> ::core::option::Option<::std::string::String> {
                ::core::option::Option::Some(::std::string::ToString::to_string(self))
            }

            fn name(&self) -> ::core::option::Option<::std::string::String> {
                #name_body
            }

            #[allow(unreachable_patterns)]
            fn code(&self) -> ::core::option::Option<i64> {
                #code_body
            }
        }
    })
}

fn generate_capture_impl(reporter: &Expr, mut input: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    if let Some(asyncness) = &input.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "capture does not support async functions",
        ));
    }

    let body = &input.block;
    let (output, wrapped) = match &input.sig.output {
        ReturnType::Default => (
            quote! { ::core::option::Option<()> },
            quote! { (#reporter).guard(move || #body) },
        ),
        ReturnType::Type(_, ty) => match result_ok_type(ty) {
            Some(ok) => (
                quote! { ::core::option::Option<#ok> },
                quote! { (#reporter).call(move || -> #ty #body) },
            ),
            None => (
                quote! { ::core::option::Option<#ty> },
                quote! { (#reporter).guard(move || -> #ty #body) },
            ),
        },
    };

    input.sig.output = syn::parse2(quote! { -> #output })?;
    input.block = syn::parse2(quote! {{ #wrapped }})?;

    Ok(quote! { #input })
}

/// The `T` of a return type spelled `Result<T, ..>`, including aliases that
/// keep the name `Result`.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}
