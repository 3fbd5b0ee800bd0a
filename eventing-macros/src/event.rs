use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Expr, Ident, LitStr, Result, Token, parse::Parse,
    parse::ParseStream, parse_macro_input,
};

/// #[derive(Event)] 实现
pub(crate) fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_derive(&input) {
        Ok(out) => TokenStream::from(out),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_derive(input: &DeriveInput) -> Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let type_lit = parse_event_attrs(&input.attrs)?;

    let body = match &input.data {
        Data::Struct(_) => match type_lit {
            Some(lit) => event_type_fn(quote! { #lit }),
            // 未声明类型键：使用 trait 默认实现（具体类型名）
            None => quote! {},
        },
        Data::Enum(data) => {
            if data.variants.is_empty() {
                return Err(syn::Error::new(
                    ident.span(),
                    "#[derive(Event)] requires at least one enum variant",
                ));
            }

            let enum_name = ident.to_string();
            let mut arms = Vec::with_capacity(data.variants.len());
            for v in &data.variants {
                let v_ident = &v.ident;
                // 优先级：变体级 > 枚举级 > EnumName.Variant
                let lit = match parse_event_attrs(&v.attrs)? {
                    Some(lit) => lit,
                    None => match &type_lit {
                        Some(lit) => lit.clone(),
                        None => LitStr::new(&format!("{enum_name}.{v_ident}"), v_ident.span()),
                    },
                };
                arms.push(quote! { Self::#v_ident { .. } => #lit });
            }

            event_type_fn(quote! { match self { #( #arms, )* } })
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "#[derive(Event)] supports only structs and enums",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::eventing_core::event::Event for #ident #ty_generics #where_clause {
            #body
        }
    })
}

fn event_type_fn(value: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    quote! {
        fn event_type(&self) -> ::std::borrow::Cow<'static, str> {
            ::std::borrow::Cow::Borrowed(#value)
        }
    }
}

// -------- parsing --------

// 合并同一位置上的所有 #[event(...)]，同一键只允许出现一次
fn parse_event_attrs(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut ty: Option<LitStr> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("event")) {
        if !matches!(attr.meta, syn::Meta::List(_)) {
            return Err(syn::Error::new(attr.span(), "expected #[event(...)]"));
        }

        let pairs: Punctuated<EventAttrKv, Token![,]> =
            attr.parse_args_with(Punctuated::<EventAttrKv, Token![,]>::parse_terminated)?;

        for kv in pairs {
            match kv.key.to_string().as_str() {
                "event_type" => {
                    if ty.is_some() {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "duplicate key 'event_type' in attribute",
                        ));
                    }
                    let lit = match kv.value {
                        Expr::Lit(syn::ExprLit {
                            lit: syn::Lit::Str(lit),
                            ..
                        }) => lit,
                        other => {
                            return Err(syn::Error::new(
                                other.span(),
                                "expected string literal for 'event_type'",
                            ));
                        }
                    };
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'event_type' must not be blank"));
                    }
                    ty = Some(lit);
                }
                _ => {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "unknown key; expected 'event_type'",
                    ));
                }
            }
        }
    }

    Ok(ty)
}

struct EventAttrKv {
    key: Ident,
    #[allow(dead_code)]
    eq: Token![=],
    value: Expr,
}

impl Parse for EventAttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            key: input.parse()?,
            eq: input.parse()?,
            value: input.parse()?,
        })
    }
}
