
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, LitStr, UnOp};

#[derive(Default)]
struct StructAttrs {
    property_mode: bool,
    name: Option<String>,
}

#[derive(Default)]
struct FieldAttrs {
    source: Option<String>,
    optional: bool,
    default: Option<TokenStream2>,
    ignore: bool,
    node_labels: bool,
    relationship_type: bool,
    converter: Option<Expr>,
    flatten: bool,
}

fn parse_struct_attrs(ast: &DeriveInput) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    for attr in &ast.attrs {
        if !attr.path().is_ident("boltmap") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                out.property_mode = true;
            } else if meta.path.is_ident("name") {
                let s: LitStr = meta.value()?.parse()?;
                out.name = Some(s.value());
            } else {
                return Err(meta.error("unknown boltmap struct attribute"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Turn a literal (or negated numeric literal) into a `Value` expression.
fn default_value(expr: &Expr) -> syn::Result<TokenStream2> {
    let (neg, lit) = match expr {
        Expr::Lit(ExprLit { lit, .. }) => (false, lit),
        Expr::Unary(ExprUnary { op: UnOp::Neg(_), expr, .. }) => match &**expr {
            Expr::Lit(ExprLit { lit, .. }) => (true, lit),
            other => return Err(syn::Error::new_spanned(other, "default must be a literal")),
        },
        other => return Err(syn::Error::new_spanned(other, "default must be a literal")),
    };
    let sign = if neg { quote!(-) } else { quote!() };
    match lit {
        Lit::Int(i) => {
            let v = i.base10_parse::<i64>()?;
            Ok(quote!(boltmap_core::value::Value::Integer(#sign #v)))
        }
        Lit::Float(f) => {
            let v = f.base10_parse::<f64>()?;
            Ok(quote!(boltmap_core::value::Value::Float(#sign #v)))
        }
        Lit::Str(s) if !neg => Ok(quote!(boltmap_core::value::Value::String(#s.to_owned()))),
        Lit::Bool(b) if !neg => {
            let v = b.value;
            Ok(quote!(boltmap_core::value::Value::Boolean(#v)))
        }
        other => Err(syn::Error::new_spanned(other, "unsupported default literal")),
    }
}

fn parse_field_attrs(f: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in &f.attrs {
        if !attr.path().is_ident("boltmap") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("source") {
                let s: LitStr = meta.value()?.parse()?;
                out.source = Some(s.value());
            } else if meta.path.is_ident("optional") {
                out.optional = true;
            } else if meta.path.is_ident("default") {
                let expr: Expr = meta.value()?.parse()?;
                out.default = Some(default_value(&expr)?);
            } else if meta.path.is_ident("ignore") {
                out.ignore = true;
            } else if meta.path.is_ident("node_labels") {
                out.node_labels = true;
            } else if meta.path.is_ident("relationship_type") {
                out.relationship_type = true;
            } else if meta.path.is_ident("converter") {
                let s: LitStr = meta.value()?.parse()?;
                out.converter = Some(s.parse()?);
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else {
                return Err(meta.error("unknown boltmap field attribute"));
            }
            Ok(())
        })?;
    }
    if out.node_labels && out.relationship_type {
        return Err(syn::Error::new_spanned(
            f,
            "node_labels and relationship_type are mutually exclusive",
        ));
    }
    Ok(out)
}

// Syntactic check, like any derive can do without type information.
fn is_option(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(p) => p.path.segments.last().map(|s| s.ident == "Option").unwrap_or(false),
        _ => false,
    }
}

/// Builder-method chain shared by `Param` and `Property` declarations.
fn binding_modifiers(attrs: &FieldAttrs, optional: bool) -> TokenStream2 {
    let mut out = TokenStream2::new();
    if let Some(source) = &attrs.source {
        out.extend(quote!(.source(#source)));
    }
    if optional {
        out.extend(quote!(.optional()));
    }
    if let Some(default) = &attrs.default {
        out.extend(quote!(.default(#default)));
    }
    if attrs.node_labels {
        out.extend(quote!(.node_labels()));
    }
    if attrs.relationship_type {
        out.extend(quote!(.relationship_type()));
    }
    out
}

pub fn expand(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match expand_derive(&ast) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand_derive(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let fields = match &ast.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            _ => {
                return Err(syn::Error::new_spanned(
                    ast,
                    "Mappable only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(ast, "Mappable only supports structs")),
    };

    let struct_attrs = parse_struct_attrs(ast)?;
    let type_name = struct_attrs.name.clone().unwrap_or_else(|| name.to_string());

    let info = if struct_attrs.property_mode {
        property_mode(&type_name, &fields)?
    } else {
        constructor_mode(&type_name, &fields)?
    };

    Ok(quote! {
        impl #impl_generics boltmap_core::traits::Mappable for #name #ty_generics #where_clause {
            fn mapping_info() -> boltmap_core::descriptor::MappingInfo<Self> {
                #info
            }
        }

        impl #impl_generics boltmap_core::traits::FromValue for #name #ty_generics #where_clause {
            fn from_value(
                value: &boltmap_core::value::Value,
                ctx: &boltmap_core::context::MappingContext<'_>,
            ) -> Result<Self, boltmap_core::error::MapError> {
                ctx.map_nested::<Self>(value)
            }
        }
    })
}

/// The struct literal is the one designated constructor; every field that
/// is not ignored becomes a parameter, in declaration order.
fn constructor_mode(type_name: &str, fields: &[&syn::Field]) -> syn::Result<TokenStream2> {
    let mut inits = Vec::new();
    let mut params = Vec::new();

    for f in fields {
        let Some(ident) = f.ident.as_ref() else { continue };
        let key = ident.to_string();
        let ty = &f.ty;
        let attrs = parse_field_attrs(f)?;

        if attrs.ignore {
            inits.push(quote!(#ident: ::core::default::Default::default()));
            continue;
        }

        if attrs.flatten {
            inits.push(quote!(#ident: args.flatten::<#ty>()?));
            params.push(quote!(boltmap_core::descriptor::Param::new(#key).flatten()));
            continue;
        }

        let optional = attrs.optional || is_option(ty);
        // Aspect fields fall back to `Default` when the value is the wrong kind.
        let captured = attrs.node_labels || attrs.relationship_type;
        let init = match (&attrs.converter, optional, captured) {
            (Some(conv), true, _) => quote!(args.next_with_or_default(#conv)?),
            (Some(conv), false, true) => quote!(args.next_captured_with(#conv)?),
            (Some(conv), false, false) => quote!(args.next_with(#conv)?),
            (None, true, _) => quote!(args.next_or_default::<#ty>()?),
            (None, false, true) => quote!(args.next_captured::<#ty>()?),
            (None, false, false) => quote!(args.next::<#ty>()?),
        };
        inits.push(quote!(#ident: #init));

        let modifiers = binding_modifiers(&attrs, optional);
        params.push(quote!(boltmap_core::descriptor::Param::new(#key)#modifiers));
    }

    let ctor_name = format!("{type_name} {{ .. }}");
    Ok(quote! {
        boltmap_core::descriptor::MappingInfo::new(#type_name).constructor(
            boltmap_core::descriptor::Constructor::new(#ctor_name, |args| {
                Ok(Self {
                    #(#inits,)*
                })
            })
            .designated()
            #(.param(#params))*
        )
    })
}

/// `Default::default()` builds the object; every field that is not ignored
/// becomes a settable property.
fn property_mode(type_name: &str, fields: &[&syn::Field]) -> syn::Result<TokenStream2> {
    let mut props = Vec::new();

    for f in fields {
        let Some(ident) = f.ident.as_ref() else { continue };
        let key = ident.to_string();
        let ty = &f.ty;
        let attrs = parse_field_attrs(f)?;

        if attrs.ignore {
            continue;
        }
        if attrs.flatten {
            return Err(syn::Error::new_spanned(
                f,
                "flatten is only supported without #[boltmap(default)]",
            ));
        }

        let optional = attrs.optional || is_option(ty);
        let modifiers = binding_modifiers(&attrs, optional);
        let setter = quote!(|obj: &mut Self, v: #ty| obj.#ident = v);
        props.push(match &attrs.converter {
            Some(conv) => quote! {
                boltmap_core::descriptor::Property::converted(#key, #conv, #setter)#modifiers
            },
            None => quote! {
                boltmap_core::descriptor::Property::new(#key, #setter)#modifiers
            },
        });
    }

    let ctor_name = format!("{type_name}::default");
    Ok(quote! {
        boltmap_core::descriptor::MappingInfo::new(#type_name)
            .constructor(boltmap_core::descriptor::Constructor::new(#ctor_name, |_args| {
                Ok(<Self as ::core::default::Default>::default())
            }))
            #(.property(#props))*
    })
}
