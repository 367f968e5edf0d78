use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_quote, DataEnum, DataStruct, DeriveInput, Fields, Generics, LitStr, Result};

struct ComparedField<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    name: String,
    ignored: bool,
}

fn with_inspect_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let type_params: Vec<_> = generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    if !type_params.is_empty() {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote!(#param: phoenix::comparer::Inspect));
        }
    }
    generics
}

fn parse_fields(data: &DataStruct) -> Result<Vec<ComparedField<'_>>> {
    let named = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(fields) => {
            return Err(syn::Error::new_spanned(
                fields,
                "tuple structs are not supported, use named fields",
            ))
        }
    };

    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let mut name = ident.to_string();
        let mut ignored = false;

        for attr in &field.attrs {
            if attr.path().is_ident("compare") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("ignore") {
                        ignored = true;
                        Ok(())
                    } else if meta.path.is_ident("rename") {
                        let s: LitStr = meta.value()?.parse()?;
                        name = s.value();
                        Ok(())
                    } else {
                        Err(meta.error("Unknown compare attribute"))
                    }
                })?
            }
        }

        fields.push(ComparedField {
            ident,
            ty: &field.ty,
            name,
            ignored,
        });
    }
    Ok(fields)
}

pub(crate) fn generate_comparable_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let generics = with_inspect_bounds(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let fields = parse_fields(data)?;

    let value_entries = fields.iter().map(|field| {
        let ident = field.ident;
        let field_name = &field.name;
        quote! {
            (#field_name, phoenix::comparer::Inspect::to_value(&self.#ident))
        }
    });

    let property_entries = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        let field_name = &field.name;
        let ignored = field.ignored;
        quote! {
            phoenix::comparer::PropertyDescriptor::new::<#ty>(#field_name, |owner| {
                owner
                    .downcast_ref::<Self>()
                    .map(|it| &it.#ident as &dyn phoenix::comparer::Inspect)
            })
            .ignored(#ignored)
        }
    });

    let gen = quote! {
        impl #impl_generics phoenix::comparer::Inspect for #name #ty_generics #where_clause {
            fn value_kind() -> phoenix::comparer::ValueKind {
                phoenix::comparer::ValueKind::ComplexObject
            }

            fn descriptor() -> Option<&'static phoenix::comparer::TypeDescriptor> {
                Some(phoenix::comparer::descriptor_of::<Self>())
            }

            fn to_value(&self) -> phoenix::comparer::Value {
                phoenix::comparer::Value::object(vec![#(#value_entries),*])
            }

            fn instance(&self) -> Option<&dyn std::any::Any> {
                Some(self)
            }
        }

        impl #impl_generics phoenix::comparer::Comparable for #name #ty_generics #where_clause {
            fn describe() -> phoenix::comparer::TypeDescriptor {
                phoenix::comparer::TypeDescriptor::new(
                    std::any::type_name::<Self>(),
                    vec![#(#property_entries),*],
                )
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_comparable_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let generics = with_inspect_bounds(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut arms = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "only unit variants are supported",
            ));
        }
        let ident = &variant.ident;
        let variant_name = ident.to_string();
        arms.push(quote!(Self::#ident => #variant_name));
    }

    let gen = quote! {
        impl #impl_generics phoenix::comparer::Inspect for #name #ty_generics #where_clause {
            fn value_kind() -> phoenix::comparer::ValueKind {
                phoenix::comparer::ValueKind::Enum
            }

            fn to_value(&self) -> phoenix::comparer::Value {
                let variant: &str = match *self {
                    #(#arms),*
                };
                phoenix::comparer::Value::Enum(variant.to_string())
            }

            fn instance(&self) -> Option<&dyn std::any::Any> {
                Some(self)
            }
        }
    };

    Ok(TokenStream::from(gen))
}
