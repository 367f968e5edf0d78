use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_quote, DeriveInput, LitStr, Result, Type};

pub(crate) fn generate_entity(ast: &DeriveInput) -> Result<TokenStream> {
    let name = &ast.ident;

    let mut profile: Option<String> = None;
    let mut collection: Option<String> = None;
    let mut bucket: Option<String> = None;
    let mut base: Option<Type> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("profile") {
                    if profile.is_some() {
                        return Err(meta.error("Multiple profile markers are not allowed"));
                    }
                    let s: LitStr = meta.value()?.parse()?;
                    profile = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("collection") {
                    if collection.is_some() {
                        return Err(meta.error("Multiple collection markers are not allowed"));
                    }
                    let s: LitStr = meta.value()?.parse()?;
                    collection = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("bucket") {
                    if bucket.is_some() {
                        return Err(meta.error("Multiple bucket markers are not allowed"));
                    }
                    let s: LitStr = meta.value()?.parse()?;
                    bucket = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("base") {
                    if base.is_some() {
                        return Err(meta.error("Multiple base types are not allowed"));
                    }
                    let s: LitStr = meta.value()?.parse()?;
                    base = Some(s.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?
        }
    }

    // every type parameter is probed as a type argument
    let mut generics = ast.generics.clone();
    let type_params: Vec<_> = generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    if !type_params.is_empty() {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote!(#param: phoenix::metadata::Entity));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let profile_code = profile.map(|it| quote!(.with_profile(#it)));
    let collection_code = collection.map(|it| quote!(.with_collection(#it)));
    let bucket_code = bucket.map(|it| quote!(.with_bucket(#it)));
    let base_code = base.map(|it| {
        quote!(.with_base(<#it as phoenix::metadata::Entity>::entity_type()))
    });

    let gen = quote! {
        impl #impl_generics phoenix::metadata::Entity for #name #ty_generics #where_clause {
            fn entity_type() -> phoenix::metadata::EntityType {
                let markers = phoenix::metadata::Markers::new()
                    #profile_code
                    #collection_code
                    #bucket_code;
                phoenix::metadata::EntityType::new(std::any::type_name::<Self>(), markers)
                    #(.with_type_argument(<#type_params as phoenix::metadata::Entity>::entity_type()))*
                    #base_code
            }
        }
    };

    Ok(TokenStream::from(gen))
}
