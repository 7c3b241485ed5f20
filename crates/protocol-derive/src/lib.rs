//! Derive macros for auraxis-protocol.
//!
//! This crate provides `#[derive(Decode)]` and `#[derive(Encode)]` for packet
//! structs whose fields all have an intrinsic wire width: the generated
//! implementations decode and encode each named field in declaration order,
//! delegating to the field type's own trait impl. Packets with sub-byte or
//! size-dependent fields implement the traits by hand instead.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields};

/// Derives `auraxis_protocol::codec::Decode`, reading each named field in
/// declaration order.
///
/// # Example
///
/// ```ignore
/// use auraxis_protocol::codec::{Decode, Encode};
///
/// #[derive(Decode, Encode)]
/// struct KeepAliveMessage {
///     code: u16,
/// }
/// ```
#[proc_macro_derive(Decode)]
pub fn derive_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let fields = named_fields(&input, "Decode");

    let decoders = fields.iter().map(|field| {
        let ident = field.ident.as_ref().expect("named field");
        let ty = &field.ty;
        quote! {
            #ident: <#ty as ::auraxis_protocol::codec::Decode>::decode(reader)?,
        }
    });

    let expanded = quote! {
        impl ::auraxis_protocol::codec::Decode for #name {
            fn decode(
                reader: &mut ::auraxis_protocol::bits::BitReader<'_>,
            ) -> ::auraxis_protocol::error::Result<Self> {
                Ok(Self {
                    #(#decoders)*
                })
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derives `auraxis_protocol::codec::Encode`, writing each named field in
/// declaration order.
#[proc_macro_derive(Encode)]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let fields = named_fields(&input, "Encode");

    let encoders = fields.iter().map(|field| {
        let ident = field.ident.as_ref().expect("named field");
        let ty = &field.ty;
        quote! {
            <#ty as ::auraxis_protocol::codec::Encode>::encode(&self.#ident, writer)?;
        }
    });

    let expanded = quote! {
        impl ::auraxis_protocol::codec::Encode for #name {
            fn encode(
                &self,
                writer: &mut ::auraxis_protocol::bits::BitWriter,
            ) -> ::auraxis_protocol::error::Result<()> {
                #(#encoders)*
                Ok(())
            }
        }
    };

    TokenStream::from(expanded)
}

fn named_fields<'a>(input: &'a DeriveInput, trait_name: &str) -> Vec<&'a Field> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => panic!("{trait_name} cannot be derived for tuple structs"),
        },
        _ => panic!("{trait_name} can only be derived for structs with named fields"),
    }
}
