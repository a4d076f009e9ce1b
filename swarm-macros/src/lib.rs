use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemFn, LitStr};

/// Proc macro to denote a Transaction
///
/// The function must be `async` and return a `Result<T, E>`; an `Err` is tallied as a failed
/// transaction. Results are grouped under the function name, or under the string literal given
/// as the attribute argument.
///
/// # Example
/// ```ignore
/// use swarm::prelude::*;
///
/// #[transaction("GET /health")]
/// async fn health(client: &reqwest::Client) -> Result<(), reqwest::Error> {
///     client.get("http://127.0.0.1:3002/health").send().await?;
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn transaction(attr: TokenStream, item: TokenStream) -> TokenStream {
    transaction_internal(attr, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn transaction_internal(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream2> {
    let input = syn::parse::<ItemFn>(item)?;

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            sig.fn_token,
            "#[transaction] only works on async functions",
        ));
    }

    let label = if attr.is_empty() {
        LitStr::new(&sig.ident.to_string(), sig.ident.span())
    } else {
        syn::parse::<LitStr>(attr)?
    };
    let stmts = &block.stmts;

    Ok(quote! {
        #(#attrs)* #vis #sig {
            ::swarm::transaction::transaction_hook(#label, async move {
                #(#stmts)*
            }).await
        }
    })
}
