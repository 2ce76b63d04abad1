//! Procedural macros shared by the vtiles crates.
//!
//! The only macro is [`macro@context`], which attaches an `anyhow` context message to every
//! error returned from the annotated function.

mod args;

use crate::args::ContextArgs;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::{ToTokens, quote};
use syn::parse_macro_input;

/// Wraps the error of a function returning `anyhow::Result` with a formatted message.
///
/// ```ignore
/// #[context("reading header of {name}")]
/// async fn read_header(name: &str) -> Result<FileHeader> { ... }
/// ```
///
/// Arguments are passed to `format!` unchanged, so they may reference the function parameters.
/// Prefix with `move,` when the body has to take ownership of captured parameters.
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let ContextArgs {
		move_token,
		format_args,
	} = parse_macro_input!(args);
	let mut input = parse_macro_input!(input as syn::ItemFn);

	let body = &input.block;
	let return_type = &input.sig.output;
	let err = Ident::new("err", Span::mixed_site());

	let new_body = if input.sig.asyncness.is_some() {
		let return_type = match return_type {
			syn::ReturnType::Default => {
				return syn::Error::new_spanned(input, "function should return Result")
					.to_compile_error()
					.into();
			}
			syn::ReturnType::Type(_, return_type) => return_type,
		};
		let result = Ident::new("result", Span::mixed_site());
		quote! {
			let #result: #return_type = async #move_token { #body }.await;
			#result.map_err(|#err| #err.context(format!(#format_args)).into())
		}
	} else {
		let once = Ident::new("once", Span::mixed_site());
		quote! {
			// a non-Copy value moved into the closure makes it FnOnce
			let #once = ::core::iter::empty::<()>();
			(#move_token || #return_type {
				::core::mem::drop(#once);
				#body
			})().map_err(|#err| #err.context(format!(#format_args)).into())
		}
	};
	input.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(new_body), None)];

	input.into_token_stream().into()
}
