//! Derive parsers from RSPT grammars.
//!
//! ```ignore
//! #[derive(Parser)]
//! #[grammar_file = "calculator.rspt"]
//! pub struct Calculator;
//! ```
//!
//! The grammar is compiled while the macro expands. Each non-terminal becomes
//! a matching function in a private module, each exported non-terminal gets a
//! `parse_<name>` method, and a grammar with a single export also implements
//! `parsegen::Parser`. Problems with the grammar are reported as compile
//! errors.

use proc_macro2::Span;
use syn::{parse_macro_input, DeriveInput};

mod error;
mod generate;

#[proc_macro_derive(Parser, attributes(grammar_file, grammar_inline))]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match generate::generate(ast) {
        Ok(ts) => ts.into(),
        Err(e) => syn::Error::new(Span::call_site(), e)
            .to_compile_error()
            .into(),
    }
}
