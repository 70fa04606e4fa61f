//! Proc macros for deriving grammar sources from EBNF.
//!
//! `#[derive(Grammar)]` reads the grammar named by `#[ebnf_file = "..."]`
//! (relative to the crate root) or `#[ebnf_inline = "..."]`, plus the
//! whitespace-separated `#[reserved_keywords = "..."]` and
//! `#[soft_keywords = "..."]` lists. The grammar is compiled while the
//! macro runs so that mistakes surface as compile errors. The derive emits
//! a `Rule` enum naming every production and an implementation of
//! `packrat::GrammarSource`.

use syn::{parse_macro_input, DeriveInput};

mod error;
mod generate;

#[proc_macro_derive(
    Grammar,
    attributes(ebnf_file, ebnf_inline, reserved_keywords, soft_keywords)
)]
pub fn derive_grammar(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    generate::generate(ast).into()
}
