use proc_macro2::TokenStream;
use quote::quote;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{DeriveInput, Generics, Ident, Lit, Meta};

use ebnf::Grammar;
use packrat::Keywords;

use crate::error::{DeriveError, Result};

const EBNF_FILE_ATTR: &str = "ebnf_file";
const EBNF_INLINE_ATTR: &str = "ebnf_inline";
const RESERVED_KEYWORDS_ATTR: &str = "reserved_keywords";
const SOFT_KEYWORDS_ATTR: &str = "soft_keywords";

/// Everything the derive attributes say about a grammar.
#[derive(Debug, Clone, PartialEq)]
struct Source {
    text: String,
    /// Set when the grammar came from a file, so that the file can be tracked
    /// as a build input.
    path: Option<PathBuf>,
    reserved: Vec<String>,
    soft: Vec<String>,
}

pub fn generate(ast: DeriveInput) -> TokenStream {
    match try_generate(&ast) {
        Ok(ts) => ts,
        Err(e) => syn::Error::new_spanned(&ast.ident, e).to_compile_error(),
    }
}

fn try_generate(ast: &DeriveInput) -> Result<TokenStream> {
    let source = source_from_ast(ast)?;
    let grammar: Grammar = source.text.parse()?;

    // Compile once here so grammar mistakes fail the build.
    let keywords = Keywords::new(source.reserved.iter(), source.soft.iter())?;
    packrat::Grammar::new(&grammar, keywords)?;

    let generated_rules = generate_rule_enum(&grammar)?;
    let generated_impl = generate_impl(&ast.ident, &ast.generics, &source);

    Ok(quote! {
        #generated_rules
        #generated_impl
    })
}

/// String values of every attribute with the given name.
fn string_attrs(ast: &DeriveInput, name: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for attr in ast.attrs.iter().filter(|attr| attr.path.is_ident(name)) {
        match attr.parse_meta()? {
            Meta::NameValue(val) => match val.lit {
                Lit::Str(s) => values.push(s.value()),
                _ => return Err(DeriveError::NotAString(name.to_owned())),
            },
            _ => return Err(DeriveError::NotAString(name.to_owned())),
        }
    }
    Ok(values)
}

fn words(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split_whitespace())
        .map(str::to_owned)
        .collect()
}

/// Load a grammar source from the derive attributes.
///
/// There must be exactly 1 attribute specifying the grammar. It may either be
/// written inline, or be a path to an ebnf file relative to the crate root.
fn source_from_ast(ast: &DeriveInput) -> Result<Source> {
    let files = string_attrs(ast, EBNF_FILE_ATTR)?;
    let inline = string_attrs(ast, EBNF_INLINE_ATTR)?;

    let (text, path) = match (files.as_slice(), inline.as_slice()) {
        ([], []) => return Err(DeriveError::MissingGrammarSource),
        ([file], []) => {
            let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
            let path = Path::new(&root).join(file);
            let text = fs::read_to_string(&path).map_err(|e| DeriveError::ReadFile {
                path: path.to_string_lossy().into_owned(),
                message: e.to_string(),
            })?;
            (text, Some(path))
        }
        ([], [text]) => (text.clone(), None),
        _ => return Err(DeriveError::MultipleGrammarSources),
    };

    Ok(Source {
        text,
        path,
        reserved: words(string_attrs(ast, RESERVED_KEYWORDS_ATTR)?),
        soft: words(string_attrs(ast, SOFT_KEYWORDS_ATTR)?),
    })
}

/// Generate the `GrammarSource` implementation.
fn generate_impl(name: &Ident, generics: &Generics, source: &Source) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let text = &source.text;
    let reserved = &source.reserved;
    let soft = &source.soft;

    let track_file = source.path.as_ref().map(|path| {
        let path = path.to_string_lossy();
        quote! {
            const _: &[u8] = include_bytes!(#path);
        }
    });

    quote! {
        #track_file

        impl #impl_generics ::packrat::GrammarSource for #name #ty_generics #where_clause {
            const EBNF: &'static str = #text;
            const RESERVED_KEYWORDS: &'static [&'static str] = &[ #( #reserved ),* ];
            const SOFT_KEYWORDS: &'static [&'static str] = &[ #( #soft ),* ];
        }
    }
}

fn rule_ident(name: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name).map_err(|_| DeriveError::InvalidRuleName(name.to_owned()))
}

/// Generate enum variants for each rule.
fn generate_rule_enum(grammar: &Grammar) -> Result<TokenStream> {
    let names: Vec<&str> = grammar.rules.iter().map(|rule| rule.lhs.name.as_str()).collect();
    let idents = names
        .iter()
        .map(|name| rule_ident(name))
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        #[allow(non_camel_case_types)]
        #[derive(Copy, Debug, Eq, Clone, PartialEq, Hash)]
        pub enum Rule {
            #( #idents ),*
        }

        impl Rule {
            pub const ALL: &'static [Rule] = &[ #( Rule::#idents ),* ];

            /// The rule's name in the grammar.
            pub fn name(self) -> &'static str {
                match self {
                    #( Rule::#idents => #names ),*
                }
            }
        }
    })
}
