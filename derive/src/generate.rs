use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Attribute, DeriveInput, Ident, Lit, Meta};

use grammar::action::{self, Segment};
use grammar::{Grammar, GrammarError, Instruction, NonTerminal, Rule, Symbol};

use crate::error::{DeriveError, Result};

const GRAMMAR_FILE_ATTR: &str = "grammar_file";
const GRAMMAR_INLINE_ATTR: &str = "grammar_inline";

/// Grammar text and, for file sources, where it was read from.
struct Source {
    text: String,
    path: Option<PathBuf>,
}

pub fn generate(ast: DeriveInput) -> Result<TokenStream> {
    let source = grammar_source(&ast)?;
    let grammar: Grammar = source.text.parse()?;
    check_actions(&grammar)?;

    let name = ast.ident;
    let module = Ident::new(
        &format!("__{}_rules", name.to_string().to_lowercase()),
        Span::call_site(),
    );
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // Rebuild when the grammar file changes.
    let tracker = source.path.map(|path| {
        let path = path.to_string_lossy().into_owned();
        quote! {
            const _: &str = include_str!(#path);
        }
    });

    let gen_rules: Vec<TokenStream> = grammar
        .non_terminals()
        .map(|(_, nt)| generate_rule_function(&grammar, nt))
        .collect();
    let gen_methods = generate_export_methods(&grammar, &module);
    let gen_parser = match grammar.exports() {
        [export] => {
            let rule = rule_ident(&grammar[*export].name);
            quote! {
                impl #impl_generics ::parsegen::Parser for #name #ty_generics #where_clause {
                    fn parse(input: &str) -> ::std::result::Result<::std::string::String, ::parsegen::Error> {
                        ::parsegen::run(input, #module::#rule)
                    }
                }
            }
        }
        _ => quote! {},
    };

    Ok(quote! {
        #[allow(non_snake_case, unused_labels, unused_mut, dead_code)]
        mod #module {
            #tracker
            #( #gen_rules )*
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #( #gen_methods )*
        }

        #gen_parser
    })
}

/// Load a grammar from a derive attribute.
///
/// There must be exactly 1 attribute specifying the grammar source. The source
/// may either be written inline, or be a path to a grammar file relative to
/// the crate root.
fn grammar_source(ast: &DeriveInput) -> Result<Source> {
    let sources: Vec<&Attribute> = ast
        .attrs
        .iter()
        .filter(|attr| match attr.parse_meta() {
            Ok(Meta::NameValue(val)) => {
                val.path.is_ident(GRAMMAR_FILE_ATTR) || val.path.is_ident(GRAMMAR_INLINE_ATTR)
            }
            _ => false,
        })
        .collect();

    let source_attr = match sources.len() {
        0 => return Err(DeriveError::MissingGrammarSource),
        1 => sources[0],
        _ => return Err(DeriveError::MultipleGrammarSources),
    };

    let val = match source_attr.parse_meta()? {
        Meta::NameValue(val) => val,
        _ => return Err(DeriveError::NotAString),
    };
    let s = match val.lit {
        Lit::Str(s) => s.value(),
        _ => return Err(DeriveError::NotAString),
    };

    if val.path.is_ident(GRAMMAR_FILE_ATTR) {
        let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
        let path = Path::new(&root).join(&s);
        let text = fs::read_to_string(&path).map_err(|e| DeriveError::ReadFile {
            path: path.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;
        Ok(Source {
            text,
            path: Some(path),
        })
    } else {
        Ok(Source { text: s, path: None })
    }
}

/// Reject `$N` and `$iN` markers pointing past the symbols matched before
/// them, which the interpreter only reports at run time.
fn check_actions(grammar: &Grammar) -> Result<()> {
    for (_, nt) in grammar.non_terminals() {
        for rule in &nt.rules {
            let mut non_terminals = 0;
            let mut matched = 0;
            for symbol in &rule.symbols {
                match symbol {
                    Symbol::NonTerminal(_) => {
                        non_terminals += 1;
                        matched += 1;
                    }
                    Symbol::Terminal(_) => matched += 1,
                    Symbol::Instruction(_) => {}
                    Symbol::Code(code) => {
                        for segment in action::segments(code)? {
                            let (marker, index, available) = match segment {
                                Segment::Output(n) => (format!("${}", n), n, non_terminals),
                                Segment::Input(n) => (format!("$i{}", n), n, matched),
                                Segment::Text(_) | Segment::Dollar => continue,
                            };
                            if index > available {
                                return Err(GrammarError::ActionIndex {
                                    code: code.clone(),
                                    marker,
                                    index,
                                    available,
                                }
                                .into());
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn rule_ident(name: &str) -> Ident {
    format_ident!("rule_{}", name)
}

/// Generate a `parse_<name>` method for each exported non-terminal.
fn generate_export_methods(grammar: &Grammar, module: &Ident) -> Vec<TokenStream> {
    grammar
        .exports()
        .iter()
        .map(|id| {
            let name = &grammar[*id].name;
            let method = format_ident!("parse_{}", name);
            let rule = rule_ident(name);
            let doc = format!("Parse `input` starting from `{}`.", name);
            quote! {
                #[doc = #doc]
                #[allow(non_snake_case)]
                pub fn #method(input: &str) -> ::std::result::Result<::std::string::String, ::parsegen::Error> {
                    ::parsegen::run(input, #module::#rule)
                }
            }
        })
        .collect()
}

/// Generates a rule function for the provided non-terminal. Alternatives are
/// tried in order; the first one to match commits.
fn generate_rule_function(grammar: &Grammar, nt: &NonTerminal) -> TokenStream {
    let name = rule_ident(&nt.name);
    let gen_alternatives: Vec<TokenStream> = nt
        .rules
        .iter()
        .map(|rule| generate_alternative(grammar, rule))
        .collect();

    quote! {
        pub fn #name(
            cursor: &mut ::parsegen::Position<'_>,
            out: &mut ::std::string::String,
        ) -> ::std::result::Result<bool, ::parsegen::Error> {
            #(
                let mut attempt = ::parsegen::Attempt::new(*cursor);
                let matched = 'alt: {
                    #gen_alternatives
                    true
                };
                if matched {
                    attempt.commit(cursor, out);
                    return ::std::result::Result::Ok(true);
                }
            )*
            ::std::result::Result::Ok(false)
        }
    }
}

fn generate_alternative(grammar: &Grammar, rule: &Rule) -> TokenStream {
    let gen_symbols = rule.symbols.iter().map(|symbol| match symbol {
        Symbol::NonTerminal(id) => {
            let rule = rule_ident(&grammar[*id].name);
            quote! {
                if !attempt.non_terminal(#rule)? {
                    break 'alt false;
                }
            }
        }
        Symbol::Terminal(literal) => quote! {
            if !attempt.terminal(#literal) {
                break 'alt false;
            }
        },
        Symbol::Code(code) => quote! {
            attempt.code(#code)?;
        },
        Symbol::Instruction(instr) => {
            let gen_instr = generate_instruction(instr);
            quote! {
                attempt.instruction(#gen_instr);
            }
        }
    });

    quote! {
        #( #gen_symbols )*
    }
}

fn generate_instruction(instr: &Instruction) -> TokenStream {
    match instr {
        Instruction::To(name) => quote! {
            ::parsegen::Instruction::To(::std::string::String::from(#name))
        },
        Instruction::Set => quote! { ::parsegen::Instruction::Set },
        Instruction::Range => quote! { ::parsegen::Instruction::Range },
        Instruction::NotSet => quote! { ::parsegen::Instruction::NotSet },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_str;

    fn derive_input(def: &str) -> DeriveInput {
        parse_str(def).unwrap()
    }

    #[test]
    fn generate_print() {
        let ast = derive_input(
            "
            #[derive(Parser)]
            #[grammar_inline = \"<export> S = A {$1} ; A = 'a' {$i1} ;\"]
            struct Dummy;
            ",
        );
        let ts = generate(ast).unwrap();
        println!("Generated:\n{}", ts);
    }

    #[test]
    fn load_simple_inline_grammar() {
        let ast = derive_input(
            "
            #[grammar_inline = \"<export> a = b ; b = 'b' ;\"]
            struct Dummy;
            ",
        );
        let source = grammar_source(&ast).unwrap();
        assert_eq!(source.text, "<export> a = b ; b = 'b' ;");
        assert_eq!(source.path, None);
    }

    #[test]
    fn missing_grammar_source() {
        let ast = derive_input("struct Dummy;");
        let err = grammar_source(&ast).err().unwrap();
        assert_eq!(err, DeriveError::MissingGrammarSource);
    }

    #[test]
    fn multiple_grammar_sources() {
        let ast = derive_input(
            "
            #[grammar_inline = \"S = 'a' ;\"]
            #[grammar_file = \"s.rspt\"]
            struct Dummy;
            ",
        );
        let err = grammar_source(&ast).err().unwrap();
        assert_eq!(err, DeriveError::MultipleGrammarSources);
    }

    #[test]
    fn grammar_source_not_a_string() {
        let ast = derive_input(
            "
            #[grammar_inline = 3]
            struct Dummy;
            ",
        );
        let err = grammar_source(&ast).err().unwrap();
        assert_eq!(err, DeriveError::NotAString);
    }

    #[test]
    fn missing_grammar_file() {
        let ast = derive_input(
            "
            #[grammar_file = \"does/not/exist.rspt\"]
            struct Dummy;
            ",
        );
        let err = grammar_source(&ast).err().unwrap();
        assert!(matches!(err, DeriveError::ReadFile { .. }), "got {:?}", err);
    }

    #[test]
    fn invalid_grammar() {
        let ast = derive_input(
            "
            #[grammar_inline = \"<export> S = T ;\"]
            struct Dummy;
            ",
        );
        let err = generate(ast).err().unwrap();
        assert_eq!(
            err,
            DeriveError::Grammar(GrammarError::Undefined("T".to_owned()).into())
        );
    }

    #[test]
    fn action_checks() {
        let tests = vec![
            ("<export> S = 'a' {$i1} A {$1$i2} ; A = ;", true),
            ("<export> S = {$$} ;", true),
            ("<export> S = 'a' {$1} ;", false),
            ("<export> S = 'a' {$i2} ;", false),
            ("<export> S = <set> 'ab' {$i1} ;", true),
        ];
        for test in tests {
            let g: Grammar = test.0.parse().unwrap();
            assert_eq!(check_actions(&g).is_ok(), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn invalid_action_syntax() {
        let ast = derive_input(
            "
            #[grammar_inline = \"<export> S = 'a' | 'b' {$x} ;\"]
            struct Dummy;
            ",
        );
        let err = generate(ast).err().unwrap();
        assert_eq!(
            err,
            DeriveError::Grammar(
                GrammarError::InvalidAction {
                    code: "$x".to_owned(),
                    offset: 0,
                }
                .into()
            )
        );
    }

    #[test]
    fn parser_impl_only_for_single_export() {
        let single = derive_input(
            "
            #[grammar_inline = \"<export> S = 'a' ;\"]
            struct Single;
            ",
        );
        let ts = generate(single).unwrap().to_string();
        assert!(ts.contains("parsegen :: Parser for Single"), "{}", ts);
        assert!(ts.contains("fn parse_S"), "{}", ts);

        let multi = derive_input(
            "
            #[grammar_inline = \"<export> S = 'a' ; <export> T = 'b' ;\"]
            struct Multi;
            ",
        );
        let ts = generate(multi).unwrap().to_string();
        assert!(!ts.contains("parsegen :: Parser for"), "{}", ts);
        assert!(ts.contains("fn parse_S"), "{}", ts);
        assert!(ts.contains("fn parse_T"), "{}", ts);
    }

    #[test]
    fn rule_function_per_non_terminal() {
        let g: Grammar = "S = A 'x' | <range> 'az' ; A = {a} ;".parse().unwrap();
        let (_, s) = g.non_terminals().next().unwrap();
        let ts = generate_rule_function(&g, s).to_string();
        assert!(ts.contains("pub fn rule_S"), "{}", ts);
        assert!(ts.contains("attempt . non_terminal (rule_A)"), "{}", ts);
        assert!(ts.contains("attempt . terminal (\"x\")"), "{}", ts);
        assert!(ts.contains("parsegen :: Instruction :: Range"), "{}", ts);
    }
}
