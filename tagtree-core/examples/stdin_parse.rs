//! Example: tokenize and parse a document from stdin.
//!
//! Run with: cargo run --example stdin_parse < layout.xml

use std::io::Read;
use tagtree_core::{Lexer, Parser};

fn main() {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input).unwrap();

    match Lexer::from_text(&input) {
        Ok(lexer) => {
            for token in lexer.tokens() {
                match token {
                    Ok(token) => eprintln!("TOKEN: {:?} {:?} (line {})", token.kind, token.value, token.line),
                    Err(e) => eprintln!("LEX ERROR: {}", e),
                }
            }
        }
        Err(e) => eprintln!("LEX ERROR: {}", e),
    }

    match Parser::from_text(&input).and_then(Parser::parse) {
        Ok(doc) => print!("{}", doc),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
