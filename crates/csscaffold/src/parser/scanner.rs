//! Declaration scanner using the `cssparser` crate.
//!
//! The scanner does not build a stylesheet model. It walks the token stream,
//! remembers the selector of each rule and records the byte range of every
//! `name: value;` declaration so that the rewriter can splice replacement
//! text into the untouched source.

use std::ops::Range;

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

/// At-rules whose blocks contain nested rules rather than declarations.
const GROUPING_AT_RULES: &[&str] = &["media", "supports", "document", "layer", "container"];

/// A single `property: value` pair found in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, lowercased.
    pub name: String,
    /// Value with surrounding whitespace removed.
    pub value: String,
    /// Selector (or at-rule prelude) of the enclosing block.
    pub selector: String,
    /// Byte range of the declaration in the source, including its semicolon.
    pub span: Range<usize>,
}

impl Declaration {
    /// The declaration text exactly as written in `css`.
    pub fn raw<'a>(&self, css: &'a str) -> &'a str {
        &css[self.span.clone()]
    }
}

/// What the next token means for the scanner.
enum Step {
    Block,
    Semicolon,
    Colon,
    AtKeyword(String),
    Ident(String),
    Other,
    End,
}

fn step<'i>(parser: &mut Parser<'i, '_>) -> Step {
    match parser.next() {
        Ok(Token::CurlyBracketBlock) => Step::Block,
        Ok(Token::Semicolon) => Step::Semicolon,
        Ok(Token::Colon) => Step::Colon,
        Ok(Token::AtKeyword(name)) => Step::AtKeyword(name.to_ascii_lowercase()),
        Ok(Token::Ident(name)) => Step::Ident(name.to_string()),
        Ok(_) => Step::Other,
        Err(_) => Step::End,
    }
}

/// Find every declaration in `css`, in source order.
///
/// Malformed input never fails the scan: tokens that do not form a
/// declaration are skipped up to the next `;`.
pub fn scan_declarations(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    scan_rule_list(&mut parser, css, &mut declarations);

    declarations
}

fn scan_rule_list<'i>(parser: &mut Parser<'i, '_>, css: &str, out: &mut Vec<Declaration>) {
    loop {
        parser.skip_whitespace();
        let prelude_start = parser.position().byte_index();
        let mut at_rule: Option<String> = None;
        let mut first = true;

        let prelude_end = loop {
            match step(parser) {
                // The position is just past the `{`.
                Step::Block => break Some(parser.position().byte_index() - 1),
                Step::Semicolon => break None,
                Step::End => return,
                Step::AtKeyword(name) if first => at_rule = Some(name),
                _ => {}
            }
            first = false;
        };

        // `None` is a statement at-rule such as `@import url(a.css);`.
        let Some(prelude_end) = prelude_end else {
            continue;
        };

        let selector = css[prelude_start..prelude_end].trim().to_string();
        let nested_rules = at_rule
            .as_deref()
            .is_some_and(|name| GROUPING_AT_RULES.contains(&name));

        let _ = parser.parse_nested_block(|block| {
            if nested_rules {
                scan_rule_list(block, css, out);
            } else {
                scan_block(block, css, &selector, out);
            }
            Ok::<_, CssParseError<'_, ()>>(())
        });
    }
}

fn scan_block<'i>(
    parser: &mut Parser<'i, '_>,
    css: &str,
    selector: &str,
    out: &mut Vec<Declaration>,
) {
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            return;
        }

        let start = parser.position().byte_index();
        let name = match step(parser) {
            Step::Ident(name) => name,
            Step::Semicolon => continue,
            Step::End => return,
            _ => {
                skip_declaration(parser);
                continue;
            }
        };

        match step(parser) {
            Step::Colon => {}
            Step::Semicolon => continue,
            Step::End => return,
            _ => {
                skip_declaration(parser);
                continue;
            }
        }

        let value_start = parser.position().byte_index();
        let (value_end, end) = loop {
            match step(parser) {
                Step::Semicolon => {
                    let end = parser.position().byte_index();
                    break (end - 1, end);
                }
                Step::End => {
                    let block_end = parser.position().byte_index();
                    let end = value_start + css[value_start..block_end].trim_end().len();
                    break (end, end);
                }
                _ => {}
            }
        };

        let value = css[value_start..value_end].trim();
        if value.is_empty() {
            tracing::debug!("Skipping empty declaration '{}' in '{}'", name, selector);
            continue;
        }

        out.push(Declaration {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
            selector: selector.to_string(),
            span: start..end,
        });
    }
}

/// Skip to the end of the current declaration (error recovery).
fn skip_declaration(parser: &mut Parser<'_, '_>) {
    loop {
        match step(parser) {
            Step::Semicolon | Step::End => return,
            _ => {}
        }
    }
}
