//! `{name}` placeholder parsing for catalog filter expansion.
//!
//! `{{` and `}}` stand for literal braces.

use thiserror::Error;

/// One piece of a parsed placeholder string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Literal text, with brace escapes already resolved.
    Text(String),
    /// A placeholder name, without the braces.
    Name(&'a str),
}

/// Syntax errors in a placeholder string. Offsets are byte offsets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaceholderError {
    /// An opening brace with no closing brace.
    #[error("unterminated placeholder at offset {offset}")]
    Unterminated {
        /// Offset of the opening brace.
        offset: usize,
    },
    /// A closing brace with no opening brace.
    #[error("unmatched '}}' at offset {offset}")]
    StrayBrace {
        /// Offset of the closing brace.
        offset: usize,
    },
    /// A placeholder whose name is empty or not an identifier.
    #[error("invalid placeholder name {name:?} at offset {offset}")]
    InvalidName {
        /// Offset of the opening brace.
        offset: usize,
        /// The offending name.
        name: String,
    },
}

/// Splits `input` into literal text and placeholder names.
///
/// # Errors
///
/// Returns an error on unbalanced braces or a malformed placeholder name.
pub fn parse(input: &str) -> Result<Vec<Piece<'_>>, PlaceholderError> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '{' if chars.next_if(|&(_, c)| c == '{').is_some() => text.push('{'),
            '}' if chars.next_if(|&(_, c)| c == '}').is_some() => text.push('}'),
            '{' => {
                let rest = &input[offset + 1..];
                let end = rest.find('}').ok_or(PlaceholderError::Unterminated { offset })?;
                let name = rest[..end].trim();
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(PlaceholderError::InvalidName { offset, name: name.to_string() });
                }
                if !text.is_empty() {
                    pieces.push(Piece::Text(std::mem::take(&mut text)));
                }
                pieces.push(Piece::Name(name));
                let close = offset + 1 + end;
                while chars.next_if(|&(i, _)| i <= close).is_some() {}
            }
            '}' => return Err(PlaceholderError::StrayBrace { offset }),
            _ => text.push(ch),
        }
    }

    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
    Ok(pieces)
}
