mod error;
mod lexer;

pub use error::{ErrorCategory, ParseError, Position};
pub use lexer::{KEYWORDS, Token, TokenKind, TokenStream, Tokenizer, is_keyword};
