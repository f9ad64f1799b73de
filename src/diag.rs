use std::error::Error;
use std::fmt;

/// Line number (starting at one).
pub type Line = u32;

/// A line-annotated compile-time error from the scanner or parser.
#[derive(Debug, PartialEq)]
pub struct Diagnostic {
    pub line: Line,
    pub location: ErrorLocation,
    pub message: String,
}

/// Where in the source a diagnostic points.
///
/// Scanner errors carry no token, parser errors name the offending lexeme
/// or `end` when the token stream ran out.
#[derive(Debug, PartialEq)]
pub enum ErrorLocation {
    Scan,
    End,
    Lexeme(String),
}

impl Diagnostic {
    pub fn scan(line: Line, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            line,
            location: ErrorLocation::Scan,
            message: message.into(),
        }
    }

    pub fn at_end(line: Line, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            line,
            location: ErrorLocation::End,
            message: message.into(),
        }
    }

    pub fn at_lexeme(line: Line, lexeme: &str, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            line,
            location: ErrorLocation::Lexeme(lexeme.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            ErrorLocation::Scan => write!(f, "[line {}] Error: {}", self.line, self.message),
            ErrorLocation::End => write!(f, "[line {}] Error at end: {}", self.line, self.message),
            ErrorLocation::Lexeme(lexeme) => write!(
                f,
                "[line {}] Error at '{}': {}",
                self.line, lexeme, self.message
            ),
        }
    }
}

impl Error for Diagnostic {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
