use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interner::{Interner, Symbol};
use crate::token::TokenKind;

/// Shared mostly read-only state that persists across pipeline stages:
/// the string interner and the keyword table.
///
/// The keyword table cannot live in a `static` because `Symbol` is not
/// `Sync`, so it is built once per context instead.
#[derive(Debug)]
pub struct Context {
    interner: RefCell<Interner>,
    keywords: HashMap<Symbol, TokenKind>,
}

impl Context {
    /// Creates a new context.
    ///
    /// Returns an `Rc` because the context is shared between the scanner,
    /// the parser, and the interpreter facade.
    pub fn new() -> Rc<Self> {
        let mut interner = Interner::new();

        let mut keywords = HashMap::new();
        for (name, kind) in KEYWORDS.iter().cloned() {
            keywords.insert(interner.symbol(name), kind);
        }

        Rc::new(Context {
            interner: RefCell::new(interner),
            keywords,
        })
    }

    /// Interns the given string if needed and returns its symbol.
    pub fn symbol(&self, name: &str) -> Symbol {
        self.interner.borrow_mut().symbol(name)
    }

    /// Returns the token kind associated with the given symbol if it is a
    /// keyword.
    pub fn keyword(&self, id: &Symbol) -> Option<TokenKind> {
        self.keywords.get(id).copied()
    }
}

/// Canonical ASCII keywords plus the emoji vocabulary. The escaped entries
/// carry a U+FE0F variation selector that would be invisible as a literal.
const KEYWORDS: [(&str, TokenKind); 23] = [
    ("and", TokenKind::And),
    ("class", TokenKind::Class),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("fun", TokenKind::Fun),
    ("if", TokenKind::If),
    ("nil", TokenKind::Nil),
    ("or", TokenKind::Or),
    ("print", TokenKind::Print),
    ("return", TokenKind::Return),
    ("super", TokenKind::Super),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
    ("\u{21a9}\u{fe0f}", TokenKind::Else),  // ↩️
    ("\u{26d4}\u{fe0f}", TokenKind::False), // ⛔️
    ("\u{1f500}", TokenKind::If),           // 🔀
    ("\u{1f4e2}", TokenKind::Print),        // 📢
    ("\u{2705}", TokenKind::True),          // ✅
    ("\u{1f381}", TokenKind::Var),          // 🎁
    ("\u{1f504}", TokenKind::While),        // 🔄
];
