use crate::di::Injectable;
use crate::metadata::ClassRef;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// A unique, opaque token.
///
/// Two symbols created with the same description are still distinct.
/// Keep them in a `LazyLock` when several modules need to share one:
///
/// ```
/// use rapidfast::Symbol;
/// use std::sync::LazyLock;
///
/// static CLOCK: LazyLock<Symbol> = LazyLock::new(|| Symbol::new("Clock"));
/// assert_eq!(CLOCK.description(), "Clock");
/// ```
#[derive(Clone, Copy)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    pub fn new(description: &'static str) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Key under which the container stores a singleton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Class(ClassRef),
    Name(String),
    Symbol(Symbol),
}

impl Token {
    /// Token of an injectable class; resolving it may construct the class.
    pub fn of<T: Injectable>() -> Self {
        Token::Class(ClassRef::injectable::<T>())
    }

    /// Token of any type, including trait objects. Never auto-constructs.
    pub fn of_dyn<T: ?Sized + 'static>() -> Self {
        Token::Class(ClassRef::opaque::<T>())
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Class(class) => f.write_str(class.name()),
            Token::Name(name) => write!(f, "\"{name}\""),
            Token::Symbol(symbol) => write!(f, "{symbol:?}"),
        }
    }
}

impl From<ClassRef> for Token {
    fn from(class: ClassRef) -> Self {
        Token::Class(class)
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Name(name.to_owned())
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Name(name)
    }
}

impl From<Symbol> for Token {
    fn from(symbol: Symbol) -> Self {
        Token::Symbol(symbol)
    }
}

impl From<&Symbol> for Token {
    fn from(symbol: &Symbol) -> Self {
        Token::Symbol(*symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_unique() {
        let a = Symbol::new("Clock");
        let b = Symbol::new("Clock");
        assert_ne!(Token::from(a), Token::from(b));
        assert_eq!(Token::from(a), Token::from(&a));
    }

    #[test]
    fn display_names() {
        struct Mailer;
        assert_eq!(Token::of_dyn::<Mailer>().to_string(), "Mailer");
        assert_eq!(Token::from("API_KEY").to_string(), "\"API_KEY\"");
        assert_eq!(Token::from(Symbol::new("Clock")).to_string(), "Symbol(Clock)");
    }
}
