use std::{collections::HashMap, fmt};

use strum_macros::EnumIter;

use crate::token::TokenKind;

/// Primitive value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Prim {
    Int,
    Dec,
    Str,
    Char,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    List,
    Set,
}

/// The semantic meaning of a type annotation. TypeNodes resolve to these
/// during checking.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Prim(Prim),
    /// Function return type only
    Void,
    /// Type of the null literal
    Null,
    Compound {
        kind: CompoundKind,
        args: Vec<Type>,
    },
    Func {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    Class(ClassType),
}

/// A declared class. Member lookup reads the direct maps only, the
/// superclass chain is stored but never walked.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: String,
    pub fields: HashMap<String, Type>,
    pub methods: HashMap<String, Type>,
    pub superclass: Option<String>,
    /// Placeholder for a forward reference. Replaced exactly once when the
    /// real declaration is processed.
    pub dummy: bool,
}

impl ClassType {
    pub fn placeholder(name: &str, superclass: Option<String>) -> Self {
        Self {
            name: name.to_owned(),
            fields: HashMap::new(),
            methods: HashMap::new(),
            superclass,
            dummy: true,
        }
    }
}

impl PartialEq for ClassType {
    /// Class types are nominal
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Type {
    pub fn as_prim(&self) -> Option<Prim> {
        match self {
            Type::Prim(p) => Some(*p),
            _ => None,
        }
    }

    pub fn list_of(elem: Type) -> Type {
        Type::Compound {
            kind: CompoundKind::List,
            args: vec![elem],
        }
    }

    pub fn set_of(elem: Type) -> Type {
        Type::Compound {
            kind: CompoundKind::Set,
            args: vec![elem],
        }
    }
}

/// Map a primitive type keyword to its semantic type.
pub fn token_to_prim(kind: &TokenKind) -> Option<Prim> {
    match kind {
        TokenKind::IntType => Some(Prim::Int),
        TokenKind::DecType => Some(Prim::Dec),
        TokenKind::StringType => Some(Prim::Str),
        TokenKind::CharType => Some(Prim::Char),
        TokenKind::BoolType => Some(Prim::Bool),
        _ => None,
    }
}

/// The type keyword for a primitive. Inverse of token_to_prim.
pub fn prim_to_token(prim: Prim) -> TokenKind {
    match prim {
        Prim::Int => TokenKind::IntType,
        Prim::Dec => TokenKind::DecType,
        Prim::Str => TokenKind::StringType,
        Prim::Char => TokenKind::CharType,
        Prim::Bool => TokenKind::BoolType,
    }
}

impl fmt::Display for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Prim::Int => "int",
            Prim::Dec => "dec",
            Prim::Str => "string",
            Prim::Char => "char",
            Prim::Bool => "bool",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for CompoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundKind::List => write!(f, "list"),
            CompoundKind::Set => write!(f, "set"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Prim(p) => write!(f, "{}", p),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Compound { kind, args } => {
                let args_str = args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}<{}>", kind, args_str)
            }
            Type::Func { params, ret } => {
                let params_str = params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "func({}) {}", params_str, ret)
            }
            Type::Class(class) => write!(f, "{}", class.name),
        }
    }
}
