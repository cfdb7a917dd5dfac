//! The tagged argument: a literal, a variable reference, a type name
//! (`READ`'s second operand), or a label reference.

use crate::frame::FrameTag;
use crate::value::Value;

/// The four kinds of argument an instruction can carry, each positioned at
/// a 1-based index in 1..=3.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgKind {
    Literal(Value),
    Var(FrameTag, String),
    Type(TypeTag),
    Label(String),
}

/// The `type` literal used by `READ`'s second argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    Str,
    Bool,
    Nil,
}

impl TypeTag {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "int" => TypeTag::Int,
            "string" => TypeTag::Str,
            "bool" => TypeTag::Bool,
            "nil" => TypeTag::Nil,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub kind: ArgKind,
    pub index: usize,
}

impl Argument {
    pub fn new(kind: ArgKind, index: usize) -> Self {
        Argument { kind, index }
    }

    pub fn literal(value: Value, index: usize) -> Self {
        Argument::new(ArgKind::Literal(value), index)
    }

    pub fn var(tag: FrameTag, name: impl Into<String>, index: usize) -> Self {
        Argument::new(ArgKind::Var(tag, name.into()), index)
    }

    pub fn label(name: impl Into<String>, index: usize) -> Self {
        Argument::new(ArgKind::Label(name.into()), index)
    }

    pub fn type_tag(tag: TypeTag, index: usize) -> Self {
        Argument::new(ArgKind::Type(tag), index)
    }

    pub fn as_label(&self) -> Option<&str> {
        match &self.kind {
            ArgKind::Label(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<(FrameTag, &str)> {
        match &self.kind {
            ArgKind::Var(tag, name) => Some((*tag, name.as_str())),
            _ => None,
        }
    }

    pub fn as_type_tag(&self) -> Option<TypeTag> {
        match &self.kind {
            ArgKind::Type(t) => Some(*t),
            _ => None,
        }
    }
}
