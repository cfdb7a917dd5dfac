//! Interpreter for IPPcode22, a three-address assembly-like language
//! delivered as an XML document.
//!
//! The core is [`interp::Interpreter`], driven by a [`program::Program`]
//! loaded from XML via [`xml::load_program`].

pub mod cli;
pub mod error;
pub mod frame;
pub mod interp;
pub mod labels;
pub mod numeric;
pub mod opcode;
pub mod program;
pub mod value;
pub mod xml;

pub use error::Error;
pub use interp::Interpreter;
pub use program::Program;
