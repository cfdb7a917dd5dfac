//! The executor: per-opcode typing, evaluation, and control-flow effects.
//!
//! Dispatch is a single `match` on [`Opcode`] in [`ops::dispatch`]; there is
//! no per-opcode type or trait.

mod ops;

use std::io::{BufRead, Write};

use tracing::trace;

use crate::error::Error;
use crate::frame::FrameStack;
use crate::labels::{ExecutionState, LabelTable};
use crate::numeric::parse_ippcode_int;
use crate::opcode::Opcode;
use crate::program::{ArgKind, Argument, Program, TypeTag};
use crate::value::{decode_string_escapes, Value};

/// Runs a loaded [`Program`] to completion.
///
/// `In`/`Out`/`Err` are the injected input/stdout/stderr streams — owned by
/// the caller (the CLI front-end). The interpreter only ever reads from
/// `input` and writes to `stdout`/`stderr`; it never opens or closes a file
/// itself.
pub struct Interpreter<In, Out, Err> {
    program: Program,
    labels: LabelTable,
    state: ExecutionState,
    frames: FrameStack,
    data_stack: Vec<Value>,
    input: In,
    stdout: Out,
    stderr: Err,
}

impl<In: BufRead, Out: Write, Err: Write> Interpreter<In, Out, Err> {
    pub fn new(program: Program, input: In, stdout: Out, stderr: Err) -> Result<Self, Error> {
        let labels = LabelTable::scan(&program)?;
        Ok(Interpreter {
            program,
            labels,
            state: ExecutionState::new(),
            frames: FrameStack::new(),
            data_stack: Vec::new(),
            input,
            stdout,
            stderr,
        })
    }

    /// Runs until the program falls off the end (exit code 0) or `EXIT`
    /// fires (its own code, 0..=49).
    pub fn run(&mut self) -> Result<i32, Error> {
        loop {
            if self.state.ip >= self.program.len() {
                self.stdout.flush().ok();
                return Ok(0);
            }
            let instr = self.program.instructions()[self.state.ip].clone();
            trace!(ip = self.state.ip, opcode = %instr.opcode, order = instr.order, "dispatch");
            match self.dispatch(&instr).map_err(|e| e.with_context(instr.at())) {
                Ok(Some(code)) => {
                    self.stdout.flush().ok();
                    return Ok(code);
                }
                Ok(None) => {}
                Err(e) => {
                    self.stdout.flush().ok();
                    return Err(e);
                }
            }
            // Uniform post-step: every dispatched instruction, jumps and
            // calls included, is followed by this same increment. Labels
            // resolve to the `LABEL` instruction's own index, so this step
            // is what lands execution on the instruction right after it.
            self.state.ip += 1;
        }
    }

    /// Resolves an argument's type name: the literal's own tag, or the
    /// current type of the variable it names. `Undef` is error 56;
    /// unknown variable is 54; inactive frame is 55.
    fn read_type(&self, arg: &Argument) -> Result<&'static str, Error> {
        match &arg.kind {
            ArgKind::Literal(v) => Ok(v.type_name()),
            ArgKind::Var(tag, name) => self.frames.type_of(*tag, name),
            ArgKind::Type(_) | ArgKind::Label(_) => {
                Err(Error::Internal("read_type called on a non-symb argument".into()))
            }
        }
    }

    /// Resolves an argument's value, cloning it out of its frame slot if
    /// it's a variable reference.
    fn read_value(&self, arg: &Argument) -> Result<Value, Error> {
        match &arg.kind {
            ArgKind::Literal(v) => Ok(v.clone()),
            ArgKind::Var(tag, name) => self.frames.value_of(*tag, name).cloned(),
            ArgKind::Type(_) | ArgKind::Label(_) => {
                Err(Error::Internal("read_value called on a non-symb argument".into()))
            }
        }
    }

    /// Writes `value` into the variable `arg` names. `arg` must be a
    /// variable reference, otherwise this is a type error (53).
    fn write_value(&mut self, arg: &Argument, value: Value) -> Result<(), Error> {
        match &arg.kind {
            ArgKind::Var(tag, name) => self.frames.set(*tag, name, value),
            _ => Err(Error::TypeMismatch("write target is not a variable".into(), None)),
        }
    }

    fn dispatch(&mut self, instr: &crate::program::Instruction) -> Result<Option<i32>, Error> {
        ops::dispatch(self, instr)
    }
}

/// Decode `\DDD` escapes and validate against the `READ int`/`bool` grammars.
/// Kept here (rather than in `value.rs`) because it's specific to the READ
/// opcode's input-line handling, not the value model in general.
fn read_typed_line(line: &str, wanted: TypeTag) -> Value {
    match wanted {
        TypeTag::Int => match parse_ippcode_int(line) {
            Some(n) => Value::Int(n),
            None => Value::Nil,
        },
        TypeTag::Str => Value::Str(decode_string_escapes(line)),
        TypeTag::Bool => Value::Bool(line.eq_ignore_ascii_case("true")),
        TypeTag::Nil => Value::Nil,
    }
}
