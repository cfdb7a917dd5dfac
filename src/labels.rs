//! Label table and execution state.
//!
//! [`LabelTable`] is read-only once the load-time label scan finishes, while
//! [`ExecutionState`] (instruction pointer, call stack) mutates on every
//! dispatched instruction — kept as two separate types so one doesn't grow
//! mutability the other doesn't need.

use std::collections::HashMap;

use crate::error::Error;
use crate::opcode::Opcode;
use crate::program::Program;

#[derive(Debug, Default)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    /// Scans `program` for `LABEL` instructions, recording each label's own
    /// instruction index. The executor's uniform post-step `ip += 1` after
    /// every dispatch is what turns this into fall-through-after-`LABEL`
    /// semantics — see [`crate::interp::Interpreter::run`].
    pub fn scan(program: &Program) -> Result<Self, Error> {
        let mut labels = HashMap::new();
        for (index, instr) in program.instructions().iter().enumerate() {
            if instr.opcode == Opcode::Label {
                let name = instr.args[0]
                    .as_label()
                    .ok_or_else(|| Error::Internal("LABEL argument is not a label".into()))?;
                if labels.insert(name.to_string(), index).is_some() {
                    return Err(Error::Redefinition(format!("label `{name}` already defined"), None));
                }
            }
        }
        Ok(LabelTable { labels })
    }

    pub fn resolve(&self, name: &str) -> Result<usize, Error> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| Error::Redefinition(format!("label `{name}` is not defined"), None))
    }
}

/// Instruction pointer and call-return stack: the part of the machine state
/// that changes on every `CALL`/`RETURN`/jump.
#[derive(Debug, Default)]
pub struct ExecutionState {
    pub ip: usize,
    call_stack: Vec<usize>,
}

impl ExecutionState {
    pub fn new() -> Self {
        ExecutionState { ip: 0, call_stack: Vec::new() }
    }

    pub fn call(&mut self, target: usize) {
        self.call_stack.push(self.ip);
        self.ip = target;
    }

    pub fn ret(&mut self) -> Result<(), Error> {
        let saved = self
            .call_stack
            .pop()
            .ok_or_else(|| Error::MissingValue("RETURN with an empty call stack".into(), None))?;
        self.ip = saved;
        Ok(())
    }

    pub fn jump(&mut self, target: usize) {
        self.ip = target;
    }
}
