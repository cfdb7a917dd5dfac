//! The variable frame model: global frame, local frame stack, temp slot.

use std::collections::HashMap;

use crate::error::Error;
use crate::value::Value;

/// The state of a single variable slot: either declared-but-unassigned, or
/// holding a concrete value. `Undef` is never observable as a `Value` — only
/// `TYPE` is allowed to read it, and it sees `""`.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Undef,
    Value(Value),
}

impl Slot {
    /// Type name as `TYPE` reports it: `""` for `Undef`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Undef => "",
            Slot::Value(v) => v.type_name(),
        }
    }
}

/// A named variable mapping with an active/inactive flag.
///
/// An inactive frame rejects every access with [`Error::InactiveFrame`],
/// modeling the local/temp frame's "not currently available" state without a
/// separate `Option<Frame>` wrapper at every call site.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    vars: HashMap<String, Slot>,
    active: bool,
}

impl Frame {
    pub fn new_active() -> Self {
        Frame { vars: HashMap::new(), active: true }
    }

    pub fn new_inactive() -> Self {
        Frame { vars: HashMap::new(), active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn require_active(&self, label: &str) -> Result<(), Error> {
        if self.active {
            Ok(())
        } else {
            Err(Error::InactiveFrame(format!("{label} frame is not active"), None))
        }
    }

    pub fn declare(&mut self, label: &str, name: &str) -> Result<(), Error> {
        self.require_active(label)?;
        if self.vars.contains_key(name) {
            return Err(Error::Redefinition(format!("variable `{name}` already declared"), None));
        }
        self.vars.insert(name.to_string(), Slot::Undef);
        Ok(())
    }

    /// Looks up a variable's type even if it is `Undef` (used by `TYPE`).
    pub fn type_of_undef(&self, label: &str, name: &str) -> Result<&'static str, Error> {
        self.require_active(label)?;
        self.slot(label, name).map(Slot::type_name)
    }

    pub fn type_of(&self, label: &str, name: &str) -> Result<&'static str, Error> {
        self.require_active(label)?;
        match self.slot(label, name)? {
            Slot::Undef => Err(Error::MissingValue(
                format!("variable `{name}` read before assignment"),
                None,
            )),
            Slot::Value(v) => Ok(v.type_name()),
        }
    }

    pub fn value_of(&self, label: &str, name: &str) -> Result<&Value, Error> {
        self.require_active(label)?;
        match self.slot(label, name)? {
            Slot::Undef => Err(Error::MissingValue(
                format!("variable `{name}` read before assignment"),
                None,
            )),
            Slot::Value(v) => Ok(v),
        }
    }

    pub fn set(&mut self, label: &str, name: &str, value: Value) -> Result<(), Error> {
        self.require_active(label)?;
        if !self.vars.contains_key(name) {
            return Err(Error::UndefinedVariable(format!("variable `{name}` is not declared"), None));
        }
        self.vars.insert(name.to_string(), Slot::Value(value));
        Ok(())
    }

    fn slot(&self, _label: &str, name: &str) -> Result<&Slot, Error> {
        self.vars
            .get(name)
            .ok_or_else(|| Error::UndefinedVariable(format!("variable `{name}` is not declared"), None))
    }

    /// `BREAK`'s per-frame diagnostic dump: `name -> value type`, one per
    /// line, in no particular order (matching the reference's dict
    /// iteration — `BREAK` output is a debugging aid, not a stable format).
    pub fn dump(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(name, slot)| match slot {
                Slot::Undef => format!("{name}: <undefined>"),
                Slot::Value(v) => format!("{name}: {} ({})", v.write_repr(), v.type_name()),
            })
            .collect()
    }
}

/// Which of the three frames a variable reference targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTag {
    Global,
    Local,
    Temp,
}

impl FrameTag {
    pub fn label(self) -> &'static str {
        match self {
            FrameTag::Global => "GF",
            FrameTag::Local => "LF",
            FrameTag::Temp => "TF",
        }
    }
}

/// Holds the global frame, the local-frame stack, and the detachable temp
/// slot.
///
/// The "current local frame" is just the top of `locals`, not a separately
/// tracked reference — `POPFRAME` moves that top entry into `temp` by value,
/// so there is nothing to re-point after the move.
#[derive(Debug)]
pub struct FrameStack {
    global: Frame,
    locals: Vec<Frame>,
    temp: Option<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        FrameStack { global: Frame::new_active(), locals: Vec::new(), temp: None }
    }

    fn local(&self) -> Frame {
        self.locals.last().cloned().unwrap_or_else(Frame::new_inactive)
    }

    pub fn declare(&mut self, tag: FrameTag, name: &str) -> Result<(), Error> {
        match tag {
            FrameTag::Global => self.global.declare("GF", name),
            FrameTag::Local => match self.locals.last_mut() {
                Some(f) => f.declare("LF", name),
                None => Err(Error::InactiveFrame("LF frame is not active".into(), None)),
            },
            FrameTag::Temp => match &mut self.temp {
                Some(f) => f.declare("TF", name),
                None => Err(Error::InactiveFrame("TF frame is not active".into(), None)),
            },
        }
    }

    pub fn type_of_undef(&self, tag: FrameTag, name: &str) -> Result<&'static str, Error> {
        match tag {
            FrameTag::Global => self.global.type_of_undef("GF", name),
            FrameTag::Local => self.require_local()?.type_of_undef("LF", name),
            FrameTag::Temp => self.require_temp()?.type_of_undef("TF", name),
        }
    }

    pub fn type_of(&self, tag: FrameTag, name: &str) -> Result<&'static str, Error> {
        match tag {
            FrameTag::Global => self.global.type_of("GF", name),
            FrameTag::Local => self.require_local()?.type_of("LF", name),
            FrameTag::Temp => self.require_temp()?.type_of("TF", name),
        }
    }

    pub fn value_of(&self, tag: FrameTag, name: &str) -> Result<&Value, Error> {
        match tag {
            FrameTag::Global => self.global.value_of("GF", name),
            FrameTag::Local => self.require_local()?.value_of("LF", name),
            FrameTag::Temp => self.require_temp()?.value_of("TF", name),
        }
    }

    pub fn set(&mut self, tag: FrameTag, name: &str, value: Value) -> Result<(), Error> {
        match tag {
            FrameTag::Global => self.global.set("GF", name, value),
            FrameTag::Local => match self.locals.last_mut() {
                Some(f) => f.set("LF", name, value),
                None => Err(Error::InactiveFrame("LF frame is not active".into(), None)),
            },
            FrameTag::Temp => match &mut self.temp {
                Some(f) => f.set("TF", name, value),
                None => Err(Error::InactiveFrame("TF frame is not active".into(), None)),
            },
        }
    }

    fn require_local(&self) -> Result<&Frame, Error> {
        self.locals
            .last()
            .ok_or_else(|| Error::InactiveFrame("LF frame is not active".into(), None))
    }

    fn require_temp(&self) -> Result<&Frame, Error> {
        self.temp
            .as_ref()
            .ok_or_else(|| Error::InactiveFrame("TF frame is not active".into(), None))
    }

    /// `CREATEFRAME`: replace the temp slot with a fresh active frame,
    /// discarding whatever was there.
    pub fn create_frame(&mut self) {
        self.temp = Some(Frame::new_active());
    }

    /// `PUSHFRAME`: move the temp frame onto the local stack; temp becomes
    /// inactive.
    pub fn push_frame(&mut self) -> Result<(), Error> {
        let frame = self
            .temp
            .take()
            .ok_or_else(|| Error::InactiveFrame("TF frame is not active".into(), None))?;
        self.locals.push(frame);
        Ok(())
    }

    /// `POPFRAME`: move the top local frame into the temp slot.
    pub fn pop_frame(&mut self) -> Result<(), Error> {
        let frame = self
            .locals
            .pop()
            .ok_or_else(|| Error::InactiveFrame("LF frame is not active".into(), None))?;
        self.temp = Some(frame);
        Ok(())
    }

    pub fn global_dump(&self) -> Vec<String> {
        self.global.dump()
    }

    pub fn local_dump(&self) -> Vec<String> {
        self.local().dump()
    }

    pub fn temp_dump(&self) -> Vec<String> {
        self.temp.clone().unwrap_or_else(Frame::new_inactive).dump()
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}
