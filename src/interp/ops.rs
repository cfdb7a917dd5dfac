//! Per-opcode semantics, dispatched by a single `match` on [`Opcode`].

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::Error;
use crate::opcode::Opcode;
use crate::program::Instruction;
use crate::value::Value;

use super::{read_typed_line, Interpreter};

pub(super) fn dispatch<In: BufRead, Out: Write, Err: Write>(
    interp: &mut Interpreter<In, Out, Err>,
    instr: &Instruction,
) -> Result<Option<i32>, Error> {
    use Opcode::*;
    match instr.opcode {
        Defvar => {
            let (tag, name) = var_arg(&instr.args[0])?;
            interp.frames.declare(tag, name)?;
            Ok(None)
        }
        Move => {
            let value = interp.read_value(&instr.args[1])?;
            interp.write_value(&instr.args[0], value)?;
            Ok(None)
        }
        Createframe => {
            interp.frames.create_frame();
            Ok(None)
        }
        Pushframe => {
            interp.frames.push_frame()?;
            debug!("PUSHFRAME");
            Ok(None)
        }
        Popframe => {
            interp.frames.pop_frame()?;
            debug!("POPFRAME");
            Ok(None)
        }
        Call => {
            let label = label_arg(&instr.args[0])?;
            let target = interp.labels.resolve(label)?;
            interp.state.call(target);
            Ok(None)
        }
        Return => {
            interp.state.ret()?;
            Ok(None)
        }
        Jump => {
            let label = label_arg(&instr.args[0])?;
            let target = interp.labels.resolve(label)?;
            interp.state.jump(target);
            Ok(None)
        }
        Jumpifeq | Jumpifneq => {
            // The label is resolved unconditionally, before the condition is
            // even evaluated: an undefined label is error 52 whether or not
            // the branch would have been taken.
            let label = label_arg(&instr.args[0])?;
            let target = interp.labels.resolve(label)?;
            let holds = eq_operands(interp, &instr.args[1], &instr.args[2])?;
            let taken = if instr.opcode == Jumpifeq { holds } else { !holds };
            if taken {
                interp.state.jump(target);
            }
            Ok(None)
        }
        Pushs => {
            let value = interp.read_value(&instr.args[0])?;
            interp.data_stack.push(value);
            Ok(None)
        }
        Pops => {
            let value = interp
                .data_stack
                .pop()
                .ok_or_else(|| Error::MissingValue("POPS on an empty data stack".into(), None))?;
            interp.write_value(&instr.args[0], value)?;
            Ok(None)
        }
        Add | Sub | Mul | Idiv => {
            let a = int_operand(interp, &instr.args[1])?;
            let b = int_operand(interp, &instr.args[2])?;
            let result = match instr.opcode {
                Add => a.wrapping_add(b),
                Sub => a.wrapping_sub(b),
                Mul => a.wrapping_mul(b),
                Idiv => {
                    if b == 0 {
                        return Err(Error::BadOperandValue("IDIV by zero".into(), None));
                    }
                    a.wrapping_div(b) // truncates toward zero, not floor division
                }
                _ => unreachable!(),
            };
            interp.write_value(&instr.args[0], Value::Int(result))?;
            Ok(None)
        }
        Lt | Gt => {
            let t1 = interp.read_type(&instr.args[1])?;
            let t2 = interp.read_type(&instr.args[2])?;
            if t1 != t2 || t1 == "nil" {
                return Err(Error::TypeMismatch(format!("{} requires two operands of the same non-nil type", instr.opcode), None));
            }
            let v1 = interp.read_value(&instr.args[1])?;
            let v2 = interp.read_value(&instr.args[2])?;
            let ordering = ordered_less(&v1, &v2)?;
            let result = if instr.opcode == Lt { ordering } else { !ordering && v1 != v2 };
            interp.write_value(&instr.args[0], Value::Bool(result))?;
            Ok(None)
        }
        Eq => {
            let result = eq_operands(interp, &instr.args[1], &instr.args[2])?;
            interp.write_value(&instr.args[0], Value::Bool(result))?;
            Ok(None)
        }
        And | Or => {
            let a = bool_operand(interp, &instr.args[1])?;
            let b = bool_operand(interp, &instr.args[2])?;
            let result = if instr.opcode == And { a && b } else { a || b };
            interp.write_value(&instr.args[0], Value::Bool(result))?;
            Ok(None)
        }
        Not => {
            let a = bool_operand(interp, &instr.args[1])?;
            interp.write_value(&instr.args[0], Value::Bool(!a))?;
            Ok(None)
        }
        Int2Char => {
            let code = int_operand(interp, &instr.args[1])?;
            let ch = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| Error::StringIndexOutOfRange("INT2CHAR: codepoint out of range".into(), None))?;
            interp.write_value(&instr.args[0], Value::Str(ch.to_string()))?;
            Ok(None)
        }
        Stri2Int => {
            let s = string_operand(interp, &instr.args[1])?;
            let index = int_operand(interp, &instr.args[2])?;
            let ch = char_at(&s, index)
                .ok_or_else(|| Error::StringIndexOutOfRange("STRI2INT: index out of range".into(), None))?;
            interp.write_value(&instr.args[0], Value::Int(ch as i64))?;
            Ok(None)
        }
        Read => {
            let wanted = instr.args[1]
                .as_type_tag()
                .ok_or_else(|| Error::Internal("READ's second argument is not a type".into()))?;
            let mut line = String::new();
            let value = match interp.input.read_line(&mut line) {
                Ok(0) => Value::Nil, // EOF
                Ok(_) => {
                    let trimmed = line.trim_end_matches(['\n', '\r']);
                    if trimmed.is_empty() {
                        Value::Nil
                    } else {
                        read_typed_line(trimmed, wanted)
                    }
                }
                Err(e) => return Err(Error::Internal(format!("reading input: {e}"))),
            };
            interp.write_value(&instr.args[0], value)?;
            Ok(None)
        }
        Write => {
            let value = interp.read_value(&instr.args[0])?;
            write!(interp.stdout, "{}", value.write_repr())
                .map_err(|e| Error::Internal(format!("writing stdout: {e}")))?;
            Ok(None)
        }
        Concat => {
            let a = string_operand(interp, &instr.args[1])?;
            let b = string_operand(interp, &instr.args[2])?;
            interp.write_value(&instr.args[0], Value::Str(a + &b))?;
            Ok(None)
        }
        Strlen => {
            let s = string_operand(interp, &instr.args[1])?;
            interp.write_value(&instr.args[0], Value::Int(s.chars().count() as i64))?;
            Ok(None)
        }
        Getchar => {
            let s = string_operand(interp, &instr.args[1])?;
            let index = int_operand(interp, &instr.args[2])?;
            let ch = char_at(&s, index)
                .ok_or_else(|| Error::StringIndexOutOfRange("GETCHAR: index out of range".into(), None))?;
            interp.write_value(&instr.args[0], Value::Str(ch.to_string()))?;
            Ok(None)
        }
        Setchar => {
            let base = string_operand(interp, &instr.args[0])?;
            let index = int_operand(interp, &instr.args[1])?;
            let replacement = string_operand(interp, &instr.args[2])?;
            let repl_char = replacement
                .chars()
                .next()
                .ok_or_else(|| Error::StringIndexOutOfRange("SETCHAR: replacement is empty".into(), None))?;
            if index < 0 || index as usize >= base.chars().count() {
                return Err(Error::StringIndexOutOfRange("SETCHAR: index out of range".into(), None));
            }
            let updated: String = base
                .chars()
                .enumerate()
                .map(|(i, c)| if i as i64 == index { repl_char } else { c })
                .collect();
            interp.write_value(&instr.args[0], Value::Str(updated))?;
            Ok(None)
        }
        Type => {
            let name = match &instr.args[1].kind {
                crate::program::ArgKind::Var(tag, var_name) => interp.frames.type_of_undef(*tag, var_name)?,
                crate::program::ArgKind::Literal(v) => v.type_name(),
                _ => return Err(Error::Internal("TYPE's operand is not a symb".into())),
            };
            interp.write_value(&instr.args[0], Value::Str(name.to_string()))?;
            Ok(None)
        }
        Label => Ok(None),
        Exit => {
            let ty = interp.read_type(&instr.args[0])?;
            if ty != "int" {
                return Err(Error::TypeMismatch("EXIT requires an int operand".into(), None));
            }
            let code = int_operand(interp, &instr.args[0])?;
            if !(0..=49).contains(&code) {
                return Err(Error::BadOperandValue(format!("EXIT code `{code}` out of range 0..=49"), None));
            }
            Ok(Some(code as i32))
        }
        Dprint => {
            let value = interp.read_value(&instr.args[0])?;
            write!(interp.stderr, "{}", value.write_repr())
                .map_err(|e| Error::Internal(format!("writing stderr: {e}")))?;
            Ok(None)
        }
        Break => {
            writeln!(interp.stderr, "instruction {} with opcode {}", instr.order, instr.opcode).ok();
            writeln!(interp.stderr, "Global frame:").ok();
            for line in interp.frames.global_dump() {
                writeln!(interp.stderr, "  {line}").ok();
            }
            writeln!(interp.stderr, "Local frame:").ok();
            for line in interp.frames.local_dump() {
                writeln!(interp.stderr, "  {line}").ok();
            }
            writeln!(interp.stderr, "Temporary frame:").ok();
            for line in interp.frames.temp_dump() {
                writeln!(interp.stderr, "  {line}").ok();
            }
            Ok(None)
        }
    }
}

fn var_arg(arg: &crate::program::Argument) -> Result<(crate::frame::FrameTag, &str), Error> {
    arg.as_var()
        .ok_or_else(|| Error::TypeMismatch("expected a variable argument".into(), None))
}

fn label_arg(arg: &crate::program::Argument) -> Result<&str, Error> {
    arg.as_label()
        .ok_or_else(|| Error::Internal("expected a label argument".into()))
}

fn int_operand<In: BufRead, Out: Write, Err: Write>(
    interp: &Interpreter<In, Out, Err>,
    arg: &crate::program::Argument,
) -> Result<i64, Error> {
    match interp.read_value(arg)? {
        Value::Int(n) => Ok(n),
        _ => Err(Error::TypeMismatch("expected an int operand".into(), None)),
    }
}

fn bool_operand<In: BufRead, Out: Write, Err: Write>(
    interp: &Interpreter<In, Out, Err>,
    arg: &crate::program::Argument,
) -> Result<bool, Error> {
    match interp.read_value(arg)? {
        Value::Bool(b) => Ok(b),
        _ => Err(Error::TypeMismatch("expected a bool operand".into(), None)),
    }
}

fn string_operand<In: BufRead, Out: Write, Err: Write>(
    interp: &Interpreter<In, Out, Err>,
    arg: &crate::program::Argument,
) -> Result<String, Error> {
    match interp.read_value(arg)? {
        Value::Str(s) => Ok(s),
        _ => Err(Error::TypeMismatch("expected a string operand".into(), None)),
    }
}

/// Shared equality used by `EQ` and `JUMPIFEQ`/`JUMPIFNEQ`: same type
/// required unless one side is `nil`, in which case equality holds only if
/// both sides are `nil`.
fn eq_operands<In: BufRead, Out: Write, Err: Write>(
    interp: &Interpreter<In, Out, Err>,
    lhs: &crate::program::Argument,
    rhs: &crate::program::Argument,
) -> Result<bool, Error> {
    let t1 = interp.read_type(lhs)?;
    let t2 = interp.read_type(rhs)?;
    if t1 != t2 && t1 != "nil" && t2 != "nil" {
        return Err(Error::TypeMismatch("EQ requires operands of the same type, or one nil".into(), None));
    }
    let v1 = interp.read_value(lhs)?;
    let v2 = interp.read_value(rhs)?;
    Ok(v1 == v2)
}

/// `LT`'s strict-less-than; `GT` is derived from this plus inequality at the
/// call site, since both reject `nil` identically.
fn ordered_less(a: &Value, b: &Value) -> Result<bool, Error> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x < y),
        (Value::Bool(x), Value::Bool(y)) => Ok(!x & y),
        (Value::Str(x), Value::Str(y)) => Ok(x < y),
        _ => Err(Error::TypeMismatch("LT/GT require matching non-nil operand types".into(), None)),
    }
}

fn char_at(s: &str, index: i64) -> Option<char> {
    if index < 0 {
        return None;
    }
    s.chars().nth(index as usize)
}
