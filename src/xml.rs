//! XML loader: turns the `<program language="IPPcode22">` document into a
//! [`Program`], reporting structural errors (unknown root, duplicate
//! argument indices, unknown opcodes, ...) as they're found.
//!
//! Built on `quick_xml`'s pull reader rather than a DOM tree, matching this
//! crate's general preference for streaming over buffer-everything-then-walk.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Error;
use crate::frame::FrameTag;
use crate::numeric::parse_ippcode_int;
use crate::opcode::Opcode;
use crate::program::{Argument, Instruction, Program, TypeTag};
use crate::value::{decode_string_escapes, Value};

pub fn load_program<R: BufRead>(source: R) -> Result<Program, Error> {
    // `trim_text` stays false (quick_xml's default): it would trim leading/
    // trailing whitespace from every text event, including the payload of
    // `<argN type="string">...</argN>` — and a string literal's whitespace is
    // significant (e.g. a lone space used as a CONCAT/WRITE separator).
    // Whitespace-only text between elements is already harmless without it:
    // the top-level loop only acts on Start/Empty events, and `read_instruction`
    // only accumulates text while inside an open `<argN>`.
    let mut reader = Reader::from_reader(source);

    let mut buf = Vec::new();
    let mut instructions = Vec::new();
    let mut saw_root = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| Error::XmlParse(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(tag) => {
                let name = tag_name(&tag)?;
                if name == "program" {
                    saw_root = true;
                    require_language(&tag)?;
                } else if name == "instruction" {
                    instructions.push(read_instruction(&mut reader, &tag)?);
                } else {
                    return Err(Error::Structural(format!("unexpected element `<{name}>`"), None));
                }
            }
            Event::Empty(tag) => {
                let name = tag_name(&tag)?;
                if name == "instruction" {
                    let (opcode, order) = instruction_attrs(&tag)?;
                    instructions.push(build_instruction(opcode, order, Vec::new())?);
                } else if name == "program" {
                    saw_root = true;
                    require_language(&tag)?;
                } else {
                    return Err(Error::Structural(format!("unexpected empty element `<{name}/>`"), None));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(Error::Structural("missing <program> root element".into(), None));
    }

    Program::new(instructions)
}

fn tag_name(tag: &BytesStart) -> Result<&str, Error> {
    std::str::from_utf8(tag.name().as_ref()).map_err(|_| Error::XmlParse("non-UTF-8 tag name".into()))
}

fn attr_value(tag: &BytesStart, key: &str) -> Result<Option<String>, Error> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| Error::XmlParse(e.to_string()))?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(|e| Error::XmlParse(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn attr_count(tag: &BytesStart) -> Result<usize, Error> {
    let mut n = 0;
    for attr in tag.attributes() {
        attr.map_err(|e| Error::XmlParse(e.to_string()))?;
        n += 1;
    }
    Ok(n)
}

fn require_language(tag: &BytesStart) -> Result<(), Error> {
    match attr_value(tag, "language")? {
        Some(lang) if lang == "IPPcode22" => Ok(()),
        Some(lang) => Err(Error::Structural(format!("unsupported language `{lang}`"), None)),
        None => Err(Error::Structural("<program> is missing the `language` attribute".into(), None)),
    }
}

fn instruction_attrs(tag: &BytesStart) -> Result<(String, i64), Error> {
    if attr_count(tag)? != 2 {
        return Err(Error::Structural(
            "<instruction> must carry exactly `order` and `opcode` attributes".into(),
            None,
        ));
    }
    let opcode = attr_value(tag, "opcode")?
        .ok_or_else(|| Error::Structural("<instruction> is missing `opcode`".into(), None))?;
    let order_text = attr_value(tag, "order")?
        .ok_or_else(|| Error::Structural("<instruction> is missing `order`".into(), None))?;
    let order: i64 = order_text
        .parse()
        .map_err(|_| Error::Structural(format!("`order` is not an integer: `{order_text}`"), None))?;
    if order <= 0 {
        return Err(Error::Structural(format!("`order` must be positive, got `{order}`"), None));
    }
    Ok((opcode, order))
}

/// One raw `<argN type="...">text</argN>` reading, before it's classified
/// into an [`Argument`].
struct RawArg {
    index: usize,
    ty: String,
    text: String,
}

fn arg_open(tag: &BytesStart) -> Result<(usize, String), Error> {
    let name = tag_name(tag)?;
    let index: usize = name
        .strip_prefix("arg")
        .and_then(|n| n.parse().ok())
        .filter(|n| (1..=3).contains(n))
        .ok_or_else(|| Error::Structural(format!("unexpected argument element `<{name}>`"), None))?;
    if attr_count(tag)? != 1 {
        return Err(Error::Structural(format!("<{name}> must carry exactly a `type` attribute"), None));
    }
    let ty = attr_value(tag, "type")?
        .ok_or_else(|| Error::Structural(format!("<{name}> is missing `type`"), None))?;
    Ok((index, ty))
}

fn read_instruction<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<Instruction, Error> {
    let (opcode, order) = instruction_attrs(start)?;
    let mut raw_args = Vec::new();
    let mut current: Option<(usize, String, String)> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| Error::XmlParse(e.to_string()))?;
        match event {
            Event::Start(tag) => {
                let (index, ty) = arg_open(&tag)?;
                current = Some((index, ty, String::new()));
            }
            Event::Empty(tag) => {
                let (index, ty) = arg_open(&tag)?;
                raw_args.push(RawArg { index, ty, text: String::new() });
            }
            Event::Text(text) => {
                if let Some((_, _, accum)) = current.as_mut() {
                    let decoded = text.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    accum.push_str(&decoded);
                }
            }
            Event::CData(text) => {
                if let Some((_, _, accum)) = current.as_mut() {
                    accum.push_str(&String::from_utf8_lossy(&text.into_inner()));
                }
            }
            Event::End(tag) => {
                let name = std::str::from_utf8(tag.name().as_ref())
                    .map_err(|_| Error::XmlParse("non-UTF-8 tag name".into()))?;
                if name == "instruction" {
                    break;
                }
                if let Some((index, ty, text)) = current.take() {
                    raw_args.push(RawArg { index, ty, text });
                }
            }
            Event::Eof => {
                return Err(Error::XmlParse("unexpected end of file inside <instruction>".into()));
            }
            _ => {}
        }
        buf.clear();
    }

    build_instruction(opcode, order, raw_args)
}

fn build_instruction(opcode_text: String, order: i64, raw_args: Vec<RawArg>) -> Result<Instruction, Error> {
    let opcode: Opcode = opcode_text
        .parse()
        .map_err(|_| Error::Structural(format!("unknown opcode `{opcode_text}`"), None))?;

    let args = raw_args
        .into_iter()
        .map(|raw| make_argument(&raw.ty, &raw.text, raw.index))
        .collect::<Result<Vec<_>, _>>()?;

    Instruction::new(opcode, order, args)
}

fn make_argument(ty: &str, text: &str, index: usize) -> Result<Argument, Error> {
    match ty {
        "var" => {
            let (prefix, name) = text
                .trim()
                .split_once('@')
                .ok_or_else(|| Error::Structural(format!("malformed variable reference `{text}`"), None))?;
            let tag = match prefix {
                "GF" => FrameTag::Global,
                "LF" => FrameTag::Local,
                "TF" => FrameTag::Temp,
                other => return Err(Error::Structural(format!("unknown frame prefix `{other}`"), None)),
            };
            Ok(Argument::var(tag, name, index))
        }
        "int" => {
            let n = parse_ippcode_int(text.trim())
                .ok_or_else(|| Error::Structural(format!("malformed integer literal `{text}`"), None))?;
            Ok(Argument::literal(Value::Int(n), index))
        }
        "string" => Ok(Argument::literal(Value::Str(decode_string_escapes(text)), index)),
        "bool" => match text.trim() {
            "true" => Ok(Argument::literal(Value::Bool(true), index)),
            "false" => Ok(Argument::literal(Value::Bool(false), index)),
            other => Err(Error::Structural(format!("malformed bool literal `{other}`"), None)),
        },
        "nil" => match text.trim() {
            "nil" => Ok(Argument::literal(Value::Nil, index)),
            other => Err(Error::Structural(format!("malformed nil literal `{other}`"), None)),
        },
        "label" => Ok(Argument::label(text.trim().to_string(), index)),
        "type" => {
            let tag = TypeTag::parse(text.trim())
                .ok_or_else(|| Error::Structural(format!("unknown type literal `{text}`"), None))?;
            Ok(Argument::type_tag(tag, index))
        }
        other => Err(Error::Structural(format!("unknown argument type `{other}`"), None)),
    }
}
