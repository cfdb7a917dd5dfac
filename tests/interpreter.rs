//! End-to-end scenarios: XML source in, stdout/stderr/exit-code triple out.

use std::io::Cursor;

use ipp22::interp::Interpreter;
use ipp22::xml;

fn run(xml_source: &str, input: &str) -> (i32, String, String) {
    let program = xml::load_program(xml_source.as_bytes()).expect("program should load");
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut interp =
        Interpreter::new(program, Cursor::new(input.as_bytes()), &mut stdout, &mut stderr).expect("label scan");
    let code = interp.run().expect("program should not error");
    (code, String::from_utf8(stdout).unwrap(), String::from_utf8(stderr).unwrap())
}

fn run_expect_err(xml_source: &str, input: &str) -> i32 {
    let program = xml::load_program(xml_source.as_bytes()).expect("program should load");
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut interp =
        Interpreter::new(program, Cursor::new(input.as_bytes()), &mut stdout, &mut stderr).expect("label scan");
    interp.run().unwrap_err().exit_code()
}

#[test]
fn move_int_then_write() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
            <instruction order="2" opcode="MOVE">
                <arg1 type="var">GF@x</arg1>
                <arg2 type="int">7</arg2>
            </instruction>
            <instruction order="3" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "7");
}

#[test]
fn idiv_truncates_toward_zero() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@a</arg1></instruction>
            <instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@b</arg1></instruction>
            <instruction order="3" opcode="MOVE">
                <arg1 type="var">GF@a</arg1><arg2 type="int">10</arg2>
            </instruction>
            <instruction order="4" opcode="MOVE">
                <arg1 type="var">GF@b</arg1><arg2 type="int">3</arg2>
            </instruction>
            <instruction order="5" opcode="IDIV">
                <arg1 type="var">GF@a</arg1><arg2 type="var">GF@a</arg2><arg3 type="var">GF@b</arg3>
            </instruction>
            <instruction order="6" opcode="WRITE"><arg1 type="var">GF@a</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "3");
}

#[test]
fn jumpifneq_loop_to_three() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@i</arg1></instruction>
            <instruction order="2" opcode="MOVE">
                <arg1 type="var">GF@i</arg1><arg2 type="int">0</arg2>
            </instruction>
            <instruction order="3" opcode="LABEL"><arg1 type="label">L</arg1></instruction>
            <instruction order="4" opcode="ADD">
                <arg1 type="var">GF@i</arg1><arg2 type="var">GF@i</arg2><arg3 type="int">1</arg3>
            </instruction>
            <instruction order="5" opcode="JUMPIFNEQ">
                <arg1 type="label">L</arg1><arg2 type="var">GF@i</arg2><arg3 type="int">3</arg3>
            </instruction>
            <instruction order="6" opcode="WRITE"><arg1 type="var">GF@i</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "3");
}

#[test]
fn pushframe_and_popframe_roundtrip() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="CREATEFRAME"></instruction>
            <instruction order="2" opcode="DEFVAR"><arg1 type="var">TF@v</arg1></instruction>
            <instruction order="3" opcode="MOVE">
                <arg1 type="var">TF@v</arg1><arg2 type="string">hi</arg2>
            </instruction>
            <instruction order="4" opcode="PUSHFRAME"></instruction>
            <instruction order="5" opcode="WRITE"><arg1 type="var">LF@v</arg1></instruction>
            <instruction order="6" opcode="POPFRAME"></instruction>
            <instruction order="7" opcode="WRITE"><arg1 type="var">TF@v</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "hihi");
}

#[test]
fn read_int_negative_and_blank_line() {
    let xml_source = r#"<program language="IPPcode22">
        <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
        <instruction order="2" opcode="READ">
            <arg1 type="var">GF@x</arg1><arg2 type="type">int</arg2>
        </instruction>
        <instruction order="3" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
    </program>"#;

    let (code, stdout, _) = run(xml_source, "-42\n");
    assert_eq!(code, 0);
    assert_eq!(stdout, "-42");

    let (code, stdout, _) = run(xml_source, "\n");
    assert_eq!(code, 0);
    assert_eq!(stdout, "");
}

#[test]
fn reading_undef_variable_is_exit_56() {
    let code = run_expect_err(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
            <instruction order="2" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 56);
}

#[test]
fn idiv_by_zero_is_exit_57() {
    let code = run_expect_err(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@z</arg1></instruction>
            <instruction order="2" opcode="MOVE">
                <arg1 type="var">GF@z</arg1><arg2 type="int">0</arg2>
            </instruction>
            <instruction order="3" opcode="IDIV">
                <arg1 type="var">GF@z</arg1><arg2 type="int">10</arg2><arg3 type="var">GF@z</arg3>
            </instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 57);
}

#[test]
fn exit_50_is_out_of_range_57_but_49_passes_through() {
    let code_50 = run_expect_err(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="EXIT"><arg1 type="int">50</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code_50, 57);

    let (code_49, _, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="EXIT"><arg1 type="int">49</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code_49, 49);
}

#[test]
fn eq_treats_nil_specially_but_lt_rejects_it() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@a</arg1></instruction>
            <instruction order="2" opcode="EQ">
                <arg1 type="var">GF@a</arg1><arg2 type="nil">nil</arg2><arg3 type="nil">nil</arg3>
            </instruction>
            <instruction order="3" opcode="WRITE"><arg1 type="var">GF@a</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "true");

    let code = run_expect_err(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@a</arg1></instruction>
            <instruction order="2" opcode="LT">
                <arg1 type="var">GF@a</arg1><arg2 type="int">5</arg2><arg3 type="nil">nil</arg3>
            </instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 53);
}

#[test]
fn concat_preserves_a_whitespace_only_string_literal() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@s</arg1></instruction>
            <instruction order="2" opcode="CONCAT">
                <arg1 type="var">GF@s</arg1>
                <arg2 type="string">hello</arg2>
                <arg3 type="string"> </arg3>
            </instruction>
            <instruction order="3" opcode="CONCAT">
                <arg1 type="var">GF@s</arg1>
                <arg2 type="var">GF@s</arg2>
                <arg3 type="string">world</arg3>
            </instruction>
            <instruction order="4" opcode="WRITE"><arg1 type="var">GF@s</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "hello world");
}

#[test]
fn setchar_reads_then_writes_same_var() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@s</arg1></instruction>
            <instruction order="2" opcode="MOVE">
                <arg1 type="var">GF@s</arg1><arg2 type="string">cat</arg2>
            </instruction>
            <instruction order="3" opcode="SETCHAR">
                <arg1 type="var">GF@s</arg1><arg2 type="int">1</arg2><arg3 type="string">o</arg3>
            </instruction>
            <instruction order="4" opcode="WRITE"><arg1 type="var">GF@s</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "cot");
}

#[test]
fn setchar_out_of_range_is_exit_58() {
    let code = run_expect_err(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@s</arg1></instruction>
            <instruction order="2" opcode="MOVE">
                <arg1 type="var">GF@s</arg1><arg2 type="string">hi</arg2>
            </instruction>
            <instruction order="3" opcode="SETCHAR">
                <arg1 type="var">GF@s</arg1><arg2 type="int">5</arg2><arg3 type="string">o</arg3>
            </instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 58);
}

#[test]
fn call_and_return_resume_correctly() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@r</arg1></instruction>
            <instruction order="2" opcode="CALL"><arg1 type="label">fn</arg1></instruction>
            <instruction order="3" opcode="WRITE"><arg1 type="var">GF@r</arg1></instruction>
            <instruction order="4" opcode="JUMP"><arg1 type="label">end</arg1></instruction>
            <instruction order="5" opcode="LABEL"><arg1 type="label">fn</arg1></instruction>
            <instruction order="6" opcode="MOVE">
                <arg1 type="var">GF@r</arg1><arg2 type="string">called</arg2>
            </instruction>
            <instruction order="7" opcode="RETURN"></instruction>
            <instruction order="8" opcode="LABEL"><arg1 type="label">end</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "called");
}

#[test]
fn pushs_pops_roundtrip_value_and_type() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@y</arg1></instruction>
            <instruction order="2" opcode="PUSHS"><arg1 type="bool">true</arg1></instruction>
            <instruction order="3" opcode="POPS"><arg1 type="var">GF@y</arg1></instruction>
            <instruction order="4" opcode="WRITE"><arg1 type="var">GF@y</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "true");
}

#[test]
fn jumpifneq_to_an_undefined_label_is_exit_52_even_when_not_taken() {
    // x == x always holds, so JUMPIFNEQ never actually jumps here — but the
    // label must still be resolved eagerly, so this is error 52, not 0.
    let code = run_expect_err(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
            <instruction order="2" opcode="MOVE">
                <arg1 type="var">GF@x</arg1><arg2 type="int">1</arg2>
            </instruction>
            <instruction order="3" opcode="JUMPIFNEQ">
                <arg1 type="label">nowhere</arg1><arg2 type="var">GF@x</arg2><arg3 type="var">GF@x</arg3>
            </instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 52);
}

#[test]
fn wrong_xml_root_language_is_exit_32() {
    let program_err = xml::load_program(r#"<program language="NotIPP"></program>"#.as_bytes()).unwrap_err();
    assert_eq!(program_err.exit_code(), 32);
}

#[test]
fn malformed_xml_is_exit_31() {
    let program_err = xml::load_program(r#"<program language="IPPcode22">"#.as_bytes()).unwrap_err();
    assert_eq!(program_err.exit_code(), 31);
}

#[test]
fn type_of_undeclared_is_empty_string_never_errors() {
    let (code, stdout, _) = run(
        r#"<program language="IPPcode22">
            <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
            <instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@t</arg1></instruction>
            <instruction order="3" opcode="TYPE">
                <arg1 type="var">GF@t</arg1><arg2 type="var">GF@x</arg2>
            </instruction>
            <instruction order="4" opcode="WRITE"><arg1 type="var">GF@t</arg1></instruction>
        </program>"#,
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "");
}
