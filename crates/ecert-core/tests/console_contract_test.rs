//! Contract tests for console I/O: what a compiled program observes on its
//! standard streams for each runtime call, in both modes.

use ecert_core::input::DEFAULT_STRING_CAPACITY;
use ecert_core::{Console, RuntimeError};
use ecert_membrane::{HealingPolicy, RuntimeConfig, RuntimeMode};

static POLICY: HealingPolicy = HealingPolicy::new();

fn session(input: &str, mode: RuntimeMode) -> Console<&[u8], Vec<u8>> {
    Console::new(
        input.as_bytes(),
        Vec::new(),
        RuntimeConfig::default().with_mode(mode),
    )
    .with_policy(&POLICY)
}

fn text(console: Console<&[u8], Vec<u8>>) -> String {
    let (_, out) = console.into_parts();
    String::from_utf8(out).unwrap()
}

#[derive(Clone, Copy)]
struct ReadCase {
    input: &'static str,
    strict_kind: Option<&'static str>,
    hardened: i32,
}

fn integer_cases() -> Vec<ReadCase> {
    vec![
        ReadCase {
            input: "42",
            strict_kind: None,
            hardened: 42,
        },
        ReadCase {
            input: "  \n\t-17  ",
            strict_kind: None,
            hardened: -17,
        },
        ReadCase {
            input: "12abc",
            strict_kind: Some("malformed_integer"),
            hardened: 0,
        },
        ReadCase {
            input: "4294967296",
            strict_kind: Some("integer_out_of_range"),
            hardened: i32::MAX,
        },
        ReadCase {
            input: "-4294967296",
            strict_kind: Some("integer_out_of_range"),
            hardened: i32::MIN,
        },
        ReadCase {
            input: "",
            strict_kind: Some("end_of_input"),
            hardened: 0,
        },
    ]
}

#[test]
fn integer_read_matrix() {
    for case in integer_cases() {
        let strict = session(case.input, RuntimeMode::Strict).get_integer();
        match (case.strict_kind, strict) {
            (None, Ok(v)) => assert_eq!(v, case.hardened, "input {:?}", case.input),
            (Some(kind), Err(err)) => assert_eq!(err.kind(), kind, "input {:?}", case.input),
            (expected, got) => panic!("input {:?}: expected {expected:?}, got {got:?}", case.input),
        }

        let hardened = session(case.input, RuntimeMode::Hardened)
            .get_integer()
            .unwrap();
        assert_eq!(hardened, case.hardened, "input {:?}", case.input);
    }
}

#[test]
fn written_integers_read_back_identically() {
    for n in [0, 7, -7, 65_535, i32::MAX, i32::MIN] {
        let mut writer = session("", RuntimeMode::Strict);
        writer.put_integer(n).unwrap();
        let written = text(writer);

        let mut reader = session(&written, RuntimeMode::Strict);
        assert_eq!(reader.get_integer().unwrap(), n);
    }
}

#[test]
fn get_string_returns_length_plus_one() {
    let mut console = session("hello world", RuntimeMode::Strict);
    let mut buf = vec![0u8; DEFAULT_STRING_CAPACITY];
    assert_eq!(console.get_string_into(&mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"hello\0");
    assert_eq!(console.get_string_into(&mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"world\0");
}

#[test]
fn string_at_capacity_boundary() {
    // 1023 bytes + NUL fits exactly in the default buffer.
    let fits = "a".repeat(DEFAULT_STRING_CAPACITY - 1);
    let mut buf = vec![0u8; DEFAULT_STRING_CAPACITY];
    let mut console = session(&fits, RuntimeMode::Strict);
    assert_eq!(
        console.get_string_into(&mut buf).unwrap(),
        DEFAULT_STRING_CAPACITY
    );

    let too_long = "a".repeat(DEFAULT_STRING_CAPACITY);
    let mut console = session(&too_long, RuntimeMode::Strict);
    assert!(matches!(
        console.get_string_into(&mut buf),
        Err(RuntimeError::StringTooLong { .. })
    ));

    let mut console = session(&too_long, RuntimeMode::Hardened);
    assert_eq!(
        console.get_string_into(&mut buf).unwrap(),
        DEFAULT_STRING_CAPACITY
    );
    assert_eq!(buf[DEFAULT_STRING_CAPACITY - 1], 0);
}

#[test]
fn output_conventions() {
    let mut console = session("", RuntimeMode::Strict);
    console.put_float(1.5).unwrap();
    console.put_string(b" ").unwrap();
    console.put_bool(1).unwrap();
    console.put_string(b" ").unwrap();
    console.put_bool(0).unwrap();
    console.put_string(b" ").unwrap();
    console.put_integer(-3).unwrap();
    assert_eq!(text(console), "1.500000 true false -3");
}

#[test]
fn mixed_program_session() {
    // read n, read n floats, print their sum
    let mut console = session("3\n1.5 2.5\n-1.0\n", RuntimeMode::Strict);
    let n = console.get_integer().unwrap();
    let mut sum = 0.0f32;
    for _ in 0..n {
        sum += console.get_float().unwrap();
    }
    console.put_string(b"sum=\0").unwrap();
    console.put_float(sum).unwrap();
    assert_eq!(text(console), "sum=3.000000");
}

#[test]
fn fatal_diagnostic_follows_prior_output_without_newline() {
    let mut console = session("", RuntimeMode::Hardened);
    console.put_string(b"before").unwrap();
    let err = console.validate_boolean_op(1, b'|', 2, 33).unwrap_err();
    console.report_fatal("validateBooleanOp", &err).unwrap();
    assert_eq!(
        text(console),
        "beforeFATAL ERROR:line 33:Right operand to boolean operator '|' had illegal value of 2"
    );
}

#[test]
fn heals_reach_the_shared_policy() {
    let before = POLICY.total();
    let mut console = session("nope", RuntimeMode::Hardened);
    assert_eq!(console.get_float().unwrap(), 0.0);
    assert_eq!(console.heals(), 1);
    assert!(POLICY.total() > before);
}
