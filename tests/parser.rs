//! Literal-grammar edge cases and the parse/render round-trip invariant
//! (C9, §4.9, §8.1 invariant 7).

use db48x::object::{Kind, Object};
use db48x::parser::{self, renderer};
use db48x::settings::Settings;

fn settings() -> Settings {
    Settings::default()
}

fn round_trips(text: &str) {
    let s = settings();
    let obj = parser::parse(text, &s).unwrap_or_else(|e| panic!("parsing {text:?} failed: {e}"));
    let rendered = renderer::render(&obj, &s);
    let reparsed = parser::parse(&rendered, &s).unwrap_or_else(|e| panic!("re-parsing {rendered:?} failed: {e}"));
    assert_eq!(obj, reparsed, "{text:?} -> {rendered:?} did not round-trip");
}

#[test]
fn integers_fractions_and_decimals_round_trip() {
    round_trips("42");
    round_trips("-17");
    round_trips("1/3");
    round_trips("3.14");
    round_trips("-2.5e10");
}

#[test]
fn based_integer_literal_forms_parse() {
    let s = settings();
    let explicit = parser::parse("16#FF", &s).unwrap();
    let default_base = parser::parse("#FF", &s).unwrap();
    assert_eq!(explicit, default_base);
}

#[test]
fn programs_lists_and_arrays_round_trip() {
    round_trips("\u{ab} 1 2 + \u{bb}");
    round_trips("{ 1 2 3 }");
    round_trips("[1, 2, 3]");
    round_trips("[1, 2; 3, 4]");
}

#[test]
fn text_and_tag_literals_parse() {
    let s = settings();
    let text = parser::parse("\"hi\"", &s).unwrap();
    assert_eq!(text, Object::Text("hi".to_string()));

    let tag = parser::parse(":label:42", &s).unwrap();
    match tag {
        Object::Tag(name, value) => {
            assert_eq!(name, "label");
            assert_eq!(*value, Object::Real(db48x::number::Real::Integer(
                db48x::number::integer::Integer::small(42)
            )));
        }
        other => panic!("expected a tag, got {other:?}"),
    }
}

#[test]
fn expression_literal_parses_with_operator_precedence() {
    let s = settings();
    let obj = parser::parse("'2+3*4'", &s).unwrap();
    assert!(matches!(obj, Object::Expression(_)));
}

#[test]
fn command_words_take_priority_over_plain_symbols() {
    let s = settings();
    let obj = parser::parse("SIN", &s).unwrap();
    assert_eq!(obj, Object::Command(Kind::CmdSin));

    let sym = parser::parse("myvar", &s).unwrap();
    assert!(matches!(sym, Object::Symbol(_)));
}

#[test]
fn unterminated_text_literal_is_a_parse_error() {
    let s = settings();
    assert!(parser::parse("\"never closed", &s).is_err());
}

#[test]
fn trailing_garbage_after_a_literal_is_a_parse_error() {
    let s = settings();
    assert!(parser::parse("42 garbage", &s).is_err());
}

#[rstest::rstest]
#[case("0", "0")]
#[case("007", "7")]
#[case("-0", "0")]
#[case("1000", "1000")]
#[case("-999999999999999999999999", "-999999999999999999999999")]
fn integer_literals_normalize_to_their_canonical_rendering(#[case] input: &str, #[case] expected: &str) {
    let s = settings();
    let obj = parser::parse(input, &s).unwrap();
    assert_eq!(renderer::render(&obj, &s), expected);
}

#[test]
fn digit_grouping_round_trips_regardless_of_separator_whitespace() {
    let mut s = settings();
    s.spacing_mut().separator = ' ';
    let obj = parser::parse("1000000", &s).unwrap();
    let text = renderer::render(&obj, &s);
    assert_eq!(parser::parse(&text, &s).unwrap(), obj);

    s.spacing_mut().separator = '_';
    s.spacing_mut().mantissa_group = 3;
    let text = renderer::render(&obj, &s);
    assert!(text.contains('_'));
    assert_eq!(parser::parse(&text, &s).unwrap(), obj);
}
