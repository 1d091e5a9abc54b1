//! End-to-end tests through the `Session` facade

use clasp::frontend::core::lexer::LexErrorKind;
use clasp::frontend::core::node_array::NodeLayout;
use clasp::frontend::core::parser::ParseErrorKind;
use clasp::frontend::core::type_system::{ArraySize, Field, ProcedureSignature};
use clasp::util::config::SessionConfig;
use clasp::{AstType, Bindings, Class, FrontendError, Session, TypeError, ValueInfo};

fn kinds(session: &mut Session, source: &str) -> Vec<AstType> {
    let unit = session.compile_unit(source.as_bytes()).unwrap();
    unit.ast.iter().map(|(_, node, _)| node.kind).collect()
}

#[test]
fn test_unterminated_string_points_at_quote() {
    let mut session = Session::default();
    let err = session.compile_unit(b"abc \"unterminated").unwrap_err();
    match err {
        FrontendError::Lex(err) => {
            assert_eq!(err.kind, LexErrorKind::UnterminatedString);
            assert_eq!(err.position, 4);
        }
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn test_multiplication_is_nested_under_addition() {
    let mut session = Session::default();
    let kinds = kinds(&mut session, "1 + 2 * 3");
    let multiply = kinds.iter().position(|&kind| kind == AstType::Multiply).unwrap();
    let add = kinds.iter().position(|&kind| kind == AstType::Add).unwrap();
    assert!(multiply < add, "{kinds:?}");
}

#[test]
fn test_program_with_procedures() {
    let source = "\
clamp := (value: u32, low: u32 = 0, high: u32 = 255) => {
    v := value;
    return v
}
main := () => {
    p := Point.{1.5f, .5};
    name := \"point\\n\";
    clamp(p.x ** 2, 1) // trailing comment
}
";
    let mut session = Session::default();
    let unit = session.compile_unit(source.as_bytes()).unwrap();
    assert!(unit.ast.is_terminated());

    let headers: Vec<_> = unit
        .ast
        .iter()
        .filter(|(_, node, _)| node.kind == AstType::Procedure)
        .map(|(index, _, data)| (index, data.unwrap().as_proc_header()))
        .collect();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].1.params, 3);
    assert_eq!(headers[0].1.defaults, 2);
    assert_eq!(headers[1].1.params, 0);
    for (index, header) in headers {
        let end = index + header.end_offset as usize;
        assert_eq!(unit.ast.node(end - 1).map(|node| node.kind), Some(AstType::EndScope));
    }
}

#[test]
fn test_slot_count_matches_size_table() {
    let mut session = Session::default();
    let unit = session.compile_unit(b"f(a, [4]u8, \"s\", 'c', 2.5) + x.y").unwrap();
    for (array, layout) in [(&unit.tokens, NodeLayout::Tokens), (&unit.ast, NodeLayout::Ast)] {
        let walked: usize = array.iter().map(|(_, node, _)| layout.size_of(node.kind)).sum();
        assert_eq!(walked + 1, array.len());
    }
}

#[test]
fn test_first_error_aborts_unit() {
    let mut session = Session::default();
    let err = session.compile_unit(b"a = 1\nb = (2, 3)\nc = 4 4").unwrap_err();
    assert!(matches!(
        err,
        FrontendError::Parse(ref parse) if parse.kind == ParseErrorKind::TooManyExpressions
    ));
    assert_eq!(err.position(), Some(10));
}

#[test]
fn test_limits_come_from_config() {
    let config = SessionConfig::from_toml_str("[limits]\nscope_depth = 2\n").unwrap();
    let mut session = Session::new(config);
    assert!(session.compile_unit(b"((a))").is_ok());
    let err = session.compile_unit(b"(((a)))").unwrap_err();
    assert!(matches!(err, FrontendError::Lex(ref lex) if lex.kind == LexErrorKind::TooManyScopes));

    let config = SessionConfig::from_toml_str("[limits]\noperator_depth = 3\n").unwrap();
    let mut session = Session::new(config);
    let err = session.compile_unit(b"-(-(-(-(-1))))").unwrap_err();
    assert!(matches!(
        err,
        FrontendError::Parse(ref parse) if parse.kind == ParseErrorKind::OperatorStackOverflow
    ));
}

#[test]
fn test_sessions_are_independent() {
    let mut first = Session::default();
    let mut second = Session::default();
    first.compile_unit(b"alpha beta gamma = 1").unwrap_err();
    second.compile_unit(b"x = 1").unwrap();
    assert!(first.stats().names > second.stats().names);

    let a = first.classes_mut().intern_array(Class::U8, ArraySize::Fixed(4)).unwrap();
    assert_eq!(first.stats().classes.arrays, 1);
    assert_eq!(second.stats().classes.arrays, 0);
    assert_eq!(first.classes_mut().intern_array(Class::U8, ArraySize::Fixed(4)).unwrap(), a);
}

#[test]
fn test_argument_checking_against_interned_classes() {
    let mut session = Session::default();
    let classes = session.classes_mut();

    let mut constant = ValueInfo::constant(Class::U32, 300);
    let err = classes.match_argument(&mut constant, Class::U8, &mut Bindings::new()).unwrap_err();
    assert_eq!(err, TypeError::ValueOutOfRange { value: 300, target: Class::U8 });

    let mut small = ValueInfo::constant(Class::U32, 10);
    classes.match_argument(&mut small, Class::U8, &mut Bindings::new()).unwrap();
    assert_eq!(small.class, Class::U8);

    let mut bindings = Bindings::new();
    let matched = classes.match_class(Class::U32, Class::infered(1), &mut bindings).unwrap();
    assert_eq!(matched, Class::U32);
    assert_eq!(bindings.class(1), Ok(Class::U32));
}

#[test]
fn test_classes_named_by_the_session() {
    let mut session = Session::default();
    let x = session.names_mut().intern(b"x").unwrap();
    let y = session.names_mut().intern(b"y").unwrap();
    let point = session.names_mut().intern(b"Point").unwrap();
    let f32_name = session.names_mut().intern(b"f32").unwrap();
    let f32_class = session.class_by_name(f32_name).unwrap();

    let classes = session.classes_mut();
    let fields = [Field::stored(x, f32_class), Field::stored(y, f32_class)];
    let class = classes.intern_struct(point, &fields).unwrap();
    assert_eq!(classes.bytesize(class), Some(8));
    assert_eq!(classes.struct_field(class, y).map(|(class, _)| class), Some(Class::F32));

    let params = [(x, f32_class)];
    let signature = ProcedureSignature {
        name: point,
        params: &params,
        ret: Class::VOID,
        infered: 0,
        defaults: 0,
    };
    let procedure = classes.intern_procedure(signature).unwrap();
    assert_eq!(classes.intern_procedure(signature).unwrap(), procedure);
}
