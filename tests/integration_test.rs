use predicates::expression::ExpressionError;
use predicates::{parse, parse_as, DataType, ExpressionParser, Parameter, Value};
use rand::Rng;
use std::sync::Arc;
use std::thread;

#[test]
fn test_numerical_addition() {
    let params = [Parameter::of::<i32>("x"), Parameter::of::<i32>("y")];
    let f = parse("x+ y", &params)
        .unwrap()
        .compile_typed::<(i32, i32), i32>()
        .unwrap();
    assert_eq!(f.call((2, 2)).unwrap(), 4);
    assert_ne!(f.call((2, 3)).unwrap(), 4);
}

#[test]
fn test_numerical_multiplication() {
    let params = [Parameter::of::<f64>("x"), Parameter::of::<f64>("y")];
    let f = parse("x * y", &params)
        .unwrap()
        .compile_typed::<(f64, f64), f64>()
        .unwrap();
    assert_eq!(f.call((3.5, 1.5)).unwrap(), 5.25);
    assert_ne!(f.call((2.0, 2.0)).unwrap(), 4.1);
}

#[test]
fn test_numerical_grouping() {
    let params = [Parameter::of::<f64>("x"), Parameter::of::<f64>("y")];
    let f = parse("(4+x) * (y-3) + 1", &params)
        .unwrap()
        .compile_typed::<(f64, f64), f64>()
        .unwrap();
    assert_eq!(f.call((1.0, 5.0)).unwrap(), 11.0);
}

#[test]
fn test_numerical_power_with_forced_type() {
    let params = [Parameter::of::<f32>("x")];
    let result = parse_as("x^2 + 2*x + 1", DataType::Float32, &params).unwrap();
    assert_eq!(result.output_type(), DataType::Float32);

    let f = result.compile_typed::<(f32,), f32>().unwrap();
    assert_eq!(f.call((-1.0,)).unwrap(), 0.0);
    assert_eq!(f.call((2.0,)).unwrap(), 9.0);
}

#[test]
fn test_forced_type_applies_to_operands() {
    let params = [Parameter::of::<i32>("x")];
    let f = parse_as("x / 2", DataType::Float64, &params)
        .unwrap()
        .compile_typed::<(i32,), f64>()
        .unwrap();
    assert_eq!(f.call((5,)).unwrap(), 2.5);

    // without a forced type the division stays integral
    let f = parse("x / 2", &params)
        .unwrap()
        .compile_typed::<(i32,), i32>()
        .unwrap();
    assert_eq!(f.call((5,)).unwrap(), 2);
}

#[test]
fn test_numerical_power() {
    let params = [Parameter::of::<f64>("x")];
    let f = parse("x^4 - 1", &params)
        .unwrap()
        .compile_typed::<(f64,), f64>()
        .unwrap();
    assert_eq!(f.call((1.0,)).unwrap(), 0.0);
    assert_eq!(f.call((2.0,)).unwrap(), 15.0);
}

#[test]
fn test_function_call_in_expression() {
    let params = [Parameter::of::<f64>("x")];
    let f = parse("x + SUM(x- 1, 3, 2) - 2", &params)
        .unwrap()
        .compile_typed::<(f64,), f64>()
        .unwrap();
    assert_eq!(f.call((-1.0,)).unwrap(), 0.0);
}

#[test]
fn test_variadic_call_with_trailing_comma() {
    let f = parse("AVG(1,2,3,4,5,5,6,7,8,9,)", &[])
        .unwrap()
        .compile_typed::<(), f64>()
        .unwrap();
    assert_eq!(f.call(()).unwrap(), 5.0);
}

#[test]
fn test_multi_argument_call() {
    let f = parse("POW(2, 3)", &[])
        .unwrap()
        .compile_typed::<(), f64>()
        .unwrap();
    assert_eq!(f.call(()).unwrap(), 8.0);
}

#[test]
fn test_nested_calls() {
    let params = [Parameter::of::<f64>("x")];
    let f = parse("SQRT(ABS(x)) + MAX(1, MIN(x, 3), -2)", &params)
        .unwrap()
        .compile_typed::<(f64,), f64>()
        .unwrap();
    // sqrt(4) + max(1, 3, -2)
    assert_eq!(f.call((4.0,)).unwrap(), 5.0);
    // sqrt(9) + max(1, -9, -2)
    assert_eq!(f.call((-9.0,)).unwrap(), 4.0);
}

#[test]
fn test_predicate_greater_or_equal() {
    let f = parse("x >=1", &[Parameter::of::<i32>("x")])
        .unwrap()
        .compile_typed::<(i32,), bool>()
        .unwrap();
    assert!(f.call((1,)).unwrap());
    assert!(!f.call((-3,)).unwrap());
}

#[test]
fn test_predicate_arithmetic_less_or_equal() {
    let f = parse("x+4<=2", &[Parameter::of::<i32>("x")])
        .unwrap()
        .compile_typed::<(i32,), bool>()
        .unwrap();
    assert!(!f.call((1,)).unwrap());
    assert!(f.call((-10,)).unwrap());
}

#[test]
fn test_predicate_float_literals() {
    let f = parse("x + 5.2 > 9.2", &[Parameter::of::<f64>("x")])
        .unwrap()
        .compile_typed::<(f64,), bool>()
        .unwrap();
    assert!(!f.call((4.0,)).unwrap());
    assert!(f.call((4.1,)).unwrap());
}

#[test]
fn test_predicate_nested_groups() {
    let f = parse("2+(x + 5)* 3 >1", &[Parameter::of::<i32>("x")])
        .unwrap()
        .compile_typed::<(i32,), bool>()
        .unwrap();
    assert!(!f.call((-6,)).unwrap());
    assert!(f.call((5,)).unwrap());
}

#[test]
fn test_predicate_string_equality() {
    let f = parse("x == \"raf\"", &[Parameter::of::<String>("x")])
        .unwrap()
        .compile_typed::<(String,), bool>()
        .unwrap();
    assert!(!f.call(("Raf".to_string(),)).unwrap());
    assert!(f.call(("raf".to_string(),)).unwrap());
}

#[test]
fn test_predicate_quoted_text_kept_whole() {
    let f = parse("x != \"a + b, (c)\"", &[Parameter::of::<String>("x")])
        .unwrap()
        .compile_predicate()
        .unwrap();
    assert!(!f(&[Value::from("a + b, (c)")]));
    assert!(f(&[Value::from("a+b")]));
}

#[test]
fn test_predicate_range() {
    let f = parse("x >=1 && x<5", &[Parameter::of::<i32>("x")])
        .unwrap()
        .compile_predicate()
        .unwrap();
    assert!(f(&[Value::Int32(3)]));
    assert!(!f(&[Value::Int32(6)]));
}

#[test]
fn test_predicate_two_parameters() {
    let params = [Parameter::of::<i32>("x"), Parameter::of::<i32>("y")];
    let f = parse("x >=1 && x<5 && y>0 && y<10", &params)
        .unwrap()
        .compile_typed::<(i32, i32), bool>()
        .unwrap();
    assert!(f.call((3, 3)).unwrap());
    assert!(!f.call((6, 3)).unwrap());
    assert!(!f.call((3, 10)).unwrap());
}

#[test]
fn test_predicate_negation_and_or() {
    let params = [Parameter::of::<i32>("x"), Parameter::of::<bool>("flag")];
    let f = parse("!flag || x % 2 == 0", &params)
        .unwrap()
        .compile_typed::<(bool, i32), bool>()
        .unwrap();
    assert!(f.call((false, 3)).unwrap());
    assert!(f.call((true, 4)).unwrap());
    assert!(!f.call((true, 3)).unwrap());
}

#[test]
fn test_rendering_matches_hand_built_tree() {
    let result = parse("x >= 10", &[Parameter::of::<i32>("x")]).unwrap();
    assert_eq!(result.expression().to_string(), "(x >= 10)");
}

#[test]
fn test_mixed_integer_widths() {
    let params = [Parameter::of::<u8>("a"), Parameter::of::<i64>("b")];
    let result = parse("a + b", &params).unwrap();
    assert_eq!(result.output_type(), DataType::Int64);
    assert_eq!(
        result.expression().to_string(),
        "(Convert(a, Int64) + b)"
    );
    let f = result.compile_typed::<(u8, i64), i64>().unwrap();
    assert_eq!(f.call((200, -1)).unwrap(), 199);
}

#[test]
fn test_decimal_parameters() {
    use rust_decimal::Decimal;

    let params = [Parameter::of::<Decimal>("price"), Parameter::of::<i32>("qty")];
    let f = parse("price * qty", &params)
        .unwrap()
        .compile_typed::<(Decimal, i32), Decimal>()
        .unwrap();
    assert_eq!(
        f.call((Decimal::new(125, 2), 4)).unwrap(),
        Decimal::new(500, 2)
    );
}

#[test]
fn test_subtraction_is_left_associative() {
    let f = parse("10 - 2 - 3", &[])
        .unwrap()
        .compile_typed::<(), i32>()
        .unwrap();
    assert_eq!(f.call(()).unwrap(), 5);

    let f = parse("100 / 10 / 5", &[])
        .unwrap()
        .compile_typed::<(), i32>()
        .unwrap();
    assert_eq!(f.call(()).unwrap(), 2);
}

#[test]
fn test_unary_operands() {
    let params = [Parameter::of::<i32>("x")];
    let f = parse("2*-x + ~x", &params)
        .unwrap()
        .compile_typed::<(i32,), i32>()
        .unwrap();
    // -6 + -4
    assert_eq!(f.call((3,)).unwrap(), -10);

    let f = parse("x >= -1", &params)
        .unwrap()
        .compile_typed::<(i32,), bool>()
        .unwrap();
    assert!(f.call((-1,)).unwrap());
    assert!(!f.call((-2,)).unwrap());
}

#[test]
fn test_negative_exponent() {
    let f = parse("x ^ -1", &[Parameter::of::<f64>("x")])
        .unwrap()
        .compile_typed::<(f64,), f64>()
        .unwrap();
    assert_eq!(f.call((4.0,)).unwrap(), 0.25);
}

#[test]
fn test_shifts_and_bitwise() {
    let params = [Parameter::of::<i32>("x")];
    let f = parse("(x << 2 | 1) >> 1", &params)
        .unwrap()
        .compile_typed::<(i32,), i32>()
        .unwrap();
    assert_eq!(f.call((5,)).unwrap(), 10);

    // no hex literals
    assert!(matches!(
        parse("(x << 2 | 1) & 0xff0 == 0", &params),
        Err(ExpressionError::InvalidLiteral { .. })
    ));
}

#[test]
fn test_unused_parameters_are_not_arguments() {
    let params = [
        Parameter::of::<i32>("unused"),
        Parameter::of::<i32>("x"),
        Parameter::of::<f64>("y"),
    ];
    let result = parse("y > x", &params).unwrap();
    let names: Vec<&str> = result.parameters().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["y", "x"]);

    let f = result.compile_typed::<(f64, i32), bool>().unwrap();
    assert!(f.call((2.5, 2)).unwrap());
}

#[test]
fn test_parse_failures() {
    let int_x: &[Parameter] = &[Parameter::of::<i32>("x")];
    let none: &[Parameter] = &[];

    let cases = [
        ("(x + 1", int_x),
        ("x + 1)", int_x),
        ("x >1", none),
        ("1.2.3 + 1", none),
        ("x ? 1", int_x),
        ("FOO(x)", int_x),
        ("x *", int_x),
        ("x 5", int_x),
        ("", none),
        ("SUM(1,,2)", none),
        ("POW(1, 2, 3)", none),
        ("x + \"a\"", int_x),
        ("x = 1", int_x),
    ];
    for (text, params) in cases {
        assert!(parse(text, params).is_err(), "'{}' should fail", text);
    }

    assert!(matches!(
        parse("x >1", &[]),
        Err(ExpressionError::UndeclaredParameter { .. })
    ));
    assert!(matches!(
        parse("(x + 1", int_x),
        Err(ExpressionError::ParenthesisMismatch { .. })
    ));
    assert!(matches!(
        parse("x + \"a\"", int_x),
        Err(ExpressionError::InvalidOperandTypes { .. })
    ));
}

#[test]
fn test_evaluation_failures() {
    let params = [Parameter::of::<i32>("x")];
    let f = parse("10 / x", &params).unwrap().compile();
    assert_eq!(
        f.call(&[Value::Int32(0)]).unwrap_err(),
        ExpressionError::DivisionByZero
    );

    let predicate = parse("10 / x > 1", &params)
        .unwrap()
        .compile_predicate()
        .unwrap();
    assert!(!predicate(&[Value::Int32(0)]));
    assert!(predicate(&[Value::Int32(2)]));
}

#[test]
fn test_compile_is_idempotent() {
    let params = [Parameter::of::<i32>("x"), Parameter::of::<i32>("y")];
    let result = parse("x * 3 - y", &params).unwrap();
    let before = result.expression().to_string();

    let first = result.compile();
    let second = result.compile();
    let typed = result.compile_typed::<(i32, i32), i32>().unwrap();
    for (x, y) in [(1, 2), (-5, 7), (100, 0)] {
        let args = [Value::Int32(x), Value::Int32(y)];
        assert_eq!(first.call(&args).unwrap(), second.call(&args).unwrap());
        assert_eq!(first.call(&args).unwrap(), Value::Int32(typed.call((x, y)).unwrap()));
    }
    assert_eq!(result.expression().to_string(), before);
}

#[test]
fn test_randomized_integer_arithmetic() {
    let params = [
        Parameter::of::<i32>("a"),
        Parameter::of::<i32>("b"),
        Parameter::of::<i32>("c"),
    ];
    let f = parse("a - b - c * 2 + (a + b) * c", &params)
        .unwrap()
        .compile_typed::<(i32, i32, i32), i32>()
        .unwrap();

    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let a: i32 = rng.gen_range(-10_000..10_000);
        let b: i32 = rng.gen_range(-10_000..10_000);
        let c: i32 = rng.gen_range(-10_000..10_000);
        let expected = a - b - c * 2 + (a + b) * c;
        assert_eq!(f.call((a, b, c)).unwrap(), expected, "a={} b={} c={}", a, b, c);
    }
}

#[test]
fn test_randomized_predicates() {
    let params = [Parameter::of::<f64>("x"), Parameter::of::<i32>("n")];
    let f = parse("x * 2 > n && !(n % 3 == 0) || x <= -50.5", &params)
        .unwrap()
        .compile_typed::<(f64, i32), bool>()
        .unwrap();

    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let x: f64 = rng.gen_range(-100.0..100.0);
        let n: i32 = rng.gen_range(-100..100);
        let expected = x * 2.0 > n as f64 && !(n % 3 == 0) || x <= -50.5;
        assert_eq!(f.call((x, n)).unwrap(), expected, "x={} n={}", x, n);
    }
}

#[test]
fn test_concurrent_parsing() {
    let parser = Arc::new(ExpressionParser::new([Parameter::of::<f64>("x")]));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || {
                let text = format!("SUM(x, {}) * 2", i);
                let f = parser
                    .parse(&text)
                    .unwrap()
                    .compile_typed::<(f64,), f64>()
                    .unwrap();
                f.call((1.0,)).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), (1.0 + i as f64) * 2.0);
    }
}
