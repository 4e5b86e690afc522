extern crate irkit;

use indoc::indoc;
use irkit::codegen::FormatService;
use irkit::codegen::Generator;
use irkit::ir::Node;
use irkit::ir::Scalar;
use irkit::tester::ExprDialect;
use irkit::IrError;

fn expr_generator(d: &ExprDialect) -> Generator {
    let mut generator = Generator::new();
    generator.template(&d.literal, "{value}").unwrap();
    generator.template(&d.binary_op, "({left}{op}{right})").unwrap();
    generator.template(&d.call, "{name}({args|, })").unwrap();
    generator.template(&d.program, "{body|\n}").unwrap();
    generator
}

#[test]
fn renders_bottom_up() {
    let d = ExprDialect::new();
    let generator = expr_generator(&d);
    let tree = d.binary(d.literal(3), "+", d.literal(5));
    assert_eq!(generator.render(&tree).unwrap(), "(3+5)");
}

#[test]
fn sequence_fields_join_with_the_separator() {
    let d = ExprDialect::new();
    let generator = expr_generator(&d);
    let tree = d.call("f", vec![d.literal(1), d.literal(2), d.literal(3)]);
    assert_eq!(generator.render(&tree).unwrap(), "f(1, 2, 3)");
}

#[test]
fn whole_program_rendering() {
    let d = ExprDialect::new();
    let generator = expr_generator(&d);
    let tree = d.program(vec![
        d.binary(d.literal(1), "+", d.literal(2)),
        d.call("print", vec![d.literal(7)]),
    ]);
    let expected = indoc! {"
    (1+2)
    print(7)
    "};
    assert_eq!(generator.render(&tree).unwrap(), expected.trim_end());
}

#[test]
fn missing_template_is_fatal() {
    let d = ExprDialect::new();
    let generator = expr_generator(&d);
    let var = Node::builder(&d.var).set("name", "x").build().unwrap();
    let result = generator.render(&var);
    match result {
        Err(IrError::UnsupportedVariant(kind)) => assert_eq!(kind, "Var"),
        other => panic!("expected an unsupported variant error, got {other:?}"),
    }
}

#[test]
fn ancestor_template_applies_to_descendants() {
    let d = ExprDialect::new();
    let mut generator = Generator::new();
    generator.template(&d.expr, "<expr>").unwrap();
    let tree = d.literal(1);
    assert_eq!(generator.render(&tree).unwrap(), "<expr>");
}

#[test]
fn absent_optional_fields_render_empty() {
    let d = ExprDialect::new();
    let mut generator = Generator::new();
    generator.template(&d.var, "let {name}{init};").unwrap();
    generator.template(&d.literal, " = {value}").unwrap();
    let plain = Node::builder(&d.var).set("name", "x").build().unwrap();
    assert_eq!(generator.render(&plain).unwrap(), "let x;");
    let initialized = Node::builder(&d.var)
        .set("name", "x")
        .set("init", d.literal(3))
        .build()
        .unwrap();
    assert_eq!(generator.render(&initialized).unwrap(), "let x = 3;");
}

#[test]
fn unknown_field_reference_is_a_dispatch_error() {
    let d = ExprDialect::new();
    let mut generator = Generator::new();
    generator.template(&d.literal, "{nope}").unwrap();
    let result = generator.render(&d.literal(1));
    assert!(matches!(result, Err(IrError::Dispatch(_))));
}

#[test]
fn scalar_stringification_is_replaceable() {
    let d = ExprDialect::new();
    let mut generator = Generator::new();
    generator.template(&d.literal, "{value}").unwrap();
    generator.template(&d.binary_op, "({left}{op}{right})").unwrap();
    generator.scalar_format(|scalar| match scalar {
        Scalar::Enum(op) if op == "+" => " plus ".to_string(),
        other => other.to_string(),
    });
    let tree = d.binary(d.literal(3), "+", d.literal(5));
    assert_eq!(generator.render(&tree).unwrap(), "(3 plus 5)");
}

struct FailingFormatter;

impl FormatService for FailingFormatter {
    fn format(&self, _language: &str, _source: &str, _style: &str) -> Result<String, IrError> {
        Err(IrError::Formatting("service unavailable".to_string()))
    }
}

#[test]
fn formatter_failure_degrades_to_unformatted_output() {
    let d = ExprDialect::new();
    let mut generator = expr_generator(&d);
    generator.formatter(Box::new(FailingFormatter), "toy", "default");
    let tree = d.binary(d.literal(3), "+", d.literal(5));
    assert_eq!(generator.generate(&tree).unwrap(), "(3+5)");
}

struct UppercaseFormatter;

impl FormatService for UppercaseFormatter {
    fn format(&self, language: &str, source: &str, style: &str) -> Result<String, IrError> {
        assert_eq!(language, "toy");
        assert_eq!(style, "shouty");
        Ok(source.to_uppercase())
    }
}

#[test]
fn formatter_runs_after_rendering() {
    let d = ExprDialect::new();
    let mut generator = expr_generator(&d);
    generator.formatter(Box::new(UppercaseFormatter), "toy", "shouty");
    let tree = d.call("f", vec![d.literal(1)]);
    assert_eq!(generator.generate(&tree).unwrap(), "F(1)");
}
