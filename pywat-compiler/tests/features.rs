use pywat_compiler::ast::{BinOp, Builtin1, Builtin2, Expr, Stmt};
use pywat_compiler::lower::MAX_NESTING_DEPTH;
use pywat_compiler::{compile, compile_to_wat, parse, Instr, Slot};

fn body(source: &str) -> Vec<String> {
    compile(source).unwrap().instrs.iter().map(|i| i.to_string()).collect()
}

// ── Definitions and references ───────────────────────────────────────────

#[test]
fn define_then_print() {
    let source = "x = 3\ny = x + 4\nprint(y)";
    let wat = compile_to_wat(source).unwrap();
    let expected = [
        "(local $$last i32)",
        "(local $x i32)",
        "(local $y i32)",
        "(i32.const 3)",
        "(local.set $x)",
        "(local.get $x)",
        "(i32.const 4)",
        "(i32.add)",
        "(local.set $y)",
        "(local.get $y)",
        "(call $print)",
        "(local.set $$last)",
    ]
    .join("\n");
    assert_eq!(wat, expected);
}

#[test]
fn define_then_print_lowers_to_three_statements() {
    let program = parse("x = 3\ny = x + 4\nprint(y)").unwrap();
    assert_eq!(program.len(), 3);
    assert!(matches!(&program[0], Stmt::Define { name, value: Expr::Number(3) } if name == "x"));
    assert!(matches!(
        &program[1],
        Stmt::Define { name, value: Expr::Binary { op: BinOp::Add, .. } } if name == "y"
    ));
    assert!(matches!(
        &program[2],
        Stmt::ExprStmt { expr: Expr::Builtin1 { name: Builtin1::Print, .. } }
    ));
}

#[test]
fn redefinition_reuses_the_slot() {
    let source = r#"
x = 1
x = x + 1
x = x * 2
"#;
    let compiled = compile(source).unwrap();
    assert_eq!(compiled.locals.len(), 2, "Only $$last and $x should be declared");
    assert_eq!(compiled.locals[1].slot, Slot::named("x"));
    let sets = compiled
        .instrs
        .iter()
        .filter(|i| **i == Instr::LocalSet { slot: Slot::named("x") })
        .count();
    assert_eq!(sets, 3);
}

#[test]
fn slots_follow_first_definition_order() {
    let source = r#"
b = 1
a = 2
b = a
c = b
"#;
    let lines = compile(source).unwrap().to_lines();
    assert_eq!(
        &lines[..4],
        ["(local $$last i32)", "(local $b i32)", "(local $a i32)", "(local $c i32)"]
    );
}

#[test]
fn semicolons_separate_statements() {
    assert_eq!(
        body("x = 5; y = x"),
        ["(i32.const 5)", "(local.set $x)", "(local.get $x)", "(local.set $y)"]
    );
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let source = r#"
# setup
x = 2   # two

print(x)
"#;
    assert_eq!(
        body(source),
        ["(i32.const 2)", "(local.set $x)", "(local.get $x)", "(call $print)", "(local.set $$last)"]
    );
}

// ── Expression statements ────────────────────────────────────────────────

#[test]
fn bare_literal_goes_to_scratch() {
    assert_eq!(body("42"), ["(i32.const 42)", "(local.set $$last)"]);
}

#[test]
fn bare_variable_goes_to_scratch() {
    assert_eq!(
        body("x = 1\nx"),
        ["(i32.const 1)", "(local.set $x)", "(local.get $x)", "(local.set $$last)"]
    );
}

// ── Arithmetic ───────────────────────────────────────────────────────────

#[test]
fn operators_map_to_i32_instructions() {
    assert_eq!(body("1 + 2")[2], "(i32.add)");
    assert_eq!(body("1 - 2")[2], "(i32.sub)");
    assert_eq!(body("1 * 2")[2], "(i32.mul)");
}

#[test]
fn precedence_is_postfix_order() {
    assert_eq!(
        body("1 + 2 * 3"),
        [
            "(i32.const 1)",
            "(i32.const 2)",
            "(i32.const 3)",
            "(i32.mul)",
            "(i32.add)",
            "(local.set $$last)",
        ]
    );
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(
        body("10 - 3 - 2"),
        [
            "(i32.const 10)",
            "(i32.const 3)",
            "(i32.sub)",
            "(i32.const 2)",
            "(i32.sub)",
            "(local.set $$last)",
        ]
    );
}

// ── Literals ─────────────────────────────────────────────────────────────

#[test]
fn literal_bounds_are_accepted() {
    assert_eq!(body("4294967295")[0], "(i32.const 4294967295)");
    assert_eq!(body("-2147483648")[0], "(i32.const -2147483648)");
    assert_eq!(body("0")[0], "(i32.const 0)");
}

#[test]
fn signed_literals_fold_into_the_constant() {
    assert_eq!(body("-5")[0], "(i32.const -5)");
    assert_eq!(body("+5")[0], "(i32.const 5)");
    assert_eq!(
        body("1 - -2"),
        ["(i32.const 1)", "(i32.const -2)", "(i32.sub)", "(local.set $$last)"]
    );
}

#[test]
fn integral_decimal_literals_are_integers() {
    assert_eq!(body("3.0"), ["(i32.const 3)", "(local.set $$last)"]);
    assert_eq!(body("x = -2.0")[0], "(i32.const -2)");
    assert_eq!(body("1.0e0")[0], "(i32.const 1)");
}

#[test]
fn leading_zeros_are_decimal() {
    assert_eq!(body("007")[0], "(i32.const 7)");
}

// ── Builtins ─────────────────────────────────────────────────────────────

#[test]
fn unary_builtins() {
    assert_eq!(
        body("abs(-3)"),
        ["(i32.const -3)", "(call $abs)", "(local.set $$last)"]
    );
    assert_eq!(body("print(1)")[1], "(call $print)");
}

#[test]
fn binary_builtins_push_both_arguments_in_order() {
    for (name, builtin) in [
        ("min", Builtin2::Min),
        ("max", Builtin2::Max),
        ("pow", Builtin2::Pow),
    ] {
        let source = format!("{name}(2, 10)");
        assert_eq!(
            body(&source),
            [
                "(i32.const 2)".to_string(),
                "(i32.const 10)".to_string(),
                format!("(call ${})", builtin.name()),
                "(local.set $$last)".to_string(),
            ]
        );
    }
}

#[test]
fn nested_calls() {
    assert_eq!(
        body("print(max(1, abs(-2)))"),
        [
            "(i32.const 1)",
            "(i32.const -2)",
            "(call $abs)",
            "(call $max)",
            "(call $print)",
            "(local.set $$last)",
        ]
    );
}

#[test]
fn call_arguments_may_span_lines() {
    let source = "x = min(\n    1,\n    2\n)";
    assert_eq!(
        body(source),
        ["(i32.const 1)", "(i32.const 2)", "(call $min)", "(local.set $x)"]
    );
}

#[test]
fn builtin_names_are_not_reserved_as_variables() {
    assert_eq!(
        body("print = 1\nprint(print)"),
        [
            "(i32.const 1)",
            "(local.set $print)",
            "(local.get $print)",
            "(call $print)",
            "(local.set $$last)",
        ]
    );
}

// ── Nesting ──────────────────────────────────────────────────────────────

#[test]
fn longest_accepted_sum_compiles() {
    let source = vec!["1"; MAX_NESTING_DEPTH].join(" + ");
    let compiled = compile(&source).unwrap();
    let adds = compiled.instrs.iter().filter(|i| matches!(i, Instr::Arith { .. })).count();
    assert_eq!(adds, MAX_NESTING_DEPTH - 1);
}

#[test]
fn long_programs_of_short_statements_compile() {
    let source = vec!["x = 1 + 2"; 10_000].join("\n");
    assert_eq!(compile(&source).unwrap().instrs.len(), 40_000);
}

// ── Empty programs ───────────────────────────────────────────────────────

#[test]
fn empty_source_compiles() {
    for source in ["", "   ", "\n\n\t\n"] {
        let compiled = compile(source).unwrap();
        assert!(compiled.instrs.is_empty());
        assert_eq!(compiled.to_lines(), ["(local $$last i32)"]);
    }
}

#[test]
fn comment_only_source_compiles() {
    assert!(compile("# nothing here\n").unwrap().instrs.is_empty());
}
