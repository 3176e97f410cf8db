use bang_ast::ast::*;
use bang_ast::types::Type;
use bang_types::{analyze, compile, CompileError, GlobalCounts, TypeError};
use pretty_assertions::assert_eq;

fn type_error(src: &str) -> TypeError {
    match compile(src) {
        Err(CompileError::Type(e)) => e,
        other => panic!("expected a type error, got {:?}", other),
    }
}

/// `name : type` for every top-level binding.
fn summary(src: &str) -> Vec<String> {
    let analysis = analyze(src).unwrap();
    analysis.bindings().into_iter().map(|(n, t)| format!("{n} : {t}")).collect()
}

#[test]
fn arithmetic_on_a_bool_is_rejected() {
    assert_eq!(
        type_error("x = 1 + true"),
        TypeError::OperatorTypes { line: 1, op: BinaryOp::Add, left: Type::int(), right: Type::bool() }
    );
    assert!(matches!(type_error("x = \"a\" + \"b\""), TypeError::OperatorTypes { .. }));
    assert!(matches!(type_error("x = 1.5 && true"), TypeError::OperatorTypes { .. }));
}

#[test]
fn operators_produce_their_result_type() {
    assert_eq!(
        summary("a = 1 + 2 * 3\nb = 1.5 / 2.\nc = 1 < 2 && true\nd = false == true"),
        ["a : int", "b : float", "c : bool", "d : bool"]
    );
}

#[test]
fn globals_are_immutable() {
    assert_eq!(type_error("x = 1\nx = true"), TypeError::GlobalMutation { line: 2, name: "x".into() });
    assert_eq!(type_error("x = 1\nx = 2"), TypeError::GlobalMutation { line: 2, name: "x".into() });
}

#[test]
fn globals_cannot_be_assigned_from_a_function() {
    let err = type_error("x = 1\nf = () -> (int) {\n x = 2\n return x\n}");
    assert_eq!(err, TypeError::GlobalMutation { line: 3, name: "x".into() });
}

#[test]
fn locals_keep_their_type() {
    let err = type_error("f = () -> (int) {\n x = 1\n x = true\n return 1\n}");
    assert_eq!(
        err,
        TypeError::LocalTypeChange { line: 3, name: "x".into(), previous: Type::int(), found: Type::bool() }
    );
    assert_eq!(summary("f = () -> (int) {\n x = 1\n x = x + 1\n return x\n}"), ["f : () -> (int)"]);
}

#[test]
fn get_resolves_its_hole_from_the_array() {
    assert_eq!(summary("xs = [1, 2]\ny = !get xs 0"), ["xs : []int", "y : int"]);
    assert_eq!(summary("y = !get [[1.5]] 0"), ["y : []float"]);
    assert_eq!(summary("n = !length [true]\nt = !tail [\"a\"]"), ["n : int", "t : []string"]);
}

#[test]
fn disagreeing_hole_bindings_are_rejected() {
    assert_eq!(
        type_error("y = !set [1] 0 true"),
        TypeError::ArgumentType { line: 1, position: 3, expected: Type::hole("a"), found: Type::bool() }
    );
    assert_eq!(summary("y = !set [1] 0 5"), ["y : []int"]);
}

#[test]
fn builtins_must_be_called_to_be_stored() {
    assert_eq!(type_error("g = get"), TypeError::UnresolvedTypeHole { line: 1, name: "a".into() });
}

#[test]
fn application_checks_the_callee_and_arguments() {
    assert_eq!(type_error("x = 1\ny = !x 2"), TypeError::NotAFunction { line: 2, found: "int".into() });
    assert_eq!(
        type_error("y = !length [1] 2"),
        TypeError::ArgumentCount { line: 1, expected: 1, found: 2 }
    );
    assert_eq!(
        type_error("f = (a int) -> { a }\ny = !f 1.5"),
        TypeError::ArgumentType { line: 2, position: 1, expected: Type::int(), found: Type::float() }
    );
    assert!(matches!(type_error("y = !missing 1"), TypeError::UndefinedIdentifier { line: 1, .. }));
}

#[test]
fn if_branches_must_agree() {
    assert_eq!(summary("x = if true 1 else 2"), ["x : int"]);
    assert_eq!(
        type_error("x = if true 1 else true"),
        TypeError::BranchMismatch { line: 1, then: "int".into(), otherwise: "bool".into() }
    );
    assert_eq!(type_error("x = if 1 2 else 3"), TypeError::ConditionNotBool { line: 1, found: "int".into() });
}

#[test]
fn recursion_needs_explicit_return_types() {
    assert_eq!(summary("f = (n int) -> (int) { return !f n }"), ["f : (int) -> (int)"]);
    let src = "fact = (n int) -> (int) {\n r = if n > 1 n * !fact n - 1 else 1\n return r\n}\nx = !fact 5";
    assert_eq!(summary(src), ["fact : (int) -> (int)", "x : int"]);
    assert_eq!(
        type_error("f = (n int) -> { return !f n }"),
        TypeError::RecursiveWithoutReturnTypes { line: 1, name: "f".into() }
    );
}

#[test]
fn locals_vanish_with_their_function() {
    let err = type_error("f = (a int) -> (int) {\n y = a\n return y\n}\nz = y");
    assert_eq!(err, TypeError::UndefinedIdentifier { line: 5, name: "y".into() });
}

#[test]
fn functions_see_only_their_own_frame_and_globals() {
    let src = "g = 10\nf = (a int) -> (int) {\n h = (b int) -> { b + g }\n return !h a\n}";
    assert_eq!(summary(src), ["g : int", "f : (int) -> (int)"]);
    let err = type_error("f = (a int) -> (int) {\n h = (b int) -> { b + a }\n return !h a\n}");
    assert_eq!(err, TypeError::UndefinedIdentifier { line: 2, name: "a".into() });
}

#[test]
fn arrays_need_one_element_type() {
    assert_eq!(type_error("x = [1]\ny = []"), TypeError::EmptyArrayLiteral { line: 2 });
    assert_eq!(
        type_error("x = [1, 2.5]"),
        TypeError::ArrayElementMismatch { line: 1, index: 1, expected: Type::int(), found: Type::float() }
    );
}

#[test]
fn assignments_match_value_count_and_annotation() {
    assert_eq!(type_error("x, y = 1"), TypeError::AssignmentArity { line: 1, variables: 2, values: 1 });
    assert_eq!(
        type_error("x int = 1.5"),
        TypeError::AnnotationMismatch { line: 1, name: "x".into(), declared: Type::int(), found: Type::float() }
    );
    let src = "d = (n int) -> (int, bool) { return n, true }\nq, ok = !d 3";
    assert_eq!(summary(src), ["d : (int) -> (int, bool)", "q : int", "ok : bool"]);
}

#[test]
fn multi_value_results_are_not_operands() {
    let err = type_error("d = (n int) -> (int, int) { return n, n }\nx = 1 + !d 1");
    assert_eq!(
        err,
        TypeError::MultiValueOperand { line: 2, op: BinaryOp::Add, left: "int".into(), right: "int, int".into() }
    );
    let err = type_error("d = (n int) -> (int, int) { return n, n }\nx = [!d 1]");
    assert!(matches!(err, TypeError::MultiValueExpression { line: 2, context: "array element", .. }));
}

#[test]
fn inferred_functions_need_exactly_one_return() {
    assert_eq!(type_error("f = () -> { }"), TypeError::MissingReturnTypes { line: 1, found: 0 });
    assert_eq!(summary("f = (a float) -> { a * 2. }"), ["f : (float) -> (float)"]);
}

#[test]
fn arguments_need_annotations() {
    assert_eq!(type_error("f = (a) -> { a }"), TypeError::UntypedArgument { line: 1, name: "a".into() });
}

#[test]
fn return_only_inside_functions() {
    assert_eq!(type_error("x = 1\nreturn x"), TypeError::ReturnOutsideFunction { line: 2 });
}

#[test]
fn function_literals_as_arguments_take_anonymous_slots() {
    let src = "apply = (f (int) -> (int), x int) -> (int) { return !f x }\ny = !apply (n int) -> { n + 1 } 2";
    let analysis = analyze(src).unwrap();
    assert_eq!(analysis.counts, GlobalCounts { values: 1, functions: 2 });
    let names: Vec<_> = analysis.bindings().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["apply", "y"]);
}

#[test]
fn validated_tree_carries_types() {
    let program = compile("x = 1 + 2\nf = (a int) -> { a }\ny = !f x").unwrap();
    let values: Vec<&Expr> = program
        .body
        .statements
        .iter()
        .map(|s| match s {
            Statement::Assignment(a) => &a.value,
            Statement::Return(_) => panic!("unexpected return"),
        })
        .collect();
    match values[0] {
        Expr::Operator(o) => assert_eq!(o.operand_type, Some(Type::int())),
        other => panic!("expected an operator, got {:?}", other),
    }
    match values[1] {
        Expr::FunctionDefinition(def) => {
            assert_eq!(def.return_types, [Type::int()]);
            assert_eq!(
                def.function_type.clone().map(Type::Function),
                Some(Type::function(vec![Type::int()], vec![Type::int()]))
            );
        }
        other => panic!("expected a function literal, got {:?}", other),
    }
    match values[2] {
        Expr::Apply(a) => {
            assert_eq!(a.return_types, [Type::int()]);
            assert!(matches!(a.function.as_ref(), Expr::Variable(Variable { ty: Some(Type::Function(_)), .. })));
        }
        other => panic!("expected an application, got {:?}", other),
    }
}

#[test]
fn generic_builtins_cannot_be_used_as_plain_values() {
    let hole = TypeError::UnresolvedTypeHole { line: 1, name: "a".into() };
    assert_eq!(type_error("n = !length [get]"), hole);
    assert_eq!(type_error("f = if true get else get"), hole);
    assert_eq!(type_error("g = (h ([]int) -> (int)) -> { 1 }\nn = !g tail"), TypeError::UnresolvedTypeHole {
        line: 2,
        name: "a".into()
    });
    assert_eq!(type_error("f = () -> { return length }"), hole);
}

#[test]
fn take_expects_the_count_first() {
    assert_eq!(summary("t = !take 1 [2.5]"), ["t : []float"]);
    assert_eq!(
        type_error("t = !take [1] 1"),
        TypeError::ArgumentType { line: 1, position: 1, expected: Type::int(), found: Type::array(Type::int()) }
    );
}

#[test]
fn unicode_names_bind_like_ascii_ones() {
    assert_eq!(summary("café = 1\nλ = café * 2"), ["café : int", "λ : int"]);
}
