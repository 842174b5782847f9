use jmm_engine::parser::checker::dedup_reports;
use jmm_engine::{analyze, build_symbol_table, parse_source, Report, Severity, Stage};

fn check(source: &str) -> Vec<Report> {
    let ast = parse_source(source).expect("source should parse");
    let table = build_symbol_table(&ast);
    analyze(&ast, table).reports
}

/// Wrap statements in an instance method of class `A`.
fn check_body(body: &str) -> Vec<Report> {
    check(&format!("class A {{\n  void f() {{\n{}\n  }}\n}}\n", body))
}

fn messages(reports: &[Report]) -> Vec<&str> {
    reports.iter().map(|r| r.message.as_str()).collect()
}

// ============================================================================
// Accepted programs
// ============================================================================

#[test]
fn test_well_typed_programs_have_no_reports() {
    let programs = [
        "class A { int f() { return 42; } }",
        "class A { int g(int x) { x = x + 1; return x; } }",
        "class A { int h() { int[] a; a = new int[5]; return a.length; } }",
        "class A { boolean b() { return 1 < 2; } }",
        "class A extends B { boolean eq(A x) { return x == this; } }",
        "class A { int m() { int x; x = 1; while (x < 10) x = x + 1; return x; } }",
    ];
    for program in programs {
        let reports = check(program);
        assert!(reports.is_empty(), "{}: {:?}", program, reports);
    }
}

#[test]
fn test_imported_calls_are_trusted() {
    let reports = check(
        "import io;\nclass A { public static void main(String[] args) { io.println(1); io.read(true, 2); } }",
    );
    assert!(reports.is_empty(), "{:?}", reports);
}

#[test]
fn test_superclass_and_imported_types_are_compatible() {
    let reports = check(
        "import B;\nclass A extends B { B f() { A a; B b; a = new A(); b = a; a = b; return a; } }",
    );
    assert!(reports.is_empty(), "{:?}", reports);
}

#[test]
fn test_unknown_method_on_subclass_is_trusted() {
    let reports = check("class A extends B { int f() { return this.inherited(); } }");
    assert!(reports.is_empty(), "{:?}", reports);
}

// ============================================================================
// Negative scenarios
// ============================================================================

#[test]
fn test_assignment_type_mismatch() {
    let reports = check_body("    int x;\n    boolean y;\n    x = y;");
    assert_eq!(reports.len(), 1, "{:?}", reports);
    assert_eq!(reports[0].message, "Assignment between a 'int' and a 'boolean'.");
    assert_eq!(reports[0].severity, Severity::Error);
    assert_eq!(reports[0].stage, Stage::Semantic);
}

#[test]
fn test_array_index_must_be_int() {
    let reports = check_body("    int[] a;\n    a[true];");
    assert_eq!(
        messages(&reports),
        vec!["Array Access Index should be of type 'int'."]
    );
    // Reported on the `true` literal
    assert_eq!((reports[0].line, reports[0].col), (4, 7));
}

#[test]
fn test_arity_mismatch() {
    let reports = check("class A { int m(int a) { return a; } int f() { return this.m(1, 2); } }");
    assert_eq!(messages(&reports), vec!["m expected 1 arguments but received 2."]);
}

#[test]
fn test_undeclared_method() {
    let reports = check("class A { int f() { return this.g(); } }");
    assert_eq!(messages(&reports), vec!["Method g is not declared."]);
}

#[test]
fn test_undeclared_variable() {
    let reports = check_body("    int x;\n    x = y;");
    assert_eq!(messages(&reports), vec!["Variable y is not declared."]);
}

#[test]
fn test_fields_in_static_method() {
    let reports = check(
        "class A { int n; public static void main(String[] args) { int x; x = n; } }",
    );
    assert_eq!(messages(&reports), vec!["Cannot use fields in a static method."]);
}

#[test]
fn test_main_is_static_without_modifier() {
    let reports = check("class A { int x; public void main(String[] a) { x = 1; this.g(); } void g() { } }");
    let messages = messages(&reports);
    assert!(messages.contains(&"Cannot use fields in a static method."), "{:?}", messages);
    assert!(messages.contains(&"'this' cannot be used in a static method."), "{:?}", messages);
}

#[test]
fn test_not_on_int() {
    let reports = check_body("    boolean b;\n    b = !3;");
    assert_eq!(messages(&reports), vec!["Cannot use '!' on a 'int'."]);
}

#[test]
fn test_wrong_return_type() {
    let reports = check("class A { int f() { return true; } }");
    assert_eq!(
        messages(&reports),
        vec!["Method f should return int but is returning 'boolean'."]
    );
}

#[test]
fn test_unknown_class() {
    let reports = check_body("    int x;\n    x = Missing.size();");
    assert_eq!(
        messages(&reports),
        vec!["Missing doesn't exist. Maybe you forgot to import a class or define a variable?"]
    );
}

#[test]
fn test_duplicate_members() {
    let reports = check("class A { int x; int x; int f() { return 1; } int f() { return 2; } }");
    let messages = messages(&reports);
    assert!(messages.contains(&"Field x is already defined."), "{:?}", messages);
    assert!(messages.contains(&"Method f is already defined."), "{:?}", messages);
}

#[test]
fn test_conditions_must_be_boolean() {
    let reports = check_body("    int x;\n    x = 1;\n    if (x) x = 2; else x = 3;\n    while (x) x = 4;");
    assert_eq!(
        messages(&reports),
        vec![
            "Expected a 'boolean' inside If condition but received a 'int'.",
            "Condition should be 'boolean'.",
        ]
    );
}

#[test]
fn test_arithmetic_on_booleans() {
    let reports = check_body("    int x;\n    x = true + 1;");
    assert_eq!(reports.len(), 1, "{:?}", reports);
    assert!(reports[0].message.starts_with("Cannot use '+' between"));
}

// ============================================================================
// Report sets
// ============================================================================

#[test]
fn test_analysis_is_deterministic() {
    let source = "class A { int m(int a) { return a; } int f() { int x; boolean y; x = y; return this.m(1, 2); } }";
    let ast = parse_source(source).unwrap();

    let first = dedup_reports(analyze(&ast, build_symbol_table(&ast)).reports);
    let second = dedup_reports(analyze(&ast, build_symbol_table(&ast)).reports);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_reports_are_located() {
    let reports = check_body("    int x;\n    boolean y;\n    x = y;");
    assert_eq!(reports[0].line, 5);
    assert!(reports[0].col > 0);
}

#[test]
fn test_check_result_keeps_the_table() {
    let ast = parse_source("class A { int f() { return 1; } }").unwrap();
    let result = analyze(&ast, build_symbol_table(&ast));
    assert!(!result.has_errors());
    assert_eq!(result.symbol_table.class_name(), "A");
}
