use jmm_engine::{pipeline, CompileError, CompilerConfig, Pipeline, Stage};
use std::io::Write;

const PROGRAM: &str = r#"
import io;
class Counter {
    int total;

    public static void main(String[] args) {
        Counter c;
        c = new Counter();
        io.println(c.count(10));
    }

    int count(int n) {
        int i;
        i = 0;
        total = 0;
        while (i < n) {
            if (i < 5 && !(i == 3)) {
                total = total + i;
            } else {
                total = total + 1;
            }
            i = i + 1;
        }
        return total;
    }
}
"#;

fn source_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".jmm")
        .tempfile()
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

// ============================================================================
// Successful runs
// ============================================================================

#[test]
fn test_compile_produces_every_artifact() {
    let output = pipeline::compile(PROGRAM).unwrap();
    assert!(!output.ast.is_empty());
    assert_eq!(output.symbol_table.class_name(), "Counter");
    assert!(output.reports.is_empty());
    assert!(output.ir.starts_with("import io;\nCounter {"));
    assert!(output.jasmin.starts_with(".class public Counter\n.super java/lang/Object\n"));
    assert!(output.jasmin.contains("invokestatic io/println(I)V"));
    assert!(output.jasmin.contains("invokevirtual Counter/count(I)I"));
    assert!(output.jasmin.contains("putfield Counter/total I"));
}

#[test]
fn test_compile_file() {
    let file = source_file(PROGRAM);
    let output = Pipeline::default().compile_file(file.path()).unwrap();
    assert_eq!(output.symbol_table.methods().len(), 2);
}

#[test]
fn test_run_uses_configured_input() {
    let file = source_file("class A { int f() { return 42; } }");
    let config = CompilerConfig::from_map([
        ("inputFile", file.path().to_str().unwrap()),
        ("debug", "true"),
    ])
    .unwrap();
    let pipeline = Pipeline::new(config);
    assert!(pipeline.config().debug);

    let output = pipeline.run().unwrap();
    assert!(output.jasmin.contains("bipush 42"));
}

#[test]
fn test_recorded_options_do_not_change_output() {
    let plain = pipeline::compile(PROGRAM).unwrap();
    let config = CompilerConfig::from_map([("optimize", "true"), ("registerAllocation", "2")]).unwrap();
    let tuned = Pipeline::new(config).compile(PROGRAM).unwrap();
    assert_eq!(plain.ir, tuned.ir);
    assert_eq!(plain.jasmin, tuned.jasmin);
}

#[test]
fn test_dollar_identifiers_compile() {
    let output = pipeline::compile(
        "class A { int f() { int a$b; a$b = 3; return a$b; } int g(int[] $v) { return $v[0]; } }",
    )
    .unwrap();
    assert!(output.ir.contains("a$b.i32 :=.i32 3.i32;"));
    assert!(output.ir.contains("$1.$v[0.i32].i32"));
    assert!(output.jasmin.contains(".method public f()I"));
    assert!(output.jasmin.contains(".method public g([I)I"));
}

#[test]
fn test_non_static_main_is_checked_as_static() {
    let err = pipeline::compile(
        "class A { int x; public void main(String[] a) { x = 1; } }",
    )
    .unwrap_err();
    match err {
        CompileError::Semantic { reports } => {
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].message, "Cannot use fields in a static method.");
        }
        other => panic!("expected semantic error, got {:?}", other),
    }
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_parameter_slot_names_are_reserved() {
    let err = pipeline::compile("class A { int f() { int $1; $1 = 2; return $1; } }").unwrap_err();
    assert!(matches!(err, CompileError::Parse { .. }));
    assert!(err.reports()[0].message.contains("'$1' is reserved"));
}

#[test]
fn test_parse_failure_reports_parse_stage() {
    let err = pipeline::compile("class A { int f() { return 1 } }").unwrap_err();
    let reports = err.reports();
    assert!(!reports.is_empty());
    assert!(reports.iter().all(|r| r.stage == Stage::Parse));
    assert!(matches!(err, CompileError::Parse { .. }));
}

#[test]
fn test_semantic_failure_stops_before_lowering() {
    let err = pipeline::compile("class A { void f() { int x; boolean y; x = y; } }").unwrap_err();
    match err {
        CompileError::Semantic { reports } => {
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].message, "Assignment between a 'int' and a 'boolean'.");
        }
        other => panic!("expected semantic error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Pipeline::default()
        .compile_file(dir.path().join("Missing.jmm"))
        .unwrap_err();
    assert!(matches!(err, CompileError::Io(_)));
    assert!(err.reports().is_empty());
}

#[test]
fn test_run_without_input() {
    let err = Pipeline::default().run().unwrap_err();
    assert!(matches!(err, CompileError::Config { .. }));
}
