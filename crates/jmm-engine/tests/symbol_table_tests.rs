use jmm_engine::parser::checker::VarOrigin;
use jmm_engine::{build_symbol_table, parse_source, SymbolTable, Type};

fn table(source: &str) -> SymbolTable {
    let ast = parse_source(source).expect("source should parse");
    build_symbol_table(&ast)
}

const PROGRAM: &str = r#"
import io;
import java.util.List;
class Shapes extends Base implements Drawable {
    int count;
    boolean[] flags;

    public static void main(String[] args) {
        Shapes s;
        s = new Shapes();
    }

    int area(int w, int h) {
        int a;
        a = w * h;
        return a;
    }

    int[] squares(int n) {
        int[] out;
        int i;
        out = new int[n];
        i = 0;
        int sq;
        while (i < n) {
            sq = i * i;
            out[i] = sq;
            i = i + 1;
        }
        return out;
    }
}
"#;

// ============================================================================
// Class-level metadata
// ============================================================================

#[test]
fn test_imports_are_dotted_paths() {
    let t = table(PROGRAM);
    assert_eq!(t.imports(), &["io".to_string(), "java.util.List".to_string()]);
    assert_eq!(
        t.import_statements(),
        vec!["import io;".to_string(), "import java.util.List;".to_string()]
    );
}

#[test]
fn test_imported_names_resolve_by_last_segment() {
    let t = table(PROGRAM);
    assert!(t.is_imported("io"));
    assert!(t.is_imported("List"));
    assert!(t.is_imported("java.util.List"));
    assert!(!t.is_imported("util"));
    assert_eq!(t.import_path("List"), Some("java.util.List"));
    assert_eq!(t.import_path("Map"), None);
}

#[test]
fn test_class_header() {
    let t = table(PROGRAM);
    assert_eq!(t.class_name(), "Shapes");
    assert_eq!(t.super_class(), Some("Base"));
    assert_eq!(t.interfaces(), &["Drawable".to_string()]);
}

#[test]
fn test_class_without_superclass() {
    let t = table("class A { }");
    assert_eq!(t.class_name(), "A");
    assert_eq!(t.super_class(), None);
    assert!(t.fields().is_empty());
    assert!(t.methods().is_empty());
}

#[test]
fn test_fields() {
    let t = table(PROGRAM);
    let fields: Vec<(&str, String)> = t
        .fields()
        .iter()
        .map(|f| (f.name.as_str(), f.ty.to_string()))
        .collect();
    assert_eq!(
        fields,
        vec![("count", "int".to_string()), ("flags", "boolean[]".to_string())]
    );
    assert_eq!(t.field("count").map(|f| &f.ty), Some(&Type::int()));
    assert!(t.field("missing").is_none());
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn test_method_names_in_declaration_order() {
    let t = table(PROGRAM);
    assert_eq!(
        t.methods(),
        &["main".to_string(), "area".to_string(), "squares".to_string()]
    );
    assert!(t.has_method("area"));
    assert!(!t.has_method("perimeter"));
}

#[test]
fn test_parameters_match_declared_arity() {
    let t = table(PROGRAM);
    let params: Vec<&str> = t.parameters("area").iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["w", "h"]);
    assert_eq!(t.parameters("squares").len(), 1);
    assert_eq!(t.parameters("main")[0].ty, Type::new("String", true));
    assert!(t.parameters("missing").is_empty());
}

#[test]
fn test_return_types() {
    let t = table(PROGRAM);
    assert_eq!(t.return_type("area"), Some(&Type::int()));
    assert_eq!(t.return_type("squares"), Some(&Type::int_array()));
    assert_eq!(t.return_type("main"), Some(&Type::void()));
    assert_eq!(t.return_type("missing"), None);
}

#[test]
fn test_locals_include_late_declarations() {
    let t = table(PROGRAM);
    let locals: Vec<&str> = t.locals("squares").iter().map(|l| l.name.as_str()).collect();
    assert_eq!(locals, vec!["out", "i", "sq"]);
    assert_eq!(t.locals("main")[0].ty, Type::class("Shapes"));
}

#[test]
fn test_modifiers() {
    let t = table(PROGRAM);
    let main = t.signature("main").unwrap();
    assert!(main.is_static());
    assert!(!t.signature("area").unwrap().is_static());
}

#[test]
fn test_duplicate_method_replaces_signature() {
    let t = table("class A { int f(int a) { return a; } boolean f() { return true; } }");
    assert_eq!(t.methods(), &["f".to_string()]);
    assert_eq!(t.return_type("f"), Some(&Type::boolean()));
    assert!(t.parameters("f").is_empty());
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_lookup_order() {
    let t = table("class A { int x; int y; int f(int x) { int y; return x; } }");

    let (symbol, origin) = t.lookup("f", "y").unwrap();
    assert_eq!(origin, VarOrigin::Local);
    assert_eq!(symbol.ty, Type::int());

    let (_, origin) = t.lookup("f", "x").unwrap();
    assert_eq!(origin, VarOrigin::Parameter(0));

    let t = table("class A { int z; int f() { return z; } }");
    let (_, origin) = t.lookup("f", "z").unwrap();
    assert_eq!(origin, VarOrigin::Field);
    assert!(t.lookup("f", "nothing").is_none());
}

#[test]
fn test_display_lists_members() {
    let text = table(PROGRAM).to_string();
    assert!(text.contains("import io"));
    assert!(text.contains("class Shapes extends Base"));
    assert!(text.contains("field count: int"));
    assert!(text.contains("area"));
}
