use crate::types::{Prim, SymTable, Type};

fn int() -> Type {
    Type::Prim(Prim::Int)
}

fn boolean() -> Type {
    Type::Prim(Prim::Bool)
}

#[test]
fn test_declare_and_lookup() {
    let mut sym = SymTable::new();
    assert!(sym.declare_var("a", int()));
    assert_eq!(sym.get_var("a"), Some(&int()));
    assert_eq!(sym.get_var("b"), None);
}

#[test]
fn test_redeclaration_in_same_frame() {
    let mut sym = SymTable::new();
    assert!(sym.declare_var("a", int()));
    assert!(!sym.declare_var("a", boolean()));

    // The first declaration wins
    assert_eq!(sym.get_var("a"), Some(&int()));
}

#[test]
fn test_shadowing() {
    let mut sym = SymTable::new();
    sym.declare_var("a", int());

    sym.enter_scope();
    assert!(sym.declare_var("a", boolean()));
    assert_eq!(sym.get_var("a"), Some(&boolean()));
    sym.exit_scope();

    // The outer binding is visible again
    assert_eq!(sym.get_var("a"), Some(&int()));
}

#[test]
fn test_global_fallback() {
    let mut sym = SymTable::new();
    sym.declare_var("g", int());

    sym.enter_scope();
    sym.enter_scope();
    assert_eq!(sym.get_var("g"), Some(&int()));
    sym.exit_scope();
    sym.exit_scope();
}

#[test]
fn test_namespaces_are_independent() {
    let mut sym = SymTable::new();

    // The same name may live in all three namespaces at once
    assert!(sym.declare_var("x", int()));
    assert!(sym.declare_func("x", boolean()));
    assert!(sym.declare_type("x", int()));

    assert_eq!(sym.get_var("x"), Some(&int()));
    assert_eq!(sym.get_func("x"), Some(&boolean()));
    assert_eq!(sym.get_type("x"), Some(&int()));
}

#[test]
fn test_declared_in_current_frame() {
    let mut sym = SymTable::new();
    sym.declare_func("f", boolean());
    assert!(sym.func_in_current("f"));

    sym.enter_scope();
    assert!(!sym.func_in_current("f"));
    sym.exit_scope();
}

#[test]
fn test_replace_type() {
    let mut sym = SymTable::new();
    sym.declare_type("T", int());

    sym.enter_scope();
    assert!(sym.replace_type("T", boolean()));
    sym.exit_scope();

    assert_eq!(sym.get_type("T"), Some(&boolean()));
    assert!(!sym.replace_type("U", int()));
}

#[test]
#[should_panic(expected = "attempted to pop base scope")]
fn test_pop_base_scope_panics() {
    let mut sym = SymTable::new();
    sym.exit_scope();
}
