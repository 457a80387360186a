use crate::{
    ast::{Expr, GraphExpr, Stmt},
    config::Config,
    driver::front_end,
    error::ReportKind,
    token::{Source, TokenKind, scan},
    util::must,
};

#[test]
fn test_end_to_end_var_decl() {
    let source = Source::new_from_string("int a = 1 + 2;");

    // Scans to the expected token sequence
    let tokens = must(scan(&source, &Config::test()));
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::IntType,
            TokenKind::IdentLit("a".to_string()),
            TokenKind::Eq,
            TokenKind::IntLit(1),
            TokenKind::Plus,
            TokenKind::IntLit(2),
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );

    // Parses to one variable declaration and passes checking
    let ast = must(front_end(&source, &Config::test()));
    assert_eq!(ast.nodes.len(), 1);

    let Stmt::VarDecl(var) = &ast.nodes[0] else {
        panic!("expected variable declaration");
    };
    assert_eq!(var.name.kind, TokenKind::IdentLit("a".to_string()));
    assert!(matches!(var.init, Some(Expr::Binary(_))));
}

#[test]
fn test_end_to_end_graph() {
    let source = Source::new_from_string("g { [\"x\"] => [\"y\"] 5; };");
    let ast = must(front_end(&source, &Config::test()));
    assert_eq!(ast.nodes.len(), 1);

    let Stmt::Graph(graph) = &ast.nodes[0] else {
        panic!("expected graph statement");
    };
    assert_eq!(graph.name.kind, TokenKind::IdentLit("g".to_string()));
    assert_eq!(graph.ops.len(), 1);

    let GraphExpr::Edge(edge) = &graph.ops[0] else {
        panic!("expected edge operation");
    };
    assert_eq!(edge.op.kind, TokenKind::Arrow);
    assert!(matches!(&edge.weight, Some(t) if t.kind == TokenKind::IntLit(5)));
}

#[test]
fn test_fail_fast_per_stage() {
    // The first error of any stage aborts the whole run
    let lexical = front_end(&Source::new_from_string("int a = $;"), &Config::test());
    assert_eq!(lexical.unwrap_err().kind, ReportKind::Lexical);

    let syntax = front_end(&Source::new_from_string("int a = ;"), &Config::test());
    assert_eq!(syntax.unwrap_err().kind, ReportKind::Syntax);

    let semantic = front_end(&Source::new_from_string("int a = true;"), &Config::test());
    assert_eq!(semantic.unwrap_err().kind, ReportKind::Semantic);
}

#[test]
fn test_error_rendering() {
    let source = Source::new_from_string("int a = true;");
    let err = front_end(&source, &Config::test()).unwrap_err();
    let rendered = err.render(&source);

    assert!(rendered.contains("semantic error"));
    assert!(rendered.contains("int a = true;"));
    assert!(rendered.contains("^"));
}
