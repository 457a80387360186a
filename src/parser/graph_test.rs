use crate::ast::{Expr, GraphExpr, Pred, Printer, Stmt};
use crate::error::ReportKind;
use crate::token::TokenKind;
use crate::util::{compare_string_lines_or_panic, must, parse_string};

fn compare_string(src: &str) {
    let ast = must(parse_string(src));
    let pstr = Printer::to_string(&ast);
    compare_string_lines_or_panic(pstr, src.to_string());
}

/// Parse a source with one graph statement and return its operations.
fn graph_ops(src: &str) -> Vec<GraphExpr> {
    let ast = must(parse_string(src));
    assert_eq!(ast.nodes.len(), 1);

    match ast.nodes.into_iter().next().unwrap() {
        Stmt::Graph(node) => node.ops,
        other => panic!("expected graph statement, got {:?}", other),
    }
}

#[test]
fn test_weighted_edge() {
    let ops = graph_ops("g { [\"x\"] => [\"y\"] 5; };");
    assert_eq!(ops.len(), 1);

    let GraphExpr::Edge(edge) = &ops[0] else {
        panic!("expected edge operation");
    };

    assert_eq!(edge.op.kind, TokenKind::Arrow);
    assert!(matches!(&edge.weight, Some(t) if t.kind == TokenKind::IntLit(5)));
    assert!(
        matches!(&edge.left.pred, Pred::Test(Expr::Literal(t)) if t.kind == TokenKind::StringLit("x".to_string()))
    );
}

#[test]
fn test_edge_relations() {
    let ops = graph_ops("g { [\"a\"] <=> [\"b\"]; [\"a\"] =/= [\"b\"]; };");
    assert_eq!(ops.len(), 2);

    let GraphExpr::Edge(both) = &ops[0] else {
        panic!("expected edge operation");
    };
    assert_eq!(both.op.kind, TokenKind::DoubleArrow);
    assert!(both.weight.is_none());

    let GraphExpr::Edge(disconnect) = &ops[1] else {
        panic!("expected edge operation");
    };
    assert_eq!(disconnect.op.kind, TokenKind::NotArrow);
}

#[test]
fn test_add_and_remove_vertices() {
    let ops = graph_ops("g { V+ {\"a\", \"b\"} 3; V- [\"a\"]; };");
    assert_eq!(ops.len(), 2);

    let GraphExpr::AddVertex(add) = &ops[0] else {
        panic!("expected add vertex operation");
    };
    assert!(matches!(&add.tags, Expr::SetLit(s) if s.items.len() == 2));
    assert!(matches!(&add.count, Some(t) if t.kind == TokenKind::IntLit(3)));

    assert!(matches!(&ops[1], GraphExpr::RemoveVertex(_)));
}

#[test]
fn test_add_vertex_default_count() {
    let ops = graph_ops("g { V+ {\"a\"}; };");
    let GraphExpr::AddVertex(add) = &ops[0] else {
        panic!("expected add vertex operation");
    };
    assert!(add.count.is_none());
}

#[test]
fn test_tag_mutation() {
    let ops = graph_ops("g { [\"a\"] ++ {\"t\"}; [\"a\"] -- {\"t\"}; };");
    assert!(matches!(&ops[0], GraphExpr::TagAdd(_)));
    assert!(matches!(&ops[1], GraphExpr::TagRemove(_)));
}

#[test]
fn test_retag() {
    let ops = graph_ops("g { \"old\" << \"new\"; \"gone\" << null; };");

    let GraphExpr::Retag(retag) = &ops[0] else {
        panic!("expected retag operation");
    };
    assert_eq!(retag.new.kind, TokenKind::StringLit("new".to_string()));

    let GraphExpr::Retag(remove) = &ops[1] else {
        panic!("expected retag operation");
    };
    assert_eq!(remove.new.kind, TokenKind::Null);
}

#[test]
fn test_retag_requires_string_or_null() {
    let err = parse_string("g { \"old\" << 5; };").unwrap_err();
    assert_eq!(err.kind, ReportKind::Syntax);
    assert_eq!(err.message, "expected string or null");
}

#[test]
fn test_graph_control_flow() {
    let ops = graph_ops(
        "g { while (run) { V+ {\"n\"}; } if (flag) { V+ {\"x\"}; } else { V- [\"x\"]; } };",
    );
    assert_eq!(ops.len(), 2);

    let GraphExpr::While(wh) = &ops[0] else {
        panic!("expected graph while");
    };
    assert_eq!(wh.body.ops.len(), 1);

    let GraphExpr::If(iff) = &ops[1] else {
        panic!("expected graph if");
    };
    assert!(iff.els.is_some());
}

#[test]
fn test_embedded_statement() {
    let ops = graph_ops("g { int i = 0; i = i + 1; };");
    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[0], GraphExpr::Stmt(s) if matches!(&**s, Stmt::VarDecl(_))));
    assert!(matches!(&ops[1], GraphExpr::Stmt(s) if matches!(&**s, Stmt::ExprStmt(_))));
}

#[test]
fn test_predicate_algebra() {
    // or binds loosest, then and, then unary not
    let ops = graph_ops("g { V- [\"a\" and !\"b\" or (\"c\")]; };");

    let GraphExpr::RemoveVertex(remove) = &ops[0] else {
        panic!("expected remove vertex operation");
    };

    let Pred::Or(or) = &remove.pred.pred else {
        panic!("expected or predicate");
    };
    assert!(matches!(&*or.left, Pred::And(and) if matches!(&*and.right, Pred::Not(_))));
    assert!(matches!(&*or.right, Pred::Group(_)));
}

#[test]
fn test_graph_block_requires_semicolon() {
    let err = parse_string("g { V+ {\"a\"}; }").unwrap_err();
    assert_eq!(err.kind, ReportKind::Syntax);
    assert_eq!(err.message, "expected ;");
}

#[test]
fn test_graph_round_trip() {
    compare_string(
        r#"
        g {
            V+ {"server"} 3;
            ["server"] => ["db"] 5;
            ["db"] ++ {"active"};
            "old" << "new";
        };
    "#,
    );
}
