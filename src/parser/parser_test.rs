use crate::ast::{Expr, Printer, Stmt, TypeNode};
use crate::error::ReportKind;
use crate::token::TokenKind;
use crate::util::{compare_string_lines_or_panic, must, parse_string};

/// Parse the source and compare the printed AST against it line by line.
fn compare_string(src: &str) {
    let ast = must(parse_string(src));
    let pstr = Printer::to_string(&ast);
    compare_string_lines_or_panic(pstr, src.to_string());
}

#[test]
fn test_multiplicative_binds_tighter() {
    let ast = must(parse_string("1 + 2 * 3;"));
    assert_eq!(ast.nodes.len(), 1);

    let Stmt::ExprStmt(Expr::Binary(plus)) = &ast.nodes[0] else {
        panic!("expected binary expression statement");
    };

    assert_eq!(plus.op.kind, TokenKind::Plus);
    let Expr::Binary(star) = &*plus.right else {
        panic!("expected binary right operand");
    };
    assert_eq!(star.op.kind, TokenKind::Star);
}

#[test]
fn test_var_decl() {
    let ast = must(parse_string("int a = 1 + 2;"));
    assert_eq!(ast.nodes.len(), 1);

    let Stmt::VarDecl(var) = &ast.nodes[0] else {
        panic!("expected variable declaration");
    };

    assert!(matches!(&var.typ, TypeNode::Primitive(t) if t.kind == TokenKind::IntType));
    assert_eq!(var.name.kind, TokenKind::IdentLit("a".to_string()));
    assert!(matches!(var.init, Some(Expr::Binary(_))));
}

#[test]
fn test_assignment_targets() {
    let ast = must(parse_string("a = 1;"));
    assert!(matches!(
        &ast.nodes[0],
        Stmt::ExprStmt(Expr::Assign(_))
    ));

    let ast = must(parse_string("a.b = 1;"));
    assert!(matches!(&ast.nodes[0], Stmt::ExprStmt(Expr::Set(_))));

    let err = parse_string("1 = 2;").unwrap_err();
    assert_eq!(err.kind, ReportKind::Syntax);
    assert_eq!(err.message, "invalid assignment target");
}

#[test]
fn test_missing_semicolon() {
    let err = parse_string("int a = 1").unwrap_err();
    assert_eq!(err.kind, ReportKind::Syntax);
    assert_eq!(err.message, "expected ;");
}

#[test]
fn test_functions() {
    compare_string(
        r#"
        func main() returns void {
            return;
        }
    "#,
    );

    compare_string(
        r#"
        func add(int a, int b) returns int {
            return a + b;
        }
    "#,
    );

    compare_string(
        r#"
        func choose(bool flag, dec fallback) returns dec {
            if (flag) {
                return 1.5;
            } else {
                return fallback;
            }
        }
    "#,
    );
}

#[test]
fn test_duplicate_parameter_name() {
    let err = parse_string("func f(int a, bool a) returns void {}").unwrap_err();
    assert_eq!(err.kind, ReportKind::Syntax);
    assert_eq!(err.message, "duplicate parameter name");
}

#[test]
fn test_control_flow() {
    compare_string(
        r#"
        func main() returns void {
            int i = 0;
            while (i < 10) {
                if (i == 5) {
                    break;
                } else {
                    i = i + 1;
                }
            }
        }
    "#,
    );
}

#[test]
fn test_class_declaration() {
    compare_string(
        r#"
        public class Point extends Shape {
            private int x;
            public func scale(int k) returns void {
                this.x = this.x * k;
            }
        }
    "#,
    );
}

#[test]
fn test_compound_types() {
    compare_string(
        r#"
        list<int> xs = [1, 2, 3];
        set<string> tags = {"a", "b"};
        list<list<int>> grid = [];
    "#,
    );
}

#[test]
fn test_calls_and_members() {
    compare_string(
        r#"
        int a = add(1, 2);
        int b = p.get();
        int c = xs[0];
        Point p = new Point();
    "#,
    );
}

#[test]
fn test_lambda_expression() {
    let ast = must(parse_string("func (int x) returns int { return x; }(3);"));

    let Stmt::ExprStmt(Expr::Call(call)) = &ast.nodes[0] else {
        panic!("expected call expression statement");
    };
    assert!(matches!(&*call.callee, Expr::Lambda(_)));
    assert_eq!(call.args.len(), 1);
}

#[test]
fn test_logical_precedence() {
    // or binds looser than and
    let ast = must(parse_string("a or b and c;"));

    let Stmt::ExprStmt(Expr::Logical(or)) = &ast.nodes[0] else {
        panic!("expected logical expression statement");
    };
    assert_eq!(or.op.kind, TokenKind::Or);
    assert!(matches!(&*or.right, Expr::Logical(and) if and.op.kind == TokenKind::And));
}

#[test]
fn test_unexpected_token() {
    let err = parse_string("func f() returns int { return }").unwrap_err();
    assert_eq!(err.kind, ReportKind::Syntax);
    assert_eq!(err.message, "expected expression");
}
