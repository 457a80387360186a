use crate::ast::{
    Access, Ast, BlockNode, Expr, FuncNode, GraphBlock, GraphExpr, IfNode, Member, Pred, PredNode,
    Stmt, TypeNode, VarNode,
};
use crate::token::{Token, TokenKind};

/// Renders an AST back to canonical source text. Non-block bodies of if and
/// while are normalized to blocks.
pub struct Printer {
    s: String,
    indent: usize,
}

impl Printer {
    /// Convert AST to printable format and print to stdout
    pub fn print(ast: &Ast) {
        println!("{}", Printer::to_string(ast));
    }

    /// Convert AST to printable format
    pub fn to_string(ast: &Ast) -> String {
        let mut p = Self {
            s: String::new(),
            indent: 0,
        };

        for node in &ast.nodes {
            p.stmt(node);
        }

        p.s
    }

    fn pad(&mut self) {
        self.s.push_str(&"    ".repeat(self.indent));
    }

    fn push(&mut self, text: &str) {
        self.s.push_str(text);
    }

    /// Write a token. String and char literals get their quotes back.
    fn token(&mut self, token: &Token) {
        match &token.kind {
            TokenKind::StringLit(s) => self.s.push_str(&format!("\"{}\"", s)),
            TokenKind::CharLit(c) => self.s.push_str(&format!("'{}'", c)),
            k => self.s.push_str(&format!("{}", k)),
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        self.pad();
        self.stmt_inline(stmt);
        self.s.push('\n');
    }

    fn stmt_inline(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(node) => self.block(node),

            Stmt::ExprStmt(expr) => {
                self.expr(expr);
                self.push(";");
            }

            Stmt::If(node) => self.if_stmt(node),

            Stmt::While(node) => {
                self.push("while (");
                self.expr(&node.cond);
                self.push(") ");
                self.stmt_body(&node.body);
            }

            Stmt::Return(node) => {
                self.push("return");
                if let Some(expr) = &node.expr {
                    self.push(" ");
                    self.expr(expr);
                }
                self.push(";");
            }

            Stmt::Break(_) => self.push("break;"),
            Stmt::Continue(_) => self.push("continue;"),

            Stmt::Graph(node) => {
                self.token(&node.name);
                self.push(" {\n");
                self.indent += 1;
                for op in &node.ops {
                    self.graph_op(op);
                }
                self.indent -= 1;
                self.pad();
                self.push("};");
            }

            Stmt::Class(node) => {
                self.access(node.access);
                self.push("class ");
                self.token(&node.name);
                if let Some(superclass) = &node.superclass {
                    self.push(" extends ");
                    self.token(superclass);
                }
                self.push(" {\n");
                self.indent += 1;
                for member in &node.members {
                    self.pad();
                    match member {
                        Member::Var(access, var) => {
                            self.access(*access);
                            self.var_decl(var);
                        }
                        Member::Func(access, func) => {
                            self.access(*access);
                            self.func_decl(func);
                        }
                    }
                    self.s.push('\n');
                }
                self.indent -= 1;
                self.pad();
                self.push("}");
            }

            Stmt::Func(node) => self.func_decl(node),
            Stmt::VarDecl(node) => self.var_decl(node),
        }
    }

    fn func_decl(&mut self, node: &FuncNode) {
        self.push("func ");
        self.token(&node.name);
        self.push("(");
        for (i, param) in node.params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.type_node(&param.typ);
            self.push(" ");
            self.token(&param.name);
        }
        self.push(") returns ");
        self.type_node(&node.ret);
        self.push(" ");
        self.block(&node.body);
    }

    fn var_decl(&mut self, node: &VarNode) {
        self.type_node(&node.typ);
        self.push(" ");
        self.token(&node.name);
        if let Some(init) = &node.init {
            self.push(" = ");
            self.expr(init);
        }
        self.push(";");
    }

    fn if_stmt(&mut self, node: &IfNode) {
        self.push("if (");
        self.expr(&node.cond);
        self.push(") ");
        self.stmt_body(&node.then);

        if let Some(els) = &node.els {
            self.push(" else ");
            match &**els {
                Stmt::If(inner) => self.if_stmt(inner),
                other => self.stmt_body(other),
            }
        }
    }

    /// A statement in body position. Blocks print as-is, anything else is
    /// wrapped in braces.
    fn stmt_body(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(node) => self.block(node),
            other => {
                self.push("{\n");
                self.indent += 1;
                self.stmt(other);
                self.indent -= 1;
                self.pad();
                self.push("}");
            }
        }
    }

    fn block(&mut self, node: &BlockNode) {
        self.push("{\n");
        self.indent += 1;
        for stmt in &node.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
    }

    fn graph_op(&mut self, op: &GraphExpr) {
        self.pad();
        match op {
            GraphExpr::Edge(node) => {
                self.pred_node(&node.left);
                self.push(&format!(" {} ", node.op.kind));
                self.pred_node(&node.right);
                if let Some(weight) = &node.weight {
                    self.push(" ");
                    self.token(weight);
                }
                self.push(";");
            }

            GraphExpr::AddVertex(node) => {
                self.push("V+ ");
                self.expr(&node.tags);
                if let Some(count) = &node.count {
                    self.push(" ");
                    self.token(count);
                }
                self.push(";");
            }

            GraphExpr::RemoveVertex(node) => {
                self.push("V- ");
                self.pred_node(&node.pred);
                self.push(";");
            }

            GraphExpr::TagAdd(node) | GraphExpr::TagRemove(node) => {
                self.pred_node(&node.pred);
                self.push(&format!(" {} ", node.op.kind));
                self.expr(&node.tags);
                self.push(";");
            }

            GraphExpr::Retag(node) => {
                self.token(&node.old);
                self.push(" << ");
                self.token(&node.new);
                self.push(";");
            }

            GraphExpr::While(node) => {
                self.push("while (");
                self.expr(&node.cond);
                self.push(") ");
                self.graph_block(&node.body);
            }

            GraphExpr::If(node) => {
                self.push("if (");
                self.expr(&node.cond);
                self.push(") ");
                self.graph_block(&node.then);
                if let Some(els) = &node.els {
                    self.push(" else ");
                    self.graph_block(els);
                }
            }

            GraphExpr::Block(node) => self.graph_block(node),

            GraphExpr::Stmt(stmt) => self.stmt_inline(stmt),
        }
        self.s.push('\n');
    }

    fn graph_block(&mut self, node: &GraphBlock) {
        self.push("{\n");
        self.indent += 1;
        for op in &node.ops {
            self.graph_op(op);
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
    }

    fn pred_node(&mut self, node: &PredNode) {
        self.push("[");
        self.pred(&node.pred);
        self.push("]");
    }

    fn pred(&mut self, pred: &Pred) {
        match pred {
            Pred::Or(node) => {
                self.pred(&node.left);
                self.push(" or ");
                self.pred(&node.right);
            }
            Pred::And(node) => {
                self.pred(&node.left);
                self.push(" and ");
                self.pred(&node.right);
            }
            Pred::Not(node) => {
                self.push("!");
                self.pred(&node.right);
            }
            Pred::Group(node) => {
                self.push("(");
                self.pred(&node.inner);
                self.push(")");
            }
            Pred::Test(expr) => self.expr(expr),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Binary(node) => {
                self.expr(&node.left);
                self.push(&format!(" {} ", node.op.kind));
                self.expr(&node.right);
            }
            Expr::Logical(node) => {
                self.expr(&node.left);
                self.push(&format!(" {} ", node.op.kind));
                self.expr(&node.right);
            }
            Expr::Group(node) => {
                self.push("(");
                self.expr(&node.inner);
                self.push(")");
            }
            Expr::Literal(token) => self.token(token),
            Expr::Unary(node) => {
                self.push(&format!("{}", node.op.kind));
                self.expr(&node.right);
            }
            Expr::Assign(node) => {
                self.token(&node.name);
                self.push(" = ");
                self.expr(&node.value);
            }
            Expr::Var(token) => self.token(token),
            Expr::Call(node) => {
                self.expr(&node.callee);
                self.push("(");
                self.expr_list(&node.args);
                self.push(")");
            }
            Expr::Get(node) => {
                self.expr(&node.object);
                self.push(".");
                self.token(&node.name);
            }
            Expr::Set(node) => {
                self.expr(&node.object);
                self.push(".");
                self.token(&node.name);
                self.push(" = ");
                self.expr(&node.value);
            }
            Expr::This(_) => self.push("this"),
            Expr::Super(_) => self.push("super"),
            Expr::List(node) => {
                self.push("[");
                self.expr_list(&node.items);
                self.push("]");
            }
            Expr::SetLit(node) => {
                self.push("{");
                self.expr_list(&node.items);
                self.push("}");
            }
            Expr::New(node) => {
                self.push("new ");
                self.token(&node.name);
                self.push("(");
                self.expr_list(&node.args);
                self.push(")");
            }
            Expr::Lambda(node) => {
                self.push("func (");
                for (i, param) in node.params.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.type_node(&param.typ);
                    self.push(" ");
                    self.token(&param.name);
                }
                self.push(") returns ");
                self.type_node(&node.ret);
                self.push(" ");
                self.block(&node.body);
            }
            Expr::Index(node) => {
                self.expr(&node.object);
                self.push("[");
                self.expr(&node.index);
                self.push("]");
            }
        }
    }

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(expr);
        }
    }

    fn type_node(&mut self, typ: &TypeNode) {
        match typ {
            TypeNode::Primitive(token) | TypeNode::Ident(token) => self.token(token),
            TypeNode::Compound(node) => {
                self.token(&node.kw);
                self.push("<");
                for (i, arg) in node.args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.type_node(arg);
                }
                self.push(">");
            }
        }
    }

    fn access(&mut self, access: Access) {
        match access {
            Access::Public => self.push("public "),
            Access::Private => self.push("private "),
        }
    }
}
