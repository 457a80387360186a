use std::collections::HashMap;

use tracing::{debug, info};

use crate::{
    ast::{
        Ast, BinaryExpr, BlockNode, CallExpr, ClassNode, Expr, Field, FuncNode, GraphBlock,
        GraphExpr, GraphNode, LogicalExpr, Member, Node, Pred, Stmt, TypeNode, UnaryExpr, VarNode,
    },
    config::Config,
    error::{Report, Res},
    token::TokenKind,
    types::{ClassType, CompoundKind, Prim, SymTable, Type, token_to_prim},
};

pub fn check(ast: &Ast, config: &Config) -> Res<()> {
    let checker = Checker::new(config);
    checker.check(ast)
}

struct Checker<'a> {
    sym: SymTable,
    _config: &'a Config,

    /// Return types of enclosing functions, innermost last.
    rtypes: Vec<Type>,
    /// Names of enclosing class declarations, innermost last.
    classes: Vec<String>,
    /// Number of enclosing loops in the current function.
    loop_depth: usize,
}

impl<'a> Checker<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            sym: SymTable::new(),
            _config: config,
            rtypes: Vec::new(),
            classes: Vec::new(),
            loop_depth: 0,
        }
    }

    fn check(mut self, ast: &Ast) -> Res<()> {
        info!("checking {} top level statements", ast.nodes.len());

        for stmt in &ast.nodes {
            self.stmt(stmt)?;
        }

        debug!("check ok");
        Ok(())
    }

    // ---------------------------- Statements ---------------------------- //

    fn stmt(&mut self, stmt: &Stmt) -> Res<()> {
        match stmt {
            Stmt::Block(node) => {
                self.sym.enter_scope();
                for s in &node.stmts {
                    self.stmt(s)?;
                }
                self.sym.exit_scope();
                Ok(())
            }

            Stmt::ExprStmt(expr) => self.expr(expr).map(|_| ()),

            Stmt::If(node) => {
                // The condition must be boolean before the bodies are
                // checked, each in its own fresh scope
                self.condition(&node.cond)?;
                self.scoped_stmt(&node.then)?;
                if let Some(els) = &node.els {
                    self.scoped_stmt(els)?;
                }
                Ok(())
            }

            Stmt::While(node) => {
                self.condition(&node.cond)?;
                self.loop_depth += 1;
                self.scoped_stmt(&node.body)?;
                self.loop_depth -= 1;
                Ok(())
            }

            Stmt::Return(node) => {
                let Some(rtype) = self.rtypes.last().cloned() else {
                    return Err(self.error("'return' outside function", &node.kw));
                };

                match &node.expr {
                    Some(expr) => self.check_against(expr, &rtype, "incorrect return type"),
                    None => {
                        if rtype != Type::Void {
                            Err(self.error(
                                &format!("incorrect return type: expected '{}', got none", rtype),
                                &node.kw,
                            ))
                        } else {
                            Ok(())
                        }
                    }
                }
            }

            Stmt::Break(token) => {
                if self.loop_depth == 0 {
                    Err(self.error("'break' outside loop", token))
                } else {
                    Ok(())
                }
            }

            Stmt::Continue(token) => {
                if self.loop_depth == 0 {
                    Err(self.error("'continue' outside loop", token))
                } else {
                    Ok(())
                }
            }

            Stmt::Graph(node) => self.graph_stmt(node),
            Stmt::Class(node) => self.class_decl(node),
            Stmt::Func(node) => self.func_decl(node),
            Stmt::VarDecl(node) => self.var_decl(node),
        }
    }

    /// Check a statement in its own fresh scope.
    fn scoped_stmt(&mut self, stmt: &Stmt) -> Res<()> {
        self.sym.enter_scope();
        self.stmt(stmt)?;
        self.sym.exit_scope();
        Ok(())
    }

    fn condition(&mut self, expr: &Expr) -> Res<()> {
        let t = self.expr(expr)?;
        if t != Type::Prim(Prim::Bool) {
            return Err(self.error(&format!("condition must be 'bool', got '{}'", t), expr));
        }
        Ok(())
    }

    fn var_decl(&mut self, node: &VarNode) -> Res<()> {
        let declared = self.resolve_type(&node.typ)?;

        if let Some(init) = &node.init {
            self.check_against(init, &declared, "incorrect initializer type")?;
        }

        let name = node.name.kind.to_string();
        if !self.sym.declare_var(&name, declared) {
            return Err(self.error("already declared", &node.name));
        }

        Ok(())
    }

    fn func_decl(&mut self, node: &FuncNode) -> Res<()> {
        let name = node.name.kind.to_string();

        // A redeclaration in the current frame is rejected before the body
        // is checked. The name itself is registered only after the body,
        // so the body cannot refer to its own function.
        if self.sym.func_in_current(&name) {
            return Err(self.error("already declared", &node.name));
        }

        let ftype = self.func_type(&node.params, &node.ret)?;
        self.check_func_body(&node.params, &ftype, &node.body)?;

        self.sym.declare_func(&name, ftype);
        Ok(())
    }

    /// Resolve a parameter list and return type annotation to a function
    /// type.
    fn func_type(&mut self, params: &[Field], ret: &TypeNode) -> Res<Type> {
        let mut ptypes = Vec::new();
        for p in params {
            ptypes.push(self.resolve_type(&p.typ)?);
        }

        let rtype = self.resolve_ret_type(ret)?;
        Ok(Type::Func {
            params: ptypes,
            ret: Box::new(rtype),
        })
    }

    /// Open a function scope, bind the parameters, and check the body.
    fn check_func_body(&mut self, params: &[Field], ftype: &Type, body: &BlockNode) -> Res<()> {
        let Type::Func {
            params: ptypes,
            ret,
        } = ftype
        else {
            panic!("check_func_body requires a function type");
        };

        self.sym.enter_scope();
        for (field, ptype) in params.iter().zip(ptypes) {
            // Parameter names are unique, the parser checks
            self.sym.declare_var(&field.name.kind.to_string(), ptype.clone());
        }

        self.rtypes.push((**ret).clone());
        let depth = self.loop_depth;
        self.loop_depth = 0;

        for stmt in &body.stmts {
            self.stmt(stmt)?;
        }

        self.loop_depth = depth;
        self.rtypes.pop();
        self.sym.exit_scope();
        Ok(())
    }

    fn class_decl(&mut self, node: &ClassNode) -> Res<()> {
        let name = node.name.kind.to_string();

        if self.sym.type_in_current(&name) {
            return Err(self.error("already declared", &node.name));
        }

        // The superclass must be a declared class. Member lookup never
        // walks the superclass chain, only the direct maps are
        // authoritative.
        let superclass = match &node.superclass {
            Some(token) => {
                let sname = token.kind.to_string();
                match self.sym.get_type(&sname) {
                    Some(Type::Class(_)) => Some(sname),
                    Some(_) => return Err(self.error("superclass must be a class", token)),
                    None => return Err(self.error("not a type", token)),
                }
            }
            None => None,
        };

        // Placeholder for forward references until the declaration has
        // been processed
        self.sym.declare_type(
            &name,
            Type::Class(ClassType::placeholder(&name, superclass.clone())),
        );

        self.sym.enter_scope();
        self.classes.push(name.clone());

        // First the field declarations and method signatures. Bodies wait
        // until the real class type is known so 'this' resolves members.
        let mut fields = HashMap::new();
        let mut methods = HashMap::new();

        for member in &node.members {
            match member {
                Member::Var(_, var) => {
                    let t = self.resolve_type(&var.typ)?;
                    if let Some(init) = &var.init {
                        self.check_against(init, &t, "incorrect initializer type")?;
                    }

                    let fname = var.name.kind.to_string();
                    if fields.insert(fname.clone(), t.clone()).is_some() {
                        return Err(self.error("duplicate member", &var.name));
                    }
                    self.sym.declare_var(&fname, t);
                }

                Member::Func(_, func) => {
                    let ftype = self.func_type(&func.params, &func.ret)?;
                    let mname = func.name.kind.to_string();
                    if methods.insert(mname.clone(), ftype.clone()).is_some() {
                        return Err(self.error("duplicate member", &func.name));
                    }
                    self.sym.declare_func(&mname, ftype);
                }
            }
        }

        // The placeholder is replaced exactly once
        let class_type = Type::Class(ClassType {
            name: name.clone(),
            fields,
            methods,
            superclass,
            dummy: false,
        });
        self.sym.replace_type(&name, class_type);

        // Then the method bodies
        for member in &node.members {
            if let Member::Func(_, func) = member {
                let ftype = self.func_type(&func.params, &func.ret)?;
                self.check_func_body(&func.params, &ftype, &func.body)?;
            }
        }

        self.classes.pop();
        self.sym.exit_scope();
        Ok(())
    }

    // ------------------------------- Types ------------------------------- //

    fn resolve_type(&mut self, node: &TypeNode) -> Res<Type> {
        match node {
            TypeNode::Primitive(token) => match token_to_prim(&token.kind) {
                Some(p) => Ok(Type::Prim(p)),
                None => Err(self.error("expected type", token)),
            },

            TypeNode::Compound(c) => {
                let kind = match c.kw.kind {
                    TokenKind::ListType => CompoundKind::List,
                    TokenKind::SetType => CompoundKind::Set,
                    _ => panic!("unknown compound type keyword: {}", c.kw.kind),
                };

                // list and set take exactly one type argument
                if c.args.len() != 1 {
                    return Err(self.error(
                        &format!("'{}' takes exactly one type argument", c.kw.kind),
                        node,
                    ));
                }

                let mut args = Vec::new();
                for a in &c.args {
                    args.push(self.resolve_type(a)?);
                }

                Ok(Type::Compound { kind, args })
            }

            TypeNode::Ident(token) => {
                match self.sym.get_type(&token.kind.to_string()).cloned() {
                    Some(t) => Ok(t),
                    None => Err(self.error("not a type", token)),
                }
            }
        }
    }

    /// Return type annotations additionally allow 'void'.
    fn resolve_ret_type(&mut self, node: &TypeNode) -> Res<Type> {
        if let TypeNode::Primitive(token) = node {
            if token.kind == TokenKind::Void {
                return Ok(Type::Void);
            }
        }

        self.resolve_type(node)
    }

    // ---------------------------- Expressions ---------------------------- //

    fn expr(&mut self, expr: &Expr) -> Res<Type> {
        match expr {
            Expr::Binary(node) => self.binary(node),
            Expr::Logical(node) => self.logical(node),
            Expr::Group(node) => self.expr(&node.inner),
            Expr::Unary(node) => self.unary(node),

            Expr::Literal(token) => match &token.kind {
                TokenKind::IntLit(_) => Ok(Type::Prim(Prim::Int)),
                TokenKind::DecLit(_) => Ok(Type::Prim(Prim::Dec)),
                TokenKind::StringLit(_) => Ok(Type::Prim(Prim::Str)),
                TokenKind::CharLit(_) => Ok(Type::Prim(Prim::Char)),
                TokenKind::True | TokenKind::False => Ok(Type::Prim(Prim::Bool)),
                TokenKind::Null => Ok(Type::Null),
                _ => panic!("non-literal token in literal expression: {}", token.kind),
            },

            Expr::Var(token) => match self.sym.get_var(&token.kind.to_string()).cloned() {
                Some(t) => Ok(t),
                None => Err(self.error("not declared", token)),
            },

            Expr::Assign(node) => {
                let Some(t) = self.sym.get_var(&node.name.kind.to_string()).cloned() else {
                    return Err(self.error("not declared", &node.name));
                };

                self.check_against(&node.value, &t, "incorrect assignment type")?;
                Ok(t)
            }

            Expr::Call(node) => self.call(node),

            Expr::Get(node) => {
                let ot = self.expr(&node.object)?;
                let class = match ot {
                    Type::Class(class) => class,
                    other => {
                        return Err(self.error(
                            &format!("only class instances have members, got '{}'", other),
                            &*node.object,
                        ));
                    }
                };

                let name = node.name.kind.to_string();
                match class.fields.get(&name).or_else(|| class.methods.get(&name)) {
                    Some(t) => Ok(t.clone()),
                    None => Err(self.error(&format!("undefined member '{}'", name), &node.name)),
                }
            }

            Expr::Set(node) => {
                let ot = self.expr(&node.object)?;
                let class = match ot {
                    Type::Class(class) => class,
                    other => {
                        return Err(self.error(
                            &format!("only class instances have members, got '{}'", other),
                            &*node.object,
                        ));
                    }
                };

                let name = node.name.kind.to_string();
                let Some(ft) = class.fields.get(&name).cloned() else {
                    return Err(self.error(&format!("undefined member '{}'", name), &node.name));
                };

                self.check_against(&node.value, &ft, "incorrect assignment type")?;
                Ok(ft)
            }

            Expr::This(token) => {
                let Some(name) = self.classes.last() else {
                    return Err(self.error("'this' is only allowed inside a class", token));
                };

                match self.sym.get_type(name).cloned() {
                    Some(t) => Ok(t),
                    None => Err(self.error("not a type", token)),
                }
            }

            Expr::Super(token) => {
                let Some(name) = self.classes.last().cloned() else {
                    return Err(self.error("'super' is only allowed inside a class", token));
                };

                let superclass = match self.sym.get_type(&name) {
                    Some(Type::Class(class)) => class.superclass.clone(),
                    _ => None,
                };

                let Some(sname) = superclass else {
                    return Err(self.error("class has no superclass", token));
                };

                match self.sym.get_type(&sname).cloned() {
                    Some(t) => Ok(t),
                    None => Err(self.error("not a type", token)),
                }
            }

            Expr::List(node) => self.sequence(&node.items, CompoundKind::List, &node.lbrack),
            Expr::SetLit(node) => self.sequence(&node.items, CompoundKind::Set, &node.lbrace),

            Expr::New(node) => {
                let name = node.name.kind.to_string();
                match self.sym.get_type(&name).cloned() {
                    Some(t @ Type::Class(_)) => {
                        for arg in &node.args {
                            self.expr(arg)?;
                        }
                        Ok(t)
                    }
                    Some(t) => Err(self.error(
                        &format!("'new' requires a class type, got '{}'", t),
                        &node.name,
                    )),
                    None => Err(self.error("not a type", &node.name)),
                }
            }

            Expr::Lambda(node) => {
                let ftype = self.func_type(&node.params, &node.ret)?;
                self.check_func_body(&node.params, &ftype, &node.body)?;
                Ok(ftype)
            }

            Expr::Index(node) => {
                let ot = self.expr(&node.object)?;
                let args = match ot {
                    Type::Compound {
                        kind: CompoundKind::List,
                        args,
                    } => args,
                    other => {
                        return Err(self.error(
                            &format!("only lists can be indexed, got '{}'", other),
                            &*node.object,
                        ));
                    }
                };

                self.check_against(&node.index, &Type::Prim(Prim::Int), "incorrect index type")?;
                Ok(args[0].clone())
            }
        }
    }

    /// Type a binary expression by dispatching on the left operand's
    /// primitive kind. String concatenation with '+' dominates every other
    /// rule.
    fn binary(&mut self, node: &BinaryExpr) -> Res<Type> {
        let lt = self.expr(&node.left)?;
        let rt = self.expr(&node.right)?;

        // Binary operators are defined over primitives only
        let Some(l) = lt.as_prim() else {
            return Err(self.ineligible(&lt, &*node.left));
        };
        let Some(r) = rt.as_prim() else {
            return Err(self.ineligible(&rt, &*node.right));
        };

        if node.op.kind == TokenKind::Plus && (l == Prim::Str || r == Prim::Str) {
            return Ok(Type::Prim(Prim::Str));
        }

        let result = match node.op.kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Mod => match l {
                // Arithmetic promotes to the right operand's kind
                Prim::Int => match r {
                    Prim::Int => Some(Prim::Int),
                    Prim::Dec => Some(Prim::Dec),
                    _ => None,
                },
                Prim::Dec => match r {
                    Prim::Int | Prim::Dec => Some(Prim::Dec),
                    _ => None,
                },
                _ => None,
            },

            TokenKind::Less | TokenKind::LessEq | TokenKind::GreaterEq | TokenKind::Greater => {
                match l {
                    Prim::Int | Prim::Dec => match r {
                        Prim::Int | Prim::Dec => Some(Prim::Bool),
                        _ => None,
                    },
                    _ => None,
                }
            }

            TokenKind::EqEq | TokenKind::BangEq => match (l, r) {
                (Prim::Str, Prim::Str) | (Prim::Char, Prim::Char) | (Prim::Bool, Prim::Bool) => {
                    Some(Prim::Bool)
                }
                (Prim::Int | Prim::Dec, Prim::Int | Prim::Dec) => Some(Prim::Bool),
                _ => None,
            },

            _ => None,
        };

        match result {
            Some(p) => Ok(Type::Prim(p)),
            None => Err(Report::semantic(
                &format!("invalid operation: '{}' {} '{}'", l, node.op.kind, r),
                node.left.pos(),
                node.right.end(),
            )),
        }
    }

    fn logical(&mut self, node: &LogicalExpr) -> Res<Type> {
        let lt = self.expr(&node.left)?;
        let rt = self.expr(&node.right)?;

        let Some(l) = lt.as_prim() else {
            return Err(self.ineligible(&lt, &*node.left));
        };
        let Some(r) = rt.as_prim() else {
            return Err(self.ineligible(&rt, &*node.right));
        };

        if l == Prim::Bool && r == Prim::Bool {
            Ok(Type::Prim(Prim::Bool))
        } else {
            Err(Report::semantic(
                &format!("invalid operation: '{}' {} '{}'", l, node.op.kind, r),
                node.left.pos(),
                node.right.end(),
            ))
        }
    }

    fn unary(&mut self, node: &UnaryExpr) -> Res<Type> {
        let t = self.expr(&node.right)?;

        match (&node.op.kind, t.as_prim()) {
            (TokenKind::Bang, Some(Prim::Bool)) => Ok(Type::Prim(Prim::Bool)),
            (TokenKind::Minus, Some(Prim::Int)) => Ok(Type::Prim(Prim::Int)),
            (TokenKind::Minus, Some(Prim::Dec)) => Ok(Type::Prim(Prim::Dec)),
            _ => Err(self.error(
                &format!("invalid operation: {} '{}'", node.op.kind, t),
                &*node.right,
            )),
        }
    }

    fn call(&mut self, node: &CallExpr) -> Res<Type> {
        let callee_t = match &*node.callee {
            // A bare name consults the function namespace first, then falls
            // back to variables holding a function value
            Expr::Var(name) => {
                let key = name.kind.to_string();
                match self
                    .sym
                    .get_func(&key)
                    .or_else(|| self.sym.get_var(&key))
                    .cloned()
                {
                    Some(t) => t,
                    None => return Err(self.error("not declared", name)),
                }
            }
            other => self.expr(other)?,
        };

        let (params, ret) = match callee_t {
            Type::Func { params, ret } => (params, ret),
            other => {
                return Err(self.error(&format!("not a function, got '{}'", other), &*node.callee));
            }
        };

        if node.args.len() != params.len() {
            return Err(self.error(
                &format!("expected {} arguments, got {}", params.len(), node.args.len()),
                &node.rparen,
            ));
        }

        for (arg, ptype) in node.args.iter().zip(&params) {
            self.check_against(arg, ptype, "incorrect argument type")?;
        }

        Ok(*ret)
    }

    /// Type a list or set literal. All elements must share one type.
    fn sequence(&mut self, items: &[Expr], kind: CompoundKind, anchor: &dyn Node) -> Res<Type> {
        let Some(first) = items.first() else {
            return Err(self.error(
                &format!("cannot infer element type of empty {}", kind),
                anchor,
            ));
        };

        let elem = self.expr(first)?;
        for item in &items[1..] {
            let t = self.expr(item)?;
            if t != elem {
                return Err(self.error_expected_got("mismatched element type", &elem, &t, item));
            }
        }

        Ok(Type::Compound {
            kind,
            args: vec![elem],
        })
    }

    /// Check an expression against an expected type. Empty list and set
    /// literals take their element type from the expectation.
    fn check_against(&mut self, expr: &Expr, expected: &Type, msg: &str) -> Res<()> {
        match expr {
            Expr::List(node) if node.items.is_empty() => {
                if matches!(
                    expected,
                    Type::Compound {
                        kind: CompoundKind::List,
                        ..
                    }
                ) {
                    return Ok(());
                }
            }
            Expr::SetLit(node) if node.items.is_empty() => {
                if matches!(
                    expected,
                    Type::Compound {
                        kind: CompoundKind::Set,
                        ..
                    }
                ) {
                    return Ok(());
                }
            }
            _ => {}
        }

        let t = self.expr(expr)?;
        if assignable(expected, &t) {
            Ok(())
        } else {
            Err(self.error_expected_got(msg, expected, &t, expr))
        }
    }

    // --------------------------- Graph blocks --------------------------- //

    fn graph_stmt(&mut self, node: &GraphNode) -> Res<()> {
        self.sym.enter_scope();
        for op in &node.ops {
            self.graph_op(op)?;
        }
        self.sym.exit_scope();
        Ok(())
    }

    fn graph_op(&mut self, op: &GraphExpr) -> Res<()> {
        match op {
            // Weight and retag operands are literals by grammar
            GraphExpr::Edge(node) => {
                self.pred(&node.left.pred)?;
                self.pred(&node.right.pred)
            }
            GraphExpr::Retag(_) => Ok(()),

            GraphExpr::AddVertex(node) => self.tag_set(&node.tags),
            GraphExpr::RemoveVertex(node) => self.pred(&node.pred.pred),

            GraphExpr::TagAdd(node) | GraphExpr::TagRemove(node) => {
                self.pred(&node.pred.pred)?;
                self.tag_set(&node.tags)
            }

            GraphExpr::While(node) => {
                self.condition(&node.cond)?;
                self.loop_depth += 1;
                self.graph_block(&node.body)?;
                self.loop_depth -= 1;
                Ok(())
            }

            GraphExpr::If(node) => {
                self.condition(&node.cond)?;
                self.graph_block(&node.then)?;
                if let Some(els) = &node.els {
                    self.graph_block(els)?;
                }
                Ok(())
            }

            GraphExpr::Block(node) => self.graph_block(node),

            GraphExpr::Stmt(stmt) => self.stmt(stmt),
        }
    }

    fn graph_block(&mut self, node: &GraphBlock) -> Res<()> {
        self.sym.enter_scope();
        for op in &node.ops {
            self.graph_op(op)?;
        }
        self.sym.exit_scope();
        Ok(())
    }

    fn tag_set(&mut self, expr: &Expr) -> Res<()> {
        let expected = Type::set_of(Type::Prim(Prim::Str));
        self.check_against(expr, &expected, "incorrect tag set type")
    }

    /// Predicate leaves may be any primitive-typed expression. The runtime
    /// interprets the value as a tag test.
    fn pred(&mut self, pred: &Pred) -> Res<()> {
        match pred {
            Pred::Or(node) => {
                self.pred(&node.left)?;
                self.pred(&node.right)
            }
            Pred::And(node) => {
                self.pred(&node.left)?;
                self.pred(&node.right)
            }
            Pred::Not(node) => self.pred(&node.right),
            Pred::Group(node) => self.pred(&node.inner),
            Pred::Test(expr) => {
                let t = self.expr(expr)?;
                if t.as_prim().is_none() {
                    return Err(self.error(
                        &format!("predicate must be a primitive value, got '{}'", t),
                        expr,
                    ));
                }
                Ok(())
            }
        }
    }

    // ------------------------------ Helpers ------------------------------ //

    fn error(&self, msg: &str, node: &dyn Node) -> Report {
        Report::semantic(msg, node.pos(), node.end())
    }

    fn error_expected_got(&self, msg: &str, expect: &Type, got: &Type, node: &dyn Node) -> Report {
        self.error(
            &format!("{}: expected '{}', got '{}'", msg, expect, got),
            node,
        )
    }

    fn ineligible(&self, t: &Type, node: &dyn Node) -> Report {
        self.error(
            &format!("binary operator requires primitive operands, got '{}'", t),
            node,
        )
    }
}

/// A value type is assignable to a target type when they are equal, or by
/// int to dec promotion.
fn assignable(target: &Type, value: &Type) -> bool {
    target == value || (*target == Type::Prim(Prim::Dec) && *value == Type::Prim(Prim::Int))
}
