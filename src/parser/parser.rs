use std::collections::HashSet;

use tracing::{debug, info};

use crate::{
    ast::{
        Access, AddVertexOp, AndPred, AssignExpr, Ast, BinaryExpr, BlockNode, CallExpr, ClassNode,
        CompoundNode, EdgeOp, Expr, Field, FuncNode, GetExpr, GraphBlock, GraphExpr, GraphIf,
        GraphNode, GraphWhile, GroupExpr, GroupPred, IfNode, IndexExpr, LambdaExpr, ListExpr,
        LogicalExpr, Member, NewExpr, NotPred, OrPred, Pred, PredNode, RemoveVertexOp, RetagOp,
        ReturnNode, SetExpr, SetLitExpr, Stmt, TagOp, TypeNode, UnaryExpr, VarNode, WhileNode,
    },
    config::Config,
    error::{Report, Res},
    token::{Token, TokenKind},
};

pub fn parse(tokens: Vec<Token>, config: &Config) -> Res<Ast> {
    let parser = Parser::new(tokens, config);
    parser.parse()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
    _config: &'a Config,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, config: &'a Config) -> Self {
        Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            _config: config,
        }
    }

    fn parse(mut self) -> Res<Ast> {
        info!("parsing {} tokens", self.tokens.len());

        while !self.eof() {
            let stmt = self.parse_stmt()?;
            self.ast.add_node(stmt);
        }

        debug!("success: {} top level statements", self.ast.nodes.len());
        Ok(self.ast)
    }

    // ---------------------------- Statements ---------------------------- //

    fn parse_stmt(&mut self) -> Result<Stmt, Report> {
        let Some(token) = self.cur() else {
            return Err(self.error_token("expected statement"));
        };

        match token.kind {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),

            TokenKind::Break => {
                self.consume();
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Break(token))
            }

            TokenKind::Continue => {
                self.consume();
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Continue(token))
            }

            TokenKind::Public | TokenKind::Private | TokenKind::Class => self.parse_class(),

            // Lambda expressions also lead with 'func', but are followed by
            // a parenthesis instead of a name.
            TokenKind::Func => {
                if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
                    self.parse_expr_stmt()
                } else {
                    Ok(Stmt::Func(self.parse_func()?))
                }
            }

            TokenKind::IntType
            | TokenKind::DecType
            | TokenKind::StringType
            | TokenKind::CharType
            | TokenKind::BoolType
            | TokenKind::ListType
            | TokenKind::SetType => Ok(Stmt::VarDecl(self.parse_var_node()?)),

            // An identifier leads a graph block, a class-typed variable
            // declaration, or an expression statement.
            TokenKind::IdentLit(_) => match self.peek_kind() {
                Some(TokenKind::LBrace) => self.parse_graph(),
                Some(TokenKind::IdentLit(_)) => Ok(Stmt::VarDecl(self.parse_var_node()?)),
                _ => self.parse_expr_stmt(),
            },

            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_block(&mut self) -> Result<BlockNode, Report> {
        let lbrace = self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();

        while !self.eof() && !self.matches(TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }

        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(BlockNode {
            lbrace,
            stmts,
            rbrace,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, Report> {
        let kw = self.must_consume()?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;

        let then = Box::new(self.parse_stmt()?);
        let els = if self.matches(TokenKind::Else) {
            self.consume();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If(IfNode {
            kw,
            cond,
            then,
            els,
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt, Report> {
        let kw = self.must_consume()?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::While(WhileNode { kw, cond, body }))
    }

    fn parse_return(&mut self) -> Result<Stmt, Report> {
        let kw = self.must_consume()?;

        let expr = if self.matches(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        let semi = self.expect(TokenKind::Semi)?;
        Ok(Stmt::Return(ReturnNode { kw, expr, semi }))
    }

    fn parse_class(&mut self) -> Result<Stmt, Report> {
        let access = self.parse_access();
        let kw = self.expect(TokenKind::Class)?;
        let name = self.expect_identifier("class name")?;

        let superclass = if self.matches(TokenKind::Extends) {
            self.consume();
            Some(self.expect_identifier("superclass name")?)
        } else {
            None
        };

        let lbrace = self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.eof() && !self.matches(TokenKind::RBrace) {
            let maccess = self.parse_access();
            if self.matches(TokenKind::Func) {
                members.push(Member::Func(maccess, self.parse_func()?));
            } else {
                members.push(Member::Var(maccess, self.parse_var_node()?));
            }
        }

        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Class(ClassNode {
            access,
            kw,
            name,
            superclass,
            lbrace,
            members,
            rbrace,
        }))
    }

    fn parse_access(&mut self) -> Access {
        if self.matches(TokenKind::Public) {
            self.consume();
            Access::Public
        } else if self.matches(TokenKind::Private) {
            self.consume();
            Access::Private
        } else {
            Access::Public
        }
    }

    fn parse_func(&mut self) -> Result<FuncNode, Report> {
        let kw = self.expect(TokenKind::Func)?;
        let name = self.expect_identifier("function name")?;
        let (lparen, params, rparen) = self.parse_params()?;

        self.expect(TokenKind::Returns)?;
        let ret = self.parse_return_type()?;
        let body = self.parse_block()?;

        Ok(FuncNode {
            kw,
            name,
            lparen,
            params,
            rparen,
            ret,
            body,
        })
    }

    fn parse_params(&mut self) -> Result<(Token, Vec<Field>, Token), Report> {
        let lparen = self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut param_names = HashSet::new();

        if !self.matches(TokenKind::RParen) {
            while !self.eof() {
                let typ = self.parse_type()?;
                let name = self.expect_identifier("parameter name")?;

                // If name already exists
                if !param_names.insert(name.kind.to_string()) {
                    return Err(self.error_from_to("duplicate parameter name", &name, &name));
                }

                params.push(Field { typ, name });

                // Done?
                if self.matches(TokenKind::RParen) {
                    break;
                }

                // Must be a comma
                self.expect(TokenKind::Comma)?;
            }
        }

        let rparen = self.expect(TokenKind::RParen)?;
        Ok((lparen, params, rparen))
    }

    fn parse_var_node(&mut self) -> Result<VarNode, Report> {
        let typ = self.parse_type()?;
        let name = self.expect_identifier("variable name")?;

        let init = if self.matches(TokenKind::Eq) {
            self.consume();
            Some(self.parse_expr()?)
        } else {
            None
        };

        let semi = self.expect(TokenKind::Semi)?;
        Ok(VarNode {
            typ,
            name,
            init,
            semi,
        })
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, Report> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::ExprStmt(expr))
    }

    // ------------------------------- Types ------------------------------- //

    fn parse_type(&mut self) -> Result<TypeNode, Report> {
        let Some(token) = self.cur() else {
            return Err(self.error_token("expected type"));
        };

        match token.kind {
            TokenKind::IdentLit(_) => {
                self.consume();
                Ok(TypeNode::Ident(token))
            }

            TokenKind::IntType
            | TokenKind::DecType
            | TokenKind::StringType
            | TokenKind::CharType
            | TokenKind::BoolType => {
                self.consume();
                Ok(TypeNode::Primitive(token))
            }

            TokenKind::ListType | TokenKind::SetType => {
                let kw = self.must_consume()?;
                let lt = self.expect(TokenKind::Less)?;

                let mut args = vec![self.parse_type()?];
                while self.matches(TokenKind::Comma) {
                    self.consume();
                    args.push(self.parse_type()?);
                }

                let gt = self.expect(TokenKind::Greater)?;
                Ok(TypeNode::Compound(CompoundNode { kw, lt, args, gt }))
            }

            _ => Err(self.error_token("expected type")),
        }
    }

    /// Return types additionally allow 'void'.
    fn parse_return_type(&mut self) -> Result<TypeNode, Report> {
        if self.matches(TokenKind::Void) {
            let token = self.must_consume()?;
            return Ok(TypeNode::Primitive(token));
        }

        self.parse_type()
    }

    // ---------------------------- Expressions ---------------------------- //

    fn parse_expr(&mut self) -> Result<Expr, Report> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, Report> {
        let expr = self.parse_or()?;

        if self.matches(TokenKind::Eq) {
            let eq = self.must_consume()?;
            let value = Box::new(self.parse_assignment()?);

            // Only variables and fields are assignable
            return match expr {
                Expr::Var(name) => Ok(Expr::Assign(AssignExpr { name, value })),
                Expr::Get(get) => Ok(Expr::Set(SetExpr {
                    object: get.object,
                    name: get.name,
                    value,
                })),
                _ => Err(self.error_from_to("invalid assignment target", &eq, &eq)),
            };
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_and()?;

        while self.matches(TokenKind::Or) {
            let op = self.must_consume()?;
            let right = self.parse_and()?;
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_equality()?;

        while self.matches(TokenKind::And) {
            let op = self.must_consume()?;
            let right = self.parse_equality()?;
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_relational()?;

        while self.matches_any(&[TokenKind::EqEq, TokenKind::BangEq]) {
            let op = self.must_consume()?;
            let right = self.parse_relational()?;
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_relational(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_additive()?;

        while self.matches_any(&[
            TokenKind::Less,
            TokenKind::LessEq,
            TokenKind::GreaterEq,
            TokenKind::Greater,
        ]) {
            let op = self.must_consume()?;
            let right = self.parse_additive()?;
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_multiplicative()?;

        while self.matches_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = self.must_consume()?;
            let right = self.parse_multiplicative()?;
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_unary()?;

        while self.matches_any(&[TokenKind::Star, TokenKind::Slash, TokenKind::Mod]) {
            let op = self.must_consume()?;
            let right = self.parse_unary()?;
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Report> {
        if self.matches_any(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.must_consume()?;
            let right = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                right: Box::new(right),
            }));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, Report> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.matches(TokenKind::LParen) {
                let lparen = self.must_consume()?;
                let mut args = Vec::new();

                while !self.matches(TokenKind::RParen) {
                    args.push(self.parse_expr()?);
                    if self.matches(TokenKind::RParen) {
                        break;
                    }

                    self.expect(TokenKind::Comma)?;
                }

                let rparen = self.expect(TokenKind::RParen)?;
                expr = Expr::Call(CallExpr {
                    callee: Box::new(expr),
                    lparen,
                    args,
                    rparen,
                });
            } else if self.matches(TokenKind::Dot) {
                self.consume();
                let name = self.expect_identifier("member name")?;
                expr = Expr::Get(GetExpr {
                    object: Box::new(expr),
                    name,
                });
            } else if self.matches(TokenKind::LBrack) {
                let lbrack = self.must_consume()?;
                let index = Box::new(self.parse_expr()?);
                let rbrack = self.expect(TokenKind::RBrack)?;
                expr = Expr::Index(IndexExpr {
                    object: Box::new(expr),
                    lbrack,
                    index,
                    rbrack,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Report> {
        let Some(token) = self.cur() else {
            return Err(self.error_token("expected expression"));
        };

        match token.kind {
            TokenKind::IntLit(_)
            | TokenKind::DecLit(_)
            | TokenKind::StringLit(_)
            | TokenKind::CharLit(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                self.consume();
                Ok(Expr::Literal(token))
            }

            TokenKind::IdentLit(_) => {
                self.consume();
                Ok(Expr::Var(token))
            }

            TokenKind::This => {
                self.consume();
                Ok(Expr::This(token))
            }

            TokenKind::Super => {
                self.consume();
                Ok(Expr::Super(token))
            }

            TokenKind::LParen => {
                let lparen = self.must_consume()?;
                let inner = Box::new(self.parse_expr()?);
                let rparen = self.expect(TokenKind::RParen)?;
                Ok(Expr::Group(GroupExpr {
                    lparen,
                    inner,
                    rparen,
                }))
            }

            TokenKind::LBrack => {
                let lbrack = self.must_consume()?;
                let items = self.parse_expr_list(TokenKind::RBrack)?;
                let rbrack = self.expect(TokenKind::RBrack)?;
                Ok(Expr::List(ListExpr {
                    lbrack,
                    items,
                    rbrack,
                }))
            }

            TokenKind::LBrace => {
                let lbrace = self.must_consume()?;
                let items = self.parse_expr_list(TokenKind::RBrace)?;
                let rbrace = self.expect(TokenKind::RBrace)?;
                Ok(Expr::SetLit(SetLitExpr {
                    lbrace,
                    items,
                    rbrace,
                }))
            }

            TokenKind::New => {
                let kw = self.must_consume()?;
                let name = self.expect_identifier("class name")?;
                let lparen = self.expect(TokenKind::LParen)?;
                let args = self.parse_expr_list(TokenKind::RParen)?;
                let rparen = self.expect(TokenKind::RParen)?;
                Ok(Expr::New(NewExpr {
                    kw,
                    name,
                    lparen,
                    args,
                    rparen,
                }))
            }

            TokenKind::Func => Ok(Expr::Lambda(self.parse_lambda()?)),

            _ => Err(self.error_token("expected expression")),
        }
    }

    /// Comma separated expressions up to (not including) the closing token.
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<Vec<Expr>, Report> {
        let mut items = Vec::new();

        while !self.matches(close.clone()) {
            items.push(self.parse_expr()?);
            if self.matches(close.clone()) {
                break;
            }

            self.expect(TokenKind::Comma)?;
        }

        Ok(items)
    }

    fn parse_lambda(&mut self) -> Result<LambdaExpr, Report> {
        let kw = self.expect(TokenKind::Func)?;
        let (lparen, params, rparen) = self.parse_params()?;

        self.expect(TokenKind::Returns)?;
        let ret = self.parse_return_type()?;
        let body = self.parse_block()?;

        Ok(LambdaExpr {
            kw,
            lparen,
            params,
            rparen,
            ret,
            body,
        })
    }

    // --------------------------- Graph blocks --------------------------- //

    fn parse_graph(&mut self) -> Result<Stmt, Report> {
        let name = self.expect_identifier("graph name")?;
        let lbrace = self.expect(TokenKind::LBrace)?;

        let mut ops = Vec::new();
        while !self.eof() && !self.matches(TokenKind::RBrace) {
            ops.push(self.parse_graph_op()?);
        }

        let rbrace = self.expect(TokenKind::RBrace)?;
        let semi = self.expect(TokenKind::Semi)?;

        Ok(Stmt::Graph(GraphNode {
            name,
            lbrace,
            ops,
            rbrace,
            semi,
        }))
    }

    /// Graph operations dispatch on their leading token.
    fn parse_graph_op(&mut self) -> Result<GraphExpr, Report> {
        let Some(token) = self.cur() else {
            return Err(self.error_token("expected graph operation"));
        };

        match &token.kind {
            TokenKind::IdentLit(name) if name.as_str() == "V" => match self.peek_kind() {
                Some(TokenKind::Plus) => self.parse_add_vertex(),
                Some(TokenKind::Minus) => self.parse_remove_vertex(),
                _ => Ok(GraphExpr::Stmt(Box::new(self.parse_stmt()?))),
            },

            TokenKind::LBrack => self.parse_pred_op(),

            TokenKind::StringLit(_) => self.parse_retag(),

            TokenKind::While => {
                let kw = self.must_consume()?;
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_graph_block()?;
                Ok(GraphExpr::While(GraphWhile { kw, cond, body }))
            }

            TokenKind::If => {
                let kw = self.must_consume()?;
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let then = self.parse_graph_block()?;

                let els = if self.matches(TokenKind::Else) {
                    self.consume();
                    Some(self.parse_graph_block()?)
                } else {
                    None
                };

                Ok(GraphExpr::If(GraphIf {
                    kw,
                    cond,
                    then,
                    els,
                }))
            }

            TokenKind::LBrace => Ok(GraphExpr::Block(self.parse_graph_block()?)),

            // Anything else is an ordinary statement embedded as a graph
            // operation.
            _ => Ok(GraphExpr::Stmt(Box::new(self.parse_stmt()?))),
        }
    }

    fn parse_graph_block(&mut self) -> Result<GraphBlock, Report> {
        let lbrace = self.expect(TokenKind::LBrace)?;

        let mut ops = Vec::new();
        while !self.eof() && !self.matches(TokenKind::RBrace) {
            ops.push(self.parse_graph_op()?);
        }

        let rbrace = self.expect(TokenKind::RBrace)?;
        Ok(GraphBlock { lbrace, ops, rbrace })
    }

    fn parse_add_vertex(&mut self) -> Result<GraphExpr, Report> {
        let head = self.must_consume()?;
        let plus = self.expect(TokenKind::Plus)?;
        let tags = self.parse_expr()?;

        // Optional repetition count, defaults to 1
        let count = if matches!(self.cur_kind(), Some(TokenKind::IntLit(_))) {
            Some(self.must_consume()?)
        } else {
            None
        };

        let semi = self.expect(TokenKind::Semi)?;
        Ok(GraphExpr::AddVertex(AddVertexOp {
            head,
            plus,
            tags,
            count,
            semi,
        }))
    }

    fn parse_remove_vertex(&mut self) -> Result<GraphExpr, Report> {
        let head = self.must_consume()?;
        let minus = self.expect(TokenKind::Minus)?;
        let pred = self.parse_pred_node()?;
        let semi = self.expect(TokenKind::Semi)?;

        Ok(GraphExpr::RemoveVertex(RemoveVertexOp {
            head,
            minus,
            pred,
            semi,
        }))
    }

    /// A bracketed predicate leads an edge operation or a tag mutation.
    fn parse_pred_op(&mut self) -> Result<GraphExpr, Report> {
        let left = self.parse_pred_node()?;
        let Some(token) = self.cur() else {
            return Err(self.error_token("expected edge relation or tag operation"));
        };

        match token.kind {
            TokenKind::Arrow | TokenKind::DoubleArrow | TokenKind::NotArrow => {
                let op = self.must_consume()?;
                let right = self.parse_pred_node()?;

                // Optional weight literal, defaults to 1
                let weight = if matches!(
                    self.cur_kind(),
                    Some(TokenKind::IntLit(_) | TokenKind::DecLit(_))
                ) {
                    Some(self.must_consume()?)
                } else {
                    None
                };

                let semi = self.expect(TokenKind::Semi)?;
                Ok(GraphExpr::Edge(EdgeOp {
                    left,
                    op,
                    right,
                    weight,
                    semi,
                }))
            }

            TokenKind::PlusPlus => {
                let op = self.must_consume()?;
                let tags = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semi)?;
                Ok(GraphExpr::TagAdd(TagOp {
                    pred: left,
                    op,
                    tags,
                    semi,
                }))
            }

            TokenKind::MinusMinus => {
                let op = self.must_consume()?;
                let tags = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semi)?;
                Ok(GraphExpr::TagRemove(TagOp {
                    pred: left,
                    op,
                    tags,
                    semi,
                }))
            }

            _ => Err(self.error_token("expected edge relation or tag operation")),
        }
    }

    fn parse_retag(&mut self) -> Result<GraphExpr, Report> {
        let old = self.must_consume()?;
        let op = self.expect(TokenKind::LeftLeft)?;
        let new = self.expect_pred("string or null", |t| {
            matches!(t.kind, TokenKind::StringLit(_) | TokenKind::Null)
        })?;
        let semi = self.expect(TokenKind::Semi)?;

        Ok(GraphExpr::Retag(RetagOp {
            old,
            op,
            new,
            semi,
        }))
    }

    // ---------------------------- Predicates ---------------------------- //

    fn parse_pred_node(&mut self) -> Result<PredNode, Report> {
        let lbrack = self.expect(TokenKind::LBrack)?;
        let pred = self.parse_pred()?;
        let rbrack = self.expect(TokenKind::RBrack)?;

        Ok(PredNode {
            lbrack,
            pred,
            rbrack,
        })
    }

    fn parse_pred(&mut self) -> Result<Pred, Report> {
        let mut pred = self.parse_pred_and()?;

        while self.matches(TokenKind::Or) {
            let op = self.must_consume()?;
            let right = self.parse_pred_and()?;
            pred = Pred::Or(OrPred {
                left: Box::new(pred),
                op,
                right: Box::new(right),
            });
        }

        Ok(pred)
    }

    fn parse_pred_and(&mut self) -> Result<Pred, Report> {
        let mut pred = self.parse_pred_unary()?;

        while self.matches(TokenKind::And) {
            let op = self.must_consume()?;
            let right = self.parse_pred_unary()?;
            pred = Pred::And(AndPred {
                left: Box::new(pred),
                op,
                right: Box::new(right),
            });
        }

        Ok(pred)
    }

    fn parse_pred_unary(&mut self) -> Result<Pred, Report> {
        if self.matches(TokenKind::Bang) {
            let op = self.must_consume()?;
            let right = Box::new(self.parse_pred_unary()?);
            return Ok(Pred::Not(NotPred { op, right }));
        }

        if self.matches(TokenKind::LParen) {
            let lparen = self.must_consume()?;
            let inner = Box::new(self.parse_pred()?);
            let rparen = self.expect(TokenKind::RParen)?;
            return Ok(Pred::Group(GroupPred {
                lparen,
                inner,
                rparen,
            }));
        }

        // Leaves are additive expressions interpreted by the runtime
        Ok(Pred::Test(self.parse_additive()?))
    }

    // ------------------------------ Helpers ------------------------------ //

    /// Create error marking the current token.
    fn error_token(&self, message: &str) -> Report {
        let tok = self.cur_or_last();
        Report::syntax(message, &tok.pos, tok.length.max(1))
    }

    /// Create error marking the given token range.
    fn error_from_to(&self, message: &str, from: &Token, to: &Token) -> Report {
        let length = to.end_pos.col.saturating_sub(from.pos.col).max(1);
        Report::syntax(message, &from.pos, length)
    }

    fn cur(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn cur_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind.clone())
    }

    fn cur_or_last(&self) -> Token {
        if self.pos < self.tokens.len() {
            self.tokens.get(self.pos).unwrap().clone()
        } else {
            self.tokens.last().unwrap().clone()
        }
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind.clone())
    }

    fn consume(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let pos = self.pos;
            self.pos += 1;
            Some(self.tokens[pos].clone())
        } else {
            None
        }
    }

    /// Consumes current token and returns it. Errors if EOF.
    fn must_consume(&mut self) -> Result<Token, Report> {
        self.consume()
            .map_or(Err(self.error_token("unexpected end of file")), Ok)
    }

    /// Expects the current token to be of a specific kind.
    /// Returns token if it matches, else error.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, Report> {
        self.expect_pred(&format!("{}", kind), |t| t.kind == kind)
    }

    /// Expects the current token to match a predicate.
    /// Returns token if it matches, else error.
    /// Message is prefixed with "expected ".
    fn expect_pred<P>(&mut self, message: &str, predicate: P) -> Result<Token, Report>
    where
        P: Fn(&Token) -> bool,
    {
        if let Some(tok) = self.cur() {
            if predicate(&tok) {
                self.pos += 1;
                return Ok(tok);
            }
        }
        Err(self.error_token(&format!("expected {}", message)))
    }

    /// Expects the current token to be an identifier with any content.
    fn expect_identifier(&mut self, message: &str) -> Result<Token, Report> {
        self.expect_pred(message, |t| matches!(t.kind, TokenKind::IdentLit(_)))
    }

    fn matches(&self, kind: TokenKind) -> bool {
        if let Some(tok) = self.tokens.get(self.pos) {
            tok.kind == kind
        } else {
            false
        }
    }

    fn matches_any(&self, kinds: &[TokenKind]) -> bool {
        for k in kinds {
            if self.matches(k.to_owned()) {
                return true;
            }
        }
        false
    }

    fn eof(&self) -> bool {
        self.pos >= self.tokens.len() || self.tokens[self.pos].eof
    }
}
