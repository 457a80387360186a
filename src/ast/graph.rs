use crate::ast::{Expr, Node, Stmt};
use crate::token::{Pos, Token};

/// Graph operations make up the body of a graph block. They map 1:1 onto
/// the tagged-graph runtime API, except for the control flow variants and
/// the embedding of ordinary statements.
#[derive(Debug, Clone)]
pub enum GraphExpr {
    Edge(EdgeOp),
    AddVertex(AddVertexOp),
    RemoveVertex(RemoveVertexOp),
    TagAdd(TagOp),
    TagRemove(TagOp),
    Retag(RetagOp),
    While(GraphWhile),
    If(GraphIf),
    Block(GraphBlock),
    Stmt(Box<Stmt>),
}

/// A bracketed predicate, eg. ["server" and !"legacy"].
#[derive(Debug, Clone)]
pub struct PredNode {
    pub lbrack: Token,
    pub pred: Pred,
    pub rbrack: Token,
}

/// Predicates are boolean tests over a vertex tag set. Leaves are ordinary
/// expressions interpreted by the runtime as membership tests.
#[derive(Debug, Clone)]
pub enum Pred {
    Or(OrPred),
    And(AndPred),
    Not(NotPred),
    Group(GroupPred),
    Test(Expr),
}

#[derive(Debug, Clone)]
pub struct OrPred {
    pub left: Box<Pred>,
    pub op: Token,
    pub right: Box<Pred>,
}

#[derive(Debug, Clone)]
pub struct AndPred {
    pub left: Box<Pred>,
    pub op: Token,
    pub right: Box<Pred>,
}

#[derive(Debug, Clone)]
pub struct NotPred {
    pub op: Token,
    pub right: Box<Pred>,
}

#[derive(Debug, Clone)]
pub struct GroupPred {
    pub lparen: Token,
    pub inner: Box<Pred>,
    pub rparen: Token,
}

/// Connect or disconnect all vertex pairs matching the two predicates.
/// The relation token is one of => (directed), <=> (bidirectional) and
/// =/= (disconnect). Weight defaults to 1 when absent.
#[derive(Debug, Clone)]
pub struct EdgeOp {
    pub left: PredNode,
    pub op: Token,
    pub right: PredNode,
    pub weight: Option<Token>,
    pub semi: Token,
}

/// V+ adds vertices carrying the given tag set. The optional count literal
/// repeats the insertion, defaulting to 1.
#[derive(Debug, Clone)]
pub struct AddVertexOp {
    pub head: Token,
    pub plus: Token,
    pub tags: Expr,
    pub count: Option<Token>,
    pub semi: Token,
}

/// V- removes all vertices matching the predicate.
#[derive(Debug, Clone)]
pub struct RemoveVertexOp {
    pub head: Token,
    pub minus: Token,
    pub pred: PredNode,
    pub semi: Token,
}

/// Adds (++) or removes (--) the tag set on all vertices matching the
/// predicate.
#[derive(Debug, Clone)]
pub struct TagOp {
    pub pred: PredNode,
    pub op: Token,
    pub tags: Expr,
    pub semi: Token,
}

/// Replaces one exact tag with another across all vertices. A null
/// replacement removes the tag.
#[derive(Debug, Clone)]
pub struct RetagOp {
    pub old: Token,
    pub op: Token,
    pub new: Token,
    pub semi: Token,
}

#[derive(Debug, Clone)]
pub struct GraphWhile {
    pub kw: Token,
    pub cond: Expr,
    pub body: GraphBlock,
}

#[derive(Debug, Clone)]
pub struct GraphIf {
    pub kw: Token,
    pub cond: Expr,
    pub then: GraphBlock,
    pub els: Option<GraphBlock>,
}

#[derive(Debug, Clone)]
pub struct GraphBlock {
    pub lbrace: Token,
    pub ops: Vec<GraphExpr>,
    pub rbrace: Token,
}

impl Node for GraphExpr {
    fn pos(&self) -> &Pos {
        match self {
            GraphExpr::Edge(node) => &node.left.lbrack.pos,
            GraphExpr::AddVertex(node) => &node.head.pos,
            GraphExpr::RemoveVertex(node) => &node.head.pos,
            GraphExpr::TagAdd(node) => &node.pred.lbrack.pos,
            GraphExpr::TagRemove(node) => &node.pred.lbrack.pos,
            GraphExpr::Retag(node) => &node.old.pos,
            GraphExpr::While(node) => &node.kw.pos,
            GraphExpr::If(node) => &node.kw.pos,
            GraphExpr::Block(node) => &node.lbrace.pos,
            GraphExpr::Stmt(stmt) => stmt.pos(),
        }
    }

    fn end(&self) -> &Pos {
        match self {
            GraphExpr::Edge(node) => &node.semi.end_pos,
            GraphExpr::AddVertex(node) => &node.semi.end_pos,
            GraphExpr::RemoveVertex(node) => &node.semi.end_pos,
            GraphExpr::TagAdd(node) => &node.semi.end_pos,
            GraphExpr::TagRemove(node) => &node.semi.end_pos,
            GraphExpr::Retag(node) => &node.semi.end_pos,
            GraphExpr::While(node) => &node.body.rbrace.end_pos,
            GraphExpr::If(node) => match &node.els {
                Some(els) => &els.rbrace.end_pos,
                None => &node.then.rbrace.end_pos,
            },
            GraphExpr::Block(node) => &node.rbrace.end_pos,
            GraphExpr::Stmt(stmt) => stmt.end(),
        }
    }
}

impl Node for PredNode {
    fn pos(&self) -> &Pos {
        &self.lbrack.pos
    }

    fn end(&self) -> &Pos {
        &self.rbrack.end_pos
    }
}

impl Node for Pred {
    fn pos(&self) -> &Pos {
        match self {
            Pred::Or(node) => node.left.pos(),
            Pred::And(node) => node.left.pos(),
            Pred::Not(node) => &node.op.pos,
            Pred::Group(node) => &node.lparen.pos,
            Pred::Test(expr) => expr.pos(),
        }
    }

    fn end(&self) -> &Pos {
        match self {
            Pred::Or(node) => node.right.end(),
            Pred::And(node) => node.right.end(),
            Pred::Not(node) => node.right.end(),
            Pred::Group(node) => &node.rparen.end_pos,
            Pred::Test(expr) => expr.end(),
        }
    }
}
