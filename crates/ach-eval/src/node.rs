use crate::context::EvalContext;
use serde_json::Value;

/// An expression node, parsed once from a `serde_json::Value` predicate
/// tree. Parsing never fails: any shape that doesn't match a recognized
/// node form becomes `Node::Malformed`, which always evaluates to
/// `Resolved::Undefined` (folds to `false`).
#[derive(Debug, Clone)]
pub enum Node {
    Literal(Literal),
    /// A dotted path such as `"per_game.points"`.
    Path(String),
    Op(OpKind, Vec<Node>),
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Num(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Has,
}

impl OpKind {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            ">=" => OpKind::Ge,
            ">" => OpKind::Gt,
            "<=" => OpKind::Le,
            "<" => OpKind::Lt,
            "==" => OpKind::Eq,
            "!=" => OpKind::Ne,
            "and" => OpKind::And,
            "or" => OpKind::Or,
            "not" => OpKind::Not,
            "+" => OpKind::Add,
            "-" => OpKind::Sub,
            "*" => OpKind::Mul,
            "/" => OpKind::Div,
            "has" => OpKind::Has,
            _ => return None,
        })
    }

    /// Fixed arity, or `None` for variadic (`and`/`or`).
    fn arity(self) -> Option<usize> {
        match self {
            OpKind::Ge | OpKind::Gt | OpKind::Le | OpKind::Lt | OpKind::Eq | OpKind::Ne => Some(2),
            OpKind::Add | OpKind::Sub | OpKind::Mul | OpKind::Div => Some(2),
            OpKind::Has => Some(2),
            OpKind::Not => Some(1),
            OpKind::And | OpKind::Or => None,
        }
    }
}

/// The result of resolving a node: a small lattice collapsing to a boolean
/// at the top level via `to_bool`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Bool(bool),
    Num(f64),
    Str(String),
    Undefined,
}

impl Resolved {
    /// An arithmetic result is true iff non-zero; anything else that isn't
    /// already a bool is false.
    pub fn to_bool(&self) -> bool {
        match self {
            Resolved::Bool(b) => *b,
            Resolved::Num(n) => *n != 0.0,
            Resolved::Str(_) | Resolved::Undefined => false,
        }
    }

    fn as_finite_num(&self) -> Option<f64> {
        match self {
            Resolved::Num(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl Node {
    /// Parse a JSON predicate tree. Always succeeds; unrecognized shapes
    /// become `Node::Malformed`.
    pub fn parse(v: &Value) -> Node {
        match v {
            Value::Bool(b) => Node::Literal(Literal::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(|f| Node::Literal(Literal::Num(f)))
                .unwrap_or(Node::Malformed),
            Value::String(s) => {
                if s.contains('.') {
                    Node::Path(s.clone())
                } else {
                    Node::Literal(Literal::Str(s.clone()))
                }
            }
            Value::Object(map) => {
                if map.len() != 1 {
                    return Node::Malformed;
                }
                let (key, arg) = map.iter().next().expect("len checked above");
                let Some(op) = OpKind::from_key(key) else {
                    return Node::Malformed;
                };
                let children = match arg {
                    Value::Array(items) => items.iter().map(Node::parse).collect(),
                    other => vec![Node::parse(other)],
                };
                if let Some(expected) = op.arity() {
                    if children.len() != expected {
                        // Arity mismatch: represent as Malformed so the node
                        // evaluates to false rather than panicking on index.
                        return Node::Malformed;
                    }
                }
                Node::Op(op, children)
            }
            Value::Null | Value::Array(_) => Node::Malformed,
        }
    }

    pub fn eval(&self, ctx: &EvalContext) -> Resolved {
        match self {
            Node::Malformed => Resolved::Undefined,
            Node::Literal(Literal::Bool(b)) => Resolved::Bool(*b),
            Node::Literal(Literal::Num(n)) => Resolved::Num(*n),
            Node::Literal(Literal::Str(s)) => Resolved::Str(s.clone()),
            Node::Path(path) => match ctx.lookup(path) {
                Some(v) => resolve_json_value(v),
                None => Resolved::Undefined,
            },
            Node::Op(op, children) => eval_op(*op, children, ctx),
        }
    }

    /// Resolve this node as a whole scope object, for the `has` operator's
    /// first argument (e.g. the bare literal `"per_game"`).
    fn resolve_scope<'a>(&self, ctx: &'a EvalContext) -> Option<&'a std::collections::HashMap<String, Value>> {
        match self {
            Node::Literal(Literal::Str(s)) => ctx.scope(s),
            _ => None,
        }
    }
}

fn resolve_json_value(v: &Value) -> Resolved {
    match v {
        Value::Bool(b) => Resolved::Bool(*b),
        Value::Number(n) => n.as_f64().map(Resolved::Num).unwrap_or(Resolved::Undefined),
        Value::String(s) => Resolved::Str(s.clone()),
        _ => Resolved::Undefined,
    }
}

fn eval_op(op: OpKind, children: &[Node], ctx: &EvalContext) -> Resolved {
    match op {
        OpKind::And => {
            for c in children {
                if !c.eval(ctx).to_bool() {
                    return Resolved::Bool(false);
                }
            }
            Resolved::Bool(true)
        }
        OpKind::Or => {
            for c in children {
                if c.eval(ctx).to_bool() {
                    return Resolved::Bool(true);
                }
            }
            Resolved::Bool(false)
        }
        OpKind::Not => Resolved::Bool(!children[0].eval(ctx).to_bool()),
        OpKind::Ge | OpKind::Gt | OpKind::Le | OpKind::Lt => {
            let (Some(l), Some(r)) = (
                children[0].eval(ctx).as_finite_num(),
                children[1].eval(ctx).as_finite_num(),
            ) else {
                return Resolved::Bool(false);
            };
            let result = match op {
                OpKind::Ge => l >= r,
                OpKind::Gt => l > r,
                OpKind::Le => l <= r,
                OpKind::Lt => l < r,
                _ => unreachable!(),
            };
            Resolved::Bool(result)
        }
        OpKind::Eq | OpKind::Ne => {
            let eq = children[0].eval(ctx) == children[1].eval(ctx);
            Resolved::Bool(if op == OpKind::Eq { eq } else { !eq })
        }
        OpKind::Add | OpKind::Sub | OpKind::Mul | OpKind::Div => {
            let (Some(l), Some(r)) = (
                children[0].eval(ctx).as_finite_num(),
                children[1].eval(ctx).as_finite_num(),
            ) else {
                return Resolved::Num(0.0);
            };
            let result = match op {
                OpKind::Add => l + r,
                OpKind::Sub => l - r,
                OpKind::Mul => l * r,
                OpKind::Div => {
                    if r == 0.0 {
                        0.0
                    } else {
                        l / r
                    }
                }
                _ => unreachable!(),
            };
            Resolved::Num(result)
        }
        OpKind::Has => {
            let Some(obj) = children[0].resolve_scope(ctx) else {
                return Resolved::Bool(false);
            };
            let Resolved::Str(key) = children[1].eval(ctx) else {
                return Resolved::Bool(false);
            };
            Resolved::Bool(obj.contains_key(&key))
        }
    }
}
