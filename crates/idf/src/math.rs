use folio_types::Comparison;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaryOp {
    Add,
    Sub,
    Mul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Stacked fraction.
    Div,
    /// Fraction written with a slash.
    DivInline,
    Mod,
    /// Operands are `(degree, radicand)`.
    Root,
    Compare(Comparison),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Abs,
    Factorial,
    Sin,
    Cos,
    Tan,
    ArcSin,
    ArcCos,
    ArcTan,
    Ln,
    Ld,
    Lg,
    Sqrt,
    Braces,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 14] = [
        UnaryOp::Negate,
        UnaryOp::Abs,
        UnaryOp::Factorial,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::ArcSin,
        UnaryOp::ArcCos,
        UnaryOp::ArcTan,
        UnaryOp::Ln,
        UnaryOp::Ld,
        UnaryOp::Lg,
        UnaryOp::Sqrt,
        UnaryOp::Braces,
    ];

    /// Function name for the operators written as `name(x)`.
    pub fn function_name(self) -> Option<&'static str> {
        match self {
            UnaryOp::Sin => Some("sin"),
            UnaryOp::Cos => Some("cos"),
            UnaryOp::Tan => Some("tan"),
            UnaryOp::ArcSin => Some("arcsin"),
            UnaryOp::ArcCos => Some("arccos"),
            UnaryOp::ArcTan => Some("arctan"),
            UnaryOp::Ln => Some("ln"),
            UnaryOp::Ld => Some("ld"),
            UnaryOp::Lg => Some("lg"),
            _ => None,
        }
    }
}

/// A math expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MathNode {
    /// A variable or symbol name.
    Name(String),
    Number(String),
    /// Upright text inside math.
    Text(String),
    Nary {
        op: NaryOp,
        operands: Vec<MathNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<MathNode>,
        right: Box<MathNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<MathNode>,
    },
}

impl MathNode {
    /// Whether this node must be wrapped in parentheses when used as an
    /// operand of an n-ary or unary operator.
    pub fn needs_parens(&self) -> bool {
        matches!(
            self,
            MathNode::Nary { .. }
                | MathNode::Binary {
                    op: BinaryOp::DivInline | BinaryOp::Mod | BinaryOp::Compare(_),
                    ..
                }
        )
    }

    /// Number of nodes in this expression.
    pub fn size(&self) -> usize {
        match self {
            MathNode::Name(_) | MathNode::Number(_) | MathNode::Text(_) => 1,
            MathNode::Nary { operands, .. } => 1 + operands.iter().map(MathNode::size).sum::<usize>(),
            MathNode::Binary { left, right, .. } => 1 + left.size() + right.size(),
            MathNode::Unary { operand, .. } => 1 + operand.size(),
        }
    }
}
