use crate::markup::Markup;
use folio_idf::{BinaryOp, MathNode, NaryOp, UnaryOp};
use folio_render_core::RenderError;

const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Writes `node` as a `<math>` element.
pub(crate) fn write_math(m: &mut Markup, node: &MathNode, block: bool) -> Result<(), RenderError> {
    let display = if block { "block" } else { "inline" };
    m.open("math", &[("xmlns", MATHML_NS), ("display", display)])?;
    write_node(m, node)?;
    m.close("math")
}

fn op(m: &mut Markup, symbol: &str) -> Result<(), RenderError> {
    m.element("mo", &[], symbol)
}

fn parenthesized(m: &mut Markup, node: &MathNode) -> Result<(), RenderError> {
    m.open("mrow", &[])?;
    op(m, "(")?;
    write_node(m, node)?;
    op(m, ")")?;
    m.close("mrow")
}

fn operand(m: &mut Markup, node: &MathNode) -> Result<(), RenderError> {
    if node.needs_parens() {
        parenthesized(m, node)
    } else {
        write_node(m, node)
    }
}

fn write_node(m: &mut Markup, node: &MathNode) -> Result<(), RenderError> {
    match node {
        MathNode::Name(n) => m.element("mi", &[], n),
        MathNode::Number(n) => m.element("mn", &[], n),
        MathNode::Text(t) => m.element("mtext", &[], t),
        MathNode::Nary { op: nary, operands } => {
            let symbol = match nary {
                NaryOp::Add => "+",
                NaryOp::Sub => "\u{2212}",
                NaryOp::Mul => "\u{22c5}",
            };
            m.open("mrow", &[])?;
            for (i, child) in operands.iter().enumerate() {
                if i > 0 {
                    op(m, symbol)?;
                }
                operand(m, child)?;
            }
            m.close("mrow")
        }
        MathNode::Binary { op: binary, left, right } => match binary {
            BinaryOp::Div => {
                m.open("mfrac", &[])?;
                write_node(m, left)?;
                write_node(m, right)?;
                m.close("mfrac")
            }
            BinaryOp::Root => {
                m.open("mroot", &[])?;
                write_node(m, right)?;
                write_node(m, left)?;
                m.close("mroot")
            }
            other => {
                let symbol = match other {
                    BinaryOp::DivInline => "/",
                    BinaryOp::Mod => "mod",
                    BinaryOp::Compare(c) => c.symbol(),
                    BinaryOp::Div | BinaryOp::Root => "",
                };
                m.open("mrow", &[])?;
                operand(m, left)?;
                op(m, symbol)?;
                operand(m, right)?;
                m.close("mrow")
            }
        },
        MathNode::Unary { op: unary, operand: inner } => match unary {
            UnaryOp::Sqrt => {
                m.open("msqrt", &[])?;
                write_node(m, inner)?;
                m.close("msqrt")
            }
            UnaryOp::Braces => parenthesized(m, inner),
            UnaryOp::Negate | UnaryOp::Abs | UnaryOp::Factorial => {
                m.open("mrow", &[])?;
                match unary {
                    UnaryOp::Negate => {
                        op(m, "\u{2212}")?;
                        operand(m, inner)?;
                    }
                    UnaryOp::Abs => {
                        op(m, "|")?;
                        write_node(m, inner)?;
                        op(m, "|")?;
                    }
                    _ => {
                        operand(m, inner)?;
                        op(m, "!")?;
                    }
                }
                m.close("mrow")
            }
            function => {
                m.open("mrow", &[])?;
                m.element("mi", &[], function.function_name().unwrap_or("f"))?;
                op(m, "\u{2061}")?;
                parenthesized(m, inner)?;
                m.close("mrow")
            }
        },
    }
}
