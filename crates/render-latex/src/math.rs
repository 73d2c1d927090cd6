use crate::escape::escape;
use folio_idf::{BinaryOp, MathNode, NaryOp, UnaryOp};
use folio_types::Comparison;
use itertools::Itertools;

fn comparison(c: Comparison) -> &'static str {
    match c {
        Comparison::Less => "<",
        Comparison::LessOrEqual => "\\leq",
        Comparison::Equal => "=",
        Comparison::NotEqual => "\\neq",
        Comparison::GreaterOrEqual => "\\geq",
        Comparison::Greater => ">",
        Comparison::Approximately => "\\approx",
    }
}

fn operand(node: &MathNode) -> String {
    if node.needs_parens() {
        format!("\\left({}\\right)", math_to_latex(node))
    } else {
        math_to_latex(node)
    }
}

fn name(text: &str) -> String {
    if text.chars().count() > 1 {
        format!("\\mathit{{{}}}", escape(text))
    } else {
        escape(text)
    }
}

/// Renders an expression in LaTeX math mode syntax, without delimiters.
pub fn math_to_latex(node: &MathNode) -> String {
    match node {
        MathNode::Name(n) => name(n),
        MathNode::Number(n) => n.clone(),
        MathNode::Text(t) => format!("\\text{{{}}}", escape(t)),
        MathNode::Nary { op, operands } => {
            let sep = match op {
                NaryOp::Add => " + ",
                NaryOp::Sub => " - ",
                NaryOp::Mul => " \\cdot ",
            };
            operands.iter().map(operand).join(sep)
        }
        MathNode::Binary { op, left, right } => match op {
            BinaryOp::Div => format!(
                "\\frac{{{}}}{{{}}}",
                math_to_latex(left),
                math_to_latex(right)
            ),
            BinaryOp::DivInline => format!("{} / {}", operand(left), operand(right)),
            BinaryOp::Mod => format!("{} \\bmod {}", operand(left), operand(right)),
            BinaryOp::Root => format!(
                "\\sqrt[{}]{{{}}}",
                math_to_latex(left),
                math_to_latex(right)
            ),
            BinaryOp::Compare(c) => format!(
                "{} {} {}",
                math_to_latex(left),
                comparison(*c),
                math_to_latex(right)
            ),
        },
        MathNode::Unary { op, operand: inner } => match op {
            UnaryOp::Negate => format!("-{}", operand(inner)),
            UnaryOp::Abs => format!("\\left|{}\\right|", math_to_latex(inner)),
            UnaryOp::Factorial => format!("{}!", operand(inner)),
            UnaryOp::Sqrt => format!("\\sqrt{{{}}}", math_to_latex(inner)),
            UnaryOp::Braces => format!("\\left({}\\right)", math_to_latex(inner)),
            UnaryOp::Ld => format!("\\operatorname{{ld}}\\left({}\\right)", math_to_latex(inner)),
            other => format!(
                "\\{}\\left({}\\right)",
                other.function_name().unwrap_or("operatorname"),
                math_to_latex(inner)
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: &str) -> MathNode {
        MathNode::Number(v.into())
    }

    #[test]
    fn test_fraction_of_sum() {
        let expr = MathNode::Binary {
            op: BinaryOp::Div,
            left: Box::new(MathNode::Nary {
                op: NaryOp::Add,
                operands: vec![MathNode::Name("x".into()), n("1")],
            }),
            right: Box::new(n("2")),
        };
        assert_eq!(math_to_latex(&expr), "\\frac{x + 1}{2}");
    }

    #[test]
    fn test_nested_sum_gets_parens() {
        let expr = MathNode::Nary {
            op: NaryOp::Mul,
            operands: vec![
                MathNode::Nary {
                    op: NaryOp::Sub,
                    operands: vec![n("3"), n("1")],
                },
                MathNode::Unary {
                    op: UnaryOp::Sin,
                    operand: Box::new(MathNode::Name("alpha".into())),
                },
            ],
        };
        assert_eq!(
            math_to_latex(&expr),
            "\\left(3 - 1\\right) \\cdot \\sin\\left(\\mathit{alpha}\\right)"
        );
    }

    #[test]
    fn test_root_and_compare() {
        let expr = MathNode::Binary {
            op: BinaryOp::Compare(Comparison::LessOrEqual),
            left: Box::new(MathNode::Binary {
                op: BinaryOp::Root,
                left: Box::new(n("3")),
                right: Box::new(n("27")),
            }),
            right: Box::new(n("3")),
        };
        assert_eq!(math_to_latex(&expr), "\\sqrt[3]{27} \\leq 3");
    }
}
