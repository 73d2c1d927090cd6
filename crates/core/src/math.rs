//! Math expression builder.
//!
//! An expression is a tree of [`Math`] scopes. Operators open a child
//! scope that collects their operands; leaves are added directly. The
//! operand count is checked when a scope closes.

use crate::Labelable;
use crate::error::DocumentError;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, Slot, reserve, resolve_all};
use folio_idf::{BinaryOp, MathNode, NaryOp, UnaryOp};
use folio_types::{Comparison, Label};
use std::fmt::Display;

/// What a math scope collects operands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    /// An equation or inline formula: exactly one expression.
    Root,
    Nary(NaryOp),
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl MathOp {
    fn arity_ok(self, n: usize) -> bool {
        match self {
            MathOp::Root | MathOp::Unary(_) => n == 1,
            MathOp::Binary(_) => n == 2,
            MathOp::Nary(_) => n >= 2,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            MathOp::Root | MathOp::Unary(_) => "exactly one operand",
            MathOp::Binary(_) => "exactly two operands",
            MathOp::Nary(_) => "at least two operands",
        }
    }
}

pub struct Math {
    link: ScopeLink,
    op: MathOp,
    label: Option<Label>,
    operands: Vec<Slot<MathNode>>,
    outlet: Outlet<MathNode>,
}

impl Math {
    pub(crate) fn expression(link: ScopeLink, label: Option<Label>, outlet: Outlet<MathNode>) -> Self {
        Self::new(link, MathOp::Root, label, outlet)
    }

    fn new(link: ScopeLink, op: MathOp, label: Option<Label>, outlet: Outlet<MathNode>) -> Self {
        Self {
            link,
            op,
            label,
            operands: Vec::new(),
            outlet,
        }
    }

    pub fn op(&self) -> MathOp {
        self.op
    }

    fn leaf(&mut self, node: MathNode) -> Result<(), DocumentError> {
        self.link.ensure_mutable()?;
        self.operands.push(Slot::Ready(node));
        Ok(())
    }

    fn operator(&mut self, op: MathOp) -> Result<Math, DocumentError> {
        self.link.ensure_mutable()?;
        let link = self.link.child(ScopeKind::Math)?;
        let outlet = reserve(&mut self.operands, |node| node);
        Ok(Math::new(link, op, None, outlet))
    }

    /// A variable or symbol name.
    pub fn name(&mut self, name: &str) -> Result<(), DocumentError> {
        self.leaf(MathNode::Name(name.to_string()))
    }

    pub fn number(&mut self, value: impl Display) -> Result<(), DocumentError> {
        self.leaf(MathNode::Number(value.to_string()))
    }

    /// Upright text inside a formula.
    pub fn text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.leaf(MathNode::Text(text.to_string()))
    }

    pub fn add(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Nary(NaryOp::Add))
    }

    pub fn sub(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Nary(NaryOp::Sub))
    }

    pub fn mul(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Nary(NaryOp::Mul))
    }

    /// A stacked fraction.
    pub fn div(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Binary(BinaryOp::Div))
    }

    /// A fraction written with a slash.
    pub fn div_inline(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Binary(BinaryOp::DivInline))
    }

    pub fn modulo(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Binary(BinaryOp::Mod))
    }

    /// An n-th root. Operands are the degree, then the radicand.
    pub fn root(&mut self) -> Result<Math, DocumentError> {
        self.operator(MathOp::Binary(BinaryOp::Root))
    }

    pub fn compare(&mut self, comparison: Comparison) -> Result<Math, DocumentError> {
        self.operator(MathOp::Binary(BinaryOp::Compare(comparison)))
    }

    pub fn unary(&mut self, op: UnaryOp) -> Result<Math, DocumentError> {
        self.operator(MathOp::Unary(op))
    }

    pub fn negate(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Negate)
    }

    pub fn abs(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Abs)
    }

    pub fn factorial(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Factorial)
    }

    pub fn sin(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Sin)
    }

    pub fn cos(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Cos)
    }

    pub fn tan(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Tan)
    }

    pub fn arcsin(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::ArcSin)
    }

    pub fn arccos(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::ArcCos)
    }

    pub fn arctan(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::ArcTan)
    }

    pub fn ln(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Ln)
    }

    /// Binary logarithm.
    pub fn ld(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Ld)
    }

    /// Decimal logarithm.
    pub fn lg(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Lg)
    }

    pub fn sqrt(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Sqrt)
    }

    pub fn in_braces(&mut self) -> Result<Math, DocumentError> {
        self.unary(UnaryOp::Braces)
    }

    /// Checks the operand count and hands the expression to the parent.
    ///
    /// # Errors
    ///
    /// `StructuralViolation` when the operand count does not fit the operator.
    pub fn close(&mut self) -> Result<(), DocumentError> {
        let op = self.op;
        self.link.close_with(|| {
            let mut operands = resolve_all(std::mem::take(&mut self.operands));
            if !op.arity_ok(operands.len()) {
                return Err(DocumentError::structural(format!(
                    "{:?} expression needs {}, got {}",
                    op,
                    op.expected(),
                    operands.len()
                )));
            }
            let node = match op {
                MathOp::Root => operands.remove(0),
                MathOp::Nary(op) => MathNode::Nary { op, operands },
                MathOp::Binary(op) => {
                    let right = operands.remove(1);
                    let left = operands.remove(0);
                    MathNode::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
                MathOp::Unary(op) => MathNode::Unary {
                    op,
                    operand: Box::new(operands.remove(0)),
                },
            };
            self.outlet.deliver(node);
            Ok(())
        })
    }
}

impl Labelable for Math {
    fn label(&self) -> Option<Label> {
        self.label
    }
}

close_on_drop!(Math => link);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentOutput;
    use crate::section::SectionContainer;
    use crate::testing::document;
    use folio_idf::BodyNode;
    use folio_types::LabelRequest;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// A document with one section holding one equation built by `build`.
    fn with_equation<F>(build: F) -> Result<DocumentOutput, DocumentError>
    where
        F: FnOnce(&mut Math) -> Result<(), DocumentError> + Send + 'static,
    {
        let mut doc = document();
        let mut body = doc.body()?;
        body.section(LabelRequest::None, move |section| {
            let mut content = section.body()?;
            let mut eq = content.equation(LabelRequest::Auto)?;
            build(&mut eq)?;
            eq.close()?;
            content.close()
        })?;
        body.close()?;
        doc.close()
    }

    fn expression(output: &DocumentOutput) -> Option<&MathNode> {
        output.tree.body.first()?.body.iter().find_map(|node| match node {
            BodyNode::Equation(eq) => Some(&eq.expr),
            _ => None,
        })
    }

    fn name(n: &str) -> MathNode {
        MathNode::Name(n.to_string())
    }

    #[test]
    fn test_arity_rules() {
        assert!(MathOp::Root.arity_ok(1));
        assert!(!MathOp::Root.arity_ok(2));
        assert!(MathOp::Nary(NaryOp::Add).arity_ok(3));
        assert!(!MathOp::Nary(NaryOp::Add).arity_ok(1));
        assert!(MathOp::Binary(BinaryOp::Root).arity_ok(2));
        assert!(!MathOp::Unary(UnaryOp::Sin).arity_ok(0));
    }

    #[test]
    fn test_wrong_operand_count_fails_the_document() -> TestResult {
        type Open = fn(&mut Math) -> Result<Math, DocumentError>;
        let cases: [(Open, usize); 3] = [(Math::add, 1), (Math::div, 3), (Math::sin, 0)];
        for (open, operands) in cases {
            let mut doc = document();
            let mut body = doc.body()?;
            body.section(LabelRequest::None, move |section| {
                let mut content = section.body()?;
                let mut eq = content.equation(LabelRequest::None)?;
                let mut op = open(&mut eq)?;
                for i in 0..operands {
                    op.number(i)?;
                }
                match op.close() {
                    Err(DocumentError::StructuralViolation(_)) => Ok(()),
                    other => Err(DocumentError::layout(format!("unexpected close result {:?}", other))),
                }
            })?;
            body.close()?;
            let err = doc.close().err().ok_or("a malformed formula was rendered")?;
            assert!(err.any_cause(|e| matches!(e, DocumentError::StructuralViolation(_))));
        }
        Ok(())
    }

    #[test]
    fn test_nested_expression_tree() -> TestResult {
        let output = with_equation(|eq| {
            let mut div = eq.div()?;
            let mut add = div.add()?;
            add.name("a")?;
            add.name("b")?;
            add.close()?;
            let mut sqrt = div.sqrt()?;
            sqrt.name("c")?;
            sqrt.close()?;
            div.close()
        })?;
        let expected = MathNode::Binary {
            op: BinaryOp::Div,
            left: Box::new(MathNode::Nary {
                op: NaryOp::Add,
                operands: vec![name("a"), name("b")],
            }),
            right: Box::new(MathNode::Unary {
                op: UnaryOp::Sqrt,
                operand: Box::new(name("c")),
            }),
        };
        assert_eq!(expression(&output), Some(&expected));
        Ok(())
    }

    #[test]
    fn test_root_takes_degree_then_radicand() -> TestResult {
        let output = with_equation(|eq| {
            let mut root = eq.root()?;
            root.number(3)?;
            root.name("x")?;
            root.close()
        })?;
        match expression(&output) {
            Some(MathNode::Binary {
                op: BinaryOp::Root,
                left,
                right,
            }) => {
                assert_eq!(**left, MathNode::Number("3".into()));
                assert_eq!(**right, name("x"));
            }
            other => panic!("expected a root, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_equation_holds_one_expression() -> TestResult {
        let err = with_equation(|eq| {
            eq.name("a")?;
            eq.name("b")
        })
        .unwrap_err();
        assert!(err.any_cause(|e| matches!(e, DocumentError::StructuralViolation(_))));
        Ok(())
    }
}
