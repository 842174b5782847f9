//! Control Flow Lowering
//!
//! `if`/`else` and `while` become conditional jumps over labelled blocks.
//! Label numbers come from class-wide counters so that every label is
//! unique within its method.

use super::{ir_type, Lowerer};
use crate::compiler::ir::OpType;
use crate::parser::ast::{NodeKind, NodeRef};
use crate::parser::checker::Type;

impl<'a> Lowerer<'a> {
    /// ```text
    /// if (cond) goto THEN_n;
    /// <else>
    /// goto ENDIF_n;
    /// THEN_n:
    /// <then>
    /// ENDIF_n:
    /// ```
    pub(super) fn lower_if(&mut self, node: NodeRef<'_>) {
        let n = self.if_index;
        self.if_index += 1;

        let condition = match node.child(0) {
            Some(cond) => self.lower_condition(cond),
            None => "0.bool".to_string(),
        };
        self.emit(format!("if ({}) goto THEN_{};", condition, n));

        if let Some(else_branch) = node.child(2) {
            self.lower_statement(else_branch);
        }
        self.emit(format!("goto ENDIF_{};", n));

        self.emit_label(&format!("THEN_{}", n));
        if let Some(then_branch) = node.child(1) {
            self.lower_statement(then_branch);
        }
        self.emit_label(&format!("ENDIF_{}", n));
    }

    /// ```text
    /// if (!cond) goto ENDLOOP_n+1;
    /// BODY_n:
    /// <body>
    /// if (cond) goto BODY_n;
    /// ENDLOOP_n+1:
    /// ```
    pub(super) fn lower_while(&mut self, node: NodeRef<'_>) {
        let body_label = format!("BODY_{}", self.loop_index);
        let end_label = format!("ENDLOOP_{}", self.loop_index + 1);
        self.loop_index += 2;

        let Some(cond) = node.child(0) else {
            return;
        };

        let guard = self.lower_negated_condition(cond);
        self.emit(format!("if ({}) goto {};", guard, end_label));

        self.emit_label(&body_label);
        if let Some(body) = node.child(1) {
            self.lower_statement(body);
        }

        // The condition is evaluated again at the bottom
        let condition = self.lower_condition(cond);
        self.emit(format!("if ({}) goto {};", condition, body_label));
        self.emit_label(&end_label);
    }

    /// Lower a condition to the text between the parentheses of an `if`.
    fn lower_condition(&mut self, node: NodeRef<'_>) -> String {
        let node = node.unwrap_scope();
        match node.kind() {
            NodeKind::BinaryOp | NodeKind::UnaryOp => self.lower_rhs(node, Some(Type::boolean())).text,
            _ => self.lower_value(node, Some(Type::boolean())).text,
        }
    }

    /// Lower the negation of a condition. Comparisons flip their operator,
    /// `!x` drops the negation, anything else is negated with `!.bool`.
    fn lower_negated_condition(&mut self, node: NodeRef<'_>) -> String {
        let node = node.unwrap_scope();
        match node.kind() {
            NodeKind::BinaryOp => {
                let negated = OpType::from_symbol(node.get("op"))
                    .filter(|op| op.is_comparison())
                    .and_then(|op| op.negate());
                match negated {
                    Some(op) => {
                        let (left, _, right, ty) = self.lower_binary_parts(node);
                        format!("{} {}{} {}", left.text, op.symbol(), ir_type(&ty), right.text)
                    }
                    None => {
                        let value = self.lower_value(node, Some(Type::boolean()));
                        format!("!.bool {}", value.text)
                    }
                }
            }
            NodeKind::UnaryOp => match node.child(0) {
                Some(operand) => self.lower_value(operand, Some(Type::boolean())).text,
                None => "1.bool".to_string(),
            },
            _ => {
                let value = self.lower_value(node, Some(Type::boolean()));
                format!("!.bool {}", value.text)
            }
        }
    }
}
