//! Branches and Boolean Values
//!
//! Conditional jumps for `if (...) goto`, and the jump-based idiom that
//! turns comparisons and logical operators into `0`/`1` on the stack.

use super::context::MethodContext;
use super::emit::{int_compare_jump, reference_compare_jump, swap_operands, zero_compare_jump};
use crate::compiler::error::CompileResult;
use crate::compiler::ir::{Element, Instruction, OpType};

impl<'u> MethodContext<'u> {
    /// Jump to `label` when `condition` holds.
    pub(super) fn generate_branch(&mut self, condition: &Instruction, label: &str) -> CompileResult<()> {
        match condition {
            Instruction::BinaryOp {
                op, left, right, ..
            } if op.is_comparison() => self.compare_and_jump(*op, left, right, label),
            Instruction::BinaryOp {
                op: OpType::AndB,
                left,
                right,
                ..
            } => {
                let skip = format!("skip_{}", self.next_label());
                self.load_element(left)?;
                self.jump("ifeq", &skip, 1);
                self.load_element(right)?;
                self.jump("ifne", label, 1);
                self.emit_label(&skip);
                Ok(())
            }
            Instruction::BinaryOp {
                op: OpType::OrB,
                left,
                right,
                ..
            } => {
                self.load_element(left)?;
                self.jump("ifne", label, 1);
                self.load_element(right)?;
                self.jump("ifne", label, 1);
                Ok(())
            }
            Instruction::UnaryOp {
                op: OpType::NotB,
                operand,
            } => {
                self.load_element(operand)?;
                self.jump("ifeq", label, 1);
                Ok(())
            }
            other => {
                self.generate_value(other)?;
                self.jump("ifne", label, 1);
                Ok(())
            }
        }
    }

    fn jump(&mut self, mnemonic: &str, label: &str, consumed: usize) {
        self.emit(format!("{} {}", mnemonic, label));
        self.pop(consumed);
    }

    /// Jump to `label` when `left op right` holds. Comparisons against a
    /// literal zero test the other operand alone.
    fn compare_and_jump(
        &mut self,
        op: OpType,
        left: &Element,
        right: &Element,
        label: &str,
    ) -> CompileResult<()> {
        if left.ty().is_reference() || right.ty().is_reference() {
            let mnemonic = reference_compare_jump(op)
                .ok_or_else(|| self.error(format!("'{}' between references", op)))?;
            self.load_element(left)?;
            self.load_element(right)?;
            self.jump(mnemonic, label, 2);
            return Ok(());
        }

        let is_zero = |e: &Element| e.is_literal() && e.int_value() == Some(0);
        let (operands, mnemonic, consumed) = if is_zero(right) {
            (vec![left], zero_compare_jump(op), 1)
        } else if is_zero(left) {
            (vec![right], zero_compare_jump(swap_operands(op)), 1)
        } else {
            (vec![left, right], int_compare_jump(op), 2)
        };
        let mnemonic = mnemonic.ok_or_else(|| self.error(format!("'{}' is not a comparison", op)))?;
        for operand in operands {
            self.load_element(operand)?;
        }
        self.jump(&mnemonic, label, consumed);
        Ok(())
    }

    /// Push `1` on the path that falls through `test` and `0` on the path
    /// where it jumps to the `else_N` label it is given. `test` may return
    /// one more label to place at the start of the `1` path.
    fn materialize(
        &mut self,
        test: impl FnOnce(&mut Self, usize, &str) -> CompileResult<Option<String>>,
    ) -> CompileResult<()> {
        let n = self.next_label();
        let else_label = format!("else_{}", n);
        let end_label = format!("end_{}", n);

        if let Some(label) = test(self, n, &else_label)? {
            self.emit_label(&label);
        }
        self.emit("iconst_1");
        self.push(1);
        self.emit(format!("goto {}", end_label));
        self.pop(1);

        self.emit_label(&else_label);
        self.emit("iconst_0");
        self.push(1);
        self.emit_label(&end_label);
        Ok(())
    }

    /// Comparison as a value.
    pub(super) fn generate_comparison(
        &mut self,
        op: OpType,
        left: &Element,
        right: &Element,
    ) -> CompileResult<()> {
        let negated = op
            .negate()
            .ok_or_else(|| self.error(format!("'{}' is not a comparison", op)))?;
        self.materialize(|ctx, _, else_label| {
            ctx.compare_and_jump(negated, left, right, else_label)?;
            Ok(None)
        })
    }

    /// Short-circuit `&&` and `||` as values.
    pub(super) fn generate_logical(
        &mut self,
        op: OpType,
        left: &Element,
        right: &Element,
    ) -> CompileResult<()> {
        self.materialize(|ctx, n, else_label| {
            ctx.load_element(left)?;
            if op == OpType::OrB {
                let then_label = format!("then_{}", n);
                ctx.jump("ifne", &then_label, 1);
                ctx.load_element(right)?;
                ctx.jump("ifeq", else_label, 1);
                return Ok(Some(then_label));
            }
            ctx.jump("ifeq", else_label, 1);
            ctx.load_element(right)?;
            ctx.jump("ifeq", else_label, 1);
            Ok(None)
        })
    }

    /// `!x`. A literal operand is inverted at emit time.
    pub(super) fn generate_not(&mut self, operand: &Element) -> CompileResult<()> {
        if let Some(value) = operand.int_value() {
            self.emit(if value == 0 { "iconst_1" } else { "iconst_0" });
            self.push(1);
            return Ok(());
        }
        self.materialize(|ctx, _, else_label| {
            ctx.load_element(operand)?;
            ctx.jump("ifne", else_label, 1);
            Ok(None)
        })
    }
}
