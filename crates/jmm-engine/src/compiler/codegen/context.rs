//! Method Emission Context
//!
//! Per-method state while translating IR instructions to assembler lines:
//! the body buffer, operand stack tracking, generated labels and the
//! stack of enclosing instructions.

use super::emit::{
    arithmetic_instruction, array_load_instruction, array_store_instruction, fold,
    int_constant, load_instruction, method_descriptor, owner_name, return_instruction,
    store_instruction, type_descriptor,
};
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{
    CallInstruction, CallKind, ClassUnit, Descriptor, Element, ElementType, Instruction, Method,
    OpType,
};
use std::fmt::Write;

/// Instruction whose operand is currently being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Enclosing {
    Assign,
    Branch,
    Return,
    Field,
    Call,
    /// A value computed only to be dropped
    Discard,
}

/// Context for emitting a single method
pub(super) struct MethodContext<'u> {
    unit: &'u ClassUnit,
    method: &'u Method,
    body: String,
    /// Operand stack depth at the current point
    stack: usize,
    max_stack: usize,
    label_index: usize,
    enclosing: Vec<Enclosing>,
}

impl<'u> MethodContext<'u> {
    pub(super) fn new(unit: &'u ClassUnit, method: &'u Method) -> Self {
        Self {
            unit,
            method,
            body: String::new(),
            stack: 0,
            max_stack: 0,
            label_index: 0,
            enclosing: Vec::new(),
        }
    }

    /// Emit every instruction of the method, with its labels.
    pub(super) fn generate_body(&mut self) -> CompileResult<()> {
        let method = self.method;
        let mut index = 0;
        while index < method.instructions.len() {
            for label in method.labels_at(index) {
                self.emit_label(label);
            }
            if let Some((rhs, ty)) = self.returned_directly(index) {
                self.stack = 0;
                self.enclosed(Enclosing::Return, |ctx| ctx.generate_value(rhs))?;
                self.emit(return_instruction(ty));
                self.pop(1);
                index += 2;
                continue;
            }
            self.generate_instruction(&method.instructions[index])?;
            index += 1;
        }
        for label in method.labels_at(method.instructions.len()) {
            self.emit_label(label);
        }
        Ok(())
    }

    /// `x := rhs; ret x;` where nothing else touches `x` and no label sits
    /// on the return: the value can be returned straight off the stack.
    fn returned_directly(&self, index: usize) -> Option<(&'u Instruction, &'u ElementType)> {
        let method: &'u Method = self.method;
        let (Instruction::Assign { dest, rhs, .. }, Some(next)) =
            (method.instructions.get(index)?, method.instructions.get(index + 1))
        else {
            return None;
        };
        let Element::Operand { name, .. } = dest else {
            return None;
        };
        let Instruction::Return {
            ty,
            value: Some(Element::Operand { name: returned, .. }),
        } = next
        else {
            return None;
        };
        if returned != name || name == "this" || method.labels_at(index + 1).next().is_some() {
            return None;
        }
        let uses = method
            .instructions
            .iter()
            .flat_map(Instruction::elements)
            .filter(|element| element.name() == Some(name.as_str()))
            .count();
        (uses == 2).then_some((rhs.as_ref(), ty))
    }

    /// Emitted body and the maximum stack depth it needs.
    pub(super) fn finish(self) -> (String, usize) {
        (self.body, self.max_stack)
    }

    // ========================================================================
    // Buffer and stack
    // ========================================================================

    pub(super) fn emit(&mut self, line: impl AsRef<str>) {
        writeln!(self.body, "\t{}", line.as_ref()).unwrap();
    }

    pub(super) fn emit_label(&mut self, label: &str) {
        writeln!(self.body, "{}:", label).unwrap();
    }

    pub(super) fn push(&mut self, n: usize) {
        self.stack += n;
        self.max_stack = self.max_stack.max(self.stack);
    }

    pub(super) fn pop(&mut self, n: usize) {
        self.stack = self.stack.saturating_sub(n);
    }

    /// Fresh number for a group of generated labels.
    pub(super) fn next_label(&mut self) -> usize {
        let n = self.label_index;
        self.label_index += 1;
        n
    }

    /// Run `f` with `enclosing` on the context stack.
    pub(super) fn enclosed<T>(
        &mut self,
        enclosing: Enclosing,
        f: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        self.enclosing.push(enclosing);
        let result = f(self);
        self.enclosing.pop();
        result
    }

    pub(super) fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::ir_structure(&self.method.name, message)
    }

    fn register(&self, name: &str) -> CompileResult<&'u Descriptor> {
        let method: &'u Method = self.method;
        method
            .descriptor(name)
            .ok_or_else(|| self.error(format!("no register for '{}'", name)))
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Push the value of an element.
    pub(super) fn load_element(&mut self, element: &Element) -> CompileResult<()> {
        match element {
            Element::Literal { value, ty } if *ty == ElementType::String => {
                self.emit(format!("ldc \"{}\"", value));
                self.push(1);
            }
            Element::Literal { value, .. } => {
                let value = element
                    .int_value()
                    .ok_or_else(|| self.error(format!("invalid literal '{}'", value)))?;
                self.emit(int_constant(value));
                self.push(1);
            }
            Element::Operand { ty: ElementType::Class(_), .. } => {}
            Element::Operand { name, ty } if *ty == ElementType::This || name == "this" => {
                self.emit("aload_0");
                self.push(1);
            }
            Element::Operand { name, ty } => {
                let register = self.register(name)?.register;
                self.emit(load_instruction(ty, register));
                self.push(1);
            }
            Element::ArrayOperand { name, indices, ty } => {
                let register = self.register(name)?.register;
                self.emit(load_instruction(&ElementType::array_of(ty.clone()), register));
                self.push(1);
                for index in indices {
                    self.load_element(index)?;
                }
                self.emit(array_load_instruction(ty));
                self.pop(indices.len());
            }
        }
        Ok(())
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    fn generate_instruction(&mut self, instruction: &Instruction) -> CompileResult<()> {
        self.stack = 0;
        match instruction {
            Instruction::Assign { dest, rhs, .. } => self.generate_assign(dest, rhs),
            Instruction::Call(call) => self.generate_call(call),
            Instruction::Goto(label) => {
                self.emit(format!("goto {}", label));
                Ok(())
            }
            Instruction::Branch { condition, label } => {
                self.enclosed(Enclosing::Branch, |ctx| ctx.generate_branch(condition, label))
            }
            Instruction::Return { ty, value } => {
                if let Some(value) = value {
                    self.enclosed(Enclosing::Return, |ctx| ctx.load_element(value))?;
                }
                self.emit(return_instruction(ty));
                self.pop(1);
                Ok(())
            }
            Instruction::PutField {
                object,
                field,
                value,
            } => self.enclosed(Enclosing::Field, |ctx| {
                ctx.load_element(object)?;
                ctx.load_element(value)?;
                let operand = ctx.field_operand(object, field)?;
                ctx.emit(format!("putfield {}", operand));
                ctx.pop(2);
                Ok(())
            }),
            Instruction::GetField { .. }
            | Instruction::UnaryOp { .. }
            | Instruction::BinaryOp { .. }
            | Instruction::NoOp(_) => {
                self.enclosed(Enclosing::Discard, |ctx| ctx.generate_value(instruction))?;
                self.emit("pop");
                self.pop(1);
                Ok(())
            }
        }
    }

    fn generate_assign(&mut self, dest: &Element, rhs: &Instruction) -> CompileResult<()> {
        match dest {
            Element::ArrayOperand { name, indices, ty } => {
                let register = self.register(name)?.register;
                self.emit(load_instruction(&ElementType::array_of(ty.clone()), register));
                self.push(1);
                self.enclosed(Enclosing::Assign, |ctx| {
                    for index in indices {
                        ctx.load_element(index)?;
                    }
                    ctx.generate_value(rhs)
                })?;
                self.emit(array_store_instruction(ty));
                self.pop(2 + indices.len());
                Ok(())
            }
            Element::Operand { name, .. } => {
                let descriptor = self.register(name)?;
                if let Some(k) = increment_of(dest, rhs) {
                    if k == 0 {
                        return Ok(());
                    }
                    if (-127..=127).contains(&k) {
                        self.emit(format!("iinc {} {}", descriptor.register, k));
                        return Ok(());
                    }
                    if (-32767..=32767).contains(&k) {
                        self.emit(format!("iinc_w {} {}", descriptor.register, k));
                        return Ok(());
                    }
                }
                self.enclosed(Enclosing::Assign, |ctx| ctx.generate_value(rhs))?;
                self.emit(store_instruction(&descriptor.ty, descriptor.register));
                self.pop(1);
                Ok(())
            }
            Element::Literal { value, .. } => {
                Err(self.error(format!("cannot assign to literal '{}'", value)))
            }
        }
    }

    /// Push the value computed by a right-hand side.
    pub(super) fn generate_value(&mut self, instruction: &Instruction) -> CompileResult<()> {
        match instruction {
            Instruction::NoOp(element) => self.load_element(element),
            Instruction::Call(call) => self.generate_call(call),
            Instruction::GetField { object, field } => {
                self.load_element(object)?;
                let operand = self.field_operand(object, field)?;
                self.emit(format!("getfield {}", operand));
                Ok(())
            }
            Instruction::UnaryOp {
                op: OpType::NotB,
                operand,
            } => self.generate_not(operand),
            Instruction::BinaryOp {
                op, left, right, ..
            } => self.generate_binary(*op, left, right),
            other => Err(self.error(format!("'{}' does not produce a value", other))),
        }
    }

    fn generate_binary(&mut self, op: OpType, left: &Element, right: &Element) -> CompileResult<()> {
        if let Some(name) = arithmetic_instruction(op) {
            if let (Some(a), Some(b)) = (left.int_value(), right.int_value()) {
                if let Some(value) = fold(op, a, b) {
                    self.emit(int_constant(value));
                    self.push(1);
                    return Ok(());
                }
            }
            self.load_element(left)?;
            self.load_element(right)?;
            self.emit(name);
            self.pop(1);
            return Ok(());
        }
        match op {
            OpType::AndB | OpType::OrB => self.generate_logical(op, left, right),
            op if op.is_comparison() => self.generate_comparison(op, left, right),
            op => Err(self.error(format!("'{}' is not a binary operator", op))),
        }
    }

    fn field_operand(&self, object: &Element, field: &Element) -> CompileResult<String> {
        let name = field
            .name()
            .ok_or_else(|| self.error("field access without a field name"))?;
        Ok(format!(
            "{}/{} {}",
            owner_name(object.ty(), self.unit),
            name,
            type_descriptor(field.ty(), self.unit)
        ))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn generate_call(&mut self, call: &CallInstruction) -> CompileResult<()> {
        let at_statement = self.enclosing.is_empty();
        self.enclosed(Enclosing::Call, |ctx| match call.kind {
            CallKind::New => ctx.generate_new(call),
            CallKind::ArrayLength => {
                ctx.load_element(&call.receiver)?;
                ctx.emit("arraylength");
                Ok(())
            }
            CallKind::Ldc => ctx.load_element(&call.receiver),
            CallKind::Virtual | CallKind::Interface | CallKind::Static | CallKind::Special => {
                ctx.generate_invoke(call)
            }
        })?;

        if at_statement && !call.return_type.is_void() {
            self.emit("pop");
            self.pop(1);
        }
        Ok(())
    }

    fn generate_new(&mut self, call: &CallInstruction) -> CompileResult<()> {
        if call.return_type.is_array() {
            for arg in &call.args {
                self.load_element(arg)?;
            }
            self.emit("newarray int");
            self.pop(call.args.len());
            self.push(1);
            return Ok(());
        }
        let class = match &call.receiver {
            Element::Operand {
                ty: ElementType::Class(name),
                ..
            } => self.unit.qualified_name(name),
            other => owner_name(other.ty(), self.unit),
        };
        self.emit(format!("new {}", class));
        self.emit("dup");
        self.push(2);
        Ok(())
    }

    fn generate_invoke(&mut self, call: &CallInstruction) -> CompileResult<()> {
        let loads_receiver = matches!(call.kind, CallKind::Virtual | CallKind::Interface);
        if loads_receiver {
            self.load_element(&call.receiver)?;
        }
        for arg in &call.args {
            self.load_element(arg)?;
        }

        let method = call
            .method
            .as_deref()
            .ok_or_else(|| self.error(format!("{} without a method name", call.kind.keyword())))?;
        let descriptor = method_descriptor(
            call.args.iter().map(Element::ty),
            &call.return_type,
            self.unit,
        );
        let owner = owner_name(call.receiver.ty(), self.unit);
        let mut line = format!("{} {}/{}{}", call.kind.keyword(), owner, method, descriptor);
        if call.kind == CallKind::Interface {
            write!(line, " {}", call.args.len() + 1).unwrap();
        }
        self.emit(line);

        // The receiver of invokespecial was left on the stack by `new`/`dup`
        let receiver = usize::from(call.kind != CallKind::Static);
        self.pop(call.args.len() + receiver);
        if !call.return_type.is_void() {
            self.push(1);
        }
        Ok(())
    }
}

/// Constant `k` of `x := x + k` or `x := x - k` over an int local `x`.
fn increment_of(dest: &Element, rhs: &Instruction) -> Option<i32> {
    let Element::Operand {
        name,
        ty: ElementType::Int32,
    } = dest
    else {
        return None;
    };
    let Instruction::BinaryOp {
        op, left, right, ..
    } = rhs
    else {
        return None;
    };
    let (var, k) = match (left.int_value(), right.int_value()) {
        (None, Some(k)) => (left, k),
        (Some(k), None) if *op == OpType::Add => (right, k),
        _ => return None,
    };
    if !matches!(var, Element::Operand { name: n, .. } if n == name) {
        return None;
    }
    match op {
        OpType::Add => Some(k),
        OpType::Sub => k.checked_neg(),
        _ => None,
    }
}
