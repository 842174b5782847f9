//! IR Instructions
//!
//! Three-address instructions of a method body. Operands are always
//! [`Element`]s; only `Assign` and `Branch` nest another instruction.

use super::types::ElementType;
use super::value::Element;
use std::fmt;

/// Operation of a unary or binary instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Lth,
    Gth,
    Lte,
    Gte,
    Eq,
    Neq,
    /// Logical and (`&&`)
    AndB,
    /// Logical or (`||`)
    OrB,
    /// Logical not (`!`), unary only
    NotB,
}

impl OpType {
    /// Operator written in IR text.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => OpType::Add,
            "-" => OpType::Sub,
            "*" => OpType::Mul,
            "/" => OpType::Div,
            "%" => OpType::Rem,
            "&" => OpType::And,
            "|" => OpType::Or,
            "^" => OpType::Xor,
            "<" => OpType::Lth,
            ">" => OpType::Gth,
            "<=" => OpType::Lte,
            ">=" => OpType::Gte,
            "==" => OpType::Eq,
            "!=" => OpType::Neq,
            "&&" => OpType::AndB,
            "||" => OpType::OrB,
            "!" => OpType::NotB,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            OpType::Add => "+",
            OpType::Sub => "-",
            OpType::Mul => "*",
            OpType::Div => "/",
            OpType::Rem => "%",
            OpType::And => "&",
            OpType::Or => "|",
            OpType::Xor => "^",
            OpType::Lth => "<",
            OpType::Gth => ">",
            OpType::Lte => "<=",
            OpType::Gte => ">=",
            OpType::Eq => "==",
            OpType::Neq => "!=",
            OpType::AndB => "&&",
            OpType::OrB => "||",
            OpType::NotB => "!",
        }
    }

    /// Check if this is an integer arithmetic or bitwise operator
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            OpType::Add
                | OpType::Sub
                | OpType::Mul
                | OpType::Div
                | OpType::Rem
                | OpType::And
                | OpType::Or
                | OpType::Xor
        )
    }

    /// Check if this is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OpType::Lth | OpType::Gth | OpType::Lte | OpType::Gte | OpType::Eq | OpType::Neq
        )
    }

    /// Check if this is a logical operator
    pub fn is_logical(&self) -> bool {
        matches!(self, OpType::AndB | OpType::OrB | OpType::NotB)
    }

    /// The comparison that holds exactly when `self` does not.
    pub fn negate(&self) -> Option<Self> {
        let op = match self {
            OpType::Lth => OpType::Gte,
            OpType::Gte => OpType::Lth,
            OpType::Gth => OpType::Lte,
            OpType::Lte => OpType::Gth,
            OpType::Eq => OpType::Neq,
            OpType::Neq => OpType::Eq,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Invocation kind of a call instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Virtual,
    Interface,
    Special,
    Static,
    New,
    ArrayLength,
    Ldc,
}

impl CallKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "invokevirtual" => CallKind::Virtual,
            "invokeinterface" => CallKind::Interface,
            "invokespecial" => CallKind::Special,
            "invokestatic" => CallKind::Static,
            "new" => CallKind::New,
            "arraylength" => CallKind::ArrayLength,
            "ldc" => CallKind::Ldc,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            CallKind::Virtual => "invokevirtual",
            CallKind::Interface => "invokeinterface",
            CallKind::Special => "invokespecial",
            CallKind::Static => "invokestatic",
            CallKind::New => "new",
            CallKind::ArrayLength => "arraylength",
            CallKind::Ldc => "ldc",
        }
    }

    /// Method invocations, as opposed to the allocation and constant forms.
    pub fn is_invoke(&self) -> bool {
        matches!(
            self,
            CallKind::Virtual | CallKind::Interface | CallKind::Special | CallKind::Static
        )
    }
}

/// `kind(receiver, "method", args...).ret`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInstruction {
    pub kind: CallKind,
    /// Receiver, static owner, allocated class, array or constant
    pub receiver: Element,
    /// Invoked method name; `None` for `new`, `arraylength` and `ldc`
    pub method: Option<String>,
    pub args: Vec<Element>,
    pub return_type: ElementType,
}

/// IR instruction (three-address code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `dest :=.ty rhs`
    Assign {
        dest: Element,
        ty: ElementType,
        rhs: Box<Instruction>,
    },
    Call(CallInstruction),
    Goto(String),
    /// `if (condition) goto label`
    Branch {
        condition: Box<Instruction>,
        label: String,
    },
    Return {
        ty: ElementType,
        value: Option<Element>,
    },
    PutField {
        object: Element,
        field: Element,
        value: Element,
    },
    GetField {
        object: Element,
        field: Element,
    },
    UnaryOp {
        op: OpType,
        operand: Element,
    },
    BinaryOp {
        op: OpType,
        left: Element,
        right: Element,
        ty: ElementType,
    },
    /// A single operand used as a value
    NoOp(Element),
}

impl Instruction {
    /// Jump target, for `goto` and conditional branches.
    pub fn target(&self) -> Option<&str> {
        match self {
            Instruction::Goto(label) | Instruction::Branch { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Control never falls through to the next instruction.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Goto(_) | Instruction::Return { .. })
    }

    /// Every element read or written by this instruction, in textual order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a Element>) {
        match self {
            Instruction::Assign { dest, rhs, .. } => {
                push_element(dest, out);
                rhs.collect_elements(out);
            }
            Instruction::Call(call) => {
                push_element(&call.receiver, out);
                for arg in &call.args {
                    push_element(arg, out);
                }
            }
            Instruction::Branch { condition, .. } => condition.collect_elements(out),
            Instruction::Return { value, .. } => {
                if let Some(value) = value {
                    push_element(value, out);
                }
            }
            Instruction::PutField { object, value, .. } => {
                push_element(object, out);
                push_element(value, out);
            }
            Instruction::GetField { object, .. } => push_element(object, out),
            Instruction::UnaryOp { operand, .. } => push_element(operand, out),
            Instruction::BinaryOp { left, right, .. } => {
                push_element(left, out);
                push_element(right, out);
            }
            Instruction::NoOp(element) => push_element(element, out),
            Instruction::Goto(_) => {}
        }
    }
}

fn push_element<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    out.push(element);
    if let Element::ArrayOperand { indices, .. } = element {
        out.extend(indices.iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_symbols_round_trip() {
        for op in [OpType::Add, OpType::Lte, OpType::AndB, OpType::NotB, OpType::Xor] {
            assert_eq!(OpType::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(OpType::from_symbol("<<"), None);
    }

    #[test]
    fn test_negate() {
        assert_eq!(OpType::Lth.negate(), Some(OpType::Gte));
        assert_eq!(OpType::Gth.negate(), Some(OpType::Lte));
        assert_eq!(OpType::Eq.negate(), Some(OpType::Neq));
        assert_eq!(OpType::AndB.negate(), None);
    }

    #[test]
    fn test_classification() {
        assert!(OpType::Rem.is_arithmetic());
        assert!(OpType::Neq.is_comparison());
        assert!(OpType::OrB.is_logical());
        assert!(!OpType::Add.is_comparison());
    }

    #[test]
    fn test_elements_include_array_indices() {
        let instr = Instruction::Assign {
            dest: Element::ArrayOperand {
                name: "a".into(),
                indices: vec![Element::operand("i", ElementType::Int32)],
                ty: ElementType::Int32,
            },
            ty: ElementType::Int32,
            rhs: Box::new(Instruction::NoOp(Element::operand("v", ElementType::Int32))),
        };
        let names: Vec<_> = instr.elements().iter().filter_map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "i", "v"]);
    }
}
