//! Intermediate Representation
//!
//! The three-address IR between the lowering pass and the assembler
//! emitter. The lowering pass writes IR *text*; [`parse`] reads it back
//! into a [`ClassUnit`], and the [`passes`] annotate it with labels,
//! successors and registers.
//!
//! # Pipeline
//!
//! ```text
//! IR text → parse → ClassUnit → passes::prepare → codegen
//! ```

pub mod instr;
pub mod method;
pub mod module;
pub mod parse;
pub mod passes;
pub mod pretty;
pub mod types;
pub mod value;

pub use instr::{CallInstruction, CallKind, Instruction, OpType};
pub use method::{AccessModifier, Descriptor, Method};
pub use module::{ClassUnit, Field};
pub use parse::parse;
pub use passes::{build_cfgs, build_var_tables, check_method_labels, prepare};
pub use pretty::PrettyPrint;
pub use types::ElementType;
pub use value::Element;
