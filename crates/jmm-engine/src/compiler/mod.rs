//! Java-- back end
//!
//! This module provides:
//! - **Lowering**: checked AST to IR text (`lower` module)
//! - **IR**: IR model, text parser and pre-passes (`ir` module)
//! - **Code generation**: IR to Jasmin assembly (`codegen` module)

pub mod codegen;
pub mod error;
pub mod ir;
pub mod lower;

pub use codegen::{generate, JasminGenerator};
pub use error::{CompileError, CompileResult};
pub use ir::ClassUnit;
pub use lower::{generate_ir, Lowerer};

/// Parse IR text, run the pre-passes and emit assembly.
pub fn assemble(ir_text: &str) -> CompileResult<String> {
    let unit = prepare_ir(ir_text)?;
    generate(&unit)
}

/// Parse IR text into a class unit ready for code generation.
pub fn prepare_ir(ir_text: &str) -> CompileResult<ClassUnit> {
    let mut unit = ir::parse(ir_text)?;
    ir::prepare(&mut unit)?;
    log::debug!(
        "prepared IR for '{}': {} method(s)",
        unit.name,
        unit.methods.len()
    );
    Ok(unit)
}
