//! IR methods

use super::instr::Instruction;
use super::types::ElementType;
use super::value::Element;
use rustc_hash::FxHashMap;

/// Access modifier of a class, field or method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessModifier {
    #[default]
    Public,
    Private,
    Protected,
    /// No modifier written
    Default,
}

impl AccessModifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(AccessModifier::Public),
            "private" => Some(AccessModifier::Private),
            "protected" => Some(AccessModifier::Protected),
            _ => None,
        }
    }

    /// Keyword as written in assembly, empty for the default access.
    pub fn keyword(&self) -> &'static str {
        match self {
            AccessModifier::Public => "public",
            AccessModifier::Private => "private",
            AccessModifier::Protected => "protected",
            AccessModifier::Default => "",
        }
    }
}

/// Virtual register assigned to a local name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub register: u16,
    pub ty: ElementType,
}

/// A method of a [`ClassUnit`](super::ClassUnit)
#[derive(Debug, Clone)]
pub struct Method {
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_final: bool,
    pub is_constructor: bool,
    pub name: String,
    pub params: Vec<Element>,
    pub return_type: ElementType,
    pub instructions: Vec<Instruction>,
    /// Label definitions in order, each with the index of the instruction
    /// it precedes. An index equal to `instructions.len()` marks a label at
    /// the end of the body.
    pub labels: Vec<(String, usize)>,
    /// Filled by `build_var_tables`
    pub var_table: FxHashMap<String, Descriptor>,
    /// Filled by `build_cfgs`: successor instruction indices per instruction
    pub successors: Vec<Vec<usize>>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: ElementType) -> Self {
        Method {
            access: AccessModifier::Public,
            is_static: false,
            is_final: false,
            is_constructor: false,
            name: name.into(),
            params: Vec::new(),
            return_type,
            instructions: Vec::new(),
            labels: Vec::new(),
            var_table: FxHashMap::default(),
            successors: Vec::new(),
        }
    }

    /// Define `label` before the next instruction pushed.
    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.push((label.into(), self.instructions.len()));
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Labels defined right before instruction `index`.
    pub fn labels_at(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.labels
            .iter()
            .filter(move |(_, at)| *at == index)
            .map(|(label, _)| label.as_str())
    }

    /// Instruction index a label points at.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, at)| *at)
    }

    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.var_table.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_attach_to_next_instruction() {
        let mut method = Method::new("m", ElementType::Void);
        method.add_label("A");
        method.push(Instruction::Goto("B".into()));
        method.add_label("B");
        method.add_label("C");

        assert_eq!(method.labels_at(0).collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(method.labels_at(1).collect::<Vec<_>>(), vec!["B", "C"]);
        assert_eq!(method.label_index("C"), Some(1));
        assert_eq!(method.label_index("D"), None);
    }
}
