//! String literal pool and the assembled program.

use std::fmt;

use rustc_hash::FxHashMap;
use wacc_parser::lexer::escape_value;

use super::instr::Instr;
use super::operand::Label;

/// A string literal in the data section.
///
/// `text` is kept exactly as it appears between the quotes, escapes
/// included, and `len` is the number of bytes it occupies once the
/// escapes are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringData {
    pub label: Label,
    pub text: String,
    pub len: u32,
}

/// Deduplicated string literals for one compilation, shared by user code
/// and runtime helpers.
#[derive(Debug, Default)]
pub struct DataPool {
    entries: Vec<StringData>,
    index: FxHashMap<String, usize>,
}

impl DataPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The label of `text`, adding it on first use.
    pub fn intern(&mut self, text: &str) -> Label {
        if let Some(&i) = self.index.get(text) {
            return self.entries[i].label.clone();
        }
        let label = Label::new(format!("msg_{}", self.entries.len()));
        self.index.insert(text.to_string(), self.entries.len());
        self.entries.push(StringData {
            label: label.clone(),
            text: text.to_string(),
            len: encoded_len(text),
        });
        label
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StringData> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<StringData> {
        self.entries
    }
}

/// Byte length of `text` once its escape sequences are decoded.
pub fn encoded_len(text: &str) -> u32 {
    let mut len = 0;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        let decoded = match c {
            '\\' => chars.next().map(|e| escape_value(e).unwrap_or(e)).unwrap_or('\\'),
            c => c,
        };
        len += decoded.len_utf8() as u32;
    }
    len
}

/// A complete ARM assembly program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmProgram {
    pub data: Vec<StringData>,
    pub text: Vec<Instr>,
}

impl ArmProgram {
    /// Number of text-section lines that are real instructions.
    pub fn instruction_count(&self) -> usize {
        self.text
            .iter()
            .filter(|i| !matches!(i, Instr::Label(_) | Instr::Ltorg))
            .count()
    }
}

impl fmt::Display for ArmProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.data.is_empty() {
            writeln!(f, ".data")?;
            writeln!(f)?;
            for data in &self.data {
                writeln!(f, "{}:", data.label)?;
                writeln!(f, "\t.word {}", data.len)?;
                writeln!(f, "\t.ascii \"{}\"", data.text)?;
            }
            writeln!(f)?;
        }

        writeln!(f, ".text")?;
        writeln!(f)?;
        writeln!(f, ".global main")?;
        for instr in &self.text {
            match instr {
                Instr::Label(_) => writeln!(f, "{instr}")?,
                _ => writeln!(f, "\t{instr}")?,
            }
        }
        Ok(())
    }
}
