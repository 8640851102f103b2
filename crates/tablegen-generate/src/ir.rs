use std::collections::BTreeMap;
use std::fmt::Write;

use tablegen_core::GENERATOR_NAME;

/// Named regions of a generated file. Declaration order is file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    MapTypes,
    Storage,
    LoadAll,
    Loaders,
    GetKey,
    Accessors,
    GetAll,
    SliceTypes,
    SliceStorage,
    AfterLoad,
}

impl SectionKind {
    fn title(self) -> &'static str {
        match self {
            SectionKind::MapTypes => "map types",
            SectionKind::Storage => "storage",
            SectionKind::LoadAll => "load all",
            SectionKind::Loaders => "loaders",
            SectionKind::GetKey => "keys",
            SectionKind::Accessors => "accessors",
            SectionKind::GetAll => "snapshots",
            SectionKind::SliceTypes => "slice types",
            SectionKind::SliceStorage => "slice storage",
            SectionKind::AfterLoad => "after load",
        }
    }
}

/// Ordered fragments of one section. Each fragment is complete Rust text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    fragments: Vec<String>,
}

impl Section {
    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One generated file under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    description: String,
    imports: Vec<String>,
    sections: BTreeMap<SectionKind, Section>,
}

impl Artifact {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            imports: Vec::new(),
            sections: BTreeMap::new(),
        }
    }

    /// Add a `use` line. Blank strings separate import groups.
    pub fn import(&mut self, line: impl Into<String>) {
        self.imports.push(line.into());
    }

    pub fn push(&mut self, kind: SectionKind, fragment: impl Into<String>) {
        self.sections.entry(kind).or_default().push(fragment);
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.get(&kind)
    }

    /// Render the header followed by every non-empty section in order.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut output = String::new();
        writeln!(output, "// Code generated by {GENERATOR_NAME}. DO NOT EDIT.")?;
        writeln!(output, "// {}", self.description)?;
        writeln!(output)?;
        writeln!(
            output,
            "#![allow(dead_code, unused_imports, clippy::all)]"
        )?;
        writeln!(output)?;

        for line in &self.imports {
            if line.is_empty() {
                writeln!(output)?;
            } else {
                writeln!(output, "{line}")?;
            }
        }

        for (kind, section) in &self.sections {
            if section.is_empty() {
                continue;
            }
            writeln!(output)?;
            writeln!(output, "// ---- {} ----", kind.title())?;
            for fragment in section.fragments() {
                writeln!(output)?;
                output.push_str(fragment.trim_end());
                output.push('\n');
            }
        }

        Ok(output)
    }
}
