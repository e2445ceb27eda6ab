//! Per-record output templates.
//!
//! A template is plain text with the substitution points `$data`, `$id` and `$file_number`.
//! A placeholder name runs to the first character that is not alphanumeric or `_`, so `$idx` is
//! not `$id`. `$$` writes a literal `$`; any other `$` is kept as-is. Substitution happens in one
//! pass, so substituted values are never re-scanned.

use std::path::Path;

use crate::error::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Data,
    Id,
    FileNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed template. Always contains at least one `$data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            segments: vec![Segment::Field(Field::Data)],
        }
    }
}

impl Template {
    /// Parses template text. `origin` names the template in errors.
    pub fn parse(text: &str, origin: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(position) = rest.find('$') {
            literal.push_str(&rest[..position]);
            let after = &rest[position + 1..];
            if let Some(tail) = after.strip_prefix('$') {
                literal.push('$');
                rest = tail;
                continue;
            }
            let name_len = after
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                .unwrap_or(after.len());
            let field = match &after[..name_len] {
                "data" => Field::Data,
                "id" => Field::Id,
                "file_number" => Field::FileNumber,
                _ => {
                    literal.push('$');
                    rest = after;
                    continue;
                }
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(field));
            rest = &after[name_len..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !segments.contains(&Segment::Field(Field::Data)) {
            return Err(TemplateError::MissingData {
                origin: origin.to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Reads and parses a template file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|e| TemplateError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Substitutes the record's values.
    pub fn render(&self, data: &str, id: &str, file_number: &str) -> String {
        let mut out = String::with_capacity(data.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Data) => out.push_str(data),
                Segment::Field(Field::Id) => out.push_str(id),
                Segment::Field(Field::FileNumber) => out.push_str(file_number),
            }
        }
        out
    }
}
