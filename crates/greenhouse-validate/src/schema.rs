//! Structural validation against the compiled grammar.
//!
//! Malformed input yields a single `SYNTAX_ERROR` without location. Input
//! that parses but does not conform yields one `SCHEMA_ERROR` per violation,
//! located by the line of the offending element.

use greenhouse_model::{Diagnostic, DiagnosticCode, Location};

use crate::grammar::{Content, ElementRule, Grammar, Particle, default_grammar};
use crate::xml::{XmlElement, parse_tree};

/// Validates raw bytes against a grammar.
///
/// Holds only a shared reference to an immutable grammar, so one validator
/// can be used from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'g> {
    grammar: &'g Grammar,
}

impl Default for SchemaValidator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator<'static> {
    /// Validator for the built-in greenhouse grammar.
    pub fn new() -> Self {
        Self {
            grammar: default_grammar(),
        }
    }
}

impl<'g> SchemaValidator<'g> {
    pub fn with_grammar(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Structural diagnostics for `bytes`; empty means valid.
    pub fn validate(&self, bytes: &[u8]) -> Vec<Diagnostic> {
        match self.parse(bytes) {
            Ok(_) => Vec::new(),
            Err(diagnostics) => diagnostics,
        }
    }

    /// Parse and validate, returning the element tree when it conforms.
    pub fn parse(&self, bytes: &[u8]) -> Result<XmlElement, Vec<Diagnostic>> {
        let root = parse_tree(bytes).map_err(|error| {
            tracing::debug!(line = error.line, "document is not well-formed");
            vec![Diagnostic::new(DiagnosticCode::SyntaxError, error.to_string())]
        })?;

        let mut diagnostics = Vec::new();
        let root_rule = self.grammar.root();
        if root.name == root_rule.name {
            self.check_element(root_rule, &root, &mut diagnostics);
        } else {
            diagnostics.push(schema_error(
                root.line,
                format!(
                    "root element is <{}>, expected <{}>",
                    root.name, root_rule.name
                ),
            ));
        }

        if diagnostics.is_empty() {
            Ok(root)
        } else {
            tracing::debug!(count = diagnostics.len(), "document does not conform");
            Err(diagnostics)
        }
    }

    fn check_element(&self, rule: &ElementRule, element: &XmlElement, out: &mut Vec<Diagnostic>) {
        for attribute in &rule.attributes {
            if attribute.required && element.attribute(&attribute.name).is_none() {
                out.push(schema_error(
                    element.line,
                    format!(
                        "element <{}> is missing required attribute '{}'",
                        element.name, attribute.name
                    ),
                ));
            }
        }
        for (key, _) in &element.attributes {
            if is_namespace_declaration(key) || rule.attribute(key).is_some() {
                continue;
            }
            out.push(schema_error(
                element.line,
                format!("attribute '{key}' is not allowed on <{}>", element.name),
            ));
        }

        match &rule.content {
            Content::Text => {
                if let Some(child) = element.children.first() {
                    out.push(schema_error(
                        child.line,
                        format!(
                            "element <{}> is not allowed inside text-only <{}>",
                            child.name, element.name
                        ),
                    ));
                }
            }
            Content::Empty => {
                if let Some(child) = element.children.first() {
                    out.push(schema_error(
                        child.line,
                        format!(
                            "element <{}> is not allowed inside empty <{}>",
                            child.name, element.name
                        ),
                    ));
                } else if element.has_text() {
                    out.push(schema_error(
                        element.line,
                        format!("element <{}> must be empty", element.name),
                    ));
                }
            }
            Content::Sequence(particles) => {
                if element.has_text() {
                    out.push(schema_error(
                        element.line,
                        format!(
                            "element <{}> must not contain character data",
                            element.name
                        ),
                    ));
                }
                self.check_sequence(particles, element, out);
            }
        }
    }

    /// Match children against a sequence, reporting at most one content
    /// model violation for this parent.
    fn check_sequence(&self, particles: &[Particle], element: &XmlElement, out: &mut Vec<Diagnostic>) {
        let children = &element.children;
        let mut next = 0;
        let mut counts = vec![0u32; particles.len()];

        for (position, particle) in particles.iter().enumerate() {
            let rule = self.grammar.rule(particle.element);
            while next < children.len()
                && children[next].name == rule.name
                && particle.accepts_more(counts[position])
            {
                self.check_element(rule, &children[next], out);
                counts[position] += 1;
                next += 1;
            }
            if counts[position] < particle.min {
                let expected = self.expected_names(particles, &counts, position);
                match children.get(next) {
                    Some(child) => out.push(unexpected_child(child, element, &expected)),
                    None => out.push(schema_error(
                        element.line,
                        format!(
                            "element <{}> is missing required child <{}>",
                            element.name, rule.name
                        ),
                    )),
                }
                return;
            }
        }

        if let Some(child) = children.get(next) {
            let expected = self.expected_names(particles, &counts, particles.len());
            out.push(unexpected_child(child, element, &expected));
        }
    }

    /// Names that could legally appear next: still-open particles from the
    /// last consumed one up to and including the first required one.
    fn expected_names(&self, particles: &[Particle], counts: &[u32], upto: usize) -> Vec<&'g str> {
        let start = counts[..upto.min(counts.len())]
            .iter()
            .rposition(|&count| count > 0)
            .unwrap_or(0);
        let mut names = Vec::new();
        for (position, particle) in particles.iter().enumerate().skip(start) {
            if !particle.accepts_more(counts[position]) {
                continue;
            }
            names.push(self.grammar.rule(particle.element).name.as_str());
            if particle.is_required() && counts[position] < particle.min {
                break;
            }
        }
        names
    }
}

fn unexpected_child(child: &XmlElement, parent: &XmlElement, expected: &[&str]) -> Diagnostic {
    let message = if expected.is_empty() {
        format!(
            "element <{}> is not expected in <{}>; no further elements are allowed",
            child.name, parent.name
        )
    } else {
        format!(
            "element <{}> is not expected in <{}>; expected one of: {}",
            child.name,
            parent.name,
            expected.join(", ")
        )
    };
    schema_error(child.line, message)
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

fn schema_error(line: usize, message: String) -> Diagnostic {
    Diagnostic::new(DiagnosticCode::SchemaError, message).at(Location::line(line))
}
