//! Document grammar: a tiny element-content definition language and its
//! compiled form.
//!
//! A definition has one rule per line:
//!
//! ```text
//! # comment
//! sensor @id @label? := kind
//! kind := text
//! reading := timestamp? sensorRef? value?
//! sensorRef @ref := empty
//! ```
//!
//! The first rule names the root element. Content is `text`, `empty`, or a
//! sequence of child particles, each optionally suffixed with `?`, `*` or
//! `+`. Attributes are listed before `:=`; a trailing `?` makes them
//! optional.

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

/// Built-in grammar for greenhouse telemetry documents.
pub const GREENHOUSE_GRAMMAR: &str = "\
# root record
greenhouse := name place sensors readings
name := text
place := text

sensors := sensor*
sensor @id := kind
kind := text

readings := reading*
reading := timestamp? sensorRef? value?
timestamp := text
sensorRef @ref := empty
value := text
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar has no rules")]
    Empty,
    #[error("line {line}: expected '<element> [@attr...] := <content>'")]
    MalformedRule { line: usize },
    #[error("line {line}: invalid name '{name}'")]
    InvalidName { line: usize, name: String },
    #[error("line {line}: element '{name}' is defined twice")]
    DuplicateRule { line: usize, name: String },
    #[error("element '{name}' is referenced but never defined")]
    UndefinedElement { name: String },
}

/// Declared attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRule {
    pub name: String,
    pub required: bool,
}

/// One child position in a sequence content model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Particle {
    /// Index of the element rule in the grammar.
    pub element: usize,
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl Particle {
    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    pub fn accepts_more(&self, count: u32) -> bool {
        self.max.is_none_or(|max| count < max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Character data only.
    Text,
    /// Neither character data nor child elements.
    Empty,
    /// Child elements in the given order; whitespace-only text allowed.
    Sequence(Vec<Particle>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRule {
    pub name: String,
    pub attributes: Vec<AttributeRule>,
    pub content: Content,
}

impl ElementRule {
    pub fn attribute(&self, name: &str) -> Option<&AttributeRule> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// Compiled, immutable grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<ElementRule>,
    root: usize,
}

impl Grammar {
    /// Compile a grammar definition.
    pub fn compile(definition: &str) -> Result<Self, GrammarError> {
        let mut parsed = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (offset, raw) in definition.lines().enumerate() {
            let line = offset + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            let rule = parse_rule(text, line)?;
            if index.contains_key(&rule.name) {
                return Err(GrammarError::DuplicateRule {
                    line,
                    name: rule.name,
                });
            }
            index.insert(rule.name.clone(), parsed.len());
            parsed.push(rule);
        }
        if parsed.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut rules = Vec::with_capacity(parsed.len());
        for rule in parsed {
            let content = match rule.content {
                RawContent::Text => Content::Text,
                RawContent::Empty => Content::Empty,
                RawContent::Sequence(items) => {
                    let mut particles = Vec::with_capacity(items.len());
                    for (name, min, max) in items {
                        let element = *index
                            .get(&name)
                            .ok_or(GrammarError::UndefinedElement { name })?;
                        particles.push(Particle { element, min, max });
                    }
                    Content::Sequence(particles)
                }
            };
            rules.push(ElementRule {
                name: rule.name,
                attributes: rule.attributes,
                content,
            });
        }
        Ok(Self { rules, root: 0 })
    }

    pub fn root(&self) -> &ElementRule {
        &self.rules[self.root]
    }

    /// Rule for a particle's element index.
    pub fn rule(&self, index: usize) -> &ElementRule {
        &self.rules[index]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

static DEFAULT_GRAMMAR: OnceLock<Grammar> = OnceLock::new();

/// The built-in greenhouse grammar, compiled on first access.
pub fn default_grammar() -> &'static Grammar {
    DEFAULT_GRAMMAR.get_or_init(|| {
        Grammar::compile(GREENHOUSE_GRAMMAR).expect("built-in greenhouse grammar must compile")
    })
}

struct RawRule {
    name: String,
    attributes: Vec<AttributeRule>,
    content: RawContent,
}

enum RawContent {
    Text,
    Empty,
    Sequence(Vec<(String, u32, Option<u32>)>),
}

fn parse_rule(text: &str, line: usize) -> Result<RawRule, GrammarError> {
    let (head, body) = text
        .split_once(":=")
        .ok_or(GrammarError::MalformedRule { line })?;
    let mut head_tokens = head.split_whitespace();
    let name = head_tokens
        .next()
        .ok_or(GrammarError::MalformedRule { line })?;
    let name = checked_name(name, line)?;

    let mut attributes = Vec::new();
    for token in head_tokens {
        let attr = token
            .strip_prefix('@')
            .ok_or(GrammarError::MalformedRule { line })?;
        let (attr, required) = match attr.strip_suffix('?') {
            Some(optional) => (optional, false),
            None => (attr, true),
        };
        attributes.push(AttributeRule {
            name: checked_name(attr, line)?,
            required,
        });
    }

    let content = match body.trim() {
        "text" => RawContent::Text,
        "empty" => RawContent::Empty,
        "" => return Err(GrammarError::MalformedRule { line }),
        items => {
            let mut particles = Vec::new();
            for token in items.split_whitespace() {
                let (child, min, max) = match token.as_bytes().last() {
                    Some(b'?') => (&token[..token.len() - 1], 0, Some(1)),
                    Some(b'*') => (&token[..token.len() - 1], 0, None),
                    Some(b'+') => (&token[..token.len() - 1], 1, None),
                    _ => (token, 1, Some(1)),
                };
                particles.push((checked_name(child, line)?, min, max));
            }
            RawContent::Sequence(particles)
        }
    };

    Ok(RawRule {
        name,
        attributes,
        content,
    })
}

fn checked_name(name: &str, line: usize) -> Result<String, GrammarError> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(name.to_string())
    } else {
        Err(GrammarError::InvalidName {
            line,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_grammar_compiles() {
        let grammar = default_grammar();
        assert_eq!(grammar.root().name, "greenhouse");
        assert_eq!(grammar.len(), 11);
    }

    #[test]
    fn reading_fields_are_optional_sequence() {
        let grammar = Grammar::compile(GREENHOUSE_GRAMMAR).unwrap();
        let position = grammar.rules.iter().position(|r| r.name == "reading").unwrap();
        let Content::Sequence(particles) = &grammar.rule(position).content else {
            panic!("reading should have element content");
        };
        let names: Vec<&str> = particles
            .iter()
            .map(|p| grammar.rule(p.element).name.as_str())
            .collect();
        assert_eq!(names, ["timestamp", "sensorRef", "value"]);
        assert!(particles.iter().all(|p| !p.is_required()));
    }

    #[test]
    fn attribute_suffix_marks_optional() {
        let grammar = Grammar::compile("a @x @y? := empty").unwrap();
        let attrs = &grammar.root().attributes;
        assert!(attrs[0].required);
        assert!(!attrs[1].required);
    }

    #[test]
    fn occurrence_suffixes() {
        let grammar = Grammar::compile("a := b? c* d+ e\nb := text\nc := text\nd := text\ne := text")
            .unwrap();
        let Content::Sequence(particles) = &grammar.root().content else {
            panic!("sequence expected");
        };
        let bounds: Vec<(u32, Option<u32>)> = particles.iter().map(|p| (p.min, p.max)).collect();
        assert_eq!(bounds, [(0, Some(1)), (0, None), (1, None), (1, Some(1))]);
    }

    #[test]
    fn compile_errors() {
        assert_eq!(Grammar::compile("# nothing\n"), Err(GrammarError::Empty));
        assert_eq!(
            Grammar::compile("a b"),
            Err(GrammarError::MalformedRule { line: 1 })
        );
        assert_eq!(
            Grammar::compile("a := b"),
            Err(GrammarError::UndefinedElement {
                name: "b".to_string()
            })
        );
        assert_eq!(
            Grammar::compile("a := text\na := empty"),
            Err(GrammarError::DuplicateRule {
                line: 2,
                name: "a".to_string()
            })
        );
        assert!(matches!(
            Grammar::compile("1a := text"),
            Err(GrammarError::InvalidName { line: 1, .. })
        ));
    }
}
