//! Text templates for generated wrapper files.
//!
//! The syntax is a small subset of Go's `text/template`:
//!
//! - `{{ name }}` prints a scalar field
//! - `{{ range name }} ... {{ end }}` repeats its body for each list item
//! - `{{ . }}` prints the current item inside a range
//! - `{{-` and `-}}` trim the whitespace before and after an action
//!
//! Templates are parsed once into a node tree and rendered against any type
//! implementing [`Context`].

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Errors raised while parsing or rendering a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("{template}:{line}: unclosed action")]
    UnclosedAction { template: String, line: usize },

    #[error("{template}:{line}: unknown action {action:?}")]
    UnknownAction {
        template: String,
        line: usize,
        action: String,
    },

    #[error("{template}:{line}: {{{{ . }}}} outside of range")]
    DotOutsideRange { template: String, line: usize },

    #[error("{template}:{line}: unexpected end")]
    UnexpectedEnd { template: String, line: usize },

    #[error("{template}: range over {field:?} is never closed")]
    UnclosedRange { template: String, field: String },

    #[error("{template}: unknown field {field:?}")]
    UnknownField { template: String, field: String },

    #[error("{template}: cannot print list field {field:?}")]
    NotPrintable { template: String, field: String },

    #[error("{template}: cannot range over scalar field {field:?}")]
    NotIterable { template: String, field: String },
}

/// A field value exposed to templates.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Text(&'a str),
    List(&'a [String]),
}

/// Field lookup used while rendering.
pub trait Context {
    fn lookup(&self, name: &str) -> Option<Value<'_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Field(String),
    Dot,
    Range { field: String, body: Vec<Node> },
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

fn action_pattern() -> &'static Regex {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    ACTION.get_or_init(|| {
        Regex::new(r"\{\{(-)?\s*(.*?)\s*(-)?\}\}").expect("Invalid template action pattern")
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

impl Template {
    /// Parse template source.
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut nodes: Vec<Node> = Vec::new();
        // Enclosing ranges: (field, nodes collected before the range opened)
        let mut open: Vec<(String, Vec<Node>)> = Vec::new();
        let mut trim_next = false;
        let mut last = 0;

        for caps in action_pattern().captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            let line = line_of(source, whole.start());

            let mut text = Self::check_text(name, source, last, whole.start())?;
            if trim_next {
                text = text.trim_start();
            }
            if caps.get(1).is_some() {
                text = text.trim_end();
            }
            if !text.is_empty() {
                nodes.push(Node::Text(text.to_string()));
            }
            trim_next = caps.get(3).is_some();
            last = whole.end();

            let action = caps.get(2).map_or("", |m| m.as_str());
            let words: Vec<&str> = action.split_whitespace().collect();
            match words.as_slice() {
                ["range", field] if is_identifier(field) => {
                    open.push((field.to_string(), std::mem::take(&mut nodes)));
                }
                ["end"] => {
                    let Some((field, outer)) = open.pop() else {
                        return Err(TemplateError::UnexpectedEnd {
                            template: name.to_string(),
                            line,
                        });
                    };
                    let body = std::mem::replace(&mut nodes, outer);
                    nodes.push(Node::Range { field, body });
                }
                ["."] => {
                    if open.is_empty() {
                        return Err(TemplateError::DotOutsideRange {
                            template: name.to_string(),
                            line,
                        });
                    }
                    nodes.push(Node::Dot);
                }
                [field] if is_identifier(field) => nodes.push(Node::Field(field.to_string())),
                _ => {
                    return Err(TemplateError::UnknownAction {
                        template: name.to_string(),
                        line,
                        action: action.to_string(),
                    });
                }
            }
        }

        let mut tail = Self::check_text(name, source, last, source.len())?;
        if trim_next {
            tail = tail.trim_start();
        }
        if !tail.is_empty() {
            nodes.push(Node::Text(tail.to_string()));
        }

        if let Some((field, _)) = open.pop() {
            return Err(TemplateError::UnclosedRange {
                template: name.to_string(),
                field,
            });
        }

        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    /// Literal text between actions must not contain a dangling `{{`.
    fn check_text<'s>(
        name: &str,
        source: &'s str,
        start: usize,
        end: usize,
    ) -> Result<&'s str, TemplateError> {
        let text = &source[start..end];
        match text.find("{{") {
            Some(pos) => Err(TemplateError::UnclosedAction {
                template: name.to_string(),
                line: line_of(source, start + pos),
            }),
            None => Ok(text),
        }
    }

    /// Template name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template against a context.
    pub fn render<C: Context + ?Sized>(&self, ctx: &C) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.render_nodes(&self.nodes, ctx, None, &mut out)?;
        Ok(out)
    }

    fn render_nodes<C: Context + ?Sized>(
        &self,
        nodes: &[Node],
        ctx: &C,
        item: Option<&str>,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Dot => out.push_str(item.unwrap_or_default()),
                Node::Field(field) => match ctx.lookup(field) {
                    Some(Value::Text(text)) => out.push_str(text),
                    Some(Value::List(_)) => {
                        return Err(TemplateError::NotPrintable {
                            template: self.name.clone(),
                            field: field.clone(),
                        });
                    }
                    None => return Err(self.unknown_field(field)),
                },
                Node::Range { field, body } => match ctx.lookup(field) {
                    Some(Value::List(items)) => {
                        for entry in items {
                            self.render_nodes(body, ctx, Some(entry), out)?;
                        }
                    }
                    Some(Value::Text(_)) => {
                        return Err(TemplateError::NotIterable {
                            template: self.name.clone(),
                            field: field.clone(),
                        });
                    }
                    None => return Err(self.unknown_field(field)),
                },
            }
        }
        Ok(())
    }

    fn unknown_field(&self, field: &str) -> TemplateError {
        TemplateError::UnknownField {
            template: self.name.clone(),
            field: field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        title: String,
        items: Vec<String>,
    }

    impl Context for Fixture {
        fn lookup(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "title" => Some(Value::Text(&self.title)),
                "items" => Some(Value::List(&self.items)),
                _ => None,
            }
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            title: "demo".to_string(),
            items: vec!["a".to_string(), "b".to_string()],
        }
    }

    fn render(source: &str) -> Result<String, TemplateError> {
        Template::parse("test", source)?.render(&fixture())
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render("no actions here\n").unwrap(), "no actions here\n");
    }

    #[test]
    fn test_scalar_field() {
        assert_eq!(render("name={{ title }};").unwrap(), "name=demo;");
    }

    #[test]
    fn test_range_with_dot() {
        assert_eq!(
            render("{{ range items }}[{{ . }}]{{ end }}").unwrap(),
            "[a][b]"
        );
    }

    #[test]
    fn test_trim_markers() {
        let source = "list:\n{{- range items }}\n  - {{ . }}\n{{- end }}\ndone";
        assert_eq!(render(source).unwrap(), "list:\n  - a\n  - b\ndone");

        assert_eq!(render("x   {{- title -}}   y").unwrap(), "xdemoy");
    }

    #[test]
    fn test_empty_range_renders_nothing() {
        let empty = Fixture {
            title: String::new(),
            items: Vec::new(),
        };
        let template = Template::parse("test", "a{{ range items }}{{ . }}{{ end }}b").unwrap();
        assert_eq!(template.render(&empty).unwrap(), "ab");
    }

    #[test]
    fn test_unclosed_action() {
        let err = render("line one\n{{ title").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnclosedAction {
                template: "test".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_unknown_action() {
        let err = render("{{ if title }}").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownAction { action, .. } if action == "if title"));
    }

    #[test]
    fn test_dot_outside_range() {
        assert!(matches!(
            render("{{ . }}").unwrap_err(),
            TemplateError::DotOutsideRange { line: 1, .. }
        ));
    }

    #[test]
    fn test_unbalanced_range() {
        assert!(matches!(
            render("{{ end }}").unwrap_err(),
            TemplateError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            render("{{ range items }}{{ . }}").unwrap_err(),
            TemplateError::UnclosedRange { field, .. } if field == "items"
        ));
    }

    #[test]
    fn test_render_errors() {
        assert!(matches!(
            render("{{ missing }}").unwrap_err(),
            TemplateError::UnknownField { field, .. } if field == "missing"
        ));
        assert!(matches!(
            render("{{ items }}").unwrap_err(),
            TemplateError::NotPrintable { .. }
        ));
        assert!(matches!(
            render("{{ range title }}{{ . }}{{ end }}").unwrap_err(),
            TemplateError::NotIterable { .. }
        ));
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::DotOutsideRange {
            template: "go".to_string(),
            line: 3,
        };
        assert_eq!(err.to_string(), "go:3: {{ . }} outside of range");
    }
}
