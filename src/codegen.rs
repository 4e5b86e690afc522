//! Template-based code generation.
//!
//! Each variant is rendered by a [Template]: a format string whose `{name}`
//! placeholders reference the variant's declared fields. Rendering is
//! strictly bottom-up: node-valued fields are rendered to text first and
//! substituted into the parent's template; scalar fields go through a
//! caller-replaceable stringification hook. Template lookup follows the
//! ancestor-chain dispatch rule of [crate::visit], and a variant with no
//! applicable template is a hard error since rendering has no meaningful
//! default.
//!
//! The rendered text can optionally be handed to an external
//! [FormatService] for pretty-printing. The service is a black box and may
//! fail; failure degrades to the unformatted text instead of losing the
//! output.

use crate::error::IrError;
use crate::ir::FieldValue;
use crate::ir::Node;
use crate::ir::Scalar;
use crate::ir::Schema;
use crate::visit::Registry;
use std::sync::Arc;
use tracing::warn;

enum Segment {
    Text(String),
    /// A `{name}` or `{name|separator}` substitution point. The separator
    /// joins the elements of a node-sequence field.
    Field {
        name: String,
        separator: Option<String>,
    },
}

/// A parsed per-variant rendering rule.
///
/// Syntax: `{name}` substitutes a field, `{name|, }` joins a sequence field
/// with `, `, and `{{` / `}}` are literal braces.
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(src: &str) -> Result<Template, IrError> {
        let mut segments = vec![];
        let mut text = String::new();
        let mut chars = src.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        text.push('{');
                        continue;
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    let mut reference = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        reference.push(c);
                    }
                    if !closed {
                        return Err(IrError::dispatch(format!(
                            "unclosed `{{` in template `{src}`"
                        )));
                    }
                    let (name, separator) = match reference.split_once('|') {
                        Some((name, separator)) => (name, Some(separator.to_string())),
                        None => (reference.as_str(), None),
                    };
                    if name.is_empty() {
                        return Err(IrError::dispatch(format!(
                            "empty field reference in template `{src}`"
                        )));
                    }
                    segments.push(Segment::Field {
                        name: name.to_string(),
                        separator,
                    });
                }
                '}' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        text.push('}');
                    } else {
                        return Err(IrError::dispatch(format!(
                            "unmatched `}}` in template `{src}`"
                        )));
                    }
                }
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Ok(Template { segments })
    }
}

/// An external pretty-printing service, addressed by a language tag and a
/// style name. Implemented outside the core; failure must be recoverable.
pub trait FormatService {
    fn format(&self, language: &str, source: &str, style: &str) -> Result<String, IrError>;
}

struct FormatterConfig {
    service: Box<dyn FormatService>,
    language: String,
    style: String,
}

pub type ScalarFormatFn = Box<dyn Fn(&Scalar) -> String>;

/// The template-driven renderer.
pub struct Generator {
    templates: Registry<Template>,
    scalar_format: ScalarFormatFn,
    formatter: Option<FormatterConfig>,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            templates: Registry::new(),
            scalar_format: Box::new(|scalar| scalar.to_string()),
            formatter: None,
        }
    }
    /// Register the template for `schema` and its descendants, under the
    /// ancestor-chain dispatch rule.
    pub fn template(&mut self, schema: &Arc<Schema>, src: &str) -> Result<&mut Self, IrError> {
        let template = Template::parse(src)?;
        self.templates
            .insert(schema.as_ref(), "template", template)?;
        Ok(self)
    }
    /// Replace the per-scalar stringification rule (e.g. an enum-to-source
    /// literal mapping).
    pub fn scalar_format<F>(&mut self, format: F) -> &mut Self
    where
        F: Fn(&Scalar) -> String + 'static,
    {
        self.scalar_format = Box::new(format);
        self
    }
    /// Hand the rendered text to `service` as the last generation step.
    pub fn formatter(
        &mut self,
        service: Box<dyn FormatService>,
        language: &str,
        style: &str,
    ) -> &mut Self {
        self.formatter = Some(FormatterConfig {
            service,
            language: language.to_string(),
            style: style.to_string(),
        });
        self
    }
    /// Render `node` to text, bottom-up, without external formatting.
    pub fn render(&self, node: &Node) -> Result<String, IrError> {
        let template = self
            .templates
            .resolve(node.schema())
            .ok_or_else(|| IrError::UnsupportedVariant(node.kind().to_string()))?;
        let mut out = String::new();
        for segment in &template.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field { name, separator } => {
                    let value = node.field(name).ok_or_else(|| {
                        IrError::dispatch(format!(
                            "template for `{}` references unknown field `{name}`",
                            node.kind()
                        ))
                    })?;
                    match value {
                        FieldValue::Scalar(scalar) => {
                            out.push_str(&(self.scalar_format)(scalar));
                        }
                        FieldValue::Node(child) => out.push_str(&self.render(child)?),
                        FieldValue::Nodes(children) => {
                            let separator = separator.as_deref().unwrap_or("");
                            for (index, child) in children.iter().enumerate() {
                                if index > 0 {
                                    out.push_str(separator);
                                }
                                out.push_str(&self.render(child)?);
                            }
                        }
                        FieldValue::None => {}
                    }
                }
            }
        }
        Ok(out)
    }
    /// Render the whole tree and pretty-print it if a formatter is
    /// configured.
    ///
    /// A failing formatting service is recoverable: the warning is logged
    /// and the unformatted text is returned instead.
    pub fn generate(&self, root: &Node) -> Result<String, IrError> {
        let source = self.render(root)?;
        let config = match &self.formatter {
            Some(config) => config,
            None => return Ok(source),
        };
        match config
            .service
            .format(&config.language, &source, &config.style)
        {
            Ok(formatted) => Ok(formatted),
            Err(e) => {
                warn!("formatting service failed, returning unformatted output: {e}");
                Ok(source)
            }
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_escapes() {
        let template = Template::parse("{{x}}").unwrap();
        assert_eq!(template.segments.len(), 1);
        match &template.segments[0] {
            Segment::Text(text) => assert_eq!(text, "{x}"),
            _ => panic!("expected literal text"),
        }
    }

    #[test]
    fn unclosed_reference() {
        assert!(matches!(
            Template::parse("({left"),
            Err(IrError::Dispatch(_))
        ));
        assert!(matches!(Template::parse("x}"), Err(IrError::Dispatch(_))));
    }
}
