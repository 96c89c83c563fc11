//! Explicit block/attribute schemas and the body partitioning they drive.
//!
//! Each block kind a definitions file may contain is described by a static
//! [`BodySchema`]: which attributes it accepts (and which are required) and
//! which nested block types it accepts (and their label names). Decoding a
//! body happens in two steps:
//!
//! 1. [`BodySchema::partition`] checks the body's shape against the schema:
//!    unknown attributes and blocks (strict mode only), label counts and
//!    missing required attributes. Repeated attributes never get this far:
//!    `hcl::parse` rejects them.
//! 2. The returned [`Content`] hands out typed attribute values. Expressions
//!    are evaluated in an empty context, so literals, templates without
//!    references and arithmetic work; variables and function calls do not.
//!
//! A `null` value is treated as absent.

use std::collections::BTreeMap;

use hcl::eval::{Context, Evaluate};
use hcl::{Block, BlockLabel, Body, Expression, Structure, Value};

use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub required: bool,
}

impl AttributeSchema {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// A nested block type and the names of its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSchema {
    pub identifier: &'static str,
    pub labels: &'static [&'static str],
}

impl BlockSchema {
    pub const fn labeled(identifier: &'static str, labels: &'static [&'static str]) -> Self {
        Self { identifier, labels }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodySchema {
    pub attributes: &'static [AttributeSchema],
    pub blocks: &'static [BlockSchema],
}

impl BodySchema {
    fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    fn block(&self, identifier: &str) -> Option<&BlockSchema> {
        self.blocks.iter().find(|b| b.identifier == identifier)
    }

    /// Split `body` into schema-conformant attributes and blocks.
    ///
    /// `scope` names the enclosing block in error messages. With `strict`
    /// off, attributes and blocks the schema does not mention are skipped.
    pub fn partition<'a>(
        &self,
        body: &'a Body,
        scope: &str,
        strict: bool,
    ) -> Result<Content<'a>, DecodeError> {
        let mut attributes = BTreeMap::new();
        let mut blocks = Vec::new();

        for structure in &body.0 {
            match structure {
                Structure::Attribute(attribute) => {
                    let name = attribute.key.as_str();
                    let Some(declared) = self.attribute(name) else {
                        if strict {
                            return Err(DecodeError::UnsupportedAttribute {
                                name: name.into(),
                                scope: scope.into(),
                            });
                        }
                        continue;
                    };
                    attributes.insert(declared.name, &attribute.expr);
                }
                Structure::Block(block) => {
                    let identifier = block.identifier.as_str();
                    let Some(declared) = self.block(identifier) else {
                        if strict {
                            return Err(DecodeError::UnsupportedBlock {
                                name: identifier.into(),
                                scope: scope.into(),
                            });
                        }
                        continue;
                    };
                    if block.labels.len() != declared.labels.len() {
                        return Err(DecodeError::LabelCount {
                            block: identifier.into(),
                            expected: declared.labels.len(),
                            found: block.labels.len(),
                        });
                    }
                    blocks.push(block);
                }
            }
        }

        if let Some(missing) = self
            .attributes
            .iter()
            .find(|declared| declared.required && !attributes.contains_key(declared.name))
        {
            return Err(DecodeError::MissingAttribute {
                name: missing.name.into(),
                scope: scope.into(),
            });
        }

        Ok(Content {
            scope: scope.to_string(),
            attributes,
            blocks,
        })
    }
}

/// The schema-checked content of one body.
#[derive(Debug)]
pub struct Content<'a> {
    scope: String,
    attributes: BTreeMap<&'static str, &'a Expression>,
    blocks: Vec<&'a Block>,
}

impl<'a> Content<'a> {
    /// Accepted nested blocks, in source order.
    pub fn blocks(&self) -> &[&'a Block] {
        &self.blocks
    }

    fn evaluate(&self, name: &str) -> Result<Option<Value>, DecodeError> {
        let Some(expr) = self.attributes.get(name) else {
            return Ok(None);
        };
        let value = expr
            .evaluate(&Context::new())
            .map_err(|e| DecodeError::Evaluate {
                name: name.into(),
                scope: self.scope.clone(),
                message: e.to_string(),
            })?;
        Ok(match value {
            Value::Null => None,
            value => Some(value),
        })
    }

    fn invalid_type(&self, name: &str, expected: &'static str) -> DecodeError {
        DecodeError::InvalidType {
            name: name.into(),
            scope: self.scope.clone(),
            expected,
        }
    }

    pub fn required_string(&self, name: &str) -> Result<String, DecodeError> {
        self.optional_string(name)?
            .ok_or_else(|| DecodeError::MissingAttribute {
                name: name.into(),
                scope: self.scope.clone(),
            })
    }

    pub fn optional_string(&self, name: &str) -> Result<Option<String>, DecodeError> {
        match self.evaluate(name)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.invalid_type(name, "string")),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, DecodeError> {
        match self.evaluate(name)? {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(_) => Err(self.invalid_type(name, "bool")),
        }
    }

    pub fn optional_string_list(&self, name: &str) -> Result<Option<Vec<String>>, DecodeError> {
        match self.evaluate(name)? {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(self.invalid_type(name, "list of strings")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(self.invalid_type(name, "list of strings")),
        }
    }

    /// Any evaluated value, kept as-is.
    pub fn optional_value(&self, name: &str) -> Result<Option<Value>, DecodeError> {
        self.evaluate(name)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

/// Text of the label at `index`. Callers index within the count checked by
/// [`BodySchema::partition`].
pub fn label(block: &Block, index: usize) -> String {
    match block.labels.get(index) {
        Some(BlockLabel::String(text)) => text.clone(),
        Some(BlockLabel::Identifier(ident)) => ident.as_str().to_string(),
        None => String::new(),
    }
}

/// Human-readable scope for a labeled block, e.g. `include "all"`.
pub fn block_scope(block: &Block) -> String {
    let mut scope = block.identifier.as_str().to_string();
    for index in 0..block.labels.len() {
        scope.push_str(&format!(" \"{}\"", label(block, index)));
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: BodySchema = BodySchema {
        attributes: &[
            AttributeSchema::required("path"),
            AttributeSchema::optional("expose"),
            AttributeSchema::optional("tags"),
            AttributeSchema::optional("anything"),
        ],
        blocks: &[BlockSchema::labeled("child", &["name"])],
    };

    fn parse(src: &str) -> Body {
        hcl::parse(src).unwrap()
    }

    #[test]
    fn accepts_conformant_body() {
        let body = parse(
            r#"
            path   = "p"
            expose = true
            tags   = ["a", "b"]
            child "x" {}
            "#,
        );
        let content = SCHEMA.partition(&body, "test", true).unwrap();
        assert_eq!(content.required_string("path").unwrap(), "p");
        assert_eq!(content.optional_bool("expose").unwrap(), Some(true));
        assert_eq!(
            content.optional_string_list("tags").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(content.blocks().len(), 1);
        assert_eq!(label(content.blocks()[0], 0), "x");
    }

    #[test]
    fn missing_required_attribute() {
        let body = parse("expose = true");
        let err = SCHEMA.partition(&body, "test", true).unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { ref name, .. } if name == "path"));
    }

    #[test]
    fn strict_rejects_unknown_attribute() {
        let body = parse("path = \"p\"\ntypo = 1");
        let err = SCHEMA.partition(&body, "test", true).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedAttribute { ref name, .. } if name == "typo"
        ));
    }

    #[test]
    fn lenient_skips_unknown_attribute_and_block() {
        let body = parse("path = \"p\"\ntypo = 1\nother {}");
        let content = SCHEMA.partition(&body, "test", false).unwrap();
        assert_eq!(content.required_string("path").unwrap(), "p");
        assert!(content.blocks().is_empty());
    }

    #[test]
    fn strict_rejects_unknown_block() {
        let body = parse("path = \"p\"\nother {}");
        let err = SCHEMA.partition(&body, "test", true).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedBlock { ref name, .. } if name == "other"));
    }


    #[test]
    fn wrong_label_count_is_rejected() {
        let body = parse("path = \"p\"\nchild {}");
        let err = SCHEMA.partition(&body, "test", true).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LabelCount {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let body = parse("path = true");
        let content = SCHEMA.partition(&body, "test", true).unwrap();
        let err = content.required_string("path").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { expected: "string", .. }));
    }

    #[test]
    fn null_counts_as_absent() {
        let body = parse("path = \"p\"\nexpose = null");
        let content = SCHEMA.partition(&body, "test", true).unwrap();
        assert_eq!(content.optional_bool("expose").unwrap(), None);
    }

    #[test]
    fn templates_without_references_evaluate() {
        let body = parse("path = \"a-${\"b\"}\"");
        let content = SCHEMA.partition(&body, "test", true).unwrap();
        assert_eq!(content.required_string("path").unwrap(), "a-b");
    }

    #[test]
    fn variable_references_fail_to_evaluate() {
        let body = parse("path = local.root");
        let content = SCHEMA.partition(&body, "test", true).unwrap();
        let err = content.required_string("path").unwrap_err();
        assert!(matches!(err, DecodeError::Evaluate { .. }));
    }

    #[test]
    fn optional_value_keeps_objects() {
        let body = parse("path = \"p\"\nanything = { a = 1 }");
        let content = SCHEMA.partition(&body, "test", true).unwrap();
        let value = content.optional_value("anything").unwrap().unwrap();
        assert!(matches!(value, Value::Object(_)));
    }

    #[test]
    fn block_scope_includes_labels() {
        let body = hcl::parse("include \"all\" {}").unwrap();
        let Structure::Block(block) = &body.0[0] else {
            panic!("expected block");
        };
        assert_eq!(block_scope(block), "include \"all\"");
    }
}
