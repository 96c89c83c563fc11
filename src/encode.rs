//! Encoding of generated documents into HCL text.
//!
//! Output documents are first lowered into a small typed tree ([`Body`],
//! [`Block`], attributes holding [`hcl::Value`]s) and then rendered with the
//! layout conventions of the Terraform/Terragrunt HCL writer:
//!
//! - two-space indentation per nesting level;
//! - a blank line before every run of consecutive blocks sharing an
//!   identifier, so a document made of blocks starts with an empty line and
//!   `include` blocks sit together with no space between them;
//! - `=` signs of consecutive attributes aligned on the longest key;
//! - lists inline, objects expanded one key per line.
//!
//! Rendering is a pure function of the tree and cannot fail.

use std::fmt::Write as _;

use hcl::Value;

const INDENT: &str = "  ";

/// An ordered sequence of attributes and blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Attribute { key: String, value: Value },
    Block(Block),
}

impl Item {
    fn is_attribute(&self) -> bool {
        matches!(self, Item::Attribute { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub identifier: String,
    pub labels: Vec<String>,
    pub body: Body,
}

impl Block {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            labels: Vec::new(),
            body: Body::default(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.items.push(Item::Attribute {
            key: key.into(),
            value,
        });
        self
    }

    /// Append an attribute only when a value is present.
    pub fn optional_attribute(
        &mut self,
        key: impl Into<String>,
        value: Option<Value>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.attribute(key, value);
        }
        self
    }

    pub fn block(&mut self, block: Block) -> &mut Self {
        self.items.push(Item::Block(block));
        self
    }
}

/// Render a body as HCL text.
pub fn to_string(body: &Body) -> String {
    let mut out = String::new();
    write_body(&mut out, body, 0);
    out
}

fn write_body(out: &mut String, body: &Body, depth: usize) {
    // Identifier of the preceding block, `None` after an attribute run or at the start.
    let mut previous_block: Option<&str> = None;

    for run in body
        .items
        .chunk_by(|a, b| a.is_attribute() && b.is_attribute())
    {
        match run {
            [Item::Block(block)] => {
                if previous_block != Some(block.identifier.as_str()) {
                    out.push('\n');
                }
                write_block(out, block, depth);
                previous_block = Some(block.identifier.as_str());
            }
            attributes => {
                if previous_block.is_some() {
                    out.push('\n');
                }
                // A multi-line value closes its alignment group.
                for group in attributes.split_inclusive(|item| match item {
                    Item::Attribute { value, .. } => is_multiline(value),
                    Item::Block(_) => false,
                }) {
                    let width = group
                        .iter()
                        .filter_map(|item| match item {
                            Item::Attribute { key, .. } => Some(key.len()),
                            Item::Block(_) => None,
                        })
                        .max()
                        .unwrap_or(0);
                    for item in group {
                        if let Item::Attribute { key, value } = item {
                            write_attribute(out, key, value, width, depth);
                        }
                    }
                }
                previous_block = None;
            }
        }
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    push_indent(out, depth);
    out.push_str(&block.identifier);
    for label in &block.labels {
        out.push(' ');
        write_quoted(out, label);
    }
    out.push_str(" {\n");
    write_body(out, &block.body, depth + 1);
    push_indent(out, depth);
    out.push_str("}\n");
}

fn write_attribute(out: &mut String, key: &str, value: &Value, width: usize, depth: usize) {
    push_indent(out, depth);
    let _ = write!(out, "{key:<width$} = ");
    write_value(out, value, depth);
    out.push('\n');
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => write_quoted(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth);
            }
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let entries: Vec<(String, &Value)> =
                map.iter().map(|(k, v)| (object_key(k), v)).collect();
            out.push_str("{\n");
            for group in entries.split_inclusive(|(_, value)| is_multiline(value)) {
                let width = group.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
                for (key, value) in group {
                    write_attribute(out, key, value, width, depth + 1);
                }
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn is_multiline(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => items.iter().any(is_multiline),
        _ => false,
    }
}

fn object_key(key: &str) -> String {
    if hcl::Identifier::new(key).is_ok() {
        key.to_string()
    } else {
        let mut quoted = String::new();
        write_quoted(&mut quoted, key);
        quoted
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
