//! Turning a settings tree back into text.

use crate::number::{format_float, format_integer};
use crate::options::WriteOptions;
use crate::tree::{Config, Payload, Setting};
use log::debug;
use std::fmt;

/// Serializes `config` with `options`. The output parses back to an equal tree.
#[must_use]
pub fn serialize(config: &Config, options: &WriteOptions) -> String {
    let out = Writer::new(options).write(config);
    debug!(
        "serialized {} settings into {} bytes",
        config.setting_count(),
        out.len()
    );
    out
}

impl Config {
    /// Renders the tree as a document.
    #[must_use]
    pub fn write_string(&self, options: &WriteOptions) -> String {
        serialize(self, options)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.write_string(&WriteOptions::default()))
    }
}

/// Renders settings with a fixed set of options.
#[derive(Debug, Clone, Copy)]
pub struct Writer<'o> {
    options: &'o WriteOptions,
}

impl<'o> Writer<'o> {
    #[must_use]
    pub fn new(options: &'o WriteOptions) -> Self {
        Writer { options }
    }

    /// Writes every member of the root group, one per line.
    #[must_use]
    pub fn write(&self, config: &Config) -> String {
        let mut out = String::new();
        for member in config.root_setting().children() {
            self.write_member(&mut out, member, 0);
        }
        out
    }

    /// Renders a single value the way it would appear after `name = `.
    #[must_use]
    pub fn value_text(&self, setting: Setting<'_>) -> String {
        self.render_value(setting, 0)
    }

    fn write_member(&self, out: &mut String, setting: Setting<'_>, depth: usize) {
        let opts = self.options;
        out.push_str(&self.indent(depth));
        out.push_str(setting.name().unwrap_or_default());

        let colon = if setting.is_group() {
            opts.colon_assignment_for_groups
        } else {
            opts.colon_assignment_for_non_groups
        };
        if setting.is_group() && opts.open_brace_on_separate_line && !setting.is_empty() {
            out.push_str(if colon { ":" } else { " =" });
            out.push('\n');
            out.push_str(&self.indent(depth));
        } else {
            out.push_str(if colon { ": " } else { " = " });
        }

        out.push_str(&self.render_value(setting, depth));
        if opts.semicolon_separators {
            out.push(';');
        }
        out.push('\n');
    }

    /// `depth` is the indentation level of the line the value starts on.
    fn render_value(&self, setting: Setting<'_>, depth: usize) -> String {
        match setting.payload() {
            Payload::Bool(v) => v.to_string(),
            Payload::Int(v) => format_integer(
                i64::from(*v),
                false,
                setting.format().unwrap_or(self.options.integer_base),
            ),
            Payload::Int64(v) => format_integer(
                *v,
                true,
                setting.format().unwrap_or(self.options.integer_base),
            ),
            Payload::Float(v) => format_float(*v, self.options.float_precision),
            Payload::String(s) => quote(s),
            Payload::Group(_) => {
                if setting.is_empty() {
                    return "{ }".to_string();
                }
                let mut out = String::from("{\n");
                for member in setting.children() {
                    self.write_member(&mut out, member, depth + 1);
                }
                out.push_str(&self.indent(depth));
                out.push('}');
                out
            }
            Payload::Array(_) => {
                let elements: Vec<String> = setting.children().map(|e| self.render_value(e, depth + 1)).collect();
                if elements.is_empty() {
                    return "[ ]".to_string();
                }
                let inline = format!("[ {} ]", elements.join(", "));
                match self.options.array_line_width {
                    Some(width) if inline.chars().count() > width => {
                        self.multi_line('[', ']', &elements, depth)
                    }
                    _ => inline,
                }
            }
            Payload::List(_) => {
                let elements: Vec<String> = setting.children().map(|e| self.render_value(e, depth + 1)).collect();
                if elements.is_empty() {
                    return "( )".to_string();
                }
                let inline = !setting.children().any(|e| e.is_group())
                    && !elements.iter().any(|e| e.contains('\n'));
                if inline {
                    format!("( {} )", elements.join(", "))
                } else {
                    self.multi_line('(', ')', &elements, depth)
                }
            }
        }
    }

    fn multi_line(&self, open: char, close: char, elements: &[String], depth: usize) -> String {
        let inner = self.indent(depth + 1);
        let body: Vec<String> = elements.iter().map(|e| format!("{inner}{e}")).collect();
        format!("{open}\n{}\n{}{close}", body.join(",\n"), self.indent(depth))
    }

    fn indent(&self, depth: usize) -> String {
        if self.options.use_tabs {
            "\t".repeat(depth)
        } else {
            " ".repeat(depth * self.options.indent_width)
        }
    }
}

/// Quotes and escapes a string so the lexer reads it back unchanged.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
