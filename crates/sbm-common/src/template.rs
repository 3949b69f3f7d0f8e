//! Variable substitution in boot configs.
//!
//! The server expands `{name}` placeholders from the variable collection
//! before handing a config to a booting machine. `{{` and `}}` produce
//! literal braces. This module reproduces that expansion locally so a
//! config can be previewed without recording a boot.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown variable '{name}' at offset {offset}")]
    UnknownVariable { name: String, offset: usize },

    #[error("unclosed '{{' at offset {0}")]
    Unclosed(usize),

    #[error("single '}}' at offset {0}")]
    StrayClose(usize),

    #[error("unsupported placeholder '{{{field}}}' at offset {offset}")]
    Unsupported { field: String, offset: usize },
}

/// Expands `template` with `vars`.
pub fn render(template: &str, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template.char_indices().peekable();

    while let Some((offset, c)) = rest.next() {
        match c {
            '{' => {
                if matches!(rest.peek(), Some((_, '{'))) {
                    rest.next();
                    out.push('{');
                    continue;
                }
                let mut field = String::new();
                let mut closed = false;
                for (_, fc) in rest.by_ref() {
                    if fc == '}' {
                        closed = true;
                        break;
                    }
                    field.push(fc);
                }
                if !closed {
                    return Err(TemplateError::Unclosed(offset));
                }
                out.push_str(lookup(&field, offset, vars)?);
            }
            '}' => {
                if matches!(rest.peek(), Some((_, '}'))) {
                    rest.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::StrayClose(offset));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn lookup<'a>(field: &str, offset: usize, vars: &'a HashMap<String, String>) -> Result<&'a str, TemplateError> {
    // Format specs, conversions, attribute and index access have no
    // meaning for plain string variables.
    if field.is_empty() || field.contains([':', '!', '.', '[', '{']) {
        return Err(TemplateError::Unsupported {
            field: field.to_string(),
            offset,
        });
    }
    vars.get(field)
        .map(String::as_str)
        .ok_or_else(|| TemplateError::UnknownVariable {
            name: field.to_string(),
            offset,
        })
}
