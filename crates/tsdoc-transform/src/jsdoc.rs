//! JSDoc extraction and parsing (§4.5 "Doc comments").
//!
//! The parser facade does not retain swc's `Comments` map (it is `Rc`-based
//! and would make `ParsedFile` non-`Send`), so this module works directly
//! off the raw source text: given a node's byte offset, it scans backward
//! for an immediately preceding `/** ... */` block.

use tsdoc_model::{Access, DocMeta};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsDoc {
    pub description: Option<String>,
    pub access: Option<Access>,
    pub default: Option<String>,
    pub selector: Option<String>,
    pub returns: Option<String>,
    pub params: std::collections::HashMap<String, String>,
}

impl JsDoc {
    pub fn into_doc_meta(self) -> DocMeta {
        DocMeta {
            description: self.description,
            access: self.access,
            default: self.default,
            selector: self.selector,
        }
    }
}

/// Finds the `/** ... */` block immediately preceding byte offset `pos` in
/// `source` (only whitespace may separate the comment from `pos`), parses
/// it, and returns `None` if no such comment exists.
pub fn jsdoc_before(source: &str, pos: usize) -> Option<JsDoc> {
    let pos = pos.min(source.len());
    let preceding = &source[..pos];
    let trimmed = preceding.trim_end();
    if !trimmed.ends_with("*/") {
        return None;
    }
    let start = trimmed.rfind("/**")?;
    let end = trimmed.len();
    let body = &trimmed[start + 3..end - 2];
    Some(parse_jsdoc(body))
}

/// Parses the body of a `/** ... */` comment (without the delimiters) into
/// its structured tags.
pub fn parse_jsdoc(body: &str) -> JsDoc {
    let lines: Vec<&str> = body
        .lines()
        .map(|l| {
            let l = l.trim();
            l.strip_prefix('*').map(str::trim).unwrap_or(l)
        })
        .collect();

    let mut description_lines = Vec::new();
    let mut doc = JsDoc::default();
    let mut current_param: Option<String> = None;

    for line in lines {
        if let Some(rest) = line.strip_prefix('@') {
            current_param = None;
            let mut parts = rest.splitn(2, char::is_whitespace);
            let tag = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or("").trim();
            match tag {
                "private" => doc.access = Some(Access::Private),
                "protected" => doc.access = Some(Access::Protected),
                "public" => doc.access = Some(Access::Public),
                // `@deprecated` maps to `Private` (§4.5); the deprecation
                // note itself is folded into the description by leaving the
                // tag's text in `description_lines` below.
                "deprecated" => {
                    doc.access = Some(Access::Private);
                    if !value.is_empty() {
                        description_lines.push(format!("Deprecated: {value}"));
                    }
                }
                "default" => doc.default = Some(value.to_string()),
                "selector" => doc.selector = Some(value.to_string()),
                "return" | "returns" => doc.returns = Some(value.to_string()),
                "param" => {
                    let mut parts = value.splitn(2, char::is_whitespace);
                    let name = parts.next().unwrap_or_default().trim_matches(['{', '}']);
                    let desc = parts.next().unwrap_or("").trim();
                    if !name.is_empty() {
                        doc.params.insert(name.to_string(), desc.to_string());
                        current_param = Some(name.to_string());
                    }
                }
                _ => {
                    // Unknown tag: ignored rather than surfaced as an error
                    // (§4.5 unknown-kind policy extends to doc tags).
                }
            }
            continue;
        }

        if let Some(name) = &current_param {
            if !line.is_empty() {
                let entry = doc.params.entry(name.clone()).or_default();
                if !entry.is_empty() {
                    entry.push(' ');
                }
                entry.push_str(line);
            }
            continue;
        }

        if !line.is_empty() {
            description_lines.push(line.to_string());
        } else if !description_lines.is_empty() {
            description_lines.push(String::new());
        }
    }

    while description_lines.last().is_some_and(|l| l.is_empty()) {
        description_lines.pop();
    }

    if !description_lines.is_empty() {
        doc.description = Some(description_lines.join("\n").trim().to_string());
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_description_and_access() {
        let doc = parse_jsdoc(
            "\n * Computes the thing.\n * @private\n * @default 1\n ",
        );
        assert_eq!(doc.description.as_deref(), Some("Computes the thing."));
        assert_eq!(doc.access, Some(Access::Private));
        assert_eq!(doc.default.as_deref(), Some("1"));
    }

    #[test]
    fn deprecated_maps_to_private() {
        let doc = parse_jsdoc(" * @deprecated use other() instead ");
        assert_eq!(doc.access, Some(Access::Private));
        assert!(doc.description.unwrap().contains("Deprecated"));
    }

    #[test]
    fn collects_param_descriptions() {
        let doc = parse_jsdoc(" * @param name the item's name\n * @param count how many ");
        assert_eq!(doc.params.get("name").map(String::as_str), Some("the item's name"));
        assert_eq!(doc.params.get("count").map(String::as_str), Some("how many"));
    }

    #[test]
    fn jsdoc_before_requires_immediately_preceding_comment() {
        let src = "/**\n * Hi\n */\nfunction f() {}";
        let pos = src.find("function").unwrap();
        let doc = jsdoc_before(src, pos).unwrap();
        assert_eq!(doc.description.as_deref(), Some("Hi"));
    }

    #[test]
    fn jsdoc_before_returns_none_without_comment() {
        let src = "function f() {}";
        assert!(jsdoc_before(src, 0).is_none());
    }
}
