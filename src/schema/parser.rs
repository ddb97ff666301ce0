//! Schema mini-language text parser.
//!
//! Splits schema source into statements (`;`-separated) and parses each
//! into a [`RawField`] or [`RawParam`], leaving type-token decoding to
//! [`crate::schema::types`] and expression parsing to
//! [`crate::schema::expr`] — this module only handles the field-level
//! grammar: `<type-token>: <kind-spec>( = <literal>)?` for fields, and
//! `param <type-token> <name>` for the extra parameters declared at the
//! schema's head (`spec.md` §3).
use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum RawKind {
    Named(String),
    Anonymous,
    /// `name[expr]`.
    SeqCount(String, String),
    /// `name[]`.
    SeqOpen(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub type_text: String,
    pub kind: RawKind,
    /// Raw, still-unparsed text of a `= literal` option.
    pub magic_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawParam {
    pub type_text: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSchema {
    pub params: Vec<RawParam>,
    pub fields: Vec<RawField>,
}

/// Parse full schema source text into statements.
pub fn parse(source: &str) -> Result<RawSchema, CompileError> {
    let mut schema = RawSchema::default();
    let mut seen_field = false;
    for stmt in split_statements(source) {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        if let Some(rest) = stmt.strip_prefix("param ") {
            if seen_field {
                let name = rest.split_whitespace().last().unwrap_or(rest).to_string();
                return Err(CompileError::ExtraParamAfterField { name });
            }
            schema.params.push(parse_param(rest, stmt)?);
        } else {
            seen_field = true;
            schema.fields.push(parse_field(stmt)?);
        }
    }
    Ok(schema)
}

/// Splits on `;` that isn't inside a `"..."` string literal.
fn split_statements(source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    for c in source.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                cur.push(c);
            }
            ';' if !in_quotes => {
                out.push(std::mem::take(&mut cur));
            }
            _ => cur.push(c),
        }
    }
    if !cur.trim().is_empty() {
        out.push(cur);
    }
    out
}

fn parse_param(rest: &str, stmt: &str) -> Result<RawParam, CompileError> {
    let mut parts = rest.split_whitespace();
    let type_text = parts.next().ok_or_else(|| CompileError::MalformedDeclaration {
        reason: format!("empty param declaration: {stmt:?}"),
    })?;
    let name = parts.next().ok_or_else(|| CompileError::MalformedDeclaration {
        reason: format!("param declaration missing a name: {stmt:?}"),
    })?;
    Ok(RawParam {
        type_text: type_text.to_string(),
        name: name.to_string(),
    })
}

fn parse_field(stmt: &str) -> Result<RawField, CompileError> {
    let colon = stmt.find(':').ok_or_else(|| CompileError::MalformedDeclaration {
        reason: format!("field declaration missing ':': {stmt:?}"),
    })?;
    let type_text = stmt[..colon].trim().to_string();
    let rest = stmt[colon + 1..].trim();

    let (kind_text, magic_text) = split_magic(rest);
    let kind = parse_kind(kind_text, stmt)?;
    Ok(RawField {
        type_text,
        kind,
        magic_text,
    })
}

/// Splits `name[expr] = literal` into (`"name[expr]"`, `Some("literal")`),
/// being careful not to split on an `=` embedded inside a quoted magic
/// literal (there is only ever one, so this just finds the first `=`
/// outside quotes).
fn split_magic(text: &str) -> (&str, Option<String>) {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '=' if !in_quotes => {
                return (text[..i].trim(), Some(text[i + 1..].trim().to_string()));
            }
            _ => {}
        }
    }
    (text.trim(), None)
}

fn parse_kind(text: &str, stmt: &str) -> Result<RawKind, CompileError> {
    if text == "_" {
        return Ok(RawKind::Anonymous);
    }
    if let Some(open) = text.find('[') {
        let close = text.rfind(']').ok_or_else(|| CompileError::MalformedDeclaration {
            reason: format!("unmatched '[' in {stmt:?}"),
        })?;
        let name = text[..open].trim().to_string();
        let inner = text[open + 1..close].trim();
        return if inner.is_empty() {
            Ok(RawKind::SeqOpen(name))
        } else {
            Ok(RawKind::SeqCount(name, inner.to_string()))
        };
    }
    Ok(RawKind::Named(text.to_string()))
}

/// Parses a magic literal's raw text into an integer or a byte string,
/// interpreting `\0`, `\n`, `\t`, `\\`, and `\"` escapes inside quotes.
pub fn parse_literal_text(text: &str) -> Result<crate::schema::ir::Literal, CompileError> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        let mut bytes = Vec::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('0') => bytes.push(0u8),
                    Some('n') => bytes.push(b'\n'),
                    Some('t') => bytes.push(b'\t'),
                    Some('\\') => bytes.push(b'\\'),
                    Some('"') => bytes.push(b'"'),
                    Some(other) => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes())
                    }
                    None => {
                        return Err(CompileError::MalformedDeclaration {
                            reason: format!("dangling escape in literal {text:?}"),
                        })
                    }
                }
            } else {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
        Ok(crate::schema::ir::Literal::Bytes(bytes))
    } else {
        text.parse::<i128>()
            .map(crate::schema::ir::Literal::Int)
            .map_err(|_| CompileError::MalformedDeclaration {
                reason: format!("magic literal {text:?} is neither quoted nor an integer"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_one_schema_parses() {
        let src = r#"u8: _ = 128; u16: size; 4: data[size*2]; s: str[]; s: _ = "9xC\0"; *list(size): inner; u8: _ = 67"#;
        let schema = parse(src).unwrap();
        assert_eq!(schema.fields.len(), 7);
        assert_eq!(schema.fields[0].type_text, "u8");
        assert_eq!(schema.fields[0].kind, RawKind::Anonymous);
        assert_eq!(schema.fields[0].magic_text.as_deref(), Some("128"));
        assert_eq!(schema.fields[1].kind, RawKind::Named("size".to_string()));
        assert_eq!(
            schema.fields[2].kind,
            RawKind::SeqCount("data".to_string(), "size*2".to_string())
        );
        assert_eq!(schema.fields[3].kind, RawKind::SeqOpen("str".to_string()));
        assert_eq!(schema.fields[4].magic_text.as_deref(), Some(r#""9xC\0""#));
        assert_eq!(schema.fields[5].type_text, "*list(size)");
    }

    #[test]
    fn params_must_precede_fields() {
        let src = "u8: a; param u16 size";
        assert!(parse(src).is_err());
    }

    #[test]
    fn param_declaration() {
        let src = "param u16 size; u8: data[size]";
        let schema = parse(src).unwrap();
        assert_eq!(schema.params.len(), 1);
        assert_eq!(schema.params[0].name, "size");
        assert_eq!(schema.fields.len(), 1);
    }

    #[test]
    fn string_literal_escape_nul() {
        let lit = parse_literal_text(r#""9xC\0""#).unwrap();
        assert_eq!(lit, crate::schema::ir::Literal::Bytes(b"9xC\0".to_vec()));
    }

    #[test]
    fn integer_literal() {
        let lit = parse_literal_text("128").unwrap();
        assert_eq!(lit, crate::schema::ir::Literal::Int(128));
    }

    #[test]
    fn malformed_field_fails() {
        assert!(parse_field("u8 no colon").is_err());
        assert!(parse_field("u8: name[unterminated").is_err());
    }
}
