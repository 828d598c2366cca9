#![forbid(unsafe_code)]

//! Tagged records and their text encoding.
//!
//! ```text
//! tag{name=value,name="text",name=`raw`,name=sub{...},name=[item,item]}
//! ```
//!
//! # Invariants
//!
//! - Field names are unique within a record; re-inserting a name replaces
//!   the value in place, so wire order is always first-insertion order.
//! - Encoding is total: values that cannot use their preferred form
//!   (a bare token with a stop symbol, raw text containing a backtick or a
//!   line break) fall back to the quoted form, which can represent any string.
//! - Encoded output never contains a raw newline.

use std::fmt::Write as _;

use crate::escape::{escape, is_bare_token};

/// Tag used for anonymous records (`_{...}`).
pub const ANONYMOUS_TAG: &str = "_";

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Quoted, escaped text: `"..."`.
    Text(String),
    /// Backtick-quoted text, written verbatim: `` `...` ``.
    Raw(String),
    /// Unquoted token such as an element id or an enum keyword.
    Bare(String),
    /// Integer, written unquoted.
    Int(i64),
    /// Floating point number, written unquoted in shortest form.
    Float(f64),
    /// Presence flag, written as `1`.
    Flag,
    /// Nested record: `tag{...}`.
    Record(Record),
    /// List of records or scalars: `[a,b]`.
    List(Vec<Value>),
}

impl Value {
    /// Scalar text content of `Text`, `Raw`, and `Bare` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Raw(text) | Self::Bare(text) => Some(text),
            _ => None,
        }
    }

    /// Nested record, if this value is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// List items, if this value is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    fn encode_into(&self, out: &mut String) {
        match self {
            Self::Text(text) => push_quoted(out, text),
            Self::Raw(text) => {
                if text.contains(['`', '\n', '\r']) {
                    push_quoted(out, text);
                } else {
                    out.push('`');
                    out.push_str(text);
                    out.push('`');
                }
            }
            Self::Bare(token) => push_token(out, token),
            Self::Int(number) => {
                let _ = write!(out, "{number}");
            }
            Self::Float(number) => push_float(out, *number),
            Self::Flag => out.push('1'),
            Self::Record(record) => record.encode_into(out),
            Self::List(items) => {
                out.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    item.encode_into(out);
                }
                out.push(']');
            }
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    out.push_str(&escape(text));
    out.push('"');
}

fn push_token(out: &mut String, token: &str) {
    if is_bare_token(token) {
        out.push_str(token);
    } else {
        push_quoted(out, token);
    }
}

fn push_float(out: &mut String, number: f64) {
    if number.is_nan() {
        out.push_str("NaN");
    } else if number.is_infinite() {
        out.push_str(if number > 0.0 { "Infinity" } else { "-Infinity" });
    } else if number == 0.0 {
        out.push('0');
    } else {
        // `Display` for f64 is shortest round-trip and drops a zero fraction.
        let _ = write!(out, "{number}");
    }
}

/// A tagged record with ordered, uniquely named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    tag: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: Vec::new(),
        }
    }

    /// Create an empty anonymous record (`_{...}`).
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_TAG)
    }

    /// Record tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in wire order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Set a field, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Set a field at the front of the record.
    ///
    /// An existing field with the same name is moved to the front.
    pub fn insert_first(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.insert(0, (name, value));
    }

    /// Remove a field and return its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(existing, _)| existing == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Whether a field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Scalar text of a field.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Nested record of a field.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(Value::as_record)
    }

    /// List items of a field.
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// Builder: set any value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder: quoted text (always emitted, even when empty).
    #[must_use]
    pub fn with_text(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(name, Value::Text(text.into()))
    }

    /// Builder: quoted text, omitted when `None` or empty.
    #[must_use]
    pub fn with_opt_text<S: Into<String>>(self, name: impl Into<String>, text: Option<S>) -> Self {
        match text.map(Into::into) {
            Some(text) if !text.is_empty() => self.with(name, Value::Text(text)),
            _ => self,
        }
    }

    /// Builder: backtick-quoted raw text.
    #[must_use]
    pub fn with_raw(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(name, Value::Raw(text.into()))
    }

    /// Builder: unquoted token.
    #[must_use]
    pub fn with_bare(self, name: impl Into<String>, token: impl Into<String>) -> Self {
        self.with(name, Value::Bare(token.into()))
    }

    /// Builder: unquoted token, omitted when `None` or empty.
    #[must_use]
    pub fn with_opt_bare<S: Into<String>>(self, name: impl Into<String>, token: Option<S>) -> Self {
        match token.map(Into::into) {
            Some(token) if !token.is_empty() => self.with(name, Value::Bare(token)),
            _ => self,
        }
    }

    /// Builder: integer.
    #[must_use]
    pub fn with_int(self, name: impl Into<String>, number: i64) -> Self {
        self.with(name, Value::Int(number))
    }

    /// Builder: float.
    #[must_use]
    pub fn with_float(self, name: impl Into<String>, number: f64) -> Self {
        self.with(name, Value::Float(number))
    }

    /// Builder: float, omitted when zero (the browser reports "unset" as 0).
    #[must_use]
    pub fn with_nonzero_float(self, name: impl Into<String>, number: f64) -> Self {
        if number == 0.0 {
            self
        } else {
            self.with_float(name, number)
        }
    }

    /// Builder: presence flag, emitted as `name=1` only when `set`.
    #[must_use]
    pub fn with_flag(self, name: impl Into<String>, set: bool) -> Self {
        if set { self.with(name, Value::Flag) } else { self }
    }

    /// Builder: nested record.
    #[must_use]
    pub fn with_record(self, name: impl Into<String>, record: Record) -> Self {
        self.with(name, Value::Record(record))
    }

    /// Builder: list.
    #[must_use]
    pub fn with_list(self, name: impl Into<String>, items: Vec<Value>) -> Self {
        self.with(name, Value::List(items))
    }

    /// Encode to wire text.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(32 + self.fields.len() * 16);
        self.encode_into(&mut out);
        out
    }

    /// Append the wire text to `out`.
    pub fn encode_into(&self, out: &mut String) {
        push_token(out, &self.tag);
        out.push('{');
        for (index, (name, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            push_token(out, name);
            out.push('=');
            value.encode_into(out);
        }
        out.push('}');
    }
}

impl core::fmt::Display for Record {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fields_keep_insertion_order() {
        let record = Record::new("resize")
            .with_bare("id", "view1")
            .with_int("width", 640)
            .with_int("height", 480);
        assert_eq!(record.encode(), "resize{id=view1,width=640,height=480}");
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let record = Record::new("t")
            .with_int("a", 1)
            .with_int("b", 2)
            .with_int("a", 3);
        assert_eq!(record.encode(), "t{a=3,b=2}");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn insert_first_moves_existing_field() {
        let mut record = Record::new("t").with_int("a", 1).with_bare("session", "x");
        record.insert_first("session", Value::Bare("7".to_owned()));
        assert_eq!(record.encode(), "t{session=7,a=1}");
    }

    #[test]
    fn text_values_are_escaped() {
        let record = Record::new("textChanged").with_text("text", "say \"hi\" \\o/");
        assert_eq!(record.encode(), r#"textChanged{text="say \"hi\" \\o/"}"#);
    }

    #[test]
    fn raw_values_use_backticks() {
        let record = Record::new("fileLoadingError").with_raw("error", "File \"x\" not found");
        assert_eq!(
            record.encode(),
            "fileLoadingError{error=`File \"x\" not found`}"
        );
    }

    #[test]
    fn raw_with_backtick_falls_back_to_quotes() {
        let record = Record::new("t").with_raw("data", "a`b");
        assert_eq!(record.encode(), r#"t{data="a`b"}"#);
    }

    #[test]
    fn multiline_raw_falls_back_to_quotes() {
        let record = Record::new("t").with_raw("error", "line one\nline two");
        assert_eq!(record.encode(), r#"t{error="line one\nline two"}"#);
    }

    #[test]
    fn unsafe_bare_token_is_quoted() {
        let record = Record::new("t").with_bare("id", "has space").with_bare("e", "");
        assert_eq!(record.encode(), r#"t{id="has space",e=""}"#);
    }

    #[test]
    fn flags_are_presence_only() {
        let off = Record::new("k").with_flag("ctrlKey", false);
        let on = Record::new("k").with_flag("ctrlKey", true);
        assert_eq!(off.encode(), "k{}");
        assert_eq!(on.encode(), "k{ctrlKey=1}");
    }

    #[test]
    fn optional_text_is_omitted_when_empty() {
        let record = Record::new("k")
            .with_opt_text("key", Some(""))
            .with_opt_text("code", None::<String>)
            .with_opt_text("lang", Some("en"));
        assert_eq!(record.encode(), r#"k{lang="en"}"#);
    }

    #[test]
    fn floats_use_shortest_form() {
        let record = Record::new("f")
            .with_float("a", 2.0)
            .with_float("b", 1.25)
            .with_float("c", -0.0)
            .with_float("d", f64::NAN);
        assert_eq!(record.encode(), "f{a=2,b=1.25,c=0,d=NaN}");
    }

    #[test]
    fn nested_records_and_lists() {
        let files = vec![
            Value::Record(
                Record::anonymous()
                    .with_text("name", "a.txt")
                    .with_int("size", 3),
            ),
            Value::Record(
                Record::anonymous()
                    .with_text("name", "b.txt")
                    .with_int("size", 5),
            ),
        ];
        let record = Record::new("fileSelected")
            .with_bare("id", "picker")
            .with_list("files", files);
        assert_eq!(
            record.encode(),
            r#"fileSelected{id=picker,files=[_{name="a.txt",size=3},_{name="b.txt",size=5}]}"#
        );
    }

    #[test]
    fn quoted_field_names() {
        let storage = Record::anonymous().with_text("my key", "v");
        let record = Record::new("startSession").with_record("storage", storage);
        assert_eq!(record.encode(), r#"startSession{storage=_{"my key"="v"}}"#);
    }

    #[test]
    fn encoded_text_has_no_raw_newlines() {
        let record = Record::new("t").with_text("a", "x\ny");
        assert!(!record.encode().contains('\n'));
    }

    #[test]
    fn accessors() {
        let record = Record::new("t")
            .with_text("a", "x")
            .with_record("r", Record::new("sub"))
            .with_list("l", vec![Value::Bare("q".to_owned())]);
        assert_eq!(record.text("a"), Some("x"));
        assert_eq!(record.record("r").map(Record::tag), Some("sub"));
        assert_eq!(record.list("l").map(<[Value]>::len), Some(1));
        assert!(record.contains("a"));
        assert_eq!(record.text("missing"), None);
    }
}
