//! Structural trace writer.
//!
//! Records every write as a [`Token`]. Used to render the emission order of
//! an encode and to check it in tests.

use chrono::{DateTime, Utc};
use docwire_core::{ObjectId, Value, ValueType, WriteError};
use uuid::Uuid;

use super::{Framing, ValueWriter};

/// One recorded write.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartDocument,
    EndDocument,
    StartArray,
    EndArray,
    Name(String),
    /// A scalar value.
    Value(Value),
}

/// Records writes as a flat token list.
#[derive(Debug, Default)]
pub struct TokenWriter {
    tokens: Vec<Token>,
    framing: Framing,
}

impl TokenWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Names written directly into the top-level document, in order.
    pub fn top_level_names(&self) -> Vec<&str> {
        top_level_names(&self.tokens)
    }

    /// One token per line, indented by nesting depth.
    pub fn render(&self) -> String {
        render_tokens(&self.tokens)
    }

    fn scalar(&mut self, value: Value) -> Result<(), WriteError> {
        self.framing.begin_value(value.value_type())?;
        self.tokens.push(Token::Value(value));
        Ok(())
    }
}

/// Names written directly into the top-level document of `tokens`.
pub fn top_level_names(tokens: &[Token]) -> Vec<&str> {
    let mut depth = 0usize;
    let mut names = Vec::new();
    for token in tokens {
        match token {
            Token::StartDocument | Token::StartArray => depth += 1,
            Token::EndDocument | Token::EndArray => depth = depth.saturating_sub(1),
            Token::Name(name) if depth == 1 => names.push(name.as_str()),
            _ => {}
        }
    }
    names
}

/// Render `tokens` one per line, indented by nesting depth.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for token in tokens {
        if matches!(token, Token::EndDocument | Token::EndArray) {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&"  ".repeat(depth));
        match token {
            Token::StartDocument => out.push('{'),
            Token::EndDocument => out.push('}'),
            Token::StartArray => out.push('['),
            Token::EndArray => out.push(']'),
            Token::Name(name) => {
                out.push_str(name);
                out.push(':');
            }
            Token::Value(value) => {
                out.push_str(&value.to_json().to_string());
                out.push_str(" (");
                out.push_str(value.value_type().as_str());
                out.push(')');
            }
        }
        out.push('\n');
        if matches!(token, Token::StartDocument | Token::StartArray) {
            depth += 1;
        }
    }
    out
}

impl ValueWriter for TokenWriter {
    fn write_start_document(&mut self) -> Result<(), WriteError> {
        self.framing.begin_value(ValueType::Document)?;
        self.framing.push_document();
        self.tokens.push(Token::StartDocument);
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<(), WriteError> {
        self.framing.end_document()?;
        self.tokens.push(Token::EndDocument);
        Ok(())
    }

    fn write_start_array(&mut self) -> Result<(), WriteError> {
        self.framing.begin_value(ValueType::Array)?;
        self.framing.push_array();
        self.tokens.push(Token::StartArray);
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), WriteError> {
        self.framing.end_array()?;
        self.tokens.push(Token::EndArray);
        Ok(())
    }

    fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.framing.name(name)?;
        self.tokens.push(Token::Name(name.to_owned()));
        Ok(())
    }

    fn write_null(&mut self) -> Result<(), WriteError> {
        self.scalar(Value::Null)
    }

    fn write_bool(&mut self, value: bool) -> Result<(), WriteError> {
        self.scalar(Value::Bool(value))
    }

    fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        self.scalar(Value::Int32(value))
    }

    fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        self.scalar(Value::Int64(value))
    }

    fn write_double(&mut self, value: f64) -> Result<(), WriteError> {
        self.scalar(Value::Double(value))
    }

    fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        self.scalar(Value::String(value.to_owned()))
    }

    fn write_object_id(&mut self, value: &ObjectId) -> Result<(), WriteError> {
        self.scalar(Value::ObjectId(*value))
    }

    fn write_date_time(&mut self, value: DateTime<Utc>) -> Result<(), WriteError> {
        self.scalar(Value::DateTime(value))
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), WriteError> {
        self.scalar(Value::Binary(value.to_vec()))
    }

    fn write_uuid(&mut self, value: &Uuid) -> Result<(), WriteError> {
        self.scalar(Value::Uuid(*value))
    }
}
