//! Plain-text encoding of the entities lump.
//!
//! ## Format
//!
//! ```text
//! {
//! "classname" "worldspawn"
//! "message" "Arena"
//! }
//! {
//! "classname" "light"
//! }
//! \0
//! ```
//!
//! One brace-delimited block per entity, one `"key" "value"` line per field
//! in field order, and a single trailing NUL. Strings have no escape syntax,
//! so a key or value containing `"` or NUL cannot be written.
//!
//! Parsing is more lenient than writing: any ASCII whitespace may separate
//! tokens, `//` comments run to end of line, and trailing NULs are ignored.
//! Encoding a parsed lump reproduces the writer's canonical bytes exactly.

use std::io::Write;

use crate::error::{EntityError, Result};
use crate::store::Entity;

/// Byte-level grammar for the entities lump.
pub trait EntityEncoder {
    /// Write `entities` in order.
    fn encode(&self, entities: &[Entity], writer: &mut dyn Write) -> Result<()>;

    /// Exact encoded size, if cheap to compute.
    fn encoded_size(&self, _entities: &[Entity]) -> Option<usize> {
        None
    }
}

/// The text entity format described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEntityCodec;

impl TextEntityCodec {
    pub fn new() -> Self {
        Self
    }

    /// Parse an entities lump.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<Entity>> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            EntityError::InvalidFormat(format!("invalid UTF-8 at byte {}", e.valid_up_to()))
        })?;
        let mut tokens = Tokenizer::new(text);
        let mut entities = Vec::new();

        while let Some((offset, token)) = tokens.next_token()? {
            if token != Token::Open {
                return Err(EntityError::InvalidFormat(format!(
                    "expected '{{' at byte {}",
                    offset
                )));
            }
            let mut pairs: Vec<(&str, &str)> = Vec::new();
            loop {
                match tokens.next_token()? {
                    Some((_, Token::Close)) => break,
                    Some((_, Token::Str(key))) => match tokens.next_token()? {
                        Some((_, Token::Str(value))) => pairs.push((key, value)),
                        Some((offset, _)) => {
                            return Err(EntityError::InvalidFormat(format!(
                                "expected value for key '{}' at byte {}",
                                key, offset
                            )))
                        }
                        None => {
                            return Err(EntityError::InvalidFormat(format!(
                                "missing value for key '{}' at end of lump",
                                key
                            )))
                        }
                    },
                    Some((offset, Token::Open)) => {
                        return Err(EntityError::InvalidFormat(format!(
                            "unexpected '{{' at byte {}",
                            offset
                        )))
                    }
                    None => {
                        return Err(EntityError::InvalidFormat(
                            "unterminated entity at end of lump".into(),
                        ))
                    }
                }
            }
            entities.push(Entity::from_pairs(pairs));
        }

        tracing::debug!("parsed {} entities from {} bytes", entities.len(), bytes.len());
        Ok(entities)
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self, entities: &[Entity]) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_size(entities).unwrap_or(0));
        self.encode(entities, &mut buf)?;
        Ok(buf)
    }
}

fn check_encodable(entity: usize, key: &str, s: &str) -> Result<()> {
    if s.contains('"') {
        return Err(EntityError::Unencodable {
            entity,
            key: key.to_string(),
            reason: "contains a double quote",
        });
    }
    if s.contains('\0') {
        return Err(EntityError::Unencodable {
            entity,
            key: key.to_string(),
            reason: "contains a NUL byte",
        });
    }
    Ok(())
}

impl EntityEncoder for TextEntityCodec {
    fn encode(&self, entities: &[Entity], writer: &mut dyn Write) -> Result<()> {
        for (index, entity) in entities.iter().enumerate() {
            writer.write_all(b"{\n")?;
            for (key, value) in entity.iter() {
                check_encodable(index, key.as_str(), key.as_str())?;
                check_encodable(index, key.as_str(), value)?;
                writer.write_all(b"\"")?;
                writer.write_all(key.as_str().as_bytes())?;
                writer.write_all(b"\" \"")?;
                writer.write_all(value.as_bytes())?;
                writer.write_all(b"\"\n")?;
            }
            writer.write_all(b"}\n")?;
        }
        writer.write_all(&[0u8])?;
        Ok(())
    }

    fn encoded_size(&self, entities: &[Entity]) -> Option<usize> {
        // "{\n" + "}\n" per entity, `"k" "v"\n` (6 framing bytes) per field, NUL.
        let body: usize = entities
            .iter()
            .map(|e| 4 + e.iter().map(|(k, v)| k.len() + v.len() + 6).sum::<usize>())
            .sum();
        Some(body + 1)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Str(&'a str),
}

struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn skip_trivia(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c | 0 => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Next token with its byte offset, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<(usize, Token<'a>)>> {
        self.skip_trivia();
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let Some(&b) = bytes.get(start) else {
            return Ok(None);
        };
        match b {
            b'{' => {
                self.pos += 1;
                Ok(Some((start, Token::Open)))
            }
            b'}' => {
                self.pos += 1;
                Ok(Some((start, Token::Close)))
            }
            b'"' => {
                let body = start + 1;
                let len = bytes[body..]
                    .iter()
                    .position(|&c| c == b'"')
                    .ok_or_else(|| {
                        EntityError::InvalidFormat(format!("unterminated string at byte {}", start))
                    })?;
                self.pos = body + len + 1;
                Ok(Some((start, Token::Str(&self.text[body..body + len]))))
            }
            _ => Err(EntityError::InvalidFormat(format!(
                "unexpected character {:?} at byte {}",
                self.text[start..].chars().next().unwrap_or('\u{fffd}'),
                start
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entity> {
        vec![
            Entity::from_pairs([("classname", "worldspawn"), ("message", "The Longest Yard")]),
            Entity::from_pairs([("classname", "light"), ("origin", "0 0 64"), ("light", "300")]),
            Entity::new(),
        ]
    }

    #[test]
    fn test_encode_layout() {
        let bytes = TextEntityCodec.to_bytes(&sample()[..2]).unwrap();
        let expected = "{\n\"classname\" \"worldspawn\"\n\"message\" \"The Longest Yard\"\n}\n\
                        {\n\"classname\" \"light\"\n\"origin\" \"0 0 64\"\n\"light\" \"300\"\n}\n\0";
        assert_eq!(bytes, expected.as_bytes());
    }

    #[test]
    fn test_encoded_size_matches() {
        let entities = sample();
        let bytes = TextEntityCodec.to_bytes(&entities).unwrap();
        assert_eq!(TextEntityCodec.encoded_size(&entities), Some(bytes.len()));
    }

    #[test]
    fn test_parse_canonical_roundtrip() {
        let entities = sample();
        let bytes = TextEntityCodec.to_bytes(&entities).unwrap();
        let parsed = TextEntityCodec.parse(&bytes).unwrap();
        assert_eq!(parsed, entities);
        assert_eq!(TextEntityCodec.to_bytes(&parsed).unwrap(), bytes);
    }

    #[test]
    fn test_parse_lenient_whitespace_and_comments() {
        let text = b"// map header\r\n{ \"classname\"\t\"worldspawn\" }\n\n{\n  \"ClassName\" \"info_player_start\" // spawn\n\"angle\" \"90\"}\0\0";
        let parsed = TextEntityCodec.parse(text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].get("classname"), Some("worldspawn"));
        assert_eq!(parsed[1].get("classname"), Some("info_player_start"));
        assert_eq!(parsed[1].key("classname").unwrap().as_str(), "ClassName");
        assert_eq!(parsed[1].get("angle"), Some("90"));
    }

    #[test]
    fn test_parse_empty_lump() {
        assert!(TextEntityCodec.parse(b"").unwrap().is_empty());
        assert!(TextEntityCodec.parse(b"\0").unwrap().is_empty());
        assert_eq!(TextEntityCodec.to_bytes(&[]).unwrap(), b"\0");
    }

    #[test]
    fn test_parse_values_keep_inner_whitespace() {
        let parsed = TextEntityCodec.parse(b"{\"message\" \"  two  spaces \"}").unwrap();
        assert_eq!(parsed[0].get("message"), Some("  two  spaces "));
    }

    #[test]
    fn test_parse_errors() {
        let cases: &[(&[u8], &str)] = &[
            (b"\"classname\" \"light\"", "expected '{' at byte 0"),
            (b"{ \"classname\" }", "expected value for key 'classname'"),
            (b"{ \"classname\"", "missing value for key 'classname'"),
            (b"{ \"classname\" \"light\"", "unterminated entity"),
            (b"{ { }", "unexpected '{' at byte 2"),
            (b"{ \"classname \"light\" }", "unexpected character 'l'"),
            (b"{ \"classname\" \"light }", "unterminated string at byte 14"),
            (b"{ \xff }", "invalid UTF-8 at byte 2"),
        ];
        for (input, needle) in cases {
            let err = TextEntityCodec.parse(input).unwrap_err();
            assert!(
                err.to_string().contains(needle),
                "input {:?}: unexpected error: {}",
                String::from_utf8_lossy(input),
                err
            );
        }
    }

    #[test]
    fn test_encode_rejects_quotes() {
        let mut entity = Entity::from_pairs([("classname", "worldspawn")]);
        entity.set("message", "say \"hi\"");
        let err = TextEntityCodec.to_bytes(&[Entity::new(), entity]).unwrap_err();
        match err {
            EntityError::Unencodable { entity, key, .. } => {
                assert_eq!(entity, 1);
                assert_eq!(key, "message");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
