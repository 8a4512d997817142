use super::Chord;
use crate::error::{CaptureError, Result};
use crate::events::{KeyCode, Modifiers};
use crate::mappings::KeyNames;

/// Разделитель токенов в описании сочетания
pub const DELIMITER: char = '+';

/// Разобрать текстовое описание сочетания вида `ctrl+shift+k`.
///
/// Токены регистронезависимы, пробелы вокруг них игнорируются. Требуется ровно
/// одна основная клавиша и любое число различных модификаторов.
pub fn parse_chord(spec: &str) -> Result<Chord> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(CaptureError::invalid_chord(spec, "пустое описание"));
    }

    let mut modifiers = Modifiers::new();
    let mut key: Option<KeyCode> = None;

    for raw in trimmed.split(DELIMITER) {
        let token = raw.trim();
        if token.is_empty() {
            return Err(CaptureError::invalid_chord(spec, "пустой токен"));
        }

        let code = KeyNames::lookup(token).ok_or_else(|| {
            CaptureError::invalid_chord(spec, format!("неизвестная клавиша '{}'", token))
        })?;

        match code.modifier() {
            Some(modifier) => {
                if !modifiers.insert(modifier) {
                    return Err(CaptureError::invalid_chord(
                        spec,
                        format!("модификатор '{}' указан повторно", modifier.name()),
                    ));
                }
            }
            None => {
                if let Some(previous) = key {
                    return Err(CaptureError::invalid_chord(
                        spec,
                        format!("больше одной основной клавиши ('{}' и '{}')", previous, code),
                    ));
                }
                key = Some(code);
            }
        }
    }

    let key = key.ok_or_else(|| CaptureError::invalid_chord(spec, "нет основной клавиши"))?;
    Chord::new(modifiers, key)
        .ok_or_else(|| CaptureError::invalid_chord(spec, "основная клавиша является модификатором"))
}
