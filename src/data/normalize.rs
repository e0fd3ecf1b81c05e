//! Normalization of loosely structured question banks.
//!
//! Banks have been written in several shapes over time: a bare list of
//! records, an object with a `questions` list, or an object whose first
//! list-of-objects field holds the records. Field names vary too. Every
//! record is validated on its own; the ones that cannot be resolved are
//! counted and dropped, never repaired.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AnswerKey, Choices, Label, Question};

type Record = Map<String, Value>;

const PROMPT_FIELDS: [&str; 3] = ["question", "prompt", "q"];
const CHOICE_FIELDS: [&str; 3] = ["choices", "options", "answers"];
const ANSWER_FIELDS: [&str; 3] = ["answer", "correct", "correctAnswer"];
const ANSWER_LETTER_FIELDS: [&str; 3] = ["letter", "answer", "choice"];
const QUESTION_NUMBER_FIELDS: [&str; 3] = ["question_number", "questionNumber", "number"];
const IMAGE_FIELDS: [&str; 2] = ["images", "image"];

/// Where the candidate records were found in the decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// The payload itself was a list.
    TopLevelList,
    /// The payload's `questions` field.
    QuestionsField,
    /// The first field holding a non-empty list of objects.
    Field(String),
    /// No list of records anywhere.
    NotFound,
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadSource::TopLevelList => f.write_str("top-level list"),
            PayloadSource::QuestionsField => f.write_str("\"questions\" field"),
            PayloadSource::Field(name) => write!(f, "\"{}\" field", name),
            PayloadSource::NotFound => f.write_str("no record list"),
        }
    }
}

/// Why a single record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("prompt is missing or empty")]
    MissingPrompt,
    #[error("choices do not resolve to four labelled answers")]
    UnresolvableChoices,
    #[error("answer does not name one of A-D")]
    UnresolvableAnswer,
}

/// Bank contents was structurally fine but held no usable question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("no usable questions found in the bank ({skipped} entries skipped)")]
    Empty { skipped: usize },
}

/// Canonical questions plus what was dropped along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
    pub skipped: usize,
    pub source: PayloadSource,
}

impl QuestionBank {
    /// The questions, or [`BankError::Empty`] when none survived validation.
    /// Covers both "no records found" and "all records invalid".
    pub fn require_questions(&self) -> Result<&[Question], BankError> {
        if self.questions.is_empty() {
            return Err(BankError::Empty {
                skipped: self.skipped,
            });
        }
        Ok(&self.questions)
    }
}

/// Candidate records borrowed from the payload.
#[derive(Debug)]
pub struct Payload<'a> {
    pub records: Vec<&'a Record>,
    pub source: PayloadSource,
}

type Extractor = for<'a> fn(&'a Value) -> Option<Payload<'a>>;

/// Tried in order; the first match wins.
const EXTRACTORS: [Extractor; 3] = [top_level_list, questions_field, first_record_list_field];

/// Finds the list of candidate records. Never fails: when nothing matches,
/// the payload is empty with [`PayloadSource::NotFound`].
pub fn extract_payload(data: &Value) -> Payload<'_> {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(data))
        .unwrap_or(Payload {
            records: Vec::new(),
            source: PayloadSource::NotFound,
        })
}

fn top_level_list(data: &Value) -> Option<Payload<'_>> {
    let items = data.as_array()?;
    Some(Payload {
        records: objects_in(items),
        source: PayloadSource::TopLevelList,
    })
}

fn questions_field(data: &Value) -> Option<Payload<'_>> {
    let items = data.as_object()?.get("questions")?.as_array()?;
    Some(Payload {
        records: objects_in(items),
        source: PayloadSource::QuestionsField,
    })
}

fn first_record_list_field(data: &Value) -> Option<Payload<'_>> {
    data.as_object()?.iter().find_map(|(name, value)| {
        let items = value.as_array()?;
        if items.is_empty() || !items.iter().all(Value::is_object) {
            return None;
        }
        Some(Payload {
            records: objects_in(items),
            source: PayloadSource::Field(name.clone()),
        })
    })
}

fn objects_in(items: &[Value]) -> Vec<&Record> {
    items.iter().filter_map(Value::as_object).collect()
}

/// Turns a decoded bank into canonical questions.
pub fn normalize(data: &Value) -> QuestionBank {
    let payload = extract_payload(data);

    let mut questions = Vec::with_capacity(payload.records.len());
    let mut skipped = 0;
    let mut seen_ids = HashSet::new();

    for (index, record) in payload.records.iter().enumerate() {
        match normalize_record(record, index) {
            Ok(question) => {
                if !seen_ids.insert(question.id.clone()) {
                    warn!(id = %question.id, index, "duplicate question id in bank");
                }
                questions.push(question);
            }
            Err(reason) => {
                debug!(index, %reason, "skipping bank entry");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(
            skipped,
            "skipped question entries that didn't match the expected schema"
        );
    }

    QuestionBank {
        questions,
        skipped,
        source: payload.source,
    }
}

/// Validates one record. `index` is its 0-based position in the payload and
/// only feeds positional id synthesis.
pub fn normalize_record(record: &Record, index: usize) -> Result<Question, RecordError> {
    let prompt = first_non_empty_str(record, &PROMPT_FIELDS).ok_or(RecordError::MissingPrompt)?;

    let choices = first_present(record, &CHOICE_FIELDS)
        .and_then(resolve_choices)
        .ok_or(RecordError::UnresolvableChoices)?;

    let answer = first_present(record, &ANSWER_FIELDS)
        .and_then(resolve_answer)
        .ok_or(RecordError::UnresolvableAnswer)?;

    let chapter = record.get("chapter").and_then(parse_count);
    let question_number = first_present(record, &QUESTION_NUMBER_FIELDS).and_then(parse_count);

    Ok(Question {
        id: resolve_id(record, chapter, question_number, index),
        chapter,
        question_number,
        prompt: prompt.to_string(),
        choices,
        answer,
        images: first_present(record, &IMAGE_FIELDS)
            .map(resolve_images)
            .unwrap_or_default(),
    })
}

/// First alias holding something other than `null` or a blank string.
fn first_present<'a>(record: &'a Record, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|value| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
}

fn first_non_empty_str<'a>(record: &'a Record, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| record.get(*field)?.as_str())
        .map(str::trim)
        .find(|text| !text.is_empty())
}

/// Accepts `{"A": .., "b": .., ...}` with all four labels, or a list of at
/// least four non-empty strings mapped to A-D in order.
pub fn resolve_choices(value: &Value) -> Option<Choices> {
    match value {
        Value::Object(map) => {
            let mut texts: [Option<String>; 4] = Default::default();
            for (key, text) in map {
                let (Some(label), Some(text)) = (Label::from_key(key), text.as_str()) else {
                    continue;
                };
                texts[label.index()] = Some(text.trim().to_string());
            }
            let [a, b, c, d] = texts.map(|text| text.filter(|t| !t.is_empty()));
            Some(Choices::new([a?, b?, c?, d?]))
        }
        Value::Array(items) => {
            let mut texts = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
            let choices = [texts.next()?, texts.next()?, texts.next()?, texts.next()?];
            Some(Choices::new(choices))
        }
        _ => None,
    }
}

/// Accepts `"B"` (first character decides) or an object carrying the letter
/// under one of several names plus an optional `text` override.
pub fn resolve_answer(value: &Value) -> Option<AnswerKey> {
    match value {
        Value::String(text) => Some(AnswerKey {
            letter: Label::from_leading_char(text)?,
            text: None,
        }),
        Value::Object(map) => {
            let letter = first_non_empty_str(map, &ANSWER_LETTER_FIELDS)
                .and_then(Label::from_leading_char)?;
            let text = map
                .get("text")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
            Some(AnswerKey { letter, text })
        }
        _ => None,
    }
}

/// Non-negative integer from a number or a numeric string; anything else is
/// treated as absent.
pub fn parse_count(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if number.fract() != 0.0 || number < 0.0 || number > f64::from(u32::MAX) {
        return None;
    }
    Some(number as u32)
}

/// Explicit id verbatim, else `ch{chapter}-q{number:03}`, else the 1-based
/// position as `q{index:04}`. Positional ids follow the source order.
fn resolve_id(
    record: &Record,
    chapter: Option<u32>,
    question_number: Option<u32>,
    index: usize,
) -> String {
    if let Some(id) = record.get("id").and_then(Value::as_str) {
        if !id.trim().is_empty() {
            return id.to_string();
        }
    }
    match (chapter, question_number) {
        (Some(chapter), Some(number)) => format!("ch{}-q{:03}", chapter, number),
        _ => format!("q{:04}", index + 1),
    }
}

fn resolve_images(value: &Value) -> Vec<String> {
    match value {
        Value::String(path) => {
            let path = path.trim();
            if path.is_empty() {
                Vec::new()
            } else {
                vec![path.to_string()]
            }
        }
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
