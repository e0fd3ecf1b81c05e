use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One of the four answer slots, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label {
    A,
    B,
    C,
    D,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::A, Label::B, Label::C, Label::D];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Reads the letter from the first character of `text`, ignoring case
    /// and surrounding whitespace. `"b) four"` resolves to `B`.
    pub fn from_leading_char(text: &str) -> Option<Self> {
        match text.trim().chars().next()?.to_ascii_uppercase() {
            'A' => Some(Label::A),
            'B' => Some(Label::B),
            'C' => Some(Label::C),
            'D' => Some(Label::D),
            _ => None,
        }
    }

    /// Matches a whole map key such as `"a"` or `" D "`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|label| key.eq_ignore_ascii_case(label.as_str()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::A => "A",
            Label::B => "B",
            Label::C => "C",
            Label::D => "D",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four answer texts keyed by canonical label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choices([String; 4]);

impl Choices {
    pub fn new(texts: [String; 4]) -> Self {
        Self(texts)
    }

    pub fn get(&self, label: Label) -> &str {
        &self.0[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, &str)> {
        Label::ALL
            .into_iter()
            .zip(self.0.iter().map(String::as_str))
    }
}

impl Serialize for Choices {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (label, text) in self.iter() {
            map.serialize_entry(label.as_str(), text)?;
        }
        map.end()
    }
}

/// The correct answer, with an optional display override for its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKey {
    pub letter: Label,
    pub text: Option<String>,
}

/// A validated multiple-choice question.
///
/// Serializes to the same shape the bank normalizer reads, so a normalized
/// bank can be written back out and loaded again unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: String,
    pub chapter: Option<u32>,
    pub question_number: Option<u32>,
    #[serde(rename = "question")]
    pub prompt: String,
    pub choices: Choices,
    pub answer: AnswerKey,
    pub images: Vec<String>,
}

impl Question {
    pub fn correct_label(&self) -> Label {
        self.answer.letter
    }

    /// Text shown for the correct answer: the override if the bank gave one,
    /// otherwise the choice under the correct label.
    pub fn correct_text(&self) -> &str {
        self.answer
            .text
            .as_deref()
            .unwrap_or_else(|| self.choices.get(self.answer.letter))
    }

    /// `"Chapter 3 • Q12"`, or the id when neither number is known.
    pub fn meta_line(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(chapter) = self.chapter {
            parts.push(format!("Chapter {}", chapter));
        }
        if let Some(number) = self.question_number {
            parts.push(format!("Q{}", number));
        }
        if parts.is_empty() {
            return self.id.clone();
        }
        parts.join(" • ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: "ch2-q007".to_string(),
            chapter: Some(2),
            question_number: Some(7),
            prompt: "2+2?".to_string(),
            choices: Choices::new(["3".into(), "4".into(), "5".into(), "6".into()]),
            answer: AnswerKey {
                letter: Label::B,
                text: None,
            },
            images: Vec::new(),
        }
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(Label::from_leading_char(" b "), Some(Label::B));
        assert_eq!(Label::from_leading_char("D) six"), Some(Label::D));
        assert_eq!(Label::from_leading_char("E"), None);
        assert_eq!(Label::from_leading_char("   "), None);

        assert_eq!(Label::from_key("c"), Some(Label::C));
        assert_eq!(Label::from_key(" A "), Some(Label::A));
        assert_eq!(Label::from_key("AB"), None);
    }

    #[test]
    fn test_correct_text_falls_back_to_choice() {
        let mut question = sample();
        assert_eq!(question.correct_text(), "4");

        question.answer.text = Some("Four".to_string());
        assert_eq!(question.correct_text(), "Four");
    }

    #[test]
    fn test_meta_line() {
        let mut question = sample();
        assert_eq!(question.meta_line(), "Chapter 2 • Q7");

        question.chapter = None;
        assert_eq!(question.meta_line(), "Q7");

        question.question_number = None;
        assert_eq!(question.meta_line(), "ch2-q007");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["question"], "2+2?");
        assert_eq!(json["choices"]["B"], "4");
        assert_eq!(json["answer"]["letter"], "B");
        assert!(json["answer"]["text"].is_null());
    }
}
