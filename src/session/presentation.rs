use crate::models::{Label, Question};

use super::random::{shuffle_in_place, RandomSource};

/// A question as shown to the user: choices in display order, with the
/// display slot that holds the correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    question: Question,
    /// Canonical label of the choice shown in each display slot A-D.
    order: [Label; 4],
    correct_display_label: Label,
}

impl Presentation {
    /// Lays out `question`'s choices, permuted with `rng` when `shuffle` is
    /// set. Each call draws a fresh permutation.
    pub fn build<R: RandomSource + ?Sized>(question: &Question, shuffle: bool, rng: &mut R) -> Self {
        Self::with_order(question, choice_order(shuffle, rng))
    }

    fn with_order(question: &Question, order: [Label; 4]) -> Self {
        let correct = question.correct_label();
        let correct_display_label = Label::ALL
            .into_iter()
            .zip(order)
            .find(|(_, canonical)| *canonical == correct)
            .map_or(correct, |(display, _)| display);

        Self {
            question: question.clone(),
            order,
            correct_display_label,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    /// `(display label, text)` pairs in display order.
    pub fn display_choices(&self) -> impl Iterator<Item = (Label, &str)> {
        Label::ALL
            .into_iter()
            .zip(self.order)
            .map(|(display, canonical)| (display, self.question.choices.get(canonical)))
    }

    pub fn display_text(&self, display: Label) -> &str {
        self.question.choices.get(self.canonical_label(display))
    }

    pub fn canonical_label(&self, display: Label) -> Label {
        self.order[display.index()]
    }

    pub fn correct_display_label(&self) -> Label {
        self.correct_display_label
    }

    /// The answer text to show in feedback. Always consistent with the
    /// correct display slot unless the bank supplied an override.
    pub fn correct_text(&self) -> &str {
        match &self.question.answer.text {
            Some(text) => text,
            None => self.display_text(self.correct_display_label),
        }
    }

    pub fn feedback_for(&self, chosen: Label) -> Feedback {
        Feedback {
            correct: chosen == self.correct_display_label,
            chosen,
            correct_display_label: self.correct_display_label,
            correct_text: self.correct_text().to_string(),
        }
    }
}

/// The permutation alone: display slot `i` shows canonical choice `order[i]`.
pub fn choice_order<R: RandomSource + ?Sized>(shuffle: bool, rng: &mut R) -> [Label; 4] {
    let mut order = Label::ALL;
    if shuffle {
        shuffle_in_place(&mut order, rng);
    }
    order
}

/// Outcome of one submitted answer, kept for display until the run advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub chosen: Label,
    pub correct_display_label: Label,
    pub correct_text: String,
}

impl Feedback {
    pub fn message(&self) -> String {
        if self.correct {
            format!(
                "Correct! (Answer: {}. {})",
                self.correct_display_label, self.correct_text
            )
        } else {
            format!(
                "Incorrect. Correct answer: {}. {}",
                self.correct_display_label, self.correct_text
            )
        }
    }
}
