//! Scored multiple-choice quiz for the test phase

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PASS_THRESHOLD;

/// One selectable answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    /// Stable identifier ("a", "b", ...)
    pub tag: &'static str,
    pub text: &'static str,
    pub correct: bool,
}

/// A quiz question (content, immutable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub scenario: &'static str,
    pub prompt: &'static str,
    pub options: &'static [AnswerOption],
    pub explanation: &'static str,
}

impl Question {
    /// Tag of the option flagged correct (the first one, if content is malformed)
    pub fn correct_tag(&self) -> Option<&'static str> {
        self.options.iter().find(|o| o.correct).map(|o| o.tag)
    }

    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.correct).count()
    }

    pub fn is_correct(&self, tag: &str) -> bool {
        self.correct_tag() == Some(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub passed: bool,
}

/// Per-question feedback shown after submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub index: usize,
    pub selected: Option<String>,
    pub correct_tag: Option<&'static str>,
    pub is_correct: bool,
    pub explanation: &'static str,
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    questions: &'static [Question],
    answers: Vec<Option<String>>,
    cursor: usize,
    result: Option<QuizResult>,
    pass_threshold: usize,
}

impl QuizEngine {
    pub fn new(questions: &'static [Question]) -> Self {
        Self::with_threshold(questions, DEFAULT_PASS_THRESHOLD)
    }

    pub fn with_threshold(questions: &'static [Question], pass_threshold: usize) -> Self {
        Self {
            questions,
            answers: vec![None; questions.len()],
            cursor: 0,
            result: None,
            pass_threshold,
        }
    }

    pub fn questions(&self) -> &'static [Question] {
        self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn pass_threshold(&self) -> usize {
        self.pass_threshold
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        self.questions.get(self.cursor)
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).and_then(|a| a.as_deref())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }

    /// Whether a submitted quiz met the pass threshold
    pub fn passed(&self) -> bool {
        self.result.is_some_and(|r| r.passed)
    }

    /// Record or overwrite the answer for a question. Out-of-range indices are ignored.
    ///
    /// The engine does not block answers after submission; the UI disables
    /// the options instead.
    pub fn select_answer(&mut self, index: usize, tag: &str) -> bool {
        let Some(slot) = self.answers.get_mut(index) else {
            return false;
        };
        *slot = Some(tag.to_string());
        true
    }

    /// Every question has an answer
    pub fn can_submit(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    /// Count of answers matching the answer key
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.as_deref().is_some_and(|tag| q.is_correct(tag)))
            .count()
    }

    /// Grade the quiz. `None` while any question is unanswered.
    pub fn submit(&mut self) -> Option<QuizResult> {
        if !self.can_submit() {
            return None;
        }
        let score = self.score();
        let result = QuizResult {
            score,
            total: self.questions.len(),
            passed: score >= self.pass_threshold,
        };
        self.result = Some(result);
        Some(result)
    }

    /// Clear answers and submission, back to the first question
    pub fn retry(&mut self) {
        self.answers.iter_mut().for_each(|a| *a = None);
        self.result = None;
        self.cursor = 0;
    }

    /// Jump to a question, clamped to the valid range
    pub fn go_to_question(&mut self, index: usize) {
        self.cursor = index.min(self.questions.len().saturating_sub(1));
    }

    /// Move forward; only allowed once the current question is answered
    pub fn next_question(&mut self) -> bool {
        if self.answer(self.cursor).is_none() || self.cursor + 1 >= self.questions.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn prev_question(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Per-question feedback; only available after submission
    pub fn review(&self) -> Option<Vec<QuestionReview>> {
        self.result?;
        let reviews = self
            .questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(index, (q, a))| QuestionReview {
                index,
                selected: a.clone(),
                correct_tag: q.correct_tag(),
                is_correct: a.as_deref().is_some_and(|tag| q.is_correct(tag)),
                explanation: q.explanation,
            })
            .collect();
        Some(reviews)
    }
}
