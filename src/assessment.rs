//! Adaptive symptom questionnaire.
//!
//! Narrows the disease taxonomy with yes/no questions. Each question is the
//! unasked symptom shared by the most remaining candidate diseases (greedy
//! maximum coverage). The session ends when one candidate is left, no
//! unasked symptom remains, or the question budget is spent.
//!
//! Iteration order is taxonomy order (`Normal` first), so ties and
//! ambiguous endings resolve to the earliest declared disease.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::taxonomy::{DiseaseProfile, DiseaseTaxonomy, NORMAL};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("No question is pending; the assessment has already finished")]
    InvalidAnswerState,
    #[error("Nothing to go back to; no question has been answered yet")]
    RewindUnavailable,
}

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

/// Outcome of a finished questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Symptoms answered "yes", in the order they were asked.
    pub symptoms: Vec<String>,
    pub predicted_disease: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub symptom: String,
    /// 1-based position of this question.
    pub number: usize,
    pub budget: usize,
}

/// What the caller should show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssessmentStep {
    Question(Question),
    Complete(AssessmentResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnsweredQuestion {
    pub symptom: String,
    pub has_symptom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    AwaitingAnswer { current: String },
    Terminated { result: AssessmentResult },
}

/// One questionnaire run over a shared, immutable taxonomy.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    taxonomy: Arc<DiseaseTaxonomy>,
    budget: usize,
    /// Indices into `taxonomy.diseases()`, kept in taxonomy order.
    candidates: Vec<usize>,
    history: Vec<AnsweredQuestion>,
    state: SessionState,
}

impl Questionnaire {
    /// Starts a session with the default budget and computes the first question.
    pub fn start(taxonomy: Arc<DiseaseTaxonomy>) -> Self {
        Self::with_budget(taxonomy, config::QUESTION_BUDGET)
    }

    pub fn with_budget(taxonomy: Arc<DiseaseTaxonomy>, budget: usize) -> Self {
        let candidates = (0..taxonomy.diseases().len()).collect();
        let mut session = Self {
            taxonomy,
            budget,
            candidates,
            history: Vec::new(),
            // Replaced by `settle` below.
            state: SessionState::Terminated {
                result: AssessmentResult {
                    symptoms: Vec::new(),
                    predicted_disease: NORMAL.to_string(),
                },
            },
        };
        session.settle();
        session
    }

    /// The step the session is currently at.
    pub fn step(&self) -> AssessmentStep {
        match &self.state {
            SessionState::AwaitingAnswer { current } => AssessmentStep::Question(Question {
                symptom: current.clone(),
                number: self.history.len() + 1,
                budget: self.budget,
            }),
            SessionState::Terminated { result } => AssessmentStep::Complete(result.clone()),
        }
    }

    pub fn current_symptom(&self) -> Option<&str> {
        match &self.state {
            SessionState::AwaitingAnswer { current } => Some(current),
            SessionState::Terminated { .. } => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, SessionState::Terminated { .. })
    }

    /// Final result, once terminated.
    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.state {
            SessionState::Terminated { result } => Some(result),
            SessionState::AwaitingAnswer { .. } => None,
        }
    }

    /// Diseases still consistent with every answer.
    pub fn candidates(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .map(|&i| self.taxonomy.diseases()[i].name.as_str())
            .collect()
    }

    pub fn asked_symptoms(&self) -> Vec<&str> {
        self.history.iter().map(|a| a.symptom.as_str()).collect()
    }

    pub fn confirmed_symptoms(&self) -> Vec<String> {
        self.history
            .iter()
            .filter(|a| a.has_symptom)
            .map(|a| a.symptom.clone())
            .collect()
    }

    pub fn history(&self) -> &[AnsweredQuestion] {
        &self.history
    }

    /// Records the answer to the pending question and moves to the next step.
    pub fn answer(&mut self, has_symptom: bool) -> Result<AssessmentStep, AssessmentError> {
        let symptom = match &self.state {
            SessionState::AwaitingAnswer { current } => current.clone(),
            SessionState::Terminated { .. } => return Err(AssessmentError::InvalidAnswerState),
        };

        tracing::debug!(symptom = %symptom, has_symptom, "Assessment answer");
        self.apply(&symptom, has_symptom);
        self.history.push(AnsweredQuestion {
            symptom,
            has_symptom,
        });
        self.settle();
        Ok(self.step())
    }

    /// Undoes the most recent answer.
    ///
    /// Candidates are rebuilt from the full taxonomy by replaying the
    /// remaining answers. Also reopens a terminated session.
    pub fn previous(&mut self) -> Result<AssessmentStep, AssessmentError> {
        let undone = self
            .history
            .pop()
            .ok_or(AssessmentError::RewindUnavailable)?;
        tracing::debug!(symptom = %undone.symptom, "Assessment rewind");

        self.candidates = (0..self.taxonomy.diseases().len()).collect();
        let replay = std::mem::take(&mut self.history);
        for answered in &replay {
            self.apply(&answered.symptom, answered.has_symptom);
        }
        self.history = replay;
        self.settle();
        Ok(self.step())
    }

    // ───────────────────────────────────────
    // Internals
    // ───────────────────────────────────────

    fn profile(&self, index: usize) -> &DiseaseProfile {
        &self.taxonomy.diseases()[index]
    }

    fn apply(&mut self, symptom: &str, has_symptom: bool) {
        let diseases = self.taxonomy.diseases();
        self.candidates
            .retain(|&i| diseases[i].has_symptom(symptom) == has_symptom);
    }

    /// Picks the next question or terminates.
    fn settle(&mut self) {
        self.state = match self.next_symptom() {
            Some(current) => SessionState::AwaitingAnswer { current },
            None => {
                let result = AssessmentResult {
                    symptoms: self.confirmed_symptoms(),
                    predicted_disease: self.predict(),
                };
                tracing::info!(
                    predicted = %result.predicted_disease,
                    questions = self.history.len(),
                    remaining_candidates = self.candidates.len(),
                    "Assessment complete"
                );
                SessionState::Terminated { result }
            }
        };
    }

    fn next_symptom(&self) -> Option<String> {
        if self.candidates.len() == 1 || self.history.len() >= self.budget {
            return None;
        }

        let asked: HashSet<&str> = self.history.iter().map(|a| a.symptom.as_str()).collect();
        let mut considered: HashSet<&str> = HashSet::new();
        let mut best: Option<(&str, usize)> = None;

        for &i in &self.candidates {
            for symptom in &self.profile(i).symptoms {
                let symptom = symptom.as_str();
                if asked.contains(symptom) || !considered.insert(symptom) {
                    continue;
                }
                let coverage = self
                    .candidates
                    .iter()
                    .filter(|&&j| self.profile(j).has_symptom(symptom))
                    .count();
                // Strictly greater keeps the first maximal symptom.
                if best.map_or(true, |(_, top)| coverage > top) {
                    best = Some((symptom, coverage));
                }
            }
        }

        best.map(|(symptom, _)| symptom.to_string())
    }

    /// Sole candidate, else the first remaining, else `Normal`.
    fn predict(&self) -> String {
        self.candidates
            .first()
            .map(|&i| self.profile(i).name.clone())
            .unwrap_or_else(|| NORMAL.to_string())
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
