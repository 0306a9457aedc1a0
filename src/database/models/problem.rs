use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::ProblemType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub prompt: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub problem_type: ProblemType,
    pub answer_text: Option<String>,
    pub explanation: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOption {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub problem_id: Uuid,
    pub label: String,
    pub position: i32,
    pub is_correct: bool,
}

/// A validated problem ready to be written. Which fields exist depends on the kind,
/// so text problems cannot carry options and choice problems cannot carry a model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProblem {
    pub title: String,
    pub prompt: String,
    pub explanation: Option<String>,
    pub body: ProblemBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProblemBody {
    Text { answer: String },
    SingleChoice { options: Vec<NewOption> },
    MultipleChoice { options: Vec<NewOption> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOption {
    pub label: String,
    pub is_correct: bool,
}

impl NewProblem {
    pub fn problem_type(&self) -> ProblemType {
        match self.body {
            ProblemBody::Text { .. } => ProblemType::Text,
            ProblemBody::SingleChoice { .. } => ProblemType::SingleChoice,
            ProblemBody::MultipleChoice { .. } => ProblemType::MultipleChoice,
        }
    }

    pub fn answer_text(&self) -> Option<&str> {
        match &self.body {
            ProblemBody::Text { answer } => Some(answer),
            _ => None,
        }
    }

    /// Options in display order; empty for text problems
    pub fn options(&self) -> &[NewOption] {
        match &self.body {
            ProblemBody::Text { .. } => &[],
            ProblemBody::SingleChoice { options } | ProblemBody::MultipleChoice { options } => options,
        }
    }
}
