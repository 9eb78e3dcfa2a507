use std::fmt;

use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::{env, AccountId};

use crate::constants::{EVENT_STANDARD, EVENT_VERSION};
use crate::{AnswerIndex, QuestionId};

/// Enum that represents the data type of the EventLog.
#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
#[serde(crate = "near_sdk::serde")]
#[non_exhaustive]
pub enum VotingEventKind {
    QuestionCreated(QuestionCreated),
    Vote(Vote),
    VoteCleared(VoteCleared),
}

/// NEP-297 event envelope.
///
/// Arguments:
/// * `standard`: name of the standard, "simple-voting"
/// * `version`: e.g. 1.0.0
/// * `event`: associate event data
#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
#[serde(crate = "near_sdk::serde")]
pub struct Event {
    pub standard: String,
    pub version: String,

    // `flatten` to not have "event": {<VotingEventKind>} in the JSON, just have the contents of {<VotingEventKind>}.
    #[serde(flatten)]
    pub event: VotingEventKind,
}

impl From<VotingEventKind> for Event {
    fn from(event: VotingEventKind) -> Self {
        Self {
            standard: EVENT_STANDARD.to_string(),
            version: EVENT_VERSION.to_string(),
            event,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "EVENT_JSON:{}",
            &serde_json::to_string(self).map_err(|_| fmt::Error)?
        ))
    }
}

fn emit_event(event: VotingEventKind) {
    env::log_str(&Event::from(event).to_string());
}

/// Emitted when a new question is appended.
#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct QuestionCreated {
    pub question_id: QuestionId,
    pub created_by: AccountId,
}

/// Emitted when a vote is cast or moved to the other answer.
/// `previous` is set only when the voter switched the answer.
#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct Vote {
    pub voter: AccountId,
    pub question_id: QuestionId,
    pub answer: AnswerIndex,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<AnswerIndex>,
}

/// Emitted when an active vote is withdrawn. `answer` is the withdrawn choice.
#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct VoteCleared {
    pub voter: AccountId,
    pub question_id: QuestionId,
    pub answer: AnswerIndex,
}

pub(crate) fn emit_question_created(question_id: QuestionId, created_by: AccountId) {
    emit_event(VotingEventKind::QuestionCreated(QuestionCreated {
        question_id,
        created_by,
    }));
}

pub(crate) fn emit_vote(
    voter: AccountId,
    question_id: QuestionId,
    answer: AnswerIndex,
    previous: Option<AnswerIndex>,
) {
    emit_event(VotingEventKind::Vote(Vote {
        voter,
        question_id,
        answer,
        previous,
    }));
}

pub(crate) fn emit_vote_cleared(voter: AccountId, question_id: QuestionId, answer: AnswerIndex) {
    emit_event(VotingEventKind::VoteCleared(VoteCleared {
        voter,
        question_id,
        answer,
    }));
}
