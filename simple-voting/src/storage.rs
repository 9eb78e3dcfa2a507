use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::{AccountId, BorshStorageKey};

pub type QuestionId = u64;

/// Position of an answer in `Question::possible_answers`: 0 or 1.
pub type AnswerIndex = u8;

/// Number of answers every question carries.
pub const ANSWERS_NUM: usize = 2;

/// Helper structure for keys of the persistent collections.
#[derive(BorshSerialize, BorshStorageKey)]
pub enum StorageKey {
    Questions,
    Votes,
}

/// Binary-choice question as persisted in the ledger. All fields except `vote_counts` are
/// set once, at creation.
#[derive(BorshDeserialize, BorshSerialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
pub struct Question {
    pub question: String,
    pub created_by: AccountId,
    pub possible_answers: (String, String),
    pub image: Option<String>,
    /// tally per answer slot, kept equal to the number of active votes for that slot.
    pub vote_counts: [u64; ANSWERS_NUM],
}

impl Question {
    pub fn new(
        created_by: AccountId,
        question: String,
        answer0: String,
        answer1: String,
        image: Option<String>,
    ) -> Self {
        Self {
            question,
            created_by,
            possible_answers: (answer0, answer1),
            image,
            vote_counts: [0; ANSWERS_NUM],
        }
    }

    pub fn into_view(self, id: QuestionId) -> QuestionView {
        QuestionView {
            id,
            question: self.question,
            created_by: self.created_by,
            possible_answers: self.possible_answers,
            image: self.image,
            vote_counts: self.vote_counts,
        }
    }
}

/// JSON representation of a question returned by the contract queries.
#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct QuestionView {
    pub id: QuestionId,
    pub question: String,
    pub created_by: AccountId,
    pub possible_answers: (String, String),
    pub image: Option<String>,
    pub vote_counts: [u64; ANSWERS_NUM],
}

/// Per (question, voter) record. A cleared vote keeps its record with `has_voted = false`.
#[derive(BorshDeserialize, BorshSerialize, Clone, Copy)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct VoteRecord {
    pub has_voted: bool,
    /// meaningful only when `has_voted` is true.
    pub choice: AnswerIndex,
}

impl VoteRecord {
    pub fn active(choice: AnswerIndex) -> Self {
        Self {
            has_voted: true,
            choice,
        }
    }

    /// Returns the current choice, or None if the vote is not active.
    pub fn choice(&self) -> Option<AnswerIndex> {
        if self.has_voted {
            Some(self.choice)
        } else {
            None
        }
    }
}

/// Effect of a successful `vote` call.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub enum VoteChange {
    /// voter had no active vote, a new one was recorded.
    Cast,
    /// vote moved away from the `from` answer.
    Changed { from: AnswerIndex },
    /// voter already voted for the same answer, nothing changed.
    Unchanged,
}
