use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::{env, near_bindgen, AccountId, PanicOnDefault};

pub use crate::constants::*;
pub use crate::errors::*;
pub use crate::ledger::VotingLedger;
pub use crate::storage::*;

mod constants;
mod errors;
pub mod events;
mod ledger;
mod storage;

#[near_bindgen]
#[derive(BorshDeserialize, BorshSerialize, PanicOnDefault)]
pub struct Contract {
    /// questions and votes. The only ledger instance of the contract.
    pub ledger: VotingLedger,
}

// Implement the contract structure
#[near_bindgen]
impl Contract {
    #[init]
    pub fn new() -> Self {
        Self {
            ledger: VotingLedger::new(),
        }
    }

    /**********
     * QUERIES
     **********/

    /// Returns the question with its current vote counts.
    /// Panics with "Invalid question" if the question doesn't exist.
    #[handle_result]
    pub fn get_question(&self, question_id: QuestionId) -> Result<QuestionView, VotingError> {
        Ok(self.ledger.question(question_id)?.into_view(question_id))
    }

    pub fn get_questions_count(&self) -> u64 {
        self.ledger.questions_count()
    }

    /// Lists questions in creation order.
    /// If `from_index` is not specified, listing starts from the first question.
    /// If limit is not specified, default is used: 100.
    pub fn get_questions(&self, from_index: Option<u64>, limit: Option<u32>) -> Vec<QuestionView> {
        self.ledger.questions(from_index, limit)
    }

    /// Returns true if `voter` has an active vote for the question.
    #[handle_result]
    pub fn has_voted(
        &self,
        question_id: QuestionId,
        voter: AccountId,
    ) -> Result<bool, VotingError> {
        self.ledger.has_voted(question_id, &voter)
    }

    /// Returns the answer index `voter` currently votes for, or None.
    #[handle_result]
    pub fn get_vote(
        &self,
        question_id: QuestionId,
        voter: AccountId,
    ) -> Result<Option<AnswerIndex>, VotingError> {
        self.ledger.vote_of(question_id, &voter)
    }

    /**********
     * TRANSACTIONS
     **********/

    /// Creates a new binary-choice question owned by the caller. Returns the question id.
    /// Content is not validated: checking for empty fields is up to the client.
    pub fn create_question(
        &mut self,
        question: String,
        answer0: String,
        answer1: String,
        image: Option<String>,
    ) -> QuestionId {
        let caller = env::predecessor_account_id();
        let id = self
            .ledger
            .create_question(&caller, question, answer0, answer1, image);
        events::emit_question_created(id, caller);
        id
    }

    /// Votes for `answer` (0 or 1). Caller can change the vote by voting for the other answer.
    /// Voting again for the same answer doesn't change anything.
    /// Panics if the question doesn't exist or the answer index is invalid.
    #[handle_result]
    pub fn vote(
        &mut self,
        question_id: QuestionId,
        answer: AnswerIndex,
    ) -> Result<(), VotingError> {
        let caller = env::predecessor_account_id();
        match self.ledger.vote(&caller, question_id, answer)? {
            VoteChange::Cast => events::emit_vote(caller, question_id, answer, None),
            VoteChange::Changed { from } => {
                events::emit_vote(caller, question_id, answer, Some(from))
            }
            VoteChange::Unchanged => (),
        }
        Ok(())
    }

    /// Withdraws the caller's vote. No-op if the caller has not voted.
    /// Panics if the question doesn't exist.
    #[handle_result]
    pub fn clear_vote(&mut self, question_id: QuestionId) -> Result<(), VotingError> {
        let caller = env::predecessor_account_id();
        if let Some(answer) = self.ledger.clear_vote(&caller, question_id)? {
            events::emit_vote_cleared(caller, question_id, answer);
        }
        Ok(())
    }
}
