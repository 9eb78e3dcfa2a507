use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::collections::{LookupMap, Vector};
use near_sdk::{env, require, AccountId};

use crate::constants::MAX_LIMIT;
use crate::errors::VotingError;
use crate::storage::*;

/// Questions and per (question, voter) vote records.
/// Every mutation takes the caller explicitly: the ledger never looks at the transaction
/// context. All checks are done before the first write, so a failed call leaves the state
/// untouched.
#[derive(BorshDeserialize, BorshSerialize)]
pub struct VotingLedger {
    /// question id is the position in the vector.
    questions: Vector<Question>,
    votes: LookupMap<(QuestionId, AccountId), VoteRecord>,
}

impl Default for VotingLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl VotingLedger {
    pub fn new() -> Self {
        Self {
            questions: Vector::new(StorageKey::Questions),
            votes: LookupMap::new(StorageKey::Votes),
        }
    }

    /**********
     * MUTATIONS
     **********/

    /// Appends a new question created by `caller` and returns its id.
    pub fn create_question(
        &mut self,
        caller: &AccountId,
        question: String,
        answer0: String,
        answer1: String,
        image: Option<String>,
    ) -> QuestionId {
        let id = self.questions.len();
        self.questions.push(&Question::new(
            caller.clone(),
            question,
            answer0,
            answer1,
            image,
        ));
        id
    }

    /// Records `voter`'s choice. Voting again for the current choice is a no-op, voting for
    /// the other answer moves the vote.
    pub fn vote(
        &mut self,
        voter: &AccountId,
        question_id: QuestionId,
        answer: AnswerIndex,
    ) -> Result<VoteChange, VotingError> {
        let mut q = self.get(question_id)?;
        if answer as usize >= ANSWERS_NUM {
            return Err(VotingError::InvalidAnswerIndex);
        }
        let key = (question_id, voter.clone());
        let change = match self.votes.get(&key).and_then(|r| r.choice()) {
            Some(current) if current == answer => return Ok(VoteChange::Unchanged),
            Some(current) => {
                q.vote_counts[current as usize] -= 1;
                VoteChange::Changed { from: current }
            }
            None => VoteChange::Cast,
        };
        q.vote_counts[answer as usize] += 1;
        self.votes.insert(&key, &VoteRecord::active(answer));
        self.questions.replace(question_id, &q);
        Ok(change)
    }

    /// Withdraws `voter`'s active vote and returns the withdrawn choice.
    /// Returns `None`, without changing anything, if there was no active vote.
    pub fn clear_vote(
        &mut self,
        voter: &AccountId,
        question_id: QuestionId,
    ) -> Result<Option<AnswerIndex>, VotingError> {
        let mut q = self.get(question_id)?;
        let key = (question_id, voter.clone());
        let mut record = match self.votes.get(&key) {
            Some(r) if r.has_voted => r,
            _ => return Ok(None),
        };
        let choice = record.choice;
        q.vote_counts[choice as usize] -= 1;
        record.has_voted = false;
        self.votes.insert(&key, &record);
        self.questions.replace(question_id, &q);
        Ok(Some(choice))
    }

    /**********
     * QUERIES
     **********/

    pub fn question(&self, question_id: QuestionId) -> Result<Question, VotingError> {
        self.get(question_id)
    }

    pub fn questions_count(&self) -> u64 {
        self.questions.len()
    }

    /// Returns true if `voter` has an active vote for the question.
    pub fn has_voted(
        &self,
        question_id: QuestionId,
        voter: &AccountId,
    ) -> Result<bool, VotingError> {
        Ok(self.vote_of(question_id, voter)?.is_some())
    }

    /// Returns the answer `voter` currently votes for, None if not voted.
    pub fn vote_of(
        &self,
        question_id: QuestionId,
        voter: &AccountId,
    ) -> Result<Option<AnswerIndex>, VotingError> {
        self.assert_exists(question_id)?;
        Ok(self
            .votes
            .get(&(question_id, voter.clone()))
            .and_then(|r| r.choice()))
    }

    /// Lists questions in creation order, starting from `from_index` (default 0).
    /// If limit is not specified, default is used: `MAX_LIMIT`. Limit is capped at
    /// `MAX_LIMIT` and must be positive.
    pub fn questions(&self, from_index: Option<u64>, limit: Option<u32>) -> Vec<QuestionView> {
        let limit = limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT);
        require!(limit > 0, "limit must be bigger than 0");
        let from_index = from_index.unwrap_or(0);
        let to_index = self.questions.len().min(from_index.saturating_add(limit as u64));
        (from_index..to_index)
            .filter_map(|id| self.questions.get(id).map(|q| q.into_view(id)))
            .collect()
    }

    /**********
     * INTERNAL
     **********/

    fn assert_exists(&self, question_id: QuestionId) -> Result<(), VotingError> {
        if question_id >= self.questions.len() {
            return Err(VotingError::InvalidQuestion);
        }
        Ok(())
    }

    fn get(&self, question_id: QuestionId) -> Result<Question, VotingError> {
        self.assert_exists(question_id)?;
        match self.questions.get(question_id) {
            Some(q) => Ok(q),
            None => env::panic_str("inconsistent state: question not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use near_sdk::test_utils::VMContextBuilder;
    use near_sdk::{testing_env, AccountId};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn alice() -> AccountId {
        AccountId::new_unchecked("alice.near".to_string())
    }

    fn bob() -> AccountId {
        AccountId::new_unchecked("bob.near".to_string())
    }

    fn voter(i: u8) -> AccountId {
        AccountId::new_unchecked(format!("voter{}.near", i))
    }

    fn setup() -> VotingLedger {
        testing_env!(VMContextBuilder::new().build());
        VotingLedger::new()
    }

    fn add_color_question(l: &mut VotingLedger) -> QuestionId {
        l.create_question(
            &alice(),
            "Best color?".to_string(),
            "Red".to_string(),
            "Blue".to_string(),
            Some("image-url".to_string()),
        )
    }

    fn counts(l: &VotingLedger, id: QuestionId) -> [u64; ANSWERS_NUM] {
        l.question(id).unwrap().vote_counts
    }

    #[test]
    fn create_question_round_trip() {
        let mut l = setup();
        assert_eq!(l.questions_count(), 0);
        assert_eq!(add_color_question(&mut l), 0);
        assert_eq!(l.questions_count(), 1);
        assert_eq!(
            l.question(0).unwrap(),
            Question {
                question: "Best color?".to_string(),
                created_by: alice(),
                possible_answers: ("Red".to_string(), "Blue".to_string()),
                image: Some("image-url".to_string()),
                vote_counts: [0, 0],
            }
        );

        let id = l.create_question(
            &bob(),
            "Best animal?".to_string(),
            "Cat".to_string(),
            "Dog".to_string(),
            None,
        );
        assert_eq!(id, 1);
        assert_eq!(l.questions_count(), 2);
        let q = l.question(1).unwrap();
        assert_eq!(q.created_by, bob());
        assert_eq!(q.possible_answers.1, "Dog");
        assert_eq!(q.image, None);
        // empty strings are stored as given
        let id = l.create_question(
            &bob(),
            "".to_string(),
            "".to_string(),
            "".to_string(),
            Some("".to_string()),
        );
        assert_eq!(l.question(id).unwrap().image, Some("".to_string()));
    }

    #[test]
    fn votes_from_two_voters() {
        let mut l = setup();
        add_color_question(&mut l);
        assert_eq!(l.vote(&alice(), 0, 1), Ok(VoteChange::Cast));
        assert_eq!(l.vote(&bob(), 0, 0), Ok(VoteChange::Cast));
        assert_eq!(counts(&l, 0), [1, 1]);
    }

    #[test]
    fn change_vote() {
        let mut l = setup();
        add_color_question(&mut l);
        l.vote(&alice(), 0, 1).unwrap();
        assert_eq!(l.vote(&alice(), 0, 0), Ok(VoteChange::Changed { from: 1 }));
        assert_eq!(counts(&l, 0), [1, 0]);
        assert_eq!(l.vote_of(0, &alice()), Ok(Some(0)));
    }

    #[test]
    fn vote_same_answer_twice() {
        let mut l = setup();
        add_color_question(&mut l);
        l.vote(&alice(), 0, 1).unwrap();
        assert_eq!(l.vote(&alice(), 0, 1), Ok(VoteChange::Unchanged));
        assert_eq!(counts(&l, 0), [0, 1]);
    }

    #[test]
    fn clear_vote() {
        let mut l = setup();
        add_color_question(&mut l);
        assert_eq!(l.has_voted(0, &alice()), Ok(false));
        l.vote(&alice(), 0, 1).unwrap();
        assert_eq!(l.has_voted(0, &alice()), Ok(true));

        assert_eq!(l.clear_vote(&alice(), 0), Ok(Some(1)));
        assert_eq!(counts(&l, 0), [0, 0]);
        assert_eq!(l.has_voted(0, &alice()), Ok(false));
        assert_eq!(l.vote_of(0, &alice()), Ok(None));

        // second clear is a no-op
        assert_eq!(l.clear_vote(&alice(), 0), Ok(None));
        assert_eq!(counts(&l, 0), [0, 0]);
        // never voted
        assert_eq!(l.clear_vote(&bob(), 0), Ok(None));

        // voting again after clearing is a fresh vote
        assert_eq!(l.vote(&alice(), 0, 0), Ok(VoteChange::Cast));
        assert_eq!(counts(&l, 0), [1, 0]);
    }

    #[test]
    fn invalid_question_and_answer() {
        let mut l = setup();
        assert_eq!(l.vote(&alice(), 0, 0), Err(VotingError::InvalidQuestion));
        assert_eq!(l.clear_vote(&alice(), 0), Err(VotingError::InvalidQuestion));
        assert_matches!(l.question(0), Err(VotingError::InvalidQuestion));
        assert_eq!(l.has_voted(0, &alice()), Err(VotingError::InvalidQuestion));
        assert_eq!(l.vote_of(0, &alice()), Err(VotingError::InvalidQuestion));

        add_color_question(&mut l);
        assert_eq!(l.vote(&alice(), 0, 2), Err(VotingError::InvalidAnswerIndex));
        assert_eq!(
            l.vote(&alice(), 0, u8::MAX),
            Err(VotingError::InvalidAnswerIndex)
        );
        // invalid question is reported first
        assert_eq!(l.vote(&alice(), 1, 2), Err(VotingError::InvalidQuestion));
        assert_eq!(counts(&l, 0), [0, 0]);
        assert_eq!(l.has_voted(0, &alice()), Ok(false));
    }

    #[test]
    fn failed_change_keeps_vote() {
        let mut l = setup();
        add_color_question(&mut l);
        l.vote(&alice(), 0, 1).unwrap();
        assert_eq!(l.vote(&alice(), 0, 7), Err(VotingError::InvalidAnswerIndex));
        assert_eq!(counts(&l, 0), [0, 1]);
        assert_eq!(l.vote_of(0, &alice()), Ok(Some(1)));
    }

    #[test]
    fn votes_are_per_question() {
        let mut l = setup();
        add_color_question(&mut l);
        add_color_question(&mut l);
        l.vote(&alice(), 1, 0).unwrap();
        assert_eq!(counts(&l, 0), [0, 0]);
        assert_eq!(counts(&l, 1), [1, 0]);
        assert_eq!(l.has_voted(0, &alice()), Ok(false));
        assert_eq!(l.clear_vote(&alice(), 0), Ok(None));
        assert_eq!(counts(&l, 1), [1, 0]);
    }

    #[test]
    fn list_questions() {
        let mut l = setup();
        assert!(l.questions(None, None).is_empty());
        for _ in 0..5 {
            add_color_question(&mut l);
        }
        l.vote(&bob(), 3, 1).unwrap();

        let all = l.questions(None, None);
        assert_eq!(all.len(), 5);
        assert_eq!(
            all.iter().map(|q| q.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );

        let page = l.questions(Some(2), Some(2));
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 2);
        assert_eq!(page[1].id, 3);
        assert_eq!(page[1].vote_counts, [0, 1]);

        assert_eq!(l.questions(Some(4), Some(10)).len(), 1);
        assert!(l.questions(Some(5), None).is_empty());
        assert!(l.questions(Some(u64::MAX), Some(MAX_LIMIT)).is_empty());
    }

    #[test]
    fn list_questions_capped() {
        let mut l = setup();
        for _ in 0..(MAX_LIMIT + 5) {
            add_color_question(&mut l);
        }
        assert_eq!(l.questions(None, Some(MAX_LIMIT + 5)).len(), MAX_LIMIT as usize);
        assert_eq!(l.questions(Some(100), None).len(), 5);
    }

    #[test]
    #[should_panic(expected = "limit must be bigger than 0")]
    fn list_questions_zero_limit() {
        let l = setup();
        l.questions(None, Some(0));
    }

    /// Runs a long deterministic mix of votes, changes and clears from several voters and
    /// checks after every step that the tallies match the active vote records.
    #[test]
    fn tallies_match_active_votes() {
        let mut l = setup();
        add_color_question(&mut l);
        add_color_question(&mut l);
        let voters: Vec<AccountId> = (0..6).map(voter).collect();
        // expected choice per (question, voter)
        let mut model: HashMap<(QuestionId, usize), AnswerIndex> = HashMap::new();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..400 {
            let v = rng.gen_range(0..voters.len());
            let qid: QuestionId = rng.gen_range(0..2);
            let op = rng.gen_range(0..4u8);
            let key = (qid, v);
            if op == 3 {
                let cleared = l.clear_vote(&voters[v], qid).unwrap();
                assert_eq!(cleared, model.remove(&key));
            } else {
                let answer = (op % 2) as AnswerIndex;
                let change = l.vote(&voters[v], qid, answer).unwrap();
                match model.insert(key, answer) {
                    None => assert_eq!(change, VoteChange::Cast),
                    Some(prev) if prev == answer => assert_eq!(change, VoteChange::Unchanged),
                    Some(prev) => assert_eq!(change, VoteChange::Changed { from: prev }),
                }
            }

            for q in 0..2 {
                let mut expected = [0u64; ANSWERS_NUM];
                for (i, a) in voters.iter().enumerate() {
                    let choice = l.vote_of(q, a).unwrap();
                    assert_eq!(choice, model.get(&(q, i)).copied());
                    if let Some(c) = choice {
                        expected[c as usize] += 1;
                    }
                }
                assert_eq!(counts(&l, q), expected);
            }
        }
    }
}
