//! Polls and audience questions attached to a page.

use crate::document::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identifier of a participant casting votes or asking questions.
pub type UserId = Uuid;
pub type PollId = Uuid;
pub type OptionId = Uuid;
pub type QuestionId = Uuid;

/// Upper bound on options per poll.
pub const MAX_POLL_OPTIONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: OptionId,
    pub text: String,
    #[serde(default)]
    pub votes: BTreeSet<UserId>,
}

impl PollOption {
    /// Share of `total` votes held by this option, in percent (0 when nobody voted).
    pub fn percentage(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.votes.len() as f64 * 100.0 / total as f64
        }
    }
}

/// A single-choice poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub pinned: bool,
}

impl Poll {
    /// Build a poll from raw input.
    ///
    /// Blank options are dropped and at most [`MAX_POLL_OPTIONS`] are kept.
    /// Returns `None` for a blank question or fewer than two usable options.
    pub fn new<S: AsRef<str>>(question: &str, options: &[S]) -> Option<Self> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let options: Vec<PollOption> = options
            .iter()
            .map(|o| o.as_ref().trim())
            .filter(|o| !o.is_empty())
            .take(MAX_POLL_OPTIONS)
            .map(|text| PollOption {
                id: Uuid::new_v4(),
                text: text.to_string(),
                votes: BTreeSet::new(),
            })
            .collect();
        if options.len() < 2 {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            options,
            closed: false,
            pinned: false,
        })
    }

    /// Cast, move or withdraw a vote.
    ///
    /// Voting for the option already chosen withdraws the vote. A voter is in at
    /// most one option at a time. Returns false if nothing changed.
    pub fn vote(&mut self, option: OptionId, voter: UserId) -> bool {
        if self.closed || !self.options.iter().any(|o| o.id == option) {
            return false;
        }
        let mut withdrew = false;
        for opt in &mut self.options {
            if opt.votes.remove(&voter) && opt.id == option {
                withdrew = true;
            }
        }
        if !withdrew {
            if let Some(opt) = self.options.iter_mut().find(|o| o.id == option) {
                opt.votes.insert(voter);
            }
        }
        true
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn toggle_pin(&mut self) {
        self.pinned = !self.pinned;
    }

    pub fn total_votes(&self) -> usize {
        self.options.iter().map(|o| o.votes.len()).sum()
    }

    /// Option the voter currently backs.
    pub fn choice_of(&self, voter: UserId) -> Option<OptionId> {
        self.options
            .iter()
            .find(|o| o.votes.contains(&voter))
            .map(|o| o.id)
    }

    pub fn option(&self, id: OptionId) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// An audience question with upvotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub author_id: UserId,
    pub author_name: String,
    pub text: String,
    #[serde(default)]
    pub upvotes: BTreeSet<UserId>,
    #[serde(default)]
    pub answered: bool,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Question {
    /// Returns `None` for blank text.
    pub fn new(text: &str, author_id: UserId, author_name: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            author_id,
            author_name: author_name.to_string(),
            text: text.to_string(),
            upvotes: BTreeSet::new(),
            answered: false,
            created_at: now_millis(),
        })
    }

    /// Toggle `user`'s upvote.
    pub fn upvote(&mut self, user: UserId) {
        if !self.upvotes.remove(&user) {
            self.upvotes.insert(user);
        }
    }

    pub fn toggle_answered(&mut self) {
        self.answered = !self.answered;
    }
}

/// Questions in display order: unanswered first, then most upvoted.
pub fn sorted_questions(questions: &[Question]) -> Vec<&Question> {
    let mut sorted: Vec<&Question> = questions.iter().collect();
    sorted.sort_by(|a, b| {
        a.answered
            .cmp(&b.answered)
            .then_with(|| b.upvotes.len().cmp(&a.upvotes.len()))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_validation() {
        assert!(Poll::new("  ", &["a", "b"]).is_none());
        assert!(Poll::new("Ready?", &["Yes", "  "]).is_none());
        let poll = Poll::new(" Ready? ", &["Yes", "", "No"]).unwrap();
        assert_eq!(poll.question, "Ready?");
        assert_eq!(poll.options.len(), 2);
    }

    #[test]
    fn test_poll_option_limit() {
        let options: Vec<String> = (0..10).map(|i| format!("opt {i}")).collect();
        let poll = Poll::new("Pick", &options).unwrap();
        assert_eq!(poll.options.len(), MAX_POLL_OPTIONS);
    }

    #[test]
    fn test_vote_is_single_choice() {
        let mut poll = Poll::new("Ready?", &["Yes", "No"]).unwrap();
        let (yes, no) = (poll.options[0].id, poll.options[1].id);
        let voter = Uuid::new_v4();

        assert!(poll.vote(yes, voter));
        assert_eq!(poll.choice_of(voter), Some(yes));

        assert!(poll.vote(no, voter));
        assert!(!poll.options[0].votes.contains(&voter));
        assert!(poll.options[1].votes.contains(&voter));
        assert_eq!(poll.total_votes(), 1);
    }

    #[test]
    fn test_vote_toggle_and_closed() {
        let mut poll = Poll::new("Ready?", &["Yes", "No"]).unwrap();
        let yes = poll.options[0].id;
        let voter = Uuid::new_v4();

        poll.vote(yes, voter);
        poll.vote(yes, voter);
        assert_eq!(poll.total_votes(), 0);

        poll.close();
        assert!(!poll.vote(yes, voter));
        assert_eq!(poll.total_votes(), 0);
        assert!(!poll.vote(Uuid::new_v4(), voter));
    }

    #[test]
    fn test_percentage() {
        let mut poll = Poll::new("Q", &["a", "b"]).unwrap();
        let (a, b) = (poll.options[0].id, poll.options[1].id);
        poll.vote(a, Uuid::new_v4());
        poll.vote(a, Uuid::new_v4());
        poll.vote(a, Uuid::new_v4());
        poll.vote(b, Uuid::new_v4());
        let total = poll.total_votes();
        assert!((poll.options[0].percentage(total) - 75.0).abs() < 1e-9);
        assert!((poll.options[1].percentage(total) - 25.0).abs() < 1e-9);
        assert_eq!(PollOption::percentage(&poll.options[0], 0), 0.0);
    }

    #[test]
    fn test_question_sorting() {
        let author = Uuid::new_v4();
        let mut quiet = Question::new("quiet", author, "A").unwrap();
        let mut popular = Question::new("popular", author, "A").unwrap();
        let mut done = Question::new("done", author, "A").unwrap();
        popular.upvote(Uuid::new_v4());
        popular.upvote(Uuid::new_v4());
        done.upvote(Uuid::new_v4());
        done.upvote(Uuid::new_v4());
        done.upvote(Uuid::new_v4());
        done.toggle_answered();
        quiet.upvote(author);
        quiet.upvote(author);

        let all = vec![done, quiet, popular];
        let order: Vec<&str> = sorted_questions(&all).iter().map(|q| q.text.as_str()).collect();
        assert_eq!(order, vec!["popular", "quiet", "done"]);
    }

    #[test]
    fn test_blank_question_rejected() {
        assert!(Question::new("   ", Uuid::new_v4(), "A").is_none());
    }
}
