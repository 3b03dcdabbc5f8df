//! Challenge sessions

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ChallengeProgress, ChallengeQuestion};

/// One round of challenge questions over a document
#[derive(Debug, Clone)]
pub struct ChallengeSession {
    pub id: Uuid,
    pub doc_id: String,
    pub questions: Vec<ChallengeQuestion>,
    /// question_id -> score (0-100); re-answering overwrites
    pub answers: HashMap<Uuid, u8>,
    pub created_at: DateTime<Utc>,
}

impl ChallengeSession {
    /// Start a session with no answers
    pub fn new(doc_id: impl Into<String>, questions: Vec<ChallengeQuestion>) -> Self {
        Self {
            id: Uuid::new_v4(),
            doc_id: doc_id.into(),
            questions,
            answers: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Look up a question by ID
    pub fn question(&self, question_id: Uuid) -> Option<&ChallengeQuestion> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }

    /// Answer counts and mean score so far
    pub fn progress(&self) -> ChallengeProgress {
        let answered = self.answers.len();
        let average_score = if answered == 0 {
            0.0
        } else {
            self.answers.values().map(|s| *s as f32).sum::<f32>() / answered as f32
        };

        ChallengeProgress {
            session_id: self.id,
            total_questions: self.questions.len(),
            answered_questions: answered,
            average_score,
        }
    }
}

/// In-memory session registry keyed by session ID
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, ChallengeSession>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its ID
    pub fn create(&self, doc_id: &str, questions: Vec<ChallengeQuestion>) -> Uuid {
        let session = ChallengeSession::new(doc_id, questions);
        let id = session.id;
        tracing::debug!("Created challenge session {} for {}", id, doc_id);
        self.sessions.insert(id, session);
        id
    }

    /// Snapshot of a session
    pub fn get(&self, session_id: Uuid) -> Option<ChallengeSession> {
        self.sessions.get(&session_id).map(|s| s.value().clone())
    }

    /// Document ID and question for an evaluation request
    pub fn question(&self, session_id: Uuid, question_id: Uuid) -> Result<(String, ChallengeQuestion)> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or_else(|| Error::NotFound(format!("Session {}", session_id)))?;

        let question = session
            .question(question_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Question {} in session {}", question_id, session_id)))?;

        Ok((session.doc_id.clone(), question))
    }

    /// Record the score for an answered question
    pub fn record_score(&self, session_id: Uuid, question_id: Uuid, score: u8) -> Result<()> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("Session {}", session_id)))?;

        if session.question(question_id).is_none() {
            return Err(Error::NotFound(format!(
                "Question {} in session {}",
                question_id, session_id
            )));
        }

        session.answers.insert(question_id, score.min(100));
        Ok(())
    }

    /// Progress of a session
    pub fn progress(&self, session_id: Uuid) -> Result<ChallengeProgress> {
        self.sessions
            .get(&session_id)
            .map(|s| s.progress())
            .ok_or_else(|| Error::NotFound(format!("Session {}", session_id)))
    }

    /// Drop every session over a document
    pub fn remove_for_document(&self, doc_id: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.doc_id != doc_id);
        before - self.sessions.len()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> ChallengeQuestion {
        ChallengeQuestion {
            question_id: Uuid::new_v4(),
            question: text.to_string(),
            reasoning: "Based on document content.".to_string(),
        }
    }

    #[test]
    fn test_progress_tracks_scores() {
        let store = SessionStore::new();
        let (q1, q2) = (question("One?"), question("Two?"));
        let id = store.create("doc", vec![q1.clone(), q2.clone()]);

        let empty = store.progress(id).unwrap();
        assert_eq!(empty.total_questions, 2);
        assert_eq!(empty.answered_questions, 0);
        assert_eq!(empty.average_score, 0.0);

        store.record_score(id, q1.question_id, 80).unwrap();
        store.record_score(id, q2.question_id, 40).unwrap();
        let progress = store.progress(id).unwrap();
        assert_eq!(progress.answered_questions, 2);
        assert_eq!(progress.average_score, 60.0);

        // Re-answering replaces the earlier score
        store.record_score(id, q2.question_id, 100).unwrap();
        assert_eq!(store.progress(id).unwrap().average_score, 90.0);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let store = SessionStore::new();
        let q = question("One?");
        let id = store.create("doc", vec![q.clone()]);

        assert!(matches!(store.progress(Uuid::new_v4()), Err(Error::NotFound(_))));
        assert!(matches!(store.question(id, Uuid::new_v4()), Err(Error::NotFound(_))));
        assert!(matches!(store.record_score(id, Uuid::new_v4(), 5), Err(Error::NotFound(_))));

        let (doc_id, found) = store.question(id, q.question_id).unwrap();
        assert_eq!(doc_id, "doc");
        assert_eq!(found, q);
    }

    #[test]
    fn test_remove_for_document() {
        let store = SessionStore::new();
        store.create("a", vec![]);
        store.create("a", vec![]);
        store.create("b", vec![]);
        assert_eq!(store.remove_for_document("a"), 2);
        assert_eq!(store.len(), 1);
    }
}
