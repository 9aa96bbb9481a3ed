//! crates/hr_insight_core/src/session.rs
//!
//! The conversation session manager. It owns the transcript and session
//! identifier for a single chat widget and mediates between user input and
//! the `QueryService` port, rejecting concurrent submissions and discarding
//! responses that a reset has superseded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{AnswerMetadata, Message, QueryAnswer, Session};
use crate::ports::{PortError, PortResult, QueryService};

/// A submit call that was rejected before any state change or network I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The question was blank or whitespace-only.
    #[error("Question is empty")]
    EmptyQuestion,
    /// A previous question is still waiting for its answer.
    #[error("A question is already being answered")]
    AlreadyInFlight,
}

/// What a completed round-trip did to the session.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The backend answered; the returned assistant message was appended.
    Answered(Message),
    /// The round-trip failed; `notice` was appended in place of an answer.
    /// `detail` carries the underlying error text for a toast or log line.
    Failed { notice: Message, detail: String },
    /// The response arrived after a reset superseded it; nothing was changed.
    Discarded,
}

struct Inner {
    session: Session,
    /// Token of the request currently on the wire, if any.
    in_flight: Option<u64>,
    next_token: u64,
}

/// Owns the conversation state for one chat widget.
///
/// At most one query may be outstanding at a time; a second `submit` while
/// one is pending is rejected, not queued. Every request carries a fresh
/// token, and a response is only applied if its token still matches the
/// tracked in-flight one — a `reset` drops the token, so late arrivals
/// become no-ops on state.
///
/// The internal lock is only held for the synchronous begin/complete phases,
/// never across the network await.
pub struct ConversationSessionManager<Q: ?Sized> {
    service: Arc<Q>,
    timeout: Option<Duration>,
    inner: Mutex<Inner>,
}

impl<Q: QueryService + ?Sized> ConversationSessionManager<Q> {
    /// Creates a manager with an empty session and no request deadline.
    pub fn new(service: Arc<Q>) -> Self {
        Self {
            service,
            timeout: None,
            inner: Mutex::new(Inner {
                session: Session::default(),
                in_flight: None,
                next_token: 0,
            }),
        }
    }

    /// Bounds every round-trip so the manager can never be stuck pending.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Submits one question to the backend and reconciles the response into
    /// the session.
    ///
    /// The user message is appended synchronously, before the round-trip
    /// starts, so callers can render it without waiting on the network. The
    /// raw question is kept for display; the trimmed form goes on the wire.
    pub async fn submit(&self, question: &str) -> Result<SubmitOutcome, SubmitError> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }

        let (token, session_id) = {
            let mut inner = self.lock();
            if inner.in_flight.is_some() {
                return Err(SubmitError::AlreadyInFlight);
            }
            let token = inner.next_token;
            inner.next_token += 1;
            inner.in_flight = Some(token);
            inner.session.messages.push(Message::user(question));
            (token, inner.session.session_id.clone())
        };

        let result = self.round_trip(trimmed, session_id.as_deref()).await;

        let mut inner = self.lock();
        if inner.in_flight != Some(token) {
            // A reset cleared the token while this request was on the wire.
            debug!(token, "discarding stale query response");
            return Ok(SubmitOutcome::Discarded);
        }
        inner.in_flight = None;

        match result {
            Ok(answer) => Ok(SubmitOutcome::Answered(apply_answer(&mut inner, answer))),
            Err(err) => {
                let detail = err.to_string();
                debug!(%err, "query round-trip failed");
                let notice = Message::assistant(failure_notice(&err), None);
                inner.session.messages.push(notice.clone());
                Ok(SubmitOutcome::Failed { notice, detail })
            }
        }
    }

    /// Clears the session back to its initial empty state.
    ///
    /// Any request still on the wire is orphaned: its token no longer
    /// matches, so its eventual resolution will not touch the new session.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.in_flight = None;
        inner.session = Session::default();
    }

    /// Returns an owned snapshot of the transcript, in chronological order.
    pub fn history(&self) -> Vec<Message> {
        self.lock().session.messages.clone()
    }

    /// The backend-assigned session id, once the first response has arrived.
    pub fn session_id(&self) -> Option<String> {
        self.lock().session.session_id.clone()
    }

    /// The server-reported conversation length.
    pub fn turn_count(&self) -> u32 {
        self.lock().session.turn_count
    }

    /// Whether a query is currently on the wire.
    pub fn is_pending(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    async fn round_trip(&self, question: &str, session_id: Option<&str>) -> PortResult<QueryAnswer> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.ask(question, session_id))
                .await
                .unwrap_or(Err(PortError::Timeout)),
            None => self.service.ask(question, session_id).await,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Folds a successful answer into the session and returns the appended message.
fn apply_answer(inner: &mut Inner, answer: QueryAnswer) -> Message {
    match &inner.session.session_id {
        None => inner.session.session_id = Some(answer.session_id.clone()),
        Some(held) if *held != answer.session_id => {
            // The session id is immutable once assigned; a different id from
            // the backend is a protocol anomaly, not a reason to rebind.
            warn!(
                held = %held,
                received = %answer.session_id,
                "backend returned a different session id; keeping the original"
            );
        }
        Some(_) => {}
    }

    if answer.conversation_length >= inner.session.turn_count {
        inner.session.turn_count = answer.conversation_length;
    } else {
        debug!(
            held = inner.session.turn_count,
            received = answer.conversation_length,
            "server conversation length went backwards; ignoring"
        );
    }

    let message = Message::assistant(
        answer.answer,
        Some(AnswerMetadata {
            query_type: answer.query_type,
            source_count: answer.sources.len(),
            response_time_seconds: answer.response_time_seconds,
        }),
    );
    inner.session.messages.push(message.clone());
    message
}

/// The text shown in place of an answer when a round-trip fails. A detail
/// supplied by the backend is preferred over the generic notice.
fn failure_notice(err: &PortError) -> String {
    match err {
        PortError::Service(detail) => format!("Sorry, something went wrong: {detail}"),
        PortError::Timeout => {
            "Sorry, the answer took too long to arrive. Please try again.".to_string()
        }
        _ => "Sorry, something went wrong while answering your question. Please try again."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::domain::Role;
    use crate::ports::{PortError, PortResult, QueryService};

    /// A scriptable `QueryService`: answers with pre-seeded results in order
    /// and records every call it receives. When a gate is attached, each call
    /// signals `entered` and then parks until `release` is notified, which
    /// lets tests observe and control the in-flight window.
    struct ScriptedService {
        replies: Mutex<VecDeque<PortResult<QueryAnswer>>>,
        calls: Mutex<Vec<(String, Option<String>)>>,
        gate: Option<Arc<Gate>>,
    }

    struct Gate {
        entered: Notify,
        release: Notify,
    }

    impl ScriptedService {
        fn new(replies: Vec<PortResult<QueryAnswer>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn gated(replies: Vec<PortResult<QueryAnswer>>) -> (Self, Arc<Gate>) {
            let gate = Arc::new(Gate {
                entered: Notify::new(),
                release: Notify::new(),
            });
            let mut service = Self::new(replies);
            service.gate = Some(gate.clone());
            (service, gate)
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryService for ScriptedService {
        async fn ask(&self, question: &str, session_id: Option<&str>) -> PortResult<QueryAnswer> {
            self.calls
                .lock()
                .unwrap()
                .push((question.to_string(), session_id.map(str::to_string)));
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted service ran out of replies")
        }
    }

    fn answer(text: &str, session_id: &str, length: u32) -> QueryAnswer {
        QueryAnswer {
            answer: text.to_string(),
            session_id: session_id.to_string(),
            conversation_length: length,
            query_type: "stat".to_string(),
            sources: Vec::new(),
            response_time_seconds: 0.5,
        }
    }

    #[tokio::test]
    async fn successful_round_trip_populates_session() {
        let service = Arc::new(ScriptedService::new(vec![Ok(answer(
            "42 employees",
            "abc123",
            1,
        ))]));
        let manager = ConversationSessionManager::new(service.clone());

        let outcome = manager.submit("What is the headcount?").await.unwrap();
        let replied = match outcome {
            SubmitOutcome::Answered(message) => message,
            other => panic!("expected Answered, got {other:?}"),
        };
        assert_eq!(replied.content, "42 employees");
        let metadata = replied.metadata.expect("assistant metadata");
        assert_eq!(metadata.query_type, "stat");
        assert_eq!(metadata.source_count, 0);
        assert_eq!(metadata.response_time_seconds, 0.5);

        let history = manager.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "What is the headcount?");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(manager.session_id().as_deref(), Some("abc123"));
        assert_eq!(manager.turn_count(), 1);

        // The first call carries no session id yet.
        assert_eq!(service.calls(), vec![("What is the headcount?".to_string(), None)]);
    }

    #[tokio::test]
    async fn second_question_threads_the_session_id() {
        let service = Arc::new(ScriptedService::new(vec![
            Ok(answer("first", "abc123", 1)),
            Ok(answer("second", "abc123", 2)),
        ]));
        let manager = ConversationSessionManager::new(service.clone());

        manager.submit("one").await.unwrap();
        manager.submit("two").await.unwrap();

        let calls = service.calls();
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[1].1.as_deref(), Some("abc123"));
        assert_eq!(manager.turn_count(), 2);
        assert_eq!(manager.history().len(), 4);
    }

    #[tokio::test]
    async fn blank_question_is_rejected_without_a_call() {
        let service = Arc::new(ScriptedService::new(Vec::new()));
        let manager = ConversationSessionManager::new(service.clone());

        assert_eq!(
            manager.submit("").await.unwrap_err(),
            SubmitError::EmptyQuestion
        );
        assert_eq!(
            manager.submit("   ").await.unwrap_err(),
            SubmitError::EmptyQuestion
        );
        assert!(manager.history().is_empty());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn question_is_trimmed_on_the_wire_but_kept_raw_in_history() {
        let service = Arc::new(ScriptedService::new(vec![Ok(answer("ok", "s1", 1))]));
        let manager = ConversationSessionManager::new(service.clone());

        manager.submit("  spaced out  ").await.unwrap();

        assert_eq!(manager.history()[0].content, "  spaced out  ");
        assert_eq!(service.calls()[0].0, "spaced out");
    }

    #[tokio::test]
    async fn submit_while_pending_is_rejected_and_appends_nothing() {
        let (service, gate) = ScriptedService::gated(vec![Ok(answer("done", "s1", 1))]);
        let service = Arc::new(service);
        let manager = Arc::new(ConversationSessionManager::new(service.clone()));

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit("first").await })
        };
        gate.entered.notified().await;

        assert!(manager.is_pending());
        assert_eq!(
            manager.submit("follow-up").await.unwrap_err(),
            SubmitError::AlreadyInFlight
        );
        // Only the first user message is in the transcript.
        assert_eq!(manager.history().len(), 1);

        gate.release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert_eq!(manager.history().len(), 2);
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn manager_is_usable_again_after_a_failure() {
        let service = Arc::new(ScriptedService::new(vec![
            Err(PortError::Transport("connection refused".to_string())),
            Ok(answer("recovered", "s1", 1)),
        ]));
        let manager = ConversationSessionManager::new(service.clone());

        let outcome = manager.submit("first").await.unwrap();
        let (notice, detail) = match outcome {
            SubmitOutcome::Failed { notice, detail } => (notice, detail),
            other => panic!("expected Failed, got {other:?}"),
        };
        assert_eq!(notice.role, Role::Assistant);
        assert!(notice.metadata.is_none());
        assert!(detail.contains("connection refused"));
        assert!(!manager.is_pending());
        // The failure leaves no session id behind.
        assert_eq!(manager.session_id(), None);

        let outcome = manager.submit("second").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert_eq!(manager.history().len(), 4);
    }

    #[tokio::test]
    async fn server_detail_is_preferred_in_the_failure_notice() {
        let service = Arc::new(ScriptedService::new(vec![Err(PortError::Service(
            "index not ready".to_string(),
        ))]));
        let manager = ConversationSessionManager::new(service);

        let outcome = manager.submit("anything").await.unwrap();
        match outcome {
            SubmitOutcome::Failed { notice, .. } => {
                assert!(notice.content.contains("index not ready"))
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_id_never_changes_once_assigned() {
        let service = Arc::new(ScriptedService::new(vec![
            Ok(answer("first", "abc123", 1)),
            Ok(answer("second", "zzz999", 2)),
        ]));
        let manager = ConversationSessionManager::new(service);

        manager.submit("one").await.unwrap();
        manager.submit("two").await.unwrap();

        assert_eq!(manager.session_id().as_deref(), Some("abc123"));
        // The answer itself is still applied.
        assert_eq!(manager.turn_count(), 2);
        assert_eq!(manager.history().len(), 4);
    }

    #[tokio::test]
    async fn turn_count_never_decreases() {
        let service = Arc::new(ScriptedService::new(vec![
            Ok(answer("first", "s1", 3)),
            Ok(answer("second", "s1", 1)),
        ]));
        let manager = ConversationSessionManager::new(service);

        manager.submit("one").await.unwrap();
        assert_eq!(manager.turn_count(), 3);
        manager.submit("two").await.unwrap();
        assert_eq!(manager.turn_count(), 3);
    }

    #[tokio::test]
    async fn reset_clears_the_session() {
        let service = Arc::new(ScriptedService::new(vec![Ok(answer("hi", "s1", 1))]));
        let manager = ConversationSessionManager::new(service);

        manager.submit("hello").await.unwrap();
        manager.reset();

        assert!(manager.history().is_empty());
        assert_eq!(manager.session_id(), None);
        assert_eq!(manager.turn_count(), 0);
    }

    #[tokio::test]
    async fn response_arriving_after_reset_is_discarded() {
        let (service, gate) = ScriptedService::gated(vec![Ok(answer("late", "s1", 1))]);
        let manager = Arc::new(ConversationSessionManager::new(Arc::new(service)));

        let in_flight = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit("orphaned").await })
        };
        gate.entered.notified().await;

        manager.reset();
        gate.release.notify_one();

        let outcome = in_flight.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Discarded));
        assert!(manager.history().is_empty());
        assert_eq!(manager.session_id(), None);
        assert_eq!(manager.turn_count(), 0);
        assert!(!manager.is_pending());
    }

    #[tokio::test]
    async fn a_fresh_submit_works_after_reset_discarded_an_orphan() {
        let (service, gate) = ScriptedService::gated(vec![
            Ok(answer("late", "old-session", 5)),
            Ok(answer("fresh", "new-session", 1)),
        ]);
        let manager = Arc::new(ConversationSessionManager::new(Arc::new(service)));

        let orphan = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit("orphaned").await })
        };
        gate.entered.notified().await;
        manager.reset();
        gate.release.notify_one();
        assert!(matches!(
            orphan.await.unwrap().unwrap(),
            SubmitOutcome::Discarded
        ));

        let fresh = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit("fresh question").await })
        };
        gate.entered.notified().await;
        gate.release.notify_one();
        assert!(matches!(
            fresh.await.unwrap().unwrap(),
            SubmitOutcome::Answered(_)
        ));

        assert_eq!(manager.session_id().as_deref(), Some("new-session"));
        assert_eq!(manager.turn_count(), 1);
        assert_eq!(manager.history().len(), 2);
    }

    #[tokio::test]
    async fn history_snapshot_is_stable_between_operations() {
        let service = Arc::new(ScriptedService::new(vec![Ok(answer("hi", "s1", 1))]));
        let manager = ConversationSessionManager::new(service);
        manager.submit("hello").await.unwrap();

        let first = manager.history();
        let second = manager.history();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.content, b.content);
        }
    }

    #[tokio::test]
    async fn slow_backend_trips_the_configured_timeout() {
        struct NeverReplies;

        #[async_trait]
        impl QueryService for NeverReplies {
            async fn ask(
                &self,
                _question: &str,
                _session_id: Option<&str>,
            ) -> PortResult<QueryAnswer> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                unreachable!("the timeout should fire first")
            }
        }

        let manager = ConversationSessionManager::new(Arc::new(NeverReplies))
            .with_timeout(Duration::from_millis(10));

        let outcome = manager.submit("anyone there?").await.unwrap();
        match outcome {
            SubmitOutcome::Failed { notice, .. } => {
                assert!(notice.content.contains("took too long"))
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(!manager.is_pending());
        assert_eq!(manager.history().len(), 2);
    }
}
