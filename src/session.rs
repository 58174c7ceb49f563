use crate::catalog::{ModelCatalog, ModelEntry};
use crate::completion::CompletionClient;
use crate::conversation::{Conversation, Turn};
use crate::error::SessionError;

/// Request path state. There is no cancelled state: once a request is
/// dispatched the session waits for it to finish, success or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    AwaitingReply,
}

/// One chat session: the transcript, the selected model and the client.
pub struct ChatSession {
    conversation: Conversation,
    client: CompletionClient,
    catalog: ModelCatalog,
    model: &'static ModelEntry,
    state: RequestState,
}

impl ChatSession {
    pub fn new(
        client: CompletionClient,
        catalog: ModelCatalog,
        model_label: &str,
    ) -> Result<Self, SessionError> {
        let model = catalog
            .find(model_label)
            .ok_or_else(|| SessionError::UnknownModel(model_label.to_string()))?;

        Ok(Self {
            conversation: Conversation::new(),
            client,
            catalog,
            model,
            state: RequestState::Idle,
        })
    }

    /// Append the user's message and mark a reply as pending.
    ///
    /// Blank input is ignored and returns `Ok(false)`.
    pub fn submit_user(&mut self, text: &str) -> Result<bool, SessionError> {
        if self.state == RequestState::AwaitingReply {
            return Err(SessionError::Busy);
        }
        if text.trim().is_empty() {
            return Ok(false);
        }

        self.conversation.append(Turn::user(text));
        self.state = RequestState::AwaitingReply;
        Ok(true)
    }

    /// Send the whole transcript to the selected model and append the reply.
    /// A no-op returning `None` when nothing is pending.
    pub async fn resolve_reply(&mut self) -> Option<&Turn> {
        if self.state != RequestState::AwaitingReply {
            return None;
        }

        let reply = self
            .client
            .complete(self.model.id, self.conversation.all())
            .await;
        self.conversation.append(Turn::assistant(reply));
        self.state = RequestState::Idle;
        self.conversation.last()
    }

    /// Submit and wait for the reply in one step.
    pub async fn submit(&mut self, text: &str) -> Result<Option<&Turn>, SessionError> {
        if !self.submit_user(text)? {
            return Ok(None);
        }
        Ok(self.resolve_reply().await)
    }

    pub fn select_model(&mut self, query: &str) -> Result<&'static ModelEntry, SessionError> {
        let entry = self
            .catalog
            .resolve(query)
            .ok_or_else(|| SessionError::UnknownModel(query.to_string()))?;
        self.model = entry;
        tracing::info!(label = entry.label, id = entry.id, "model selected");
        Ok(entry)
    }

    /// Move the selection `step` places through the catalog, wrapping around.
    pub fn cycle_model(&mut self, step: isize) -> &'static ModelEntry {
        let len = self.catalog.len() as isize;
        let current = self.catalog.position(self.model.label).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        if let Some(entry) = self.catalog.get(next) {
            self.model = entry;
            tracing::info!(label = entry.label, id = entry.id, "model selected");
        }
        self.model
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn model(&self) -> &'static ModelEntry {
        self.model
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn state(&self) -> RequestState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::test_support::{client_with, StubTransport};
    use crate::conversation::Role;
    use std::sync::Arc;

    fn session(stub: &Arc<StubTransport>) -> ChatSession {
        ChatSession::new(client_with(stub), ModelCatalog::default(), "LLaMA 3 (8B)").unwrap()
    }

    #[tokio::test]
    async fn n_submissions_yield_2n_alternating_turns() {
        let stub = StubTransport::new();
        for i in 0..4 {
            stub.push_content(&format!("reply {i}"));
        }
        let mut session = session(&stub);

        for i in 0..4 {
            session.submit(&format!("message {i}")).await.unwrap();
        }

        let turns = session.conversation().all();
        assert_eq!(turns.len(), 8);
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role(), expected);
        }
        assert_eq!(session.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn pending_request_ends_with_user_turn() {
        let stub = StubTransport::new();
        stub.push_content("Hi!");
        let mut session = session(&stub);

        assert!(session.submit_user("Hello").unwrap());
        assert_eq!(session.state(), RequestState::AwaitingReply);
        assert_eq!(session.conversation().last().map(Turn::role), Some(Role::User));
        assert_eq!(session.submit_user("again"), Err(SessionError::Busy));

        let reply = session.resolve_reply().await.cloned();
        assert_eq!(reply, Some(Turn::assistant("Hi!")));
        assert_eq!(session.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let stub = StubTransport::new();
        let mut session = session(&stub);

        assert_eq!(session.submit("   \n").await, Ok(None));
        assert!(session.conversation().is_empty());
        assert!(stub.requests().is_empty());
        assert!(session.resolve_reply().await.is_none());
    }

    #[tokio::test]
    async fn error_reply_is_stored_as_assistant_turn() {
        let stub = StubTransport::new();
        stub.push_failure("connection refused");
        let mut session = session(&stub);

        let reply = session.submit("Hello").await.unwrap().cloned().unwrap();
        assert_eq!(reply.role(), Role::Assistant);
        assert!(reply.content().contains("connection refused"));
        assert_eq!(session.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn selected_model_is_used_for_next_request() {
        let stub = StubTransport::new();
        stub.push_content("ok");
        let mut session = session(&stub);

        session.select_model("Gemma 3 27B").unwrap();
        session.submit("Hello").await.unwrap();

        let body: serde_json::Value = serde_json::from_str(&stub.requests()[0].body).unwrap();
        assert_eq!(body["model"], "google/gemma-3-27b-it");
    }

    #[test]
    fn cycle_model_wraps_both_ways() {
        let stub = StubTransport::new();
        let mut session = session(&stub);

        assert_eq!(session.cycle_model(-1).label, "Mistral Small");
        assert_eq!(session.cycle_model(1).label, "LLaMA 3 (8B)");
        assert_eq!(session.cycle_model(2).label, "DeepSeek Chat V3");
    }

    #[test]
    fn unknown_model_is_rejected() {
        let stub = StubTransport::new();
        let mut session = session(&stub);
        assert_eq!(
            session.select_model("gpt-5"),
            Err(SessionError::UnknownModel("gpt-5".to_string()))
        );
        assert_eq!(session.model().label, "LLaMA 3 (8B)");
    }
}
