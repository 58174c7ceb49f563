use async_trait::async_trait;
use multichat::{
    ApiKey, ChatSession, ChatTransport, CompletionClient, HttpReply, ModelCatalog,
    OutboundRequest, ReplyCache, Role, Turn, TransportFailure, OPENROUTER_CHAT_URL,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockGateway {
    replies: Mutex<VecDeque<HttpReply>>,
    seen: Mutex<Vec<OutboundRequest>>,
}

impl MockGateway {
    fn reply(&self, status: u16, reason: &str, body: &str) {
        self.replies.lock().unwrap().push_back(HttpReply {
            status,
            reason: reason.to_string(),
            body: body.to_string(),
        });
    }

    fn bodies(&self) -> Vec<serde_json::Value> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|req| serde_json::from_str(&req.body).unwrap())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for MockGateway {
    async fn send(&self, request: &OutboundRequest) -> Result<HttpReply, TransportFailure> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportFailure("connection refused".to_string()))
    }
}

fn session_with(gateway: &Arc<MockGateway>) -> ChatSession {
    let key = ApiKey::new("sk-or-test").unwrap();
    let client = CompletionClient::new(&key, Box::new(gateway.clone()), ReplyCache::default());
    ChatSession::new(client, ModelCatalog::default(), "LLaMA 3 (8B)").unwrap()
}

#[tokio::test]
async fn hello_scenario_sends_exact_history_on_next_request() {
    let gateway = Arc::new(MockGateway::default());
    gateway.reply(200, "OK", r#"{"choices":[{"message":{"content":"Hi!"}}]}"#);
    gateway.reply(200, "OK", r#"{"choices":[{"message":{"content":"Fine."}}]}"#);
    let mut session = session_with(&gateway);

    session.submit("Hello").await.unwrap();
    assert_eq!(
        session.conversation().all(),
        &[Turn::user("Hello"), Turn::assistant("Hi!")]
    );

    session.submit("How are you?").await.unwrap();
    let bodies = gateway.bodies();
    assert_eq!(bodies[0]["model"], "meta-llama/llama-3-8b-instruct");
    assert_eq!(bodies[0]["temperature"], 0.7);
    assert_eq!(
        bodies[1]["messages"],
        serde_json::json!([
            {"role": "user", "content": "Hello"},
            {"role": "assistant", "content": "Hi!"},
            {"role": "user", "content": "How are you?"}
        ])
    );
}

#[tokio::test]
async fn server_error_is_appended_as_assistant_reply() {
    let gateway = Arc::new(MockGateway::default());
    gateway.reply(500, "Internal Server Error", r#"{"error":{"message":"boom"}}"#);
    gateway.reply(200, "OK", r#"{"choices":[{"message":{"content":"back"}}]}"#);
    let mut session = session_with(&gateway);

    session.submit("Hello").await.unwrap();
    let reply = session.conversation().last().unwrap();
    assert_eq!(reply.role(), Role::Assistant);
    assert!(reply.content().contains("500"));
    assert!(reply.content().contains(OPENROUTER_CHAT_URL));

    // The error text is context for the next request like any other reply
    session.submit("again").await.unwrap();
    let bodies = gateway.bodies();
    let messages = bodies[1]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages[1]["content"].as_str().unwrap().contains("500"));
    assert_eq!(session.conversation().len(), 4);
}

#[tokio::test]
async fn missing_choices_yields_fixed_parse_error() {
    let gateway = Arc::new(MockGateway::default());
    gateway.reply(200, "OK", r#"{"object":"chat.completion"}"#);
    let mut session = session_with(&gateway);

    session.submit("Hello").await.unwrap();
    assert_eq!(
        session.conversation().last().unwrap().content(),
        "❌ Error: Could not parse API response or unexpected format."
    );
}

#[tokio::test]
async fn no_response_at_all_is_reported_without_a_status() {
    let gateway = Arc::new(MockGateway::default());
    let mut session = session_with(&gateway);

    session.submit("Hello").await.unwrap();
    let content = session.conversation().last().unwrap().content().to_string();
    assert!(content.contains("no response received"));
    assert!(content.contains("connection refused"));
}

#[tokio::test]
async fn repeated_pair_hits_cache_but_grown_transcript_does_not() {
    let gateway = Arc::new(MockGateway::default());
    gateway.reply(200, "OK", r#"{"choices":[{"message":{"content":"one"}}]}"#);
    gateway.reply(200, "OK", r#"{"choices":[{"message":{"content":"two"}}]}"#);
    let key = ApiKey::new("sk-or-test").unwrap();
    let mut client = CompletionClient::new(&key, Box::new(gateway.clone()), ReplyCache::new(8));

    let mut turns = vec![Turn::user("Hello")];
    assert_eq!(client.complete("deepseek/deepseek-r1", &turns).await, "one");
    assert_eq!(client.complete("deepseek/deepseek-r1", &turns).await, "one");
    assert_eq!(gateway.bodies().len(), 1);

    turns.push(Turn::assistant("one"));
    turns.push(Turn::user("Hello"));
    assert_eq!(client.complete("deepseek/deepseek-r1", &turns).await, "two");
    assert_eq!(gateway.bodies().len(), 2);
}
