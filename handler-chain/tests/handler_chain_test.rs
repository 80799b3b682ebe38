//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Every test handler writes its phase calls into a shared journal, so each test asserts on the
//! exact call order of one chain run.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Chat, DbotError, Handler, HandlerResponse, Message, Result, User};
use handler_chain::HandlerChain;

type Journal = Arc<Mutex<Vec<String>>>;

/// Configurable handler that journals `<name>.before`, `<name>.handle`, `<name>.after(<response>)`.
struct Step {
    name: &'static str,
    journal: Journal,
    admit: bool,
    response: HandlerResponse,
    fail_handle: bool,
}

impl Step {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            admit: true,
            response: HandlerResponse::Continue,
            fail_handle: false,
        }
    }

    fn stopping(mut self) -> Self {
        self.response = HandlerResponse::Stop;
        self
    }

    fn rejecting(mut self) -> Self {
        self.admit = false;
        self
    }

    fn failing(mut self) -> Self {
        self.fail_handle = true;
        self
    }

    fn log(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl Handler for Step {
    async fn before(&self, _message: &Message) -> Result<bool> {
        self.log(format!("{}.before", self.name));
        Ok(self.admit)
    }

    async fn handle(&self, _message: &Message) -> Result<HandlerResponse> {
        self.log(format!("{}.handle", self.name));
        if self.fail_handle {
            return Err(DbotError::Bot("send failed".to_string()));
        }
        Ok(self.response)
    }

    async fn after(&self, _message: &Message, response: &HandlerResponse) -> Result<()> {
        self.log(format!("{}.after({:?})", self.name, response));
        Ok(())
    }
}

fn menu_message() -> Message {
    Message {
        id: "42".to_string(),
        user: User {
            id: 7,
            username: Some("reader".to_string()),
            first_name: Some("Anna".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 7,
            chat_type: "private".to_string(),
        },
        content: "Статистика".to_string(),
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// **Test: logging-style handler, then a terminal handler that stops.**
///
/// **Expected:** befores in order, handles up to the stopping one, afters in reverse seeing Stop.
#[tokio::test]
async fn test_terminal_handler_stops_and_afters_see_stop() {
    let journal = Journal::default();
    let chain = HandlerChain::new()
        .add_handler(Arc::new(Step::new("log", &journal)))
        .add_handler(Arc::new(Step::new("menu", &journal).stopping()))
        .add_handler(Arc::new(Step::new("unreached", &journal)));

    let response = chain.handle(&menu_message()).await.unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    assert_eq!(
        entries(&journal),
        vec![
            "log.before",
            "menu.before",
            "unreached.before",
            "log.handle",
            "menu.handle",
            "unreached.after(Stop)",
            "menu.after(Stop)",
            "log.after(Stop)",
        ]
    );
}

/// **Test: no handler stops; every handle runs and the chain returns Continue.**
#[tokio::test]
async fn test_all_continue() {
    let journal = Journal::default();
    let chain = HandlerChain::new()
        .add_handler(Arc::new(Step::new("a", &journal)))
        .add_handler(Arc::new(Step::new("b", &journal)));

    let response = chain.handle(&menu_message()).await.unwrap();

    assert_eq!(response, HandlerResponse::Continue);
    assert_eq!(
        entries(&journal),
        vec!["a.before", "b.before", "a.handle", "b.handle", "b.after(Continue)", "a.after(Continue)"]
    );
}

/// **Test: a rejecting before ends the run at once; no handle or after runs.**
#[tokio::test]
async fn test_rejecting_before_stops_everything() {
    let journal = Journal::default();
    let chain = HandlerChain::new()
        .add_handler(Arc::new(Step::new("gate", &journal).rejecting()))
        .add_handler(Arc::new(Step::new("menu", &journal).stopping()));

    let response = chain.handle(&menu_message()).await.unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    assert_eq!(entries(&journal), vec!["gate.before"]);
}

/// **Test: an error from handle propagates and skips the after phase.**
#[tokio::test]
async fn test_handle_error_propagates() {
    let journal = Journal::default();
    let chain = HandlerChain::new()
        .add_handler(Arc::new(Step::new("log", &journal)))
        .add_handler(Arc::new(Step::new("menu", &journal).failing()));

    let result = chain.handle(&menu_message()).await;

    assert!(matches!(result, Err(DbotError::Bot(_))));
    assert_eq!(
        entries(&journal),
        vec!["log.before", "menu.before", "log.handle", "menu.handle"]
    );
}

/// **Test: an empty chain returns Continue; clones share the handler list.**
#[tokio::test]
async fn test_empty_chain_and_clone() {
    let empty = HandlerChain::new();
    assert!(empty.is_empty());
    assert_eq!(empty.handle(&menu_message()).await.unwrap(), HandlerResponse::Continue);

    let journal = Journal::default();
    let chain = HandlerChain::new().add_handler(Arc::new(Step::new("only", &journal).stopping()));
    let cloned = chain.clone();

    assert_eq!(cloned.len(), 1);
    cloned.handle(&menu_message()).await.unwrap();
    assert_eq!(entries(&journal), vec!["only.before", "only.handle", "only.after(Stop)"]);
}
