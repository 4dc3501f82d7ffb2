use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::gateway::{recommend_or_fallback, RecommendationSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    CollectingName,
    CollectingDescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    fn bot(text: String) -> Self {
        Self {
            text,
            sender: Sender::Bot,
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
}

/// One chat with one user: the two-step flow, the bot message log and the
/// text currently typed into the input box.
///
/// The log is append-only; `messages()` hands out a shared slice only.
#[derive(Debug)]
pub struct Conversation {
    id: Uuid,
    state: ConversationState,
    profile: UserProfile,
    messages: Vec<Message>,
    pending: String,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ConversationState::CollectingName,
            profile: UserProfile::default(),
            messages: Vec::new(),
            pending: String::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_query(&self) -> &str {
        &self.pending
    }

    pub fn set_pending_query(&mut self, text: impl Into<String>) {
        self.pending = text.into();
    }

    /// Stores the name and greets the user. Returns false and changes nothing
    /// when the name is blank or was already collected.
    pub fn submit_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.state != ConversationState::CollectingName {
            return false;
        }

        self.profile.name = name.to_string();
        self.push_bot(format!(
            "¡Hola {}! ¿Qué tipo de película o serie buscas hoy? 🎬",
            name
        ));
        self.state = ConversationState::CollectingDescription;

        info!(conversation = %self.id, "Name collected");
        true
    }

    /// Sends the description to `source` and appends the thinking message and
    /// the reply. A failing source yields the fallback text; the error is only
    /// logged. Returns false for blank input or before a name is known.
    pub async fn submit_description<S>(&mut self, text: &str, source: &S) -> bool
    where
        S: RecommendationSource + ?Sized,
    {
        if text.trim().is_empty() || self.state != ConversationState::CollectingDescription {
            return false;
        }

        self.push_bot(format!("Gracias, {}. Déjame pensar... 🤔", self.profile.name));

        debug!(conversation = %self.id, query = %text, "Requesting recommendations");
        let reply = recommend_or_fallback(source, text).await;

        self.push_bot(reply);
        self.pending.clear();
        self.state = ConversationState::CollectingDescription;
        true
    }

    /// Submits whatever is in the input buffer as a description.
    pub async fn submit_pending<S>(&mut self, source: &S) -> bool
    where
        S: RecommendationSource + ?Sized,
    {
        let text = self.pending.clone();
        self.submit_description(&text, source).await
    }

    fn push_bot(&mut self, text: String) {
        self.messages.push(Message::bot(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use async_trait::async_trait;

    struct FixedSource(&'static str);

    #[async_trait]
    impl RecommendationSource for FixedSource {
        async fn recommend(&self, _query: &str) -> Result<String, GatewayError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecommendationSource for FailingSource {
        async fn recommend(&self, _query: &str) -> Result<String, GatewayError> {
            Err(GatewayError::Status(503))
        }
    }

    fn texts(conv: &Conversation) -> Vec<&str> {
        conv.messages().iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_new_conversation() {
        let conv = Conversation::new();
        assert_eq!(conv.state(), ConversationState::CollectingName);
        assert!(conv.messages().is_empty());
        assert_eq!(conv.profile().name, "");
        assert_eq!(conv.pending_query(), "");
    }

    #[test]
    fn test_submit_name() {
        for name in ["Ana", "  Luis  ", "María José"] {
            let mut conv = Conversation::new();
            assert!(conv.submit_name(name));
            assert_eq!(conv.state(), ConversationState::CollectingDescription);
            assert_eq!(conv.messages().len(), 1);
            assert!(conv.messages()[0].text.contains(name.trim()));
            assert_eq!(conv.messages()[0].sender, Sender::Bot);
            assert_eq!(conv.profile().name, name.trim());
        }
    }

    #[test]
    fn test_blank_name_is_ignored() {
        for name in ["", "   ", "\t\n"] {
            let mut conv = Conversation::new();
            assert!(!conv.submit_name(name));
            assert_eq!(conv.state(), ConversationState::CollectingName);
            assert!(conv.messages().is_empty());
        }
    }

    #[test]
    fn test_name_only_once() {
        let mut conv = Conversation::new();
        assert!(conv.submit_name("Ana"));
        assert!(!conv.submit_name("Luis"));
        assert_eq!(conv.profile().name, "Ana");
        assert_eq!(conv.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_description_before_name_is_ignored() {
        let mut conv = Conversation::new();
        assert!(!conv.submit_description("acción", &FixedSource("x")).await);
        assert!(conv.messages().is_empty());
    }

    #[tokio::test]
    async fn test_submit_description() {
        let mut conv = Conversation::new();
        conv.submit_name("Ana");
        conv.set_pending_query("algo futurista");

        assert!(conv.submit_pending(&FixedSource("Título: Dune")).await);
        assert_eq!(
            texts(&conv),
            vec![
                "¡Hola Ana! ¿Qué tipo de película o serie buscas hoy? 🎬",
                "Gracias, Ana. Déjame pensar... 🤔",
                "Título: Dune",
            ]
        );
        assert_eq!(conv.pending_query(), "");
        assert_eq!(conv.state(), ConversationState::CollectingDescription);
    }

    #[tokio::test]
    async fn test_blank_description_is_ignored() {
        let mut conv = Conversation::new();
        conv.submit_name("Ana");
        conv.set_pending_query("   ");
        assert!(!conv.submit_pending(&FixedSource("x")).await);
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.pending_query(), "   ");
    }

    #[tokio::test]
    async fn test_failing_source_uses_fallback() {
        let mut conv = Conversation::new();
        conv.submit_name("Ana");
        assert!(conv.submit_description("futuristic action", &FailingSource).await);
        assert_eq!(
            conv.messages().last().map(|m| m.text.as_str()),
            Some("No tengo recomendaciones, pero intenta de nuevo.")
        );
    }

    #[tokio::test]
    async fn test_log_only_grows() {
        let mut conv = Conversation::new();
        conv.submit_name("Ana");
        for query in ["terror", "comedia", "drama"] {
            let before = conv.messages().to_vec();
            conv.submit_description(query, &FixedSource("ok")).await;
            assert_eq!(conv.messages().len(), before.len() + 2);
            assert_eq!(&conv.messages()[..before.len()], &before[..]);
        }
    }
}
