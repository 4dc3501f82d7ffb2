use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use super::conversation::{Conversation, ConversationState};
use crate::gateway::RecommendationSource;
use crate::render::ResponseFormatter;

const WELCOME: &str = "¡Bienvenido! 🎬\nPor favor, ingresa tu nombre para comenzar:";
const NAME_PROMPT: &str = "Nombre> ";
const DESCRIPTION_PROMPT: &str =
    "Describe lo que quieres ver (ej: Quiero ver una película futurista con mucha acción)> ";
const EXIT_WORD: &str = "salir";

/// Interactive chat; ends on EOF or `salir` after the name step.
pub struct ChatSession<'a, W: Write> {
    conversation: Conversation,
    source: &'a dyn RecommendationSource,
    formatter: ResponseFormatter,
    out: W,
}

impl<'a, W: Write> ChatSession<'a, W> {
    pub fn new(source: &'a dyn RecommendationSource, formatter: ResponseFormatter, out: W) -> Self {
        Self {
            conversation: Conversation::new(),
            source,
            formatter,
            out,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    pub async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(conversation = %self.conversation.id(), "Chat session started");
        writeln!(self.out, "{}", WELCOME)?;

        let mut lines = input.lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let seen = self.conversation.messages().len();
            match self.conversation.state() {
                ConversationState::CollectingName => {
                    self.conversation.submit_name(&line);
                }
                // Only once a name is known, so "Salir" is still a valid name.
                ConversationState::CollectingDescription
                    if line.trim().eq_ignore_ascii_case(EXIT_WORD) =>
                {
                    writeln!(self.out, "¡Hasta luego!")?;
                    break;
                }
                ConversationState::CollectingDescription => {
                    self.conversation.set_pending_query(line);
                    self.conversation.submit_pending(self.source).await;
                }
            }
            self.print_since(seen)?;
        }

        info!(
            conversation = %self.conversation.id(),
            messages = self.conversation.messages().len(),
            "Chat session finished"
        );
        Ok(())
    }

    fn prompt(&mut self) -> std::io::Result<()> {
        let prompt = match self.conversation.state() {
            ConversationState::CollectingName => NAME_PROMPT,
            ConversationState::CollectingDescription => DESCRIPTION_PROMPT,
        };
        write!(self.out, "{}", prompt)?;
        self.out.flush()
    }

    fn print_since(&mut self, start: usize) -> std::io::Result<()> {
        for message in &self.conversation.messages()[start..] {
            let rendered = self.formatter.format(&message.text);
            writeln!(self.out, "[{}] bot:", message.sent_at.format("%H:%M:%S"))?;
            write!(self.out, "{}", rendered)?;
        }
        Ok(())
    }
}
