use serde::{Deserialize, Serialize};

use crate::domain::{Ledger, TransactionType};

use super::{Assistant, Language, build_context, build_prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

const WELCOME_HI: &str = "नमस्ते! मैं आपका AI व्यापार सहायक हूं। मुझसे अपने व्यापार के बारे में कुछ भी पूछें जैसे:
• \"इस हफ्ते के खर्च क्या हैं?\"
• \"किसका पैसा बाकी है?\"
• \"त्योहार के लिए ऑफर मैसेज बनाओ\"";

const WELCOME_EN: &str = "Hello! I am your AI business assistant. Ask me anything about your business, for example:
• \"What are this week's expenses?\"
• \"Who still owes me money?\"
• \"Write an offer message for the festival\"";

pub fn welcome_message(language: Language) -> &'static str {
    match language {
        Language::Hi => WELCOME_HI,
        _ => WELCOME_EN,
    }
}

/// One user's working state: their ledger, the conversation so far and the
/// language replies should be written in.
///
/// Sessions are built explicitly and passed to whatever needs them.
#[derive(Debug, Clone)]
pub struct Session {
    ledger: Ledger,
    chat_history: Vec<ChatMessage>,
    language: Language,
}

impl Session {
    /// An empty session with no ledger data and no messages.
    pub fn new(language: Language) -> Self {
        Self {
            ledger: Ledger::new(),
            chat_history: Vec::new(),
            language,
        }
    }

    /// A fresh session seeded with sample transactions and the welcome message.
    pub fn initialize(language: Language) -> Self {
        let mut session = Self::new(language);
        session.load_sample_data();
        session.add_welcome_message();
        session
    }

    /// Resume a session around an existing ledger.
    pub fn from_ledger(ledger: Ledger, language: Language) -> Self {
        let mut session = Self {
            ledger,
            chat_history: Vec::new(),
            language,
        };
        session.add_welcome_message();
        session
    }

    fn load_sample_data(&mut self) {
        let samples = [
            ("राम कुमार", 150000, TransactionType::Credit, "दूध की बिक्री"),
            ("श्याम", 50000, TransactionType::Debit, "सामान खरीदा"),
        ];
        for (name, amount, transaction_type, description) in samples {
            if let Err(e) = self
                .ledger
                .add_transaction(name, amount, transaction_type, description, None)
            {
                log::warn!("Skipping sample transaction for '{}': {}", name, e);
            }
        }
    }

    fn add_welcome_message(&mut self) {
        self.add_chat_message(Role::Assistant, welcome_message(self.language));
    }

    pub fn add_chat_message(&mut self, role: Role, content: impl Into<String>) {
        self.chat_history.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Ask the assistant a question about the business.
    ///
    /// Both the question and the reply are appended to the chat history. If
    /// the assistant fails, the reply is an inline error message; the ledger
    /// is never modified either way.
    pub async fn ask<A: Assistant>(&mut self, assistant: &A, question: &str) -> String {
        self.add_chat_message(Role::User, question);

        let context = build_context(&self.ledger.generate_business_insights(), self.language);
        let prompt = build_prompt(&context, question);

        let reply = match assistant.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Assistant call failed: {}", e);
                format!("Error: {}", e)
            }
        };

        self.add_chat_message(Role::Assistant, reply.clone());
        reply
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::application::AssistantError;

    struct RecordingAssistant {
        prompts: Mutex<Vec<String>>,
    }

    impl Assistant for RecordingAssistant {
        async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("Ram owes you ₹1,500.00".to_string())
        }
    }

    struct FailingAssistant;

    impl Assistant for FailingAssistant {
        async fn generate(&self, _prompt: &str) -> Result<String, AssistantError> {
            Err(AssistantError::EmptyResponse)
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new(Language::En);
        assert!(session.ledger().is_empty());
        assert!(session.chat_history().is_empty());
    }

    #[test]
    fn test_initialize_seeds_ledger_and_welcome() {
        let session = Session::initialize(Language::Hi);

        let ledger = session.ledger();
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.calculate_total_balance(), 100000);
        assert_eq!(ledger.customer("राम कुमार").unwrap().balance, 150000);
        assert_eq!(ledger.customer("श्याम").unwrap().balance, -50000);

        assert_eq!(session.chat_history().len(), 1);
        assert_eq!(session.chat_history()[0].role, Role::Assistant);
        assert!(session.chat_history()[0].content.starts_with("नमस्ते"));
    }

    #[test]
    fn test_welcome_follows_language() {
        let session = Session::from_ledger(Ledger::new(), Language::Ta);
        assert!(session.chat_history()[0].content.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn test_ask_records_conversation() {
        let mut session = Session::initialize(Language::En);
        let assistant = RecordingAssistant {
            prompts: Mutex::new(Vec::new()),
        };

        let reply = session.ask(&assistant, "Who owes me money?").await;
        assert_eq!(reply, "Ram owes you ₹1,500.00");

        let history = session.chat_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "Who owes me money?");
        assert_eq!(history[2].role, Role::Assistant);

        let prompts = assistant.prompts.lock().unwrap();
        assert!(prompts[0].contains("Respond in English."));
        assert!(prompts[0].contains("- Total Balance: ₹1,000.00"));
        assert!(prompts[0].ends_with("USER QUESTION: Who owes me money?"));
    }

    #[tokio::test]
    async fn test_ask_failure_degrades_to_message() {
        let mut session = Session::initialize(Language::En);
        let before = session.ledger().export_data();

        let reply = session.ask(&FailingAssistant, "Sales this week?").await;

        assert!(reply.starts_with("Error: "));
        assert_eq!(session.chat_history().last().unwrap().content, reply);
        assert_eq!(session.ledger().export_data(), before);
    }
}
