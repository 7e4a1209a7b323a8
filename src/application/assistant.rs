use std::future::Future;
use std::io::ErrorKind;
use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::{BusinessInsights, format_currency};

use super::Language;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Failed to start assistant '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Assistant I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Assistant exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Assistant returned an empty response")]
    EmptyResponse,
}

/// A text generator that turns a prompt into prose. The ledger knows nothing
/// about how the reply is produced.
pub trait Assistant {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, AssistantError>> + Send;
}

/// Assistant backed by an external program: the prompt is written to its
/// stdin and its stdout is the reply.
#[derive(Debug, Clone)]
pub struct CommandAssistant {
    program: String,
    args: Vec<String>,
}

impl CommandAssistant {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line like `"llm -m mini"` on whitespace.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Assistant for CommandAssistant {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        log::debug!("Running assistant '{}' {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AssistantError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that ignores its input may close the pipe early
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(AssistantError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let reply = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if reply.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(reply)
    }
}

/// Context block describing the business, prepended to every question.
pub fn build_context(insights: &BusinessInsights, language: Language) -> String {
    let top_customers = if insights.top_customers.is_empty() {
        "none".to_string()
    } else {
        insights
            .top_customers
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "You are an AI business assistant. Respond in {}.\n\
         BUSINESS CONTEXT:\n\
         - Total Balance: {}\n\
         - Total Sales: {}\n\
         - Total Expenses: {}\n\
         - Net Profit: {}\n\
         - Top Customers: {}",
        language.display_name(),
        format_currency(insights.total_balance),
        format_currency(insights.total_sales),
        format_currency(insights.total_expenses),
        format_currency(insights.net_profit),
        top_customers
    )
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!("{}\n\nUSER QUESTION: {}", context, question)
}
