//! One user exchange: gate on input, ask the gateway, shape the reply.

use crate::gateway::CompletionGateway;

pub const MISSING_PROMPT_MESSAGE: &str = "Please enter a message to send.";
pub const PYTHON_REFERENCE: &str = "\n\n References: Python_Doc_1.pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    MissingPrompt,
}

impl Outcome {
    /// Text shown to the user for this outcome.
    pub fn text(&self) -> &str {
        match self {
            Self::Reply(reply) => reply,
            Self::MissingPrompt => MISSING_PROMPT_MESSAGE,
        }
    }
}

pub async fn respond(gateway: &dyn CompletionGateway, input: &str) -> Outcome {
    if input.trim().is_empty() {
        return Outcome::MissingPrompt;
    }

    let mut reply = match gateway.complete(input).await {
        Ok(text) => text,
        Err(err) => format!("Error: {err}"),
    };

    if mentions_python(input) {
        reply.push_str(PYTHON_REFERENCE);
    }

    Outcome::Reply(reply)
}

fn mentions_python(prompt: &str) -> bool {
    prompt.to_lowercase().contains("python")
}
