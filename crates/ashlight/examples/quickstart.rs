//! Create an assistant, chat with it, and clean up.
//!
//! Requires `ASHLIGHT_API_KEY` in the environment.

use ashlight::{Assistant, AssistantConfig, ClientError};

fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt::init();

    let config = AssistantConfig::new(
        "quickstart-sam",
        "Help users track their orders politely and concisely.",
    )?;
    let assistant = Assistant::create(config)?;

    let reply = assistant.chat().message("Where is my order #4211?")?;
    println!("assistant: {}", reply.content());

    assistant.delete(true)?;
    Ok(())
}
