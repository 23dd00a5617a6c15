//! Async variant of the chat flow.

use ashlight::{AsyncAssistant, ClientError};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt::init();

    let assistant = AsyncAssistant::load("quickstart-sam").await?;

    let reply = assistant.chat().message("What are your shipping options?").await?;
    println!("assistant: {}", reply.content());

    let mut stream = assistant.chat().stream("And to Norway?").await?;
    while let Some(event) = stream.next_event().await {
        print!("{}", event?.content());
    }
    println!();
    Ok(())
}
