//! Seed an assistant's memory and recall from it.

use ashlight::{Assistant, ClientError, MemoryItem};

fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt::init();

    let assistant = Assistant::load("quickstart-sam")?;
    let name = assistant.config().name.clone();

    let items = vec![
        MemoryItem::new(&name, "Standard shipping takes 3-5 business days.")?
            .with_source("faq.md"),
        MemoryItem::new(&name, "Returns are accepted within 30 days of delivery.")?
            .with_source("faq.md"),
    ];
    assistant.memory().add(&items)?;

    // Teaching hands raw text to the server, which chunks and embeds it.
    let learned = assistant
        .learn()
        .fast("Express shipping is available for orders above $50.")?;
    println!("learned {} new memories", learned.len());

    let recalled = assistant.memory().recall("how long does shipping take", 10)?;
    for item in &recalled {
        println!(
            "[{:.2}] {}",
            item.relevance.unwrap_or_default(),
            item.content
        );
    }
    Ok(())
}
