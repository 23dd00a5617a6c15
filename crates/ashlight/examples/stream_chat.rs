//! Stream a reply and print fragments as they arrive.

use std::io::Write as _;

use ashlight::{Assistant, ClientError};

fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt::init();

    let assistant = Assistant::load("quickstart-sam")?;

    for event in assistant.chat().stream("Summarize your return policy.")? {
        let event = event?;
        print!("{}", event.content());
        std::io::stdout().flush().ok();
        if event.stream_ended {
            if let Some(references) = event.references() {
                println!("\n({} memories consulted)", references.memory_ids.len());
            }
        }
    }
    Ok(())
}
