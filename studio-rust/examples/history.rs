use dotenvy::dotenv;
use forge_studio::StudioConfig;
use tracing_subscriber::EnvFilter;

/// Print the saved session. Pass `undo` to step the current pointer back one
/// artifact, or `clear` to drop the conversation.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let store = StudioConfig::from_env()?.open_store()?;

    match std::env::args().nth(1).as_deref() {
        Some("undo") => match store.revert_to_previous()? {
            Some(artifact) => println!("current is now {}", artifact.id),
            None => println!("nothing to undo"),
        },
        Some("clear") => store.clear_conversation()?,
        _ => {}
    }

    let current = store.current_artifact_id();
    for artifact in store.artifacts() {
        let marker = if current.as_deref() == Some(artifact.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {} {:>6} bytes  {}",
            artifact.id,
            artifact.source_text.len(),
            artifact.prompt
        );
    }
    println!("{} conversation turns", store.conversation().len());

    Ok(())
}
