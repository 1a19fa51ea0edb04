use dotenvy::dotenv;
use forge_studio::{ComponentCompiler, StudioConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let prompt = if prompt.is_empty() {
        "A counter with increment and reset buttons".to_string()
    } else {
        prompt
    };

    let config = StudioConfig::from_env()?;
    let studio = config.studio()?;

    let artifact = studio.submit(&prompt).await?;
    println!("{}", artifact.source_text);

    if let Some(compiler) = config.compiler() {
        let compiled = compiler.compile(&artifact.source_text).await?;
        println!("// compiled module: {} bytes", compiled.js.len());
    }

    Ok(())
}
