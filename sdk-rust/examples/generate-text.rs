use dotenvy::dotenv;
use forge_llm::{
    openai::{OpenAIChatModel, OpenAIChatModelOptions},
    ChatMessage, LanguageModel, LanguageModelInput,
};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let model = OpenAIChatModel::new(
        "gpt-3.5-turbo",
        OpenAIChatModelOptions {
            api_key: std::env::var("OPENAI_API_KEY")
                .expect("OPENAI_API_KEY environment variable must be set"),
            ..Default::default()
        },
    );

    let response = model
        .generate(LanguageModelInput {
            messages: vec![
                ChatMessage::system("Reply with a single Svelte component and nothing else."),
                ChatMessage::user("A toggle switch."),
                ChatMessage::assistant("<script>let on = false;</script>\n<button on:click={() => (on = !on)}>{on ? 'On' : 'Off'}</button>"),
                ChatMessage::user("Make it green when on."),
            ],
            max_tokens: Some(2000),
            temperature: Some(0.7),
        })
        .await
        .unwrap();

    println!("{response:#?}");
}
