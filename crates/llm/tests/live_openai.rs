//! Live calls against real providers. Run with `--ignored` and keys in `.env`.
use llm::{Client, ChatMessage, ChatOptions};

fn init_env() {
    // Load .env from workspace root (two levels up from tests)
    let _ = dotenv::from_path("../../.env");
}

#[tokio::test]
#[ignore]
async fn basic_call_openai() {
    init_env();
    let cli = Client::from_env_openai("gpt-3.5-turbo").unwrap();
    let out = cli.simple("Say OK.").await.unwrap();
    println!("Response: {}", out);
    assert!(!out.trim().is_empty());
}

#[tokio::test]
#[ignore]
async fn menu_json_mode_groq() {
    init_env();
    let cli = Client::from_env_groq("llama-3.1-8b-instant").unwrap();
    let msgs = vec![
        ChatMessage::system("You extract menu info. Reply ONLY as JSON: {\"items\": [{\"name\", \"description\", \"price\"}]}"),
        ChatMessage::user("PORK ROLL $4.50 - Taylor ham on a kaiser roll"),
    ];
    let out = cli.chat(&msgs, ChatOptions { json_object: true, temperature: Some(0.0) }).await.unwrap();
    println!("JSON Response: {}", out);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(v.get("items").and_then(|x| x.as_array()).is_some());
}
