use anyhow::{Context, Result, anyhow};
use reqwest::Client as Http;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// OpenAI-compatible chat-completions backends.
#[derive(Clone, Debug, PartialEq)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    fn base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    http: Http,
    provider: Provider,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { System, User, Assistant }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    /// If true, request JSON-only output (`json_object`).
    pub json_object: bool,
}

impl Client {
    pub fn new(provider: Provider, api_key: String, model: String) -> Result<Self> {
        let base_url = provider.base_url().to_string();
        Ok(Self {
            http: Http::builder().pool_max_idle_per_host(8).build()?,
            provider, api_key, model, base_url,
        })
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convenience: pick up OPENAI_API_KEY from env.
    pub fn from_env_openai(model: &str) -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        Self::new(Provider::OpenAi, key, model.to_string())
    }

    /// Convenience: pick up GROQ_API_KEY from env.
    pub fn from_env_groq(model: &str) -> Result<Self> {
        let key = std::env::var("GROQ_API_KEY").context("GROQ_API_KEY not set")?;
        Self::new(Provider::Groq, key, model.to_string())
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, messages: &[ChatMessage], opts: ChatOptions) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = request_body(&self.model, messages, &opts);

        let resp = self.http.post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send().await
            .context("request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(anyhow!("{} {}: {}", self.provider.name(), status, resp.text().await.unwrap_or_default()));
        }

        let v: Value = resp.json().await.context("invalid json")?;
        extract_content(&v)
    }

    /// Simple helper for one-shot prompts.
    pub async fn simple(&self, prompt: &str) -> Result<String> {
        let msgs = vec![ChatMessage::user(prompt)];
        self.chat(&msgs, ChatOptions::default()).await
    }
}

fn request_body(model: &str, messages: &[ChatMessage], opts: &ChatOptions) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": opts.temperature.unwrap_or(0.0)
    });
    if opts.json_object {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

fn extract_content(v: &Value) -> Result<String> {
    v.pointer("/choices/0/message/content")
        .and_then(|x| x.as_str())
        .map(String::from)
        .ok_or_else(|| anyhow!("missing choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_json_mode() {
        let msgs = vec![ChatMessage::system("You extract menu info."), ChatMessage::user("menu")];
        let body = request_body("gpt-3.5-turbo", &msgs, &ChatOptions { temperature: None, json_object: true });
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["response_format"]["type"], "json_object");

        let body = request_body("m", &msgs, &ChatOptions::default());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_extract_content() {
        let v = json!({"choices": [{"message": {"role": "assistant", "content": "{\"items\": []}"}}]});
        assert_eq!(extract_content(&v).unwrap(), "{\"items\": []}");
        assert!(extract_content(&json!({"choices": []})).is_err());
    }

    #[test]
    fn test_provider_urls() {
        let client = Client::new(Provider::Groq, "k".into(), "m".into()).unwrap();
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
        let client = client.with_base_url("http://localhost:8080/v1");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
