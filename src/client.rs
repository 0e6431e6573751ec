use directories::ProjectDirs;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

use crate::todo::Todo;

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

pub fn config_path() -> PathBuf {
    let dir = ProjectDirs::from("", "", "WebTodos")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    create_dir_all(&dir).ok();
    dir.join("client.json")
}

pub fn load_config() -> ClientConfig {
    if let Ok(url) = std::env::var("WEBTODOS_SERVER_URL") {
        return ClientConfig { server_url: url };
    }
    let file = match File::open(config_path()) {
        Ok(f) => f,
        Err(_) => return ClientConfig::default(),
    };
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).unwrap_or_default()
}

pub fn save_config(cfg: &ClientConfig) -> Result<(), String> {
    let file = File::create(config_path()).map_err(|e| format!("Open config failed: {}", e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, cfg).map_err(|e| format!("Write config failed: {}", e))
}

/// Blocking HTTP client for the todo API. Runs on worker threads so the UI
/// event loop never waits on the network.
#[derive(Clone)]
pub struct TodoApiClient {
    pub base_url: String,
    client: Client,
}

impl TodoApiClient {
    pub fn from_config(cfg: &ClientConfig) -> Result<Self, String> {
        if cfg.server_url.trim().is_empty() {
            return Err("Server URL is empty".into());
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| format!("HTTP client build failed: {}", e))?;
        Ok(Self {
            base_url: cfg.server_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: u64) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }

    pub fn fetch_todos(&self) -> Result<Vec<Todo>, String> {
        let url = self.todos_url();
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| format!("GET {} failed: {}", url, e))?;
        let status = resp.status();
        let text = resp.text().map_err(|e| format!("read {} failed: {}", url, e))?;
        if !status.is_success() {
            return Err(format!("List todos failed: HTTP {} - {}", status, text));
        }
        serde_json::from_str(&text).map_err(|e| format!("parse todos failed: {}", e))
    }

    pub fn create_todo(&self, text: &str, deadline: Option<&str>) -> Result<Todo, String> {
        let mut body = json!({ "text": text });
        if let Some(d) = deadline {
            body["deadline"] = json!(d);
        }
        let url = self.todos_url();
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| format!("POST {} failed: {}", url, e))?;
        Self::read_todo(resp, &url)
    }

    pub fn toggle_done(&self, id: u64, done: bool) -> Result<Todo, String> {
        self.patch(id, json!({ "done": done }))
    }

    /// Save inline edits. An empty deadline clears the stored one.
    pub fn save_edits(&self, id: u64, text: &str, deadline: &str) -> Result<Todo, String> {
        self.patch(id, json!({ "text": text, "deadline": deadline }))
    }

    fn patch(&self, id: u64, body: Value) -> Result<Todo, String> {
        let url = self.todo_url(id);
        let resp = self
            .client
            .patch(&url)
            .json(&body)
            .send()
            .map_err(|e| format!("PATCH {} failed: {}", url, e))?;
        Self::read_todo(resp, &url)
    }

    pub fn delete_todo(&self, id: u64) -> Result<Todo, String> {
        let url = self.todo_url(id);
        let resp = self
            .client
            .delete(&url)
            .send()
            .map_err(|e| format!("DELETE {} failed: {}", url, e))?;
        let status = resp.status();
        let text = resp.text().map_err(|e| format!("read {} failed: {}", url, e))?;
        if !status.is_success() {
            return Err(format!("Delete todo failed: HTTP {} - {}", status, text));
        }
        let v: Value =
            serde_json::from_str(&text).map_err(|e| format!("parse delete reply failed: {}", e))?;
        let deleted = v
            .get("deletedTodo")
            .cloned()
            .ok_or_else(|| "delete reply missing deletedTodo".to_string())?;
        serde_json::from_value(deleted).map_err(|e| format!("parse deleted todo failed: {}", e))
    }

    fn read_todo(resp: reqwest::blocking::Response, url: &str) -> Result<Todo, String> {
        let status = resp.status();
        let text = resp.text().map_err(|e| format!("read {} failed: {}", url, e))?;
        if !status.is_success() {
            return Err(format!("Request failed: HTTP {} - {}", status, text));
        }
        serde_json::from_str(&text).map_err(|e| format!("parse todo failed: {}", e))
    }
}
