//! Shared helpers for the integration tests
//!
//! `StubServer` stands in for the pictogram service and the segmentation
//! service: a plain TCP listener answering canned JSON per request path.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

/// Build a command with a hermetic environment
pub fn aacboard(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("aacboard"));
    for var in [
        "AACBOARD_DATA_DIR",
        "AACBOARD_API_BASE",
        "AACBOARD_LANGS",
        "AACBOARD_TIMEOUT",
        "AACBOARD_LLM_BASE",
        "AACBOARD_LLM_MODEL",
        "AACBOARD_LLM_RETRY_MS",
        "OPENAI_API_KEY",
        "RUST_LOG",
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_PROXY", "127.0.0.1,localhost")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--no-color");
    cmd
}

pub fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

/// Items of one kind, in output order
pub fn of_kind<'a>(items: &'a [Value], kind: &str) -> Vec<&'a Value> {
    items
        .iter()
        .filter(|v| v.get("kind").and_then(Value::as_str) == Some(kind))
        .collect()
}

/// `picto_id` of every cell item (None for cells without a pictogram)
pub fn cell_ids(items: &[Value]) -> Vec<Option<String>> {
    of_kind(items, "cell")
        .into_iter()
        .map(|c| c.get("picto_id").and_then(Value::as_str).map(str::to_string))
        .collect()
}

/// Canned-response HTTP server on 127.0.0.1
pub struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Start a server answering `path -> (status, body)`; unknown paths get `404 []`
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let base = format!("http://{}", listener.local_addr().unwrap());

        let routes: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let _ = handle(stream, &routes, &seen);
            }
        });

        Self { base, requests }
    }

    /// Pictogram search routes: `(lang, term, ids)`, plus any extra routes
    pub fn pictograms(hits: &[(&str, &str, &[u32])]) -> Self {
        let bodies: Vec<(String, String)> = hits
            .iter()
            .map(|(lang, term, ids)| {
                let body: Vec<Value> = ids.iter().map(|id| serde_json::json!({ "_id": id })).collect();
                (format!("/{}/search/{}", lang, term), Value::Array(body).to_string())
            })
            .collect();
        let routes: Vec<(&str, u16, &str)> = bodies
            .iter()
            .map(|(path, body)| (path.as_str(), 200, body.as_str()))
            .collect();
        Self::start(&routes)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Paths requested so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| p.as_str() == path).count()
    }
}

fn handle(
    stream: TcpStream,
    routes: &HashMap<String, (u16, String)>,
    seen: &Mutex<Vec<String>>,
) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let target = request_line.split_whitespace().nth(1)?.to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    // record before answering
    seen.lock().unwrap().push(path.clone());

    let (status, body) = routes
        .get(&path)
        .cloned()
        .unwrap_or_else(|| (404, "[]".to_string()));
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Status",
    };

    let mut stream = stream;
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()?;
    Some(())
}

/// A base URL nothing listens on
pub fn closed_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
