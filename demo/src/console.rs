//! Interactive stdin/stdout elicitation transport

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;
use turbomcp_forms::{ElicitationReply, ElicitationRequest, ElicitationTransport, TransportError};

/// Reply typed by the user instead of a value to decline the whole form
const DECLINE: &str = ":decline";
/// Reply typed by the user to dismiss the form
const CANCEL: &str = ":cancel";

/// Prompts for each property on stdout and reads answers from stdin.
///
/// Answers are sent back as raw text; the form's validation does the
/// coercion. An empty answer leaves the property out.
pub(crate) struct ConsoleTransport {
    io: Mutex<(Lines<BufReader<Stdin>>, Stdout)>,
}

impl ConsoleTransport {
    pub(crate) fn new() -> Self {
        Self {
            io: Mutex::new((BufReader::new(tokio::io::stdin()).lines(), tokio::io::stdout())),
        }
    }
}

fn prompt_line(name: &str, property: &Value, required: bool) -> String {
    let label = property
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(name);
    let mut line = label.to_string();
    if let Some(options) = property.get("enum").and_then(Value::as_array) {
        let options: Vec<&str> = options.iter().filter_map(Value::as_str).collect();
        line.push_str(&format!(" [{}]", options.join("/")));
    }
    if let Some(default) = property.get("default") {
        line.push_str(&format!(" (default {default})"));
    }
    if required {
        line.push_str(" *");
    }
    line.push_str(": ");
    line
}

#[async_trait]
impl ElicitationTransport for ConsoleTransport {
    async fn elicit(&self, request: &ElicitationRequest) -> Result<ElicitationReply, TransportError> {
        let mut guard = self.io.lock().await;
        let (lines, stdout) = &mut *guard;
        let schema = request.requested_schema.to_value();
        let required = request.requested_schema.required_names();

        let write = |e: std::io::Error| TransportError::Malformed(e.to_string());
        stdout
            .write_all(format!("\n{}\n(type {DECLINE} or {CANCEL} at any prompt)\n", request.message).as_bytes())
            .await
            .map_err(write)?;

        let mut content = Map::new();
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        for (name, property) in &properties {
            let is_required = required.iter().any(|r| r == name);
            stdout
                .write_all(prompt_line(name, property, is_required).as_bytes())
                .await
                .map_err(write)?;
            stdout.flush().await.map_err(write)?;

            let Some(answer) = lines.next_line().await.map_err(write)? else {
                return Err(TransportError::Closed);
            };
            match answer.trim() {
                DECLINE => return Ok(ElicitationReply::decline()),
                CANCEL => return Ok(ElicitationReply::cancel()),
                "" => {}
                text => {
                    content.insert(name.clone(), Value::String(text.to_string()));
                }
            }
        }

        Ok(ElicitationReply::accept(Value::Object(content)))
    }
}
