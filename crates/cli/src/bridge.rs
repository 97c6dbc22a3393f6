use async_trait::async_trait;
use locview_protocol::{ExtractionRequest, QueryRequest, QueryResult};
use locview_resolver::{ExtractionService, QueryService, ResolveError, Result};
use serde::Serialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Helper process that fronts the query and extraction engines.
///
/// Each call spawns `argv`, writes one `{"command", "params"}` document to its
/// stdin and reads one JSON document from its stdout. A non-zero exit or an
/// `error` field in the reply is reported as [`ResolveError::External`].
#[derive(Debug, Clone)]
pub struct BridgeProcess {
    argv: Vec<String>,
}

#[derive(Serialize)]
struct Envelope<'a, P: Serialize> {
    command: &'a str,
    params: &'a P,
}

impl BridgeProcess {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn is_configured(&self) -> bool {
        !self.argv.is_empty()
    }

    async fn call<P: Serialize + Sync>(&self, command: &str, params: &P) -> Result<Value> {
        let (program, args) = self.argv.split_first().ok_or_else(|| {
            ResolveError::external("bridge command is not configured (see `locview config --bridge`)")
        })?;

        let input = serde_json::to_vec(&Envelope { command, params })?;
        log::debug!("Bridge {command} via {program}");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::external(format!(
                "{command} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let reply: Value = serde_json::from_slice(&output.stdout).map_err(|err| {
            ResolveError::malformed(format!("{command} returned invalid JSON: {err}"))
        })?;
        reply_error(&reply).map_or(Ok(reply), |message| {
            Err(ResolveError::external(format!("{command}: {message}")))
        })
    }
}

fn reply_error(reply: &Value) -> Option<String> {
    match reply.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl QueryService for BridgeProcess {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        let reply = self.call("query_db", request).await?;
        Ok(serde_json::from_value(reply)?)
    }
}

#[async_trait]
impl ExtractionService for BridgeProcess {
    async fn extract(&self, request: &ExtractionRequest) -> Result<Value> {
        self.call(request.kind.command(), &request.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_is_detected() {
        assert_eq!(reply_error(&json!({"error": "locked"})).as_deref(), Some("locked"));
        assert_eq!(reply_error(&json!({"error": null, "rows": []})), None);
        assert_eq!(reply_error(&json!({"rows": []})), None);
    }

    #[tokio::test]
    async fn unconfigured_bridge_fails_as_external() {
        let bridge = BridgeProcess::new(Vec::new());
        let request = QueryRequest {
            store_path: "/g/meta".to_string(),
            query: "SELECT 1".to_string(),
            key: String::new(),
        };
        let err = bridge.query(&request).await.unwrap_err();
        assert!(matches!(err, ResolveError::External(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn query_reply_is_parsed() {
        let script = r#"cat > /dev/null; printf '{"header":["h","n"],"rows":[["ab12","x"]]}'"#;
        let bridge = BridgeProcess::new(vec!["sh".into(), "-c".into(), script.into()]);
        let request = QueryRequest {
            store_path: "/g/meta".to_string(),
            query: "SELECT h, n FROM a".to_string(),
            key: "k".to_string(),
        };
        let result = bridge.query(&request).await.unwrap();
        assert_eq!(result.columns, vec!["h", "n"]);
        assert_eq!(result.first_column(), vec!["ab12"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_process_is_external_error() {
        let bridge = BridgeProcess::new(vec![
            "sh".into(),
            "-c".into(),
            "cat > /dev/null; echo boom >&2; exit 3".into(),
        ]);
        let request = QueryRequest {
            store_path: String::new(),
            query: String::new(),
            key: String::new(),
        };
        match bridge.query(&request).await {
            Err(ResolveError::External(message)) => assert!(message.contains("boom"), "{message}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
