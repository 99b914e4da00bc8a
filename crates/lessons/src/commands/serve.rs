use lessons_core::{Engine, LessonsError, ObserveRequest, ReflectRequest};
use lessons_index::ArtifactSource;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

/// Answer one request line. Never fails: every problem becomes an
/// `{"ok":false}` response echoing the request id.
pub fn handle_line<S: ArtifactSource>(engine: &Engine<S>, line: &str, session: &str) -> Value {
    let request: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return respond(Value::Null, Err(format!("invalid request: {}", e))),
    };
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    let result = match panic::catch_unwind(AssertUnwindSafe(|| {
        dispatch(engine, &request, session)
    })) {
        Ok(outcome) => outcome.map_err(|e| e.to_string()),
        Err(payload) => Err(format!("internal error: {}", panic_message(payload.as_ref()))),
    };

    respond(id, result)
}

fn dispatch<S: ArtifactSource>(
    engine: &Engine<S>,
    request: &Value,
    session: &str,
) -> lessons_core::Result<Value> {
    let op = request
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| LessonsError::InvalidRequest("missing `op`".to_string()))?;

    let params = match request.get("params") {
        None | Some(Value::Null) => json!({}),
        Some(p) => p.clone(),
    };

    match op {
        "observe" => {
            let req: ObserveRequest = serde_json::from_value(params)?;
            Ok(serde_json::to_value(engine.observe(req, session)?)?)
        }
        "reflect" => {
            let req: ReflectRequest = serde_json::from_value(params)?;
            Ok(serde_json::to_value(engine.reflect(&req)?)?)
        }
        "stats" => Ok(serde_json::to_value(engine.stats()?)?),
        other => Err(LessonsError::InvalidRequest(format!(
            "unknown operation: {}",
            other
        ))),
    }
}

fn respond(id: Value, result: Result<Value, String>) -> Value {
    match result {
        Ok(result) => json!({ "id": id, "ok": true, "result": result }),
        Err(error) => {
            tracing::warn!(%error, "request failed");
            json!({ "id": id, "ok": false, "error": error })
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

pub fn run() -> anyhow::Result<()> {
    let engine = super::open_engine()?;
    let session = super::session_id();
    tracing::info!(%session, "serving requests on stdin");

    let mut reader = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&engine, line.trim(), &session);
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    tracing::info!("stdin closed");
    Ok(())
}
