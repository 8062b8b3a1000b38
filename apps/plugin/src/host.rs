use std::sync::Arc;

use azcheck_application::{EvaluateInput, ExecuteInput, Provider};
use azcheck_core::{AppError, AppResult};
use azcheck_domain::ExecutionStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct HostRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum HostResponse {
    Success {
        id: Value,
        result: Value,
    },
    Failure {
        id: Value,
        status: ExecutionStatus,
        error: HostError,
    },
}

#[derive(Debug, Serialize)]
struct HostError {
    kind: &'static str,
    message: String,
}

impl HostResponse {
    fn failure(id: Value, error: &AppError) -> Self {
        Self::Failure {
            id,
            status: ExecutionStatus::Failure,
            error: HostError {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }
}

/// Hands the provider to the host over stdin/stdout and serves until EOF.
pub async fn register(provider: Arc<dyn Provider>) -> AppResult<()> {
    serve(
        provider.as_ref(),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Serves newline-delimited JSON requests from `reader`, one response line
/// per request on `writer`.
pub async fn serve<R, W>(provider: &dyn Provider, mut reader: R, mut writer: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .await
            .map_err(|error| AppError::Internal(format!("failed to read host request: {error}")))?;
        if read == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buffer) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(provider, line.trim()).await,
            Err(error) => reject(&AppError::Configuration(format!(
                "host request is not valid UTF-8: {error}"
            ))),
        };

        let mut encoded = serde_json::to_vec(&response).map_err(|error| {
            AppError::Internal(format!("failed to encode host response: {error}"))
        })?;
        encoded.push(b'\n');

        writer
            .write_all(&encoded)
            .await
            .map_err(|error| AppError::Internal(format!("failed to write host response: {error}")))?;
        writer
            .flush()
            .await
            .map_err(|error| AppError::Internal(format!("failed to flush host response: {error}")))?;
    }

    debug!("host closed the request stream");
    Ok(())
}

async fn handle_line(provider: &dyn Provider, raw: &str) -> HostResponse {
    let request = match serde_json::from_str::<HostRequest>(raw) {
        Ok(request) => request,
        Err(error) => {
            return reject(&AppError::Configuration(format!(
                "invalid host request: {error}"
            )));
        }
    };

    let HostRequest { id, method, params } = request;
    match dispatch(provider, method.as_str(), params).await {
        Ok(result) => HostResponse::Success { id, result },
        Err(error) => {
            warn!(method = %method, kind = error.kind(), error = %error, "host request failed");
            HostResponse::failure(id, &error)
        }
    }
}

fn reject(error: &AppError) -> HostResponse {
    warn!(error = %error, "rejecting host request");
    HostResponse::failure(Value::Null, error)
}

async fn dispatch(provider: &dyn Provider, method: &str, params: Value) -> AppResult<Value> {
    match method {
        "evaluate" => {
            let input = decode_params::<EvaluateInput>(method, params)?;
            encode_result(provider.evaluate(input).await?)
        }
        "execute" => {
            let input = decode_params::<ExecuteInput>(method, params)?;
            encode_result(provider.execute(input).await?)
        }
        other => Err(AppError::Configuration(format!(
            "unknown host method '{other}'"
        ))),
    }
}

fn decode_params<T: for<'de> Deserialize<'de>>(method: &str, params: Value) -> AppResult<T> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };

    serde_json::from_value(params).map_err(|error| {
        AppError::Configuration(format!("invalid params for '{method}': {error}"))
    })
}

fn encode_result<T: Serialize>(result: T) -> AppResult<Value> {
    serde_json::to_value(result)
        .map_err(|error| AppError::Internal(format!("failed to encode result: {error}")))
}
