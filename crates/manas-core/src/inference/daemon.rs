//! Client for the model-pipeline daemon
//!
//! The daemon is a long-lived helper process that owns the ML pipelines and
//! listens on a Unix socket. Each exchange is one length-prefixed JSON
//! request followed by one length-prefixed JSON response.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ModelsConfig;
use crate::error::{Error, Result};

/// Upper bound on a single frame; generated audio stays well below this
const MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;

const READ_TIMEOUT: Duration = Duration::from_secs(120);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DaemonClient {
    socket_path: PathBuf,
    daemon_script: Option<PathBuf>,
    python_cmd: String,
    startup_timeout: Duration,
    daemon_process: Mutex<Option<Child>>,
}

impl DaemonClient {
    pub fn new(config: &ModelsConfig) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            daemon_script: config.daemon_script.clone(),
            python_cmd: config.python_cmd.clone(),
            startup_timeout: Duration::from_secs(config.daemon_startup_secs),
            daemon_process: Mutex::new(None),
        }
    }

    /// Make sure a daemon answers on the socket, spawning the configured
    /// script if none does.
    pub fn ensure_running(&self) -> Result<()> {
        if self.ping().is_ok() {
            debug!("Pipeline daemon already running at {:?}", self.socket_path);
            return Ok(());
        }

        let Some(script) = &self.daemon_script else {
            return Err(Error::DaemonError(format!(
                "No daemon listening on {:?} and no daemon script configured",
                self.socket_path
            )));
        };

        info!("Starting pipeline daemon: {} {:?}", self.python_cmd, script);

        let child = Command::new(&self.python_cmd)
            .arg(script)
            .arg("--socket")
            .arg(&self.socket_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::DaemonError(format!("Failed to start pipeline daemon: {}", e)))?;

        if let Ok(mut guard) = self.daemon_process.lock() {
            *guard = Some(child);
        }

        let started = Instant::now();
        while started.elapsed() < self.startup_timeout {
            std::thread::sleep(Duration::from_millis(250));
            if self.ping().is_ok() {
                info!("Pipeline daemon ready after {:?}", started.elapsed());
                return Ok(());
            }
        }

        Err(Error::DaemonError(format!(
            "Pipeline daemon did not answer within {:?}",
            self.startup_timeout
        )))
    }

    fn ping(&self) -> Result<()> {
        self.call("check", serde_json::json!({})).map(|_| ())
    }

    /// Send `command` with `payload` fields and return the raw response object
    pub fn call(&self, command: &str, payload: Value) -> Result<Value> {
        let request_id = Uuid::new_v4().to_string();

        let mut request = match payload {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(Error::DaemonError(format!(
                    "Daemon payload must be an object, got {}",
                    other
                )))
            }
        };
        request.insert("command".to_string(), Value::from(command));
        request.insert("request_id".to_string(), Value::from(request_id.clone()));

        let mut stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            Error::DaemonError(format!(
                "Failed to connect to pipeline daemon at {:?}: {}",
                self.socket_path, e
            ))
        })?;
        stream.set_read_timeout(Some(READ_TIMEOUT)).ok();
        stream.set_write_timeout(Some(WRITE_TIMEOUT)).ok();

        let body = serde_json::to_vec(&Value::Object(request))?;
        write_frame(&mut stream, &body)?;
        let response: Value = serde_json::from_slice(&read_frame(&mut stream)?)?;

        if let Some(error) = response.get("error").and_then(|e| e.as_str()) {
            return Err(Error::DaemonError(format!("{} failed: {}", command, error)));
        }

        debug!("Daemon {} request {} completed", command, request_id);
        Ok(response)
    }

    /// Like [`call`](Self::call), deserializing the response into `T`
    pub fn call_typed<T: DeserializeOwned>(&self, command: &str, payload: Value) -> Result<T> {
        let response = self.call(command, payload)?;
        serde_json::from_value(response).map_err(|e| {
            Error::DaemonError(format!("Unexpected {} response shape: {}", command, e))
        })
    }
}

impl Drop for DaemonClient {
    fn drop(&mut self) {
        let child = self.daemon_process.get_mut().ok().and_then(|c| c.take());
        if let Some(mut child) = child {
            warn!("Stopping pipeline daemon started by this process");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Write a 4-byte big-endian length prefix followed by `body`
pub fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> Result<()> {
    let length = u32::try_from(body.len())
        .map_err(|_| Error::DaemonError("Frame too large".to_string()))?;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed frame
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut length_buf = [0u8; 4];
    reader.read_exact(&mut length_buf)?;
    let length = u32::from_be_bytes(length_buf) as usize;

    if length > MAX_FRAME_BYTES {
        return Err(Error::DaemonError(format!(
            "Daemon frame of {} bytes exceeds limit",
            length
        )));
    }

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    Ok(body)
}
