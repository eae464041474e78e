//! `cue` subprocess evaluator.
//!
//! Runs `cue eval <sources...> -e <expression> --out json` inside the
//! catalog directory and parses stdout as JSON. Schema checks run
//! `cue vet -d <definition> <schema> <data>`.

use std::{
    io::{self, Read},
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use cuecfg_core::{
    application::{
        ApplicationError,
        ports::{EvaluationRequest, Evaluator, VetRequest},
    },
    error::CuecfgResult,
};

/// Default evaluator program.
pub const DEFAULT_PROGRAM: &str = "cue";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Evaluator backed by the `cue` command-line tool.
#[derive(Debug, Clone)]
pub struct CueEvaluator {
    program: String,
    timeout: Option<Duration>,
}

impl CueEvaluator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the evaluator when it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn arguments(request: &EvaluationRequest) -> Vec<String> {
        let mut args = Vec::with_capacity(request.sources.len() + 5);
        args.push("eval".to_string());
        args.extend(request.sources.iter().cloned());
        args.extend([
            "-e".to_string(),
            request.expression.clone(),
            "--out".to_string(),
            "json".to_string(),
        ]);
        args
    }

    fn vet_arguments(request: &VetRequest) -> Vec<String> {
        vec![
            "vet".to_string(),
            "-d".to_string(),
            request.definition.clone(),
            request.schema.display().to_string(),
            request.data.display().to_string(),
        ]
    }

    fn failed(&self, output: &str, diagnostic: impl Into<String>) -> ApplicationError {
        ApplicationError::EvaluationFailed {
            output: output.to_string(),
            diagnostic: diagnostic.into(),
        }
    }

    fn unavailable(&self, e: &io::Error) -> ApplicationError {
        ApplicationError::EvaluatorUnavailable {
            program: self.program.clone(),
            reason: e.to_string(),
        }
    }

    /// Wait for the child, killing it once the deadline passes.
    ///
    /// Returns `None` on timeout.
    fn wait(&self, child: &mut Child) -> io::Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return child.wait().map(Some);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                warn!(program = %self.program, ?timeout, "Evaluator timed out, killing it");
                child.kill()?;
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for CueEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

impl Evaluator for CueEvaluator {
    fn program(&self) -> String {
        self.program.clone()
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    #[instrument(skip_all, fields(program = %self.program, output = %request.output))]
    fn evaluate(&self, request: &EvaluationRequest) -> CuecfgResult<Value> {
        let stdout = self.run(&Self::arguments(request), &request.working_dir, &request.output)?;
        serde_json::from_slice(&stdout).map_err(|e| {
            self.failed(&request.output, format!("output is not valid JSON: {e}"))
                .into()
        })
    }

    #[instrument(skip_all, fields(program = %self.program, data = %request.data.display()))]
    fn vet(&self, request: &VetRequest) -> CuecfgResult<()> {
        let output = request
            .data
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.data.display().to_string());
        self.run(&Self::vet_arguments(request), &request.working_dir, &output)?;
        Ok(())
    }
}

impl CueEvaluator {
    /// Run the program to completion and return its stdout.
    ///
    /// `output` names the artifact in diagnostics.
    fn run(&self, args: &[String], working_dir: &Path, output: &str) -> CuecfgResult<Vec<u8>> {
        debug!(dir = %working_dir.display(), args = ?args, "Running evaluator");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => self.unavailable(&e),
                _ => self.failed(output, format!("failed to start {}: {e}", self.program)),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self
            .wait(&mut child)
            .map_err(|e| self.failed(output, format!("failed to wait for {}: {e}", self.program)))?;

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        let Some(status) = status else {
            let timeout = self.timeout.unwrap_or_default();
            return Err(self
                .failed(output, format!("timed out after {}s", timeout.as_secs_f64()))
                .into());
        };

        if !status.success() {
            let diagnostic = String::from_utf8_lossy(&stderr).into_owned();
            debug!(code = ?status.code(), "Evaluator exited with failure");
            return Err(self.failed(output, diagnostic).into());
        }

        Ok(stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    //! The evaluator program is `sh`, so the first argument (`eval`) names a
    //! script in the working directory.

    use super::*;
    use cuecfg_core::error::{CuecfgError, ErrorCategory};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn request(dir: &TempDir, script: &str) -> EvaluationRequest {
        fs::write(dir.path().join("eval"), script).unwrap();
        EvaluationRequest {
            working_dir: dir.path().to_path_buf(),
            sources: vec!["base.cue".into(), "ts.cue".into()],
            expression: "gitignore".into(),
            output: ".gitignore".into(),
        }
    }

    #[test]
    fn passes_sources_then_expression() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "echo \"[\\\"$1\\\", \\\"$2\\\", \\\"$4\\\", \\\"$6\\\"]\"\n");

        let value = CueEvaluator::new("sh").evaluate(&req).unwrap();
        assert_eq!(value, json!(["base.cue", "ts.cue", "gitignore", "json"]));
    }

    #[test]
    fn non_zero_exit_carries_stderr_verbatim() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "echo 'gitignore: reference \"x\" not found' >&2\nexit 1\n");

        let err = CueEvaluator::new("sh").evaluate(&req).unwrap_err();
        match &err {
            CuecfgError::Application(ApplicationError::EvaluationFailed { output, diagnostic }) => {
                assert_eq!(output, ".gitignore");
                assert_eq!(diagnostic, "gitignore: reference \"x\" not found\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn unparsable_output_fails() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "echo 'not json'\n");

        let err = CueEvaluator::new("sh").evaluate(&req).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn timeout_kills_evaluator() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "exec sleep 5\n");

        let started = Instant::now();
        let err = CueEvaluator::new("sh")
            .with_timeout(Duration::from_millis(100))
            .evaluate(&req)
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir, "");
        let evaluator = CueEvaluator::new("cuecfg-no-such-evaluator");

        assert!(!evaluator.is_available());
        let err = evaluator.evaluate(&req).unwrap_err();
        assert!(matches!(
            err,
            CuecfgError::Application(ApplicationError::EvaluatorUnavailable { .. })
        ));
    }

    fn vet_request(dir: &TempDir, script: &str) -> VetRequest {
        fs::write(dir.path().join("vet"), script).unwrap();
        VetRequest {
            working_dir: dir.path().to_path_buf(),
            schema: "schema.cue".into(),
            definition: "#Dependencies".into(),
            data: dir.path().join("dependencies.json"),
        }
    }

    #[test]
    fn vet_passes_definition_schema_and_data() {
        let dir = TempDir::new().unwrap();
        let req = vet_request(
            &dir,
            "[ \"$1\" = -d ] && [ \"$2\" = '#Dependencies' ] && [ \"$3\" = schema.cue ] || exit 3\n",
        );

        CueEvaluator::new("sh").vet(&req).unwrap();
    }

    #[test]
    fn vet_rejection_names_the_data_file() {
        let dir = TempDir::new().unwrap();
        let req = vet_request(&dir, "echo '0: conflicting values' >&2\nexit 1\n");

        let err = CueEvaluator::new("sh").vet(&req).unwrap_err();
        match err {
            CuecfgError::Application(ApplicationError::EvaluationFailed { output, diagnostic }) => {
                assert_eq!(output, "dependencies.json");
                assert_eq!(diagnostic, "0: conflicting values\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
