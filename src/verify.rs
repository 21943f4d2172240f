//! Score verification collaborator.
//!
//! The flow has two calls: submit the final score and get a job id back, then
//! poll that job until it completes or fails.  [`VerificationSession`] drives
//! the polling from frame time so nothing ever blocks the game loop, and turns
//! every outcome (including transport errors) into status text.
//!
//! ## Wire shape
//!
//! | Call   | Request                       | Response                                              |
//! |--------|-------------------------------|-------------------------------------------------------|
//! | submit | `{"final_score": n}`          | `{"job_id": "..."}` or `{"error": "..."}`             |
//! | poll   | job id                        | `{"status", "public_values", "score", "proof", "error"}` |
//!
//! [`LedgerVerifier`] is the shipped implementation: it records submissions in
//! `saves/verified_scores.toml` and reports them complete on the first poll.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{VERIFY_POLL_INTERVAL, VERIFY_RETRY_INTERVAL};
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStatus {
    Processing,
    Complete { summary: String, artifact: String },
    Failed { reason: String },
    /// Any status string the verifier does not name; polling continues.
    Other(String),
}

pub trait ScoreVerifier {
    fn submit(&mut self, score: u32) -> GameResult<JobId>;
    fn poll(&mut self, job: &JobId) -> GameResult<VerificationStatus>;
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProveRequest {
    pub final_score: u32,
}

impl ProveRequest {
    pub fn to_json(&self) -> GameResult<String> {
        serde_json::to_string(self).map_err(|err| GameError::Verification {
            reason: format!("encode request: {err}"),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProveResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProveResponse {
    pub fn to_json(&self) -> GameResult<String> {
        serde_json::to_string(self).map_err(|err| GameError::Verification {
            reason: format!("encode submit response: {err}"),
        })
    }

    pub fn from_json(body: &str) -> GameResult<Self> {
        serde_json::from_str(body).map_err(|err| GameError::Verification {
            reason: format!("decode submit response: {err}"),
        })
    }

    /// The job id, or the server's error when it did not start a job.
    pub fn into_job(self) -> GameResult<JobId> {
        match self.job_id {
            Some(id) if !id.is_empty() => Ok(JobId(id)),
            _ => Err(GameError::Verification {
                reason: self.error.unwrap_or_else(|| "Unknown error".to_string()),
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProofStatusResponse {
    pub status: String,
    /// Comma separated `key: value` pairs; the first value is the proven score.
    #[serde(default)]
    pub public_values: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
    /// Artifact name of the downloadable proof.
    #[serde(default)]
    pub proof: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProofStatusResponse {
    pub fn from_json(body: &str) -> GameResult<Self> {
        serde_json::from_str(body).map_err(|err| GameError::Verification {
            reason: format!("decode status response: {err}"),
        })
    }

    /// Score as reported by the proof, falling back to the plain field.
    pub fn proven_score(&self) -> Option<String> {
        let from_values = self.public_values.as_deref().and_then(|values| {
            let first = values.split(',').next()?;
            let value = first.split(':').nth(1)?.trim();
            (!value.is_empty()).then(|| value.to_string())
        });
        from_values.or_else(|| self.score.map(|s| s.to_string()))
    }

    pub fn into_status(self) -> VerificationStatus {
        match self.status.as_str() {
            "processing" => VerificationStatus::Processing,
            "complete" => {
                let score = self.proven_score().unwrap_or_else(|| "?".to_string());
                VerificationStatus::Complete {
                    summary: format!("Your final score of {score} has been cryptographically verified."),
                    artifact: format!("proofs/{}", self.proof.unwrap_or_default()),
                }
            }
            "failed" => VerificationStatus::Failed {
                reason: self.error.unwrap_or_else(|| "Unknown error".to_string()),
            },
            _ => VerificationStatus::Other(self.status),
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Polling { job: JobId, next_poll: f64 },
    Done,
}

/// One verification attempt for a finished run.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    score: u32,
    phase: Phase,
    status_text: String,
    last_status: Option<VerificationStatus>,
}

impl VerificationSession {
    /// Submit `score` right away; the first poll happens on the next tick.
    pub fn start(score: u32, now: f64, verifier: &mut dyn ScoreVerifier) -> Self {
        match verifier.submit(score) {
            Ok(job) => {
                info!("[verify] submitted score {score} as job {job}");
                Self {
                    score,
                    status_text: format!("Verification in progress... Job ID: {job}"),
                    phase: Phase::Polling { job, next_poll: now },
                    last_status: None,
                }
            }
            Err(err) => {
                warn!("[verify] submit failed: {err}");
                Self {
                    score,
                    phase: Phase::Done,
                    status_text: format!("Verification request failed: {err}"),
                    last_status: None,
                }
            }
        }
    }

    /// Poll when due.  Never fails; errors only reschedule.
    pub fn tick(&mut self, now: f64, verifier: &mut dyn ScoreVerifier) {
        let Phase::Polling { job, next_poll } = &self.phase else {
            return;
        };
        if now < *next_poll {
            return;
        }
        let job = job.clone();

        match verifier.poll(&job) {
            Ok(status) => {
                self.phase = match &status {
                    VerificationStatus::Processing => {
                        self.status_text = format!("Verification in progress... Job ID: {job}");
                        Phase::Polling {
                            job,
                            next_poll: now + VERIFY_POLL_INTERVAL,
                        }
                    }
                    VerificationStatus::Complete { summary, artifact } => {
                        info!("[verify] job {job} complete");
                        self.status_text = format!("Score Verified! {summary} Proof: {artifact}");
                        Phase::Done
                    }
                    VerificationStatus::Failed { reason } => {
                        warn!("[verify] job {job} failed: {reason}");
                        self.status_text = format!("Verification failed: {reason}");
                        Phase::Done
                    }
                    VerificationStatus::Other(other) => {
                        self.status_text = format!("Status: {other}");
                        Phase::Polling {
                            job,
                            next_poll: now + VERIFY_POLL_INTERVAL,
                        }
                    }
                };
                self.last_status = Some(status);
            }
            Err(err) => {
                warn!("[verify] poll failed: {err}; retrying");
                self.status_text = format!("Error checking verification status: {err}");
                self.phase = Phase::Polling {
                    job,
                    next_poll: now + VERIFY_RETRY_INTERVAL,
                };
            }
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn last_status(&self) -> Option<&VerificationStatus> {
        self.last_status.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// When the next poll is due, if one is pending.
    pub fn next_poll(&self) -> Option<f64> {
        match &self.phase {
            Phase::Polling { next_poll, .. } => Some(*next_poll),
            Phase::Done => None,
        }
    }
}

// ── Local ledger ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub job_id: String,
    pub final_score: u32,
    pub submitted_at_unix: u64,
    /// Request body as it would go over the wire.
    pub request: String,
    /// Submit reply body handed back to the session.
    #[serde(default)]
    pub response: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct Ledger {
    #[serde(default)]
    verified: Vec<LedgerEntry>,
}

pub fn default_ledger_path() -> PathBuf {
    PathBuf::from("saves").join("verified_scores.toml")
}

/// Verifier that appends submissions to a TOML ledger on disk.
#[derive(Debug, Clone)]
pub struct LedgerVerifier {
    path: PathBuf,
}

impl Default for LedgerVerifier {
    fn default() -> Self {
        Self::new(default_ledger_path())
    }
}

impl LedgerVerifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ledger_error(&self, reason: impl std::fmt::Display) -> GameError {
        GameError::Persistence {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn read(&self) -> GameResult<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| self.ledger_error(err))?;
        toml::from_str(&contents).map_err(|err| self.ledger_error(format!("parse: {err}")))
    }

    fn write(&self, ledger: &Ledger) -> GameResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| self.ledger_error(err))?;
        }
        let serialized = toml::to_string_pretty(ledger).map_err(|err| self.ledger_error(format!("serialize: {err}")))?;
        fs::write(&self.path, serialized).map_err(|err| self.ledger_error(err))
    }

    pub fn entries(&self) -> GameResult<Vec<LedgerEntry>> {
        Ok(self.read()?.verified)
    }
}

impl ScoreVerifier for LedgerVerifier {
    fn submit(&mut self, score: u32) -> GameResult<JobId> {
        let mut ledger = self.read()?;
        let submitted_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let job_id = format!("local-{}-{}", submitted_at_unix, ledger.verified.len() + 1);
        let response = ProveResponse {
            job_id: Some(job_id.clone()),
            error: None,
        }
        .to_json()?;
        ledger.verified.push(LedgerEntry {
            job_id,
            final_score: score,
            submitted_at_unix,
            request: ProveRequest { final_score: score }.to_json()?,
            response: response.clone(),
        });
        self.write(&ledger)?;
        ProveResponse::from_json(&response)?.into_job()
    }

    fn poll(&mut self, job: &JobId) -> GameResult<VerificationStatus> {
        let ledger = self.read()?;
        let response = match ledger.verified.iter().find(|e| e.job_id == job.0) {
            Some(entry) => ProofStatusResponse {
                status: "complete".to_string(),
                public_values: Some(format!("score: {}, job: {}", entry.final_score, entry.job_id)),
                score: Some(entry.final_score),
                proof: Some(format!("{}.toml", entry.job_id)),
                error: None,
            },
            None => ProofStatusResponse {
                status: "failed".to_string(),
                error: Some(format!("unknown job {job}")),
                ..Default::default()
            },
        };
        Ok(response.into_status())
    }
}
