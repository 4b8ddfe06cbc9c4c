// GitHub Build Service
// Drives the remote Actions workflow that compiles the customized client

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{BuildStatus, Config};
use crate::services::{emit_event, EventSink, BUILD_STATUS_EVENT};

const GITHUB_API_BASE: &str = "https://api.github.com";
const WORKFLOW_FILE: &str = "build-rustdesk.yml";
// Branch of the builder repository that defines the workflow, not the
// branch of the client being built
const WORKFLOW_REF: &str = "main";
const DEFAULT_EXECUTABLE_NAME: &str = "rustdesk-custom";
const USER_AGENT: &str = "deskforge-server";

const DISPATCH_SETTLE: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Errors from the remote build sequence. Each is surfaced to the operator
/// verbatim as the failed state; none are retried.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub token is invalid or lacks the required permissions")]
    Auth,

    #[error("Repository {0} does not exist or is not accessible")]
    RepoNotFound(String),

    #[error("Workflow {0} was not found in the repository")]
    WorkflowNotFound(String),

    #[error("GitHub API error ({0}): {1}")]
    Api(StatusCode, String),

    #[error("Workflow dispatch failed ({0}): {1}")]
    Dispatch(StatusCode, String),

    #[error("{0}")]
    Serialize(String),

    #[error("Owner, repository, and token are all required")]
    IncompleteRequest,

    #[error("A build sequence is already in flight")]
    AlreadyRunning,

    #[error("Build sequence cancelled")]
    Cancelled,
}

/// Coordinates of the builder repository plus the operator's token
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    id: u64,
    status: String,
    conclusion: Option<String>,
    html_url: String,
}

/// Runs the repository check → workflow dispatch → run-status poll sequence
/// against the GitHub REST API. At most one sequence is in flight at a time;
/// cancellation stops the polling without touching the dispatched run.
pub struct GithubBuildService {
    client: Client,
    api_base: String,
    status: RwLock<BuildStatus>,
    cancel_token: AtomicBool,
    in_flight: AtomicBool,
    dispatch_settle: Duration,
    poll_interval: Duration,
}

impl GithubBuildService {
    pub fn new() -> Self {
        Self::with_api_base(GITHUB_API_BASE.to_string())
    }

    pub fn with_api_base(api_base: String) -> Self {
        // GitHub rejects requests that carry no User-Agent
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base,
            status: RwLock::new(BuildStatus::Idle),
            cancel_token: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            dispatch_settle: DISPATCH_SETTLE,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Current state of the sequence, for the status endpoint
    pub async fn status(&self) -> BuildStatus {
        self.status.read().await.clone()
    }

    /// Request cancellation; checked between steps and polls
    pub fn cancel(&self) {
        self.cancel_token.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token.load(Ordering::SeqCst)
    }

    /// Start the sequence in the background. Refuses when the request is
    /// incomplete or another sequence is already in flight.
    pub async fn trigger(
        self: Arc<Self>,
        request: BuildRequest,
        config: Config,
        sink: Arc<dyn EventSink>,
    ) -> Result<(), BuildError> {
        if request.owner.trim().is_empty()
            || request.repo.trim().is_empty()
            || request.token.trim().is_empty()
        {
            return Err(BuildError::IncompleteRequest);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BuildError::AlreadyRunning);
        }

        self.cancel_token.store(false, Ordering::SeqCst);

        let service = Arc::clone(&self);
        tokio::spawn(async move {
            service.run_sequence(&request, &config, sink.as_ref()).await;
            service.in_flight.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    /// Drive one full sequence and leave the terminal state in `status`
    async fn run_sequence(&self, request: &BuildRequest, config: &Config, sink: &dyn EventSink) {
        self.set_status(sink, BuildStatus::Pending).await;

        match self.execute(request, config, sink).await {
            Ok(final_status) => {
                log::info!(
                    "Build sequence for {}/{} finished",
                    request.owner,
                    request.repo
                );
                self.set_status(sink, final_status).await;
            }
            Err(BuildError::Cancelled) => {
                // The dispatched run, if any, keeps going remotely
                log::info!("Build sequence cancelled by the operator");
                self.set_status(sink, BuildStatus::Idle).await;
            }
            Err(e) => {
                log::error!("Build sequence failed: {e}");
                self.set_status(
                    sink,
                    BuildStatus::Failed {
                        reason: e.to_string(),
                        run_url: None,
                    },
                )
                .await;
            }
        }
    }

    async fn execute(
        &self,
        request: &BuildRequest,
        config: &Config,
        sink: &dyn EventSink,
    ) -> Result<BuildStatus, BuildError> {
        let repo_path = format!("{}/{}", request.owner, request.repo);

        // Repository existence check
        let url = format!("{}/repos/{}", self.api_base, repo_path);
        let response = self.authed(self.client.get(&url), &request.token).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BuildError::RepoNotFound(repo_path));
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BuildError::Auth);
        } else if !status.is_success() {
            return Err(BuildError::Api(status, read_error_body(response).await));
        }

        // Workflow existence check
        let url = format!(
            "{}/repos/{}/actions/workflows/{}",
            self.api_base, repo_path, WORKFLOW_FILE
        );
        let response = self.authed(self.client.get(&url), &request.token).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BuildError::WorkflowNotFound(WORKFLOW_FILE.to_string()));
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BuildError::Auth);
        } else if !status.is_success() {
            return Err(BuildError::Api(status, read_error_body(response).await));
        }

        if self.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        // Dispatch the workflow
        self.set_status(sink, BuildStatus::Running { run_url: None }).await;

        let body = json!({
            "ref": WORKFLOW_REF,
            "inputs": workflow_inputs(config)?,
        });
        let url = format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.api_base, repo_path, WORKFLOW_FILE
        );
        let response = self
            .authed(self.client.post(&url), &request.token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BuildError::Dispatch(
                response.status(),
                read_error_body(response).await,
            ));
        }

        log::info!("Workflow dispatched for {repo_path}; polling for completion");

        // Give the dispatched run time to appear, then watch the most recent
        // run until it completes
        self.sleep_unless_cancelled(self.dispatch_settle).await?;

        loop {
            match self.latest_run(request).await? {
                Some(run) if run.status == "completed" => {
                    let conclusion = run.conclusion.unwrap_or_else(|| "unknown".to_string());
                    if conclusion == "success" {
                        return Ok(BuildStatus::Succeeded {
                            artifact_url: format!(
                                "https://github.com/{}/actions/runs/{}/artifacts",
                                repo_path, run.id
                            ),
                            run_url: run.html_url,
                        });
                    }
                    return Ok(BuildStatus::Failed {
                        reason: format!("Remote build concluded: {conclusion}"),
                        run_url: Some(run.html_url),
                    });
                }
                Some(run) => {
                    self.set_status(
                        sink,
                        BuildStatus::Running {
                            run_url: Some(run.html_url),
                        },
                    )
                    .await;
                }
                None => {}
            }

            self.sleep_unless_cancelled(self.poll_interval).await?;
        }
    }

    /// Most recent run of the workflow, if any exists yet
    async fn latest_run(&self, request: &BuildRequest) -> Result<Option<WorkflowRun>, BuildError> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs?per_page=1",
            self.api_base, request.owner, request.repo, WORKFLOW_FILE
        );
        let response = self.authed(self.client.get(&url), &request.token).send().await?;

        if !response.status().is_success() {
            return Err(BuildError::Api(
                response.status(),
                read_error_body(response).await,
            ));
        }

        let runs: WorkflowRunsResponse = response.json().await?;
        Ok(runs.workflow_runs.into_iter().next())
    }

    async fn sleep_unless_cancelled(&self, duration: Duration) -> Result<(), BuildError> {
        if self.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        tokio::time::sleep(duration).await;
        if self.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        Ok(())
    }

    async fn set_status(&self, sink: &dyn EventSink, status: BuildStatus) {
        {
            let mut current = self.status.write().await;
            *current = status.clone();
        }
        emit_event(sink, BUILD_STATUS_EVENT, &status);
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .header(header::AUTHORIZATION, format!("token {token}"))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
    }
}

impl Default for GithubBuildService {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs the workflow receives: the full configuration document plus the
/// scalars it reads without parsing JSON
fn workflow_inputs(config: &Config) -> Result<Value, BuildError> {
    let document = config.to_document().map_err(BuildError::Serialize)?;
    let config_json =
        serde_json::to_string(&document).map_err(|e| BuildError::Serialize(e.to_string()))?;

    let executable_name = if !config.build.executable_name.is_empty() {
        config.build.executable_name.clone()
    } else if !config.branding.app_name.is_empty() {
        config.branding.app_name.clone()
    } else {
        DEFAULT_EXECUTABLE_NAME.to_string()
    };

    Ok(json!({
        "config_json": config_json,
        "executable_name": executable_name,
        "rustdesk_branch": config.build.source_branch,
        "target_arch": config.build.target_arch.as_str(),
        "enable_portable": config.build.portable_mode,
        "include_installer": config.build.include_installer,
        "enable_debug": config.build.debug_mode,
    }))
}

async fn read_error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}
