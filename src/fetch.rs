use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use crate::context::RunContext;
use crate::error::FetchError;
use crate::types::{EnforcementLevel, Stage, TaskRecord, TaskStatus};

/// Reads the current state of a stage's run tasks.
///
/// Implementations must be safe to call repeatedly; the poller calls `fetch`
/// once per iteration and never retries a failed call.
pub trait StageFetcher: Send + Sync {
    fn fetch(
        &self,
        stage_id: &str,
        ctx: &RunContext,
    ) -> impl Future<Output = Result<Stage, FetchError>> + Send;
}

// --- JSON:API document ---

#[derive(Deserialize, Debug)]
struct TaskStageDocument {
    data: TaskStageData,
    #[serde(default)]
    included: Vec<IncludedResource>,
}

#[derive(Deserialize, Debug)]
struct TaskStageData {
    id: String,
    #[serde(default)]
    relationships: TaskStageRelationships,
}

#[derive(Deserialize, Debug, Default)]
struct TaskStageRelationships {
    #[serde(rename = "task-results", default)]
    task_results: Option<RelationshipList>,
}

#[derive(Deserialize, Debug)]
struct RelationshipList {
    #[serde(default)]
    data: Vec<ResourceRef>,
}

#[derive(Deserialize, Debug)]
struct ResourceRef {
    id: String,
}

#[derive(Deserialize, Debug)]
struct IncludedResource {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: serde_json::Value,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct TaskResultAttributes {
    task_name: String,
    status: TaskStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    workspace_task_enforcement_level: EnforcementLevel,
}

/// Decode a task-stage document read with `include=task_results`.
///
/// Record order follows the stage's `task-results` relationship; each entry
/// must have a matching `task-results` resource in `included`.
pub fn decode_task_stage(body: &str) -> Result<Stage, FetchError> {
    let document: TaskStageDocument = serde_json::from_str(body)?;

    let mut included: HashMap<&str, &serde_json::Value> = HashMap::new();
    for resource in &document.included {
        if resource.kind == "task-results" {
            included.insert(resource.id.as_str(), &resource.attributes);
        }
    }

    let refs = document
        .data
        .relationships
        .task_results
        .as_ref()
        .map(|list| list.data.as_slice())
        .unwrap_or_default();

    let mut records = Vec::with_capacity(refs.len());
    for reference in refs {
        let attributes = included.get(reference.id.as_str()).ok_or_else(|| {
            FetchError::Malformed(format!(
                "task result {} is not present in the included resources",
                reference.id
            ))
        })?;
        let attributes: TaskResultAttributes = serde_json::from_value((*attributes).clone())?;
        records.push(TaskRecord {
            name: attributes.task_name,
            status: attributes.status,
            enforcement_level: attributes.workspace_task_enforcement_level,
            message: attributes.message.unwrap_or_default(),
        });
    }

    Ok(Stage {
        id: document.data.id,
        records,
    })
}

// --- HTTP ---

/// Reads task stages from a Terraform-Cloud-compatible API.
#[derive(Clone, Debug)]
pub struct HttpStageFetcher {
    client: reqwest::Client,
    address: String,
    token: Option<String>,
}

impl HttpStageFetcher {
    pub fn new(address: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            address: address.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn stage_url(&self, stage_id: &str) -> String {
        format!(
            "{}/api/v2/task-stages/{}?include=task_results",
            self.address, stage_id
        )
    }

    async fn read(&self, stage_id: &str) -> Result<Stage, FetchError> {
        let mut request = self
            .client
            .get(self.stage_url(stage_id))
            .header("Accept", "application/vnd.api+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        expect_stage(stage_id, decode_task_stage(&body)?)
    }
}

/// Reject a document describing a different stage than the one requested.
fn expect_stage(stage_id: &str, stage: Stage) -> Result<Stage, FetchError> {
    if stage.id != stage_id {
        return Err(FetchError::Malformed(format!(
            "requested stage {} but received {}",
            stage_id, stage.id
        )));
    }
    Ok(stage)
}

impl StageFetcher for HttpStageFetcher {
    async fn fetch(&self, stage_id: &str, ctx: &RunContext) -> Result<Stage, FetchError> {
        tokio::select! {
            result = self.read(stage_id) => result,
            reason = ctx.cancelled() => Err(FetchError::Aborted(reason)),
        }
    }
}

// --- File ---

/// Re-reads a task-stage document from disk on every call.
#[derive(Clone, Debug)]
pub struct FileStageFetcher {
    path: PathBuf,
}

impl FileStageFetcher {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl StageFetcher for FileStageFetcher {
    async fn fetch(&self, stage_id: &str, _ctx: &RunContext) -> Result<Stage, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        expect_stage(stage_id, decode_task_stage(&body)?)
    }
}

// --- Mock ---

/// Mock fetcher for poller tests.
///
/// Returns predefined snapshots from a configurable sequence and counts calls.
pub struct MockStageFetcher {
    responses: tokio::sync::Mutex<Vec<Result<Stage, FetchError>>>,
    calls: AtomicUsize,
}

impl MockStageFetcher {
    /// Responses are returned in order (first call gets first response, etc.).
    pub fn new(responses: Vec<Result<Stage, FetchError>>) -> Self {
        let mut reversed = responses;
        reversed.reverse();
        Self {
            responses: tokio::sync::Mutex::new(reversed),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StageFetcher for MockStageFetcher {
    async fn fetch(&self, _stage_id: &str, _ctx: &RunContext) -> Result<Stage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        responses.pop().unwrap_or(Err(FetchError::Exhausted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_url_strips_trailing_slash() {
        let fetcher = HttpStageFetcher::new("https://tfe.example.com/", None);
        assert_eq!(
            fetcher.stage_url("ts-123"),
            "https://tfe.example.com/api/v2/task-stages/ts-123?include=task_results"
        );
    }

    #[test]
    fn decode_stage_without_relationships_is_empty() {
        let stage = decode_task_stage(r#"{"data":{"id":"ts-1"}}"#).unwrap();
        assert_eq!(stage.id, "ts-1");
        assert!(stage.records.is_empty());
    }
}
