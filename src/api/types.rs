// Wire types for the cluster REST API.
//
// The backend is tolerant about optional fields and has grown a couple
// of field spellings over time (sizeBytes vs fileSize, createdAt vs
// uploadedAt), so the DTOs accept both via serde aliases.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle state a node reports for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeState {
    Created,
    Ready,
    Running,
    Waiting,
    Stopped,
    Dead,
}

/// A process running inside a node's simulated environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub cpu_percent: f64,
}

/// One entry of the node roster (`GET /network/nodes`).
///
/// Only `nodeId` is guaranteed; everything else depends on how much the
/// backend knows about the node at the time of the fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub state: Option<NodeState>,
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub uptime_seconds: u64,
    #[serde(default, alias = "ramGB")]
    pub ram_gb: Option<u32>,
    #[serde(default)]
    pub cpu_cores: Option<u32>,
    #[serde(default, alias = "storageGB")]
    pub storage_gb: Option<u32>,
    #[serde(default, alias = "usedStorageBytes")]
    pub used_bytes: u64,
    #[serde(default, alias = "totalStorageBytes")]
    pub total_bytes: u64,
    #[serde(default, alias = "numChunks")]
    pub file_count: u64,
    #[serde(default)]
    pub processes: Vec<ProcessEntry>,
}

/// `GET /network/nodes/running` — the ids the backend considers live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningNodes {
    #[serde(default)]
    pub running_nodes: HashSet<String>,
    #[serde(default)]
    pub count: usize,
}

/// Aggregated cluster statistics (`GET /network/status`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    #[serde(default)]
    pub total_nodes: u64,
    #[serde(default)]
    pub total_storage_bytes: u64,
    #[serde(default)]
    pub used_storage_bytes: u64,
    #[serde(default)]
    pub utilization_percent: f64,
    #[serde(default)]
    pub total_chunks: u64,
}

/// One stored file, owned by the session user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: i64,
    pub file_name: String,
    #[serde(default, alias = "fileSize")]
    pub size_bytes: u64,
    #[serde(default, alias = "uploadedAt")]
    pub created_at: Option<String>,
}

/// Per-user storage aggregate (`GET /user/dashboard`). Quota math is
/// the backend's; the client only rounds for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub quota_bytes: u64,
    #[serde(default)]
    pub used_bytes: u64,
    #[serde(default)]
    pub available_bytes: Option<u64>,
    #[serde(default)]
    pub usage_percentage: f64,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub disk_id: Option<String>,
    #[serde(default)]
    pub storage_state: Option<String>,
}

/// Resource declaration sent with start and restart commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResources {
    pub port: u16,
    #[serde(rename = "storageGB")]
    pub storage_gb: u32,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
}

impl Default for NodeResources {
    // Backend defaults: 100 GB disk, 8 GB RAM, first gRPC port.
    fn default() -> Self {
        Self {
            port: 50051,
            storage_gb: 100,
            ram_gb: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNodeRequest {
    pub node_id: String,
    #[serde(flatten)]
    pub resources: NodeResources,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Generic acknowledgment for lifecycle commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
}

/// Result of a file upload: how the backend chunked and placed it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub total_chunks: u64,
    #[serde(default, alias = "fileSize")]
    pub size_bytes: u64,
    #[serde(default, alias = "distributionTimeMs")]
    pub distribution_time_ms: u64,
}
