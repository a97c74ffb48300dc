// Cluster API surface
// Public interface for the REST client, wire types, and error taxonomy

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    CommandAck, FileEntry, LoginRequest, NetworkStatus, Node, NodeResources, NodeState,
    ProcessEntry, RegisterRequest, RunningNodes, StartNodeRequest, UploadResult, UserDashboard,
    VerifyOtpRequest,
};
