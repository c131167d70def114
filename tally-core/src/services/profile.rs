//! Profile service - CRUD over the `profiles_c` table

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Profile, ProfileDraft, ProfilePatch, RecordId};
use crate::ports::{FetchParams, FieldSpec, HostedTableClient};

use super::record::{BatchFailurePolicy, TableGateway};

/// Backend table holding profiles
pub const PROFILE_TABLE: &str = "profiles_c";

/// Profile service
///
/// Stateless: every call is a round trip to the hosted table.
pub struct ProfileService {
    gateway: TableGateway,
}

impl ProfileService {
    pub fn new(client: Arc<dyn HostedTableClient>, policy: BatchFailurePolicy) -> Self {
        Self {
            gateway: TableGateway::new(client, PROFILE_TABLE, policy),
        }
    }

    /// Column projection used by every read
    pub fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::column("Id"),
            FieldSpec::column("Name"),
            FieldSpec::column("Tags"),
            FieldSpec::reference("Owner"),
            FieldSpec::column("CreatedOn"),
            FieldSpec::reference("CreatedBy"),
            FieldSpec::column("ModifiedOn"),
            FieldSpec::reference("ModifiedBy"),
            FieldSpec::column("name_c"),
            FieldSpec::column("avatar_c"),
            FieldSpec::column("website_c"),
            FieldSpec::column("bio_c"),
        ]
    }

    /// All profiles, in backend order
    pub async fn get_all(&self) -> Result<Vec<Profile>> {
        self.gateway
            .fetch_all(&FetchParams::new(Self::fields()))
            .await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Option<Profile>> {
        self.gateway
            .fetch_one(id, &FetchParams::new(Self::fields()))
            .await
    }

    /// Create a profile, returning the stored row
    pub async fn create(&self, draft: &ProfileDraft) -> Result<Option<Profile>> {
        self.gateway.create(draft.to_payload()).await
    }

    /// Update only the fields present in `patch`
    pub async fn update(&self, id: RecordId, patch: &ProfilePatch) -> Result<Option<Profile>> {
        self.gateway.update(id, patch.to_payload(id)).await
    }

    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        self.gateway.delete(id).await
    }
}
