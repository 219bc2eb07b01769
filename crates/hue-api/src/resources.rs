// CLIP v2 resource endpoints

use tracing::debug;

use crate::client::{BridgeClient, RESOURCE_PATH};
use crate::error::Error;
use crate::model::{Resource, ResourceRef};

impl BridgeClient {
    /// Fetch every resource the bridge exposes.
    pub async fn resources(&self) -> Result<Vec<Resource>, Error> {
        let url = self.url(RESOURCE_PATH)?;
        let resources: Vec<Resource> = self.get(url).await?;
        debug!(count = resources.len(), "fetched resources");
        Ok(resources)
    }

    /// Apply a partial update to one resource.
    ///
    /// Only the groups present in `patch` are sent. A bridge that merges with
    /// the rules of [`Merge`](crate::model::Merge) ignores zero-valued leaves.
    pub async fn update(
        &self,
        resource_type: &str,
        id: &str,
        patch: &Resource,
    ) -> Result<Vec<ResourceRef>, Error> {
        let url = self.resource_url(resource_type, id)?;
        self.put(url, patch).await
    }
}
