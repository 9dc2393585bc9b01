use crate::error::Result;
use crate::model::{PipelineConfig, RepoCoordinates, RevisionToken};
use crate::remote::{ConfigStore, FetchedFile};

/// Everything a fetch needs, detached from the controller so it can run elsewhere.
pub struct LoadTicket {
    pub(super) epoch: u64,
    pub(super) coords: RepoCoordinates,
    pub(super) credential: String,
}

impl LoadTicket {
    pub fn coords(&self) -> &RepoCoordinates {
        &self.coords
    }

    pub fn execute(&self, store: &dyn ConfigStore) -> Result<FetchedFile> {
        store.fetch_file(&self.coords, &self.credential)
    }
}

/// A prepared conditional write.
pub struct SaveTicket {
    pub(super) epoch: u64,
    pub(super) coords: RepoCoordinates,
    pub(super) credential: String,
    pub(super) content: String,
    pub(super) revision: RevisionToken,
    pub(super) message: String,
    pub(super) next: PipelineConfig,
}

impl SaveTicket {
    pub fn coords(&self) -> &RepoCoordinates {
        &self.coords
    }

    /// Serialized document that will be written.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Revision the write is conditioned on.
    pub fn revision(&self) -> &RevisionToken {
        &self.revision
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn execute(&self, store: &dyn ConfigStore) -> Result<RevisionToken> {
        store.write_file(
            &self.coords,
            &self.content,
            &self.revision,
            &self.credential,
            &self.message,
        )
    }
}

impl std::fmt::Debug for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTicket")
            .field("epoch", &self.epoch)
            .field("coords", &self.coords)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for SaveTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveTicket")
            .field("epoch", &self.epoch)
            .field("coords", &self.coords)
            .field("revision", &self.revision)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
