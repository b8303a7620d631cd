//! In-memory store of assessment drafts.
//!
//! A draft is one editing session's working copy of an assessment. Drafts
//! belong to the token subject that opened them and are invisible to anyone
//! else. Each mutation runs under the store's write lock, so concurrent
//! requests against one draft are applied one at a time and never observe a
//! half-applied change.

use std::collections::HashMap;

use reetr_core::assessment::dependency::QuestionRef;
use reetr_core::assessment::Assessment;
use reetr_core::error::CoreError;
use reetr_core::types::{DbId, Timestamp};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One editing session's working copy.
#[derive(Debug, Clone)]
pub struct Draft {
    pub id: Uuid,
    /// Subject of the token that opened the draft.
    pub owner: String,
    /// Backend id when editing an existing assessment; `None` for new ones.
    pub source_id: Option<DbId>,
    pub assessment: Assessment,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// What the API returns for a draft: the tree plus the questions whose
/// options are currently locked.
#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub id: Uuid,
    pub source_id: Option<DbId>,
    pub assessment: Assessment,
    pub locked_questions: Vec<QuestionRef>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Draft {
    pub fn view(&self) -> DraftView {
        DraftView {
            id: self.id,
            source_id: self.source_id,
            assessment: self.assessment.clone(),
            locked_questions: self.assessment.locked_questions().into_iter().collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Thread-safe draft registry; designed to be wrapped in `Arc` and shared.
pub struct DraftStore {
    drafts: RwLock<HashMap<Uuid, Draft>>,
}

impl DraftStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            drafts: RwLock::new(HashMap::new()),
        }
    }

    /// Open a draft for `owner` holding `assessment`.
    ///
    /// The starting tree is normalized first: ids are made dense, and a
    /// tree without stages or with an empty stage is rejected.
    pub async fn open(
        &self,
        owner: &str,
        source_id: Option<DbId>,
        mut assessment: Assessment,
    ) -> Result<DraftView, CoreError> {
        assessment.normalize()?;
        let now = chrono::Utc::now();
        let draft = Draft {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            source_id,
            assessment,
            created_at: now,
            updated_at: now,
        };
        let view = draft.view();
        self.drafts.write().await.insert(draft.id, draft);
        Ok(view)
    }

    /// Current state of a draft.
    pub async fn get(&self, owner: &str, id: Uuid) -> Result<DraftView, CoreError> {
        let drafts = self.drafts.read().await;
        owned_by(drafts.get(&id), owner, id).map(Draft::view)
    }

    /// Run a read-only query against a draft's tree.
    pub async fn inspect<T>(
        &self,
        owner: &str,
        id: Uuid,
        query: impl FnOnce(&Assessment) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let drafts = self.drafts.read().await;
        let draft = owned_by(drafts.get(&id), owner, id)?;
        query(&draft.assessment)
    }

    /// Apply a mutation to a draft under the write lock.
    ///
    /// Core mutations leave the tree untouched when they fail, so a failed
    /// mutation leaves the draft exactly as it was.
    pub async fn apply<T>(
        &self,
        owner: &str,
        id: Uuid,
        mutation: impl FnOnce(&mut Assessment) -> Result<T, CoreError>,
    ) -> Result<(T, DraftView), CoreError> {
        let mut drafts = self.drafts.write().await;
        let draft = owned_by_mut(drafts.get_mut(&id), owner, id)?;
        let output = mutation(&mut draft.assessment)?;
        draft.updated_at = chrono::Utc::now();
        Ok((output, draft.view()))
    }

    /// Remove a draft, returning it.
    pub async fn discard(&self, owner: &str, id: Uuid) -> Result<Draft, CoreError> {
        let mut drafts = self.drafts.write().await;
        owned_by(drafts.get(&id), owner, id)?;
        drafts
            .remove(&id)
            .ok_or_else(|| draft_not_found(id))
    }

    /// Claim a draft for submission by removing it under the write lock.
    ///
    /// While claimed, the draft is invisible: a second submit or a late
    /// mutation sees `NotFound` instead of racing the first submit. Hand
    /// the draft back with [`DraftStore::restore`] if submission fails.
    pub async fn take_for_submit(&self, owner: &str, id: Uuid) -> Result<Draft, CoreError> {
        self.discard(owner, id).await
    }

    /// Put back a draft claimed by [`DraftStore::take_for_submit`].
    pub async fn restore(&self, draft: Draft) {
        self.drafts.write().await.insert(draft.id, draft);
    }

    /// Number of open drafts across all owners.
    pub async fn count(&self) -> usize {
        self.drafts.read().await.len()
    }
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

fn draft_not_found(id: Uuid) -> CoreError {
    CoreError::NotFound {
        entity: "Draft",
        id: id.to_string(),
    }
}

// Another owner's draft is reported as missing.
fn owned_by<'a>(draft: Option<&'a Draft>, owner: &str, id: Uuid) -> Result<&'a Draft, CoreError> {
    draft
        .filter(|draft| draft.owner == owner)
        .ok_or_else(|| draft_not_found(id))
}

fn owned_by_mut<'a>(
    draft: Option<&'a mut Draft>,
    owner: &str,
    id: Uuid,
) -> Result<&'a mut Draft, CoreError> {
    draft
        .filter(|draft| draft.owner == owner)
        .ok_or_else(|| draft_not_found(id))
}
