//! Draft lifecycle: get-or-create with profile autofill, autosave with
//! the staleness protocol, file attachment, and discard.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::attachments;
use crate::domain::auth::Principal;
use crate::domain::cycle::CycleDetail;
use crate::domain::draft::{ApplicationDraft, DraftFileField, STALENESS_WINDOW_SECONDS};
use crate::domain::ports::{
    BlobStore, BlobStoreError, CycleRepository, DraftRepository, DraftRepositoryError,
    OrganizationRepository, OrganizationRepositoryError,
};
use crate::domain::Error;

use super::cycle_service::CycleService;

/// The application form model: the cycle's questions plus the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftForm {
    /// The cycle with its ordered questions.
    pub detail: CycleDetail,
    /// The caller's draft for that cycle.
    pub draft: ApplicationDraft,
    /// Whether this request created the draft.
    pub created: bool,
}

/// Draft reads and writes on behalf of an authenticated principal.
#[derive(Clone)]
pub struct DraftService {
    drafts: Arc<dyn DraftRepository>,
    cycles: Arc<dyn CycleRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl DraftService {
    /// Create a new service over the given ports.
    pub fn new(
        drafts: Arc<dyn DraftRepository>,
        cycles: Arc<dyn CycleRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            drafts,
            cycles,
            organizations,
            blobs,
            clock,
        }
    }

    pub(crate) fn map_draft_error(error: DraftRepositoryError) -> Error {
        match error {
            DraftRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("draft repository unavailable: {message}"))
            }
            DraftRepositoryError::Query { message } => {
                Error::internal(format!("draft repository error: {message}"))
            }
        }
    }

    pub(crate) fn map_organization_error(error: OrganizationRepositoryError) -> Error {
        match error {
            OrganizationRepositoryError::Connection { message } => Error::service_unavailable(
                format!("organization repository unavailable: {message}"),
            ),
            OrganizationRepositoryError::Query { message } => {
                Error::internal(format!("organization repository error: {message}"))
            }
        }
    }

    fn map_blob_error(error: BlobStoreError) -> Error {
        match error {
            BlobStoreError::Storage { message } => {
                Error::service_unavailable(format!("blob store unavailable: {message}"))
            }
        }
    }

    /// The caller's draft for a cycle, created with profile autofill when
    /// absent.
    pub async fn get_or_create(
        &self,
        principal: &Principal,
        cycle_id: Uuid,
    ) -> Result<DraftForm, Error> {
        let organization_id = principal.require_organization()?;
        let detail = self
            .cycles
            .detail(cycle_id)
            .await
            .map_err(CycleService::map_cycle_error)?
            .ok_or_else(|| Error::not_found("No such cycle"))?;

        if let Some(draft) = self
            .drafts
            .find_for(organization_id, cycle_id)
            .await
            .map_err(Self::map_draft_error)?
        {
            return Ok(DraftForm {
                detail,
                draft,
                created: false,
            });
        }

        let now = self.clock.utc();
        if !detail.cycle.is_open(now) {
            return Err(Error::conflict("The application period is not open"));
        }

        let organization = self
            .organizations
            .find(organization_id)
            .await
            .map_err(Self::map_organization_error)?
            .ok_or_else(|| Error::not_found("No such organization"))?;

        let mut builder = ApplicationDraft::builder(organization_id, cycle_id)
            .created(now)
            .modified(now);
        if organization.profile.is_usable() {
            builder = builder.contents(organization.profile.autofill_contents());
            if let Some(letter) = &organization.profile.fiscal_letter {
                builder = builder.file(DraftFileField::FiscalLetter, letter.clone());
            }
        }
        let draft = builder.build();
        self.drafts
            .save(&draft)
            .await
            .map_err(Self::map_draft_error)?;
        info!(draft_id = %draft.id, cycle_id = %cycle_id, "draft created");
        Ok(DraftForm {
            detail,
            draft,
            created: true,
        })
    }

    /// Autosave the whole contents map, honouring the staleness protocol.
    pub async fn autosave(
        &self,
        principal: &Principal,
        draft_id: Uuid,
        contents: BTreeMap<String, String>,
        force: bool,
    ) -> Result<ApplicationDraft, Error> {
        let mut draft = self.editable_draft(principal, draft_id).await?;
        let now = self.clock.utc();

        if !force && draft.conflicts_with(&principal.identity, now) {
            return Err(Error::conflict("Another editor saved this draft just now")
                .with_details(json!({
                    "modifiedBy": draft.modified_by,
                    "modified": draft.modified,
                    "stalenessWindowSeconds": STALENESS_WINDOW_SECONDS,
                })));
        }

        draft.contents = contents;
        draft.modified = now;
        draft.modified_by = Some(principal.identity.clone());
        self.drafts
            .save(&draft)
            .await
            .map_err(Self::map_draft_error)?;
        Ok(draft)
    }

    /// Store an upload and record its reference on the named file slot.
    pub async fn attach_file(
        &self,
        principal: &Principal,
        draft_id: Uuid,
        field: DraftFileField,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ApplicationDraft, Error> {
        attachments::validate(filename).map_err(|problem| {
            Error::invalid_request("Validation failed")
                .with_details(json!({ "fields": { field.as_str(): problem.to_string() } }))
        })?;

        let mut draft = self.editable_draft(principal, draft_id).await?;
        let reference = self
            .blobs
            .store(&format!("drafts/{draft_id}/{field}"), filename, bytes)
            .await
            .map_err(Self::map_blob_error)?;

        if let Some(previous) = draft.files.insert(field, reference) {
            self.discard_blob(&previous).await;
        }
        draft.modified = self.clock.utc();
        draft.modified_by = Some(principal.identity.clone());
        self.drafts
            .save(&draft)
            .await
            .map_err(Self::map_draft_error)?;
        Ok(draft)
    }

    /// Clear the named file slot and discard its blob.
    pub async fn clear_file(
        &self,
        principal: &Principal,
        draft_id: Uuid,
        field: DraftFileField,
    ) -> Result<ApplicationDraft, Error> {
        let mut draft = self.editable_draft(principal, draft_id).await?;
        if let Some(previous) = draft.files.remove(&field) {
            self.discard_blob(&previous).await;
            draft.modified = self.clock.utc();
            draft.modified_by = Some(principal.identity.clone());
            self.drafts
                .save(&draft)
                .await
                .map_err(Self::map_draft_error)?;
        }
        Ok(draft)
    }

    /// Delete a draft and discard its blobs.
    pub async fn discard(&self, principal: &Principal, draft_id: Uuid) -> Result<(), Error> {
        let draft = self.owned_draft(principal, draft_id).await?;
        for reference in draft.files.values() {
            self.discard_blob(reference).await;
        }
        self.drafts
            .delete(draft.id)
            .await
            .map_err(Self::map_draft_error)?;
        info!(draft_id = %draft.id, "draft discarded");
        Ok(())
    }

    /// Load a draft the principal may touch.
    pub(crate) async fn owned_draft(
        &self,
        principal: &Principal,
        draft_id: Uuid,
    ) -> Result<ApplicationDraft, Error> {
        let draft = self
            .drafts
            .find(draft_id)
            .await
            .map_err(Self::map_draft_error)?
            .ok_or_else(|| Error::not_found("No such draft"))?;
        principal.require_organization_access(draft.organization_id)?;
        Ok(draft)
    }

    async fn editable_draft(
        &self,
        principal: &Principal,
        draft_id: Uuid,
    ) -> Result<ApplicationDraft, Error> {
        let draft = self.owned_draft(principal, draft_id).await?;
        let cycle = self
            .cycles
            .find(draft.cycle_id)
            .await
            .map_err(CycleService::map_cycle_error)?
            .ok_or_else(|| Error::internal("draft references a missing cycle"))?;
        if !draft.editable(&cycle, self.clock.utc()) {
            return Err(Error::conflict("The application period has closed"));
        }
        Ok(draft)
    }

    /// Blob removal is best-effort: the reference is already gone from the
    /// draft, so a failed delete only leaks storage.
    async fn discard_blob(&self, reference: &str) {
        if let Err(error) = self.blobs.remove(reference).await {
            warn!(%reference, %error, "failed to remove blob");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        FixtureBlobStore, MockBlobStore, MockCycleRepository, MockDraftRepository,
        MockOrganizationRepository,
    };
    use crate::test_support::clock::MutableClock;
    use crate::test_support::fixtures::{sample_organization, standard_cycle_detail};
    use chrono::{Duration, Utc};
    use rstest::rstest;

    struct Harness {
        drafts: MockDraftRepository,
        cycles: MockCycleRepository,
        organizations: MockOrganizationRepository,
        clock: Arc<MutableClock>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                drafts: MockDraftRepository::new(),
                cycles: MockCycleRepository::new(),
                organizations: MockOrganizationRepository::new(),
                clock: Arc::new(MutableClock::new(Utc::now())),
            }
        }

        fn service(self) -> DraftService {
            DraftService::new(
                Arc::new(self.drafts),
                Arc::new(self.cycles),
                Arc::new(self.organizations),
                Arc::new(FixtureBlobStore),
                self.clock,
            )
        }
    }

    fn open_detail() -> CycleDetail {
        standard_cycle_detail()
    }

    #[rstest]
    #[tokio::test]
    async fn get_or_create_returns_the_existing_draft() {
        let detail = open_detail();
        let organization_id = Uuid::new_v4();
        let existing = ApplicationDraft::builder(organization_id, detail.cycle.id).build();
        let found = existing.clone();

        let mut harness = Harness::new();
        let detail_clone = detail.clone();
        harness
            .cycles
            .expect_detail()
            .return_once(move |_| Ok(Some(detail_clone)));
        harness
            .drafts
            .expect_find_for()
            .return_once(move |_, _| Ok(Some(found)));

        let service = harness.service();
        let principal = Principal::organization("org@example.org", organization_id);
        let form = service
            .get_or_create(&principal, detail.cycle.id)
            .await
            .expect("form");
        assert!(!form.created);
        assert_eq!(form.draft, existing);
    }

    #[rstest]
    #[tokio::test]
    async fn get_or_create_autofills_from_a_usable_profile() {
        let detail = open_detail();
        let mut organization = sample_organization();
        organization.profile =
            crate::domain::organization::OrganizationProfile::from_application(
                &crate::test_support::fixtures::sample_application(),
            );
        let organization_id = organization.id;
        let mission = organization.profile.mission.clone();
        assert!(organization.profile.is_usable());

        let mut harness = Harness::new();
        let detail_clone = detail.clone();
        harness
            .cycles
            .expect_detail()
            .return_once(move |_| Ok(Some(detail_clone)));
        harness.drafts.expect_find_for().return_once(|_, _| Ok(None));
        harness
            .organizations
            .expect_find()
            .return_once(move |_| Ok(Some(organization)));
        harness
            .drafts
            .expect_save()
            .withf(move |draft| draft.field("mission") == mission)
            .return_once(|_| Ok(()));

        let service = harness.service();
        let principal = Principal::organization("org@example.org", organization_id);
        let form = service
            .get_or_create(&principal, detail.cycle.id)
            .await
            .expect("form");
        assert!(form.created);
        assert_eq!(form.draft.organization_id, organization_id);
    }

    #[rstest]
    #[tokio::test]
    async fn get_or_create_rejects_a_closed_cycle() {
        let mut detail = open_detail();
        detail.cycle.open_time = Utc::now() - Duration::days(30);
        detail.cycle.close_time = Utc::now() - Duration::days(16);

        let mut harness = Harness::new();
        let detail_clone = detail.clone();
        harness
            .cycles
            .expect_detail()
            .return_once(move |_| Ok(Some(detail_clone)));
        harness.drafts.expect_find_for().return_once(|_, _| Ok(None));

        let service = harness.service();
        let principal = Principal::organization("org@example.org", Uuid::new_v4());
        let err = service
            .get_or_create(&principal, detail.cycle.id)
            .await
            .expect_err("closed");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn autosave_rejects_a_fresh_competing_writer_unless_forced() {
        let detail = open_detail();
        let organization_id = Uuid::new_v4();
        let now = Utc::now();
        let draft = ApplicationDraft::builder(organization_id, detail.cycle.id)
            .created(now - Duration::seconds(10))
            .modified(now - Duration::seconds(10))
            .modified_by("bob@example.org")
            .build();
        let draft_id = draft.id;

        let mut harness = Harness::new();
        harness.clock = Arc::new(MutableClock::new(now));
        let lookup = draft.clone();
        harness
            .drafts
            .expect_find()
            .returning(move |_| Ok(Some(lookup.clone())));
        let cycle = detail.cycle.clone();
        harness
            .cycles
            .expect_find()
            .returning(move |_| Ok(Some(cycle.clone())));
        harness.drafts.expect_save().returning(|_| Ok(()));

        let service = harness.service();
        let principal = Principal::organization("alice@example.org", organization_id);

        let err = service
            .autosave(&principal, draft_id, BTreeMap::new(), false)
            .await
            .expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);

        let saved = service
            .autosave(&principal, draft_id, BTreeMap::new(), true)
            .await
            .expect("forced save");
        assert_eq!(saved.modified_by.as_deref(), Some("alice@example.org"));
    }

    #[rstest]
    #[tokio::test]
    async fn attach_file_rejects_disallowed_extensions() {
        let harness = Harness::new();
        let service = harness.service();
        let principal = Principal::organization("org@example.org", Uuid::new_v4());

        let err = service
            .attach_file(
                &principal,
                Uuid::new_v4(),
                DraftFileField::Budget1,
                "budget.exe",
                b"bytes",
            )
            .await
            .expect_err("bad extension");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn attach_file_stores_and_records_the_reference() {
        let detail = open_detail();
        let organization_id = Uuid::new_v4();
        let draft = ApplicationDraft::builder(organization_id, detail.cycle.id).build();
        let draft_id = draft.id;

        let mut harness = Harness::new();
        harness
            .drafts
            .expect_find()
            .return_once(move |_| Ok(Some(draft)));
        let cycle = detail.cycle.clone();
        harness
            .cycles
            .expect_find()
            .return_once(move |_| Ok(Some(cycle)));
        harness
            .drafts
            .expect_save()
            .withf(|draft| {
                draft
                    .files
                    .get(&DraftFileField::Budget1)
                    .is_some_and(|reference| reference.ends_with("budget.xlsx"))
            })
            .return_once(|_| Ok(()));

        let service = harness.service();
        let principal = Principal::organization("org@example.org", organization_id);
        let saved = service
            .attach_file(
                &principal,
                draft_id,
                DraftFileField::Budget1,
                "budget.xlsx",
                b"bytes",
            )
            .await
            .expect("attached");
        assert!(saved.files.contains_key(&DraftFileField::Budget1));
    }

    #[rstest]
    #[tokio::test]
    async fn discard_requires_ownership() {
        let draft = ApplicationDraft::builder(Uuid::new_v4(), Uuid::new_v4()).build();
        let draft_id = draft.id;

        let mut harness = Harness::new();
        harness
            .drafts
            .expect_find()
            .return_once(move |_| Ok(Some(draft)));

        let service = harness.service();
        let principal = Principal::organization("other@example.org", Uuid::new_v4());
        let err = service
            .discard(&principal, draft_id)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn discard_removes_draft_and_blobs() {
        let organization_id = Uuid::new_v4();
        let draft = ApplicationDraft::builder(organization_id, Uuid::new_v4())
            .file(DraftFileField::Demographics, "blobs/demo.xlsx")
            .build();
        let draft_id = draft.id;

        let mut drafts = MockDraftRepository::new();
        drafts.expect_find().return_once(move |_| Ok(Some(draft)));
        drafts.expect_delete().times(1).return_once(|_| Ok(()));
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_remove()
            .withf(|reference| reference == "blobs/demo.xlsx")
            .times(1)
            .return_once(|_| Ok(()));

        let service = DraftService::new(
            Arc::new(drafts),
            Arc::new(MockCycleRepository::new()),
            Arc::new(MockOrganizationRepository::new()),
            Arc::new(blobs),
            Arc::new(MutableClock::new(Utc::now())),
        );
        let principal = Principal::organization("org@example.org", organization_id);
        service.discard(&principal, draft_id).await.expect("discarded");
    }
}
