//! The inspection wizard state machine.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::WizardError;
use super::cancel::CancelSignal;
use super::notice::Notice;
use super::photos::{IncomingFile, Uploader};
use super::steps::{StepDescriptor, TestStage, WizardMode, WizardStep, steps_for};
use super::store::{FileStore, InspectionStore};
use super::test_flow::{TestSnapshot, TestSubFlow};
use crate::auth::AuthContext;
use crate::config::UploadSettings;
use crate::models::{
    ComponentRecord, InspectionFields, NewInspection, Photo, RequiredAction, TestComponent,
    TestReadings, TestSelection, ValveRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WizardStatus {
    Active,
    /// Finalize persisted everything
    Completed,
    /// The inspection record was deleted
    Deleted,
}

/// Result of a navigation call.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    Moved { from: usize, to: usize },
    StageChanged { from: TestStage, to: TestStage },
    /// Mode selection is incomplete; nothing changed
    Blocked,
    Completed,
    /// Some finalize parts failed; the ones listed are still pending
    FinalizeIncomplete { failed: Vec<FinalizePart> },
    Deleted,
    /// Back from step 0: the caller leaves the wizard
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinalizePart {
    Components,
    Actions,
    Completion,
}

/// Which finalize writes already succeeded. A retry skips those.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FinalizeProgress {
    pub components_saved: bool,
    pub actions_saved: bool,
    pub completion_saved: bool,
}

impl FinalizeProgress {
    fn is_done(&self) -> bool {
        self.components_saved && self.actions_saved && self.completion_saved
    }
}

/// Serializable view of the whole wizard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WizardSnapshot {
    pub valve: ValveRef,
    pub status: WizardStatus,
    pub mode: Option<WizardMode>,
    pub test_selection: TestSelection,
    pub selection_locked: bool,
    pub step_index: usize,
    pub step_count: usize,
    pub step: StepDescriptor,
    pub inspection_id: Option<Uuid>,
    pub fields: InspectionFields,
    pub components: Vec<ComponentRecord>,
    pub actions: Vec<RequiredAction>,
    pub photos: Vec<Photo>,
    pub tests: Option<TestSnapshot>,
    pub finalize: FinalizeProgress,
    pub can_advance: bool,
}

/// One wizard run over one valve.
///
/// Component records and required actions stay buffered here until
/// finalize. Photos are persisted as soon as they are uploaded.
pub struct InspectionWizard {
    ctx: AuthContext,
    valve: ValveRef,
    store: Arc<dyn InspectionStore>,
    files: Arc<dyn FileStore>,
    limits: UploadSettings,
    cancel: CancelSignal,

    status: WizardStatus,
    step_index: usize,
    mode: Option<WizardMode>,
    selection: TestSelection,
    selection_locked: bool,
    inspection_id: Option<Uuid>,
    fields: InspectionFields,
    components: Vec<ComponentRecord>,
    actions: BTreeSet<RequiredAction>,
    photos: Vec<Photo>,
    tests: TestSubFlow,
    finalize: FinalizeProgress,
    notices: Vec<Notice>,
}

impl InspectionWizard {
    pub fn new(
        ctx: AuthContext,
        valve: ValveRef,
        store: Arc<dyn InspectionStore>,
        files: Arc<dyn FileStore>,
        limits: UploadSettings,
        cancel: CancelSignal,
    ) -> Self {
        let fields = InspectionFields {
            cdtp: valve.cdtp,
            ..Default::default()
        };

        Self {
            ctx,
            valve,
            store,
            files,
            limits,
            cancel,
            status: WizardStatus::Active,
            step_index: 0,
            mode: None,
            selection: TestSelection::default(),
            selection_locked: false,
            inspection_id: None,
            fields,
            components: Vec::new(),
            actions: BTreeSet::new(),
            photos: Vec::new(),
            tests: TestSubFlow::default(),
            finalize: FinalizeProgress::default(),
            notices: Vec::new(),
        }
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_step(&self) -> WizardStep {
        let steps = steps_for(self.mode);
        steps[self.step_index.min(steps.len() - 1)]
    }

    pub fn test_stage(&self) -> Option<TestStage> {
        (self.current_step() == WizardStep::TestSubFlow).then_some(self.tests.stage)
    }

    pub fn inspection_id(&self) -> Option<Uuid> {
        self.inspection_id
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Hand out the notifications produced since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Whether `advance` would do anything at the current step.
    pub fn can_advance(&self) -> bool {
        if self.status != WizardStatus::Active {
            return false;
        }
        match self.current_step() {
            WizardStep::ModeSelection => match self.mode {
                None => false,
                Some(WizardMode::Registry) => true,
                Some(WizardMode::Tests) => self.selection.is_complete(),
            },
            _ => true,
        }
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let steps = steps_for(self.mode);
        let tests = (self.mode == Some(WizardMode::Tests))
            .then(|| self.tests.snapshot(&self.selection, self.fields.cdtp));

        WizardSnapshot {
            valve: self.valve.clone(),
            status: self.status,
            mode: self.mode,
            test_selection: self.selection.clone(),
            selection_locked: self.selection_locked,
            step_index: self.step_index,
            step_count: steps.len(),
            step: self.current_step().into(),
            inspection_id: self.inspection_id,
            fields: self.fields.clone(),
            components: self.components.clone(),
            actions: self.actions.iter().copied().collect(),
            photos: self.photos.clone(),
            tests,
            finalize: self.finalize,
            can_advance: self.can_advance(),
        }
    }

    fn ensure_active(&self) -> Result<(), WizardError> {
        match self.status {
            WizardStatus::Active => Ok(()),
            _ => Err(WizardError::Finished),
        }
    }

    fn require_step(&self, wanted: WizardStep, name: &'static str) -> Result<(), WizardError> {
        if self.current_step() == wanted {
            Ok(())
        } else {
            Err(WizardError::WrongStep(name))
        }
    }

    fn notify_failure(&mut self, notice: &str, err: &WizardError) {
        error!(
            inspection_id = ?self.inspection_id,
            valve = %self.valve.tag,
            error = %err,
            "{}",
            notice
        );
        self.notices.push(Notice::error(notice));
    }

    /// Report a rejected request: a warning in the log and an error notice.
    fn reject(&mut self, err: WizardError) -> WizardError {
        warn!(
            inspection_id = ?self.inspection_id,
            valve = %self.valve.tag,
            step = ?self.current_step(),
            error = %err,
            "Wizard request rejected"
        );
        self.notices.push(Notice::error(err.to_string()));
        err
    }

    /// Choose the mode and, for tests mode, the test type and components.
    ///
    /// Only at step 0. Once the wizard has left step 0 the choice is locked;
    /// resubmitting the same choice is accepted.
    pub fn set_mode(
        &mut self,
        mode: WizardMode,
        selection: TestSelection,
    ) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.require_step(WizardStep::ModeSelection, "mode_selection")?;

        let selection = match mode {
            WizardMode::Registry => TestSelection::default(),
            WizardMode::Tests => selection,
        };

        if self.selection_locked {
            if self.mode == Some(mode) && self.selection == selection {
                return Ok(());
            }
            return Err(WizardError::SelectionLocked);
        }

        self.mode = Some(mode);
        self.selection = selection;
        Ok(())
    }

    /// Replace the inspection form. Rejected once the inspection exists,
    /// since later edits would never reach the record.
    pub fn update_fields(&mut self, fields: InspectionFields) -> Result<(), WizardError> {
        self.ensure_active()?;
        if self.inspection_id.is_some() {
            return Err(WizardError::FieldsLocked);
        }
        match self.current_step() {
            WizardStep::ModeSelection | WizardStep::InspectionInfo => {
                self.fields = fields;
                Ok(())
            }
            _ => Err(WizardError::WrongStep("inspection_info")),
        }
    }

    fn validate_fields(&self) -> Result<(), WizardError> {
        let fields = &self.fields;

        if let Some(cdtp) = fields.cdtp
            && !(cdtp.is_finite() && cdtp >= 0.0)
        {
            return Err(WizardError::Validation(
                "CDTP must be a non-negative number".to_string(),
            ));
        }

        if fields.leak_test && fields.leak_bubbles_per_minute.is_none() {
            return Err(WizardError::Validation(
                "Bubbles per minute is required when the leak test is checked".to_string(),
            ));
        }

        if self.mode == Some(WizardMode::Tests)
            && self.selection.includes(TestComponent::PressaoAbertura)
            && !fields.cdtp.is_some_and(|c| c > 0.0)
        {
            return Err(WizardError::Validation(
                "CDTP is required for the opening pressure test".to_string(),
            ));
        }

        Ok(())
    }

    pub fn add_component(&mut self, record: ComponentRecord) -> Result<usize, WizardError> {
        self.ensure_component_edit()?;
        self.components.push(record);
        Ok(self.components.len() - 1)
    }

    pub fn update_component(
        &mut self,
        index: usize,
        record: ComponentRecord,
    ) -> Result<(), WizardError> {
        self.ensure_component_edit()?;
        let slot = self
            .components
            .get_mut(index)
            .ok_or_else(|| WizardError::NotFound(format!("Component {}", index)))?;
        *slot = record;
        Ok(())
    }

    pub fn remove_component(&mut self, index: usize) -> Result<ComponentRecord, WizardError> {
        self.ensure_component_edit()?;
        if index >= self.components.len() {
            return Err(WizardError::NotFound(format!("Component {}", index)));
        }
        Ok(self.components.remove(index))
    }

    /// Flip an action in the checklist. Returns whether it is now selected.
    pub fn toggle_action(&mut self, action: RequiredAction) -> Result<bool, WizardError> {
        self.ensure_active()?;
        self.require_step(WizardStep::ComponentsAndActions, "components_and_actions")?;
        if self.finalize.actions_saved {
            return Err(WizardError::AlreadySaved("Required actions"));
        }
        if self.actions.remove(&action) {
            Ok(false)
        } else {
            self.actions.insert(action);
            Ok(true)
        }
    }

    fn ensure_component_edit(&self) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.require_step(WizardStep::ComponentsAndActions, "components_and_actions")?;
        if self.finalize.components_saved {
            return Err(WizardError::AlreadySaved("Component records"));
        }
        Ok(())
    }

    pub fn update_test_readings(&mut self, readings: TestReadings) -> Result<(), WizardError> {
        self.ensure_active()?;
        if self.test_stage() != Some(TestStage::Readings) {
            return Err(WizardError::WrongStep("test_readings"));
        }
        self.tests.readings = readings;
        Ok(())
    }

    /// Move forward one step.
    ///
    /// Leaving the info step the first time creates the inspection record.
    /// If that fails the step does not change and calling again retries.
    /// From the last step this finalizes.
    pub async fn advance(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;

        match self.current_step() {
            WizardStep::ModeSelection => {
                if !self.can_advance() {
                    return Ok(Transition::Blocked);
                }
                self.selection_locked = true;
                Ok(self.move_to(self.step_index + 1))
            }
            WizardStep::InspectionInfo => {
                if let Err(err) = self.validate_fields() {
                    return Err(self.reject(err));
                }
                if self.inspection_id.is_none() {
                    self.create_inspection().await?;
                }
                Ok(self.move_to(self.step_index + 1))
            }
            WizardStep::Photo(_) => Ok(self.move_to(self.step_index + 1)),
            WizardStep::ComponentsAndActions => self.finalize().await,
            WizardStep::TestSubFlow => match self.tests.stage {
                TestStage::Readings => {
                    if let Err(reason) = self.tests.validate_readings(&self.selection) {
                        return Err(self.reject(WizardError::Validation(reason)));
                    }
                    self.tests.stage = TestStage::Videos;
                    Ok(Transition::StageChanged {
                        from: TestStage::Readings,
                        to: TestStage::Videos,
                    })
                }
                TestStage::Videos => self.finalize().await,
            },
        }
    }

    /// Move back one step, or one stage inside the test sub-flow.
    ///
    /// Nothing persisted is undone. At step 0 this returns [`Transition::Exit`].
    pub fn retreat(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;

        if self.test_stage() == Some(TestStage::Videos) {
            self.tests.stage = TestStage::Readings;
            return Ok(Transition::StageChanged {
                from: TestStage::Videos,
                to: TestStage::Readings,
            });
        }

        if self.step_index == 0 {
            return Ok(Transition::Exit);
        }
        Ok(self.move_to(self.step_index - 1))
    }

    fn move_to(&mut self, to: usize) -> Transition {
        let from = self.step_index;
        self.step_index = to;
        Transition::Moved { from, to }
    }

    async fn create_inspection(&mut self) -> Result<(), WizardError> {
        let new = NewInspection {
            valve_id: self.valve.id,
            inspector_id: self.ctx.profile_id,
            fields: self.fields.clone(),
            started_at: Utc::now(),
        };

        match self.store.create_inspection(&self.ctx, &new).await {
            Ok(id) => {
                info!(inspection_id = %id, valve = %self.valve.tag, "Inspection created");
                self.inspection_id = Some(id);
                self.notices.push(Notice::success("Inspection created"));
                Ok(())
            }
            Err(e) => {
                let err = WizardError::RemoteWrite(e.to_string());
                self.notify_failure("Could not create the inspection", &err);
                Err(err)
            }
        }
    }

    /// Persist buffered components and actions and mark the inspection
    /// complete. The three writes run independently; one failing does not
    /// stop or undo the others.
    async fn finalize(&mut self) -> Result<Transition, WizardError> {
        let inspection_id = self.inspection_id.ok_or(WizardError::NoInspection)?;
        let store = Arc::clone(&self.store);
        let ctx = self.ctx.clone();
        let progress = self.finalize;
        let components: Vec<ComponentRecord> = self.components.clone();
        let actions: Vec<RequiredAction> = self.actions.iter().copied().collect();

        let save_components = async {
            if progress.components_saved || components.is_empty() {
                return Ok(());
            }
            store
                .bulk_insert_components(&ctx, inspection_id, &components)
                .await
        };
        let save_actions = async {
            if progress.actions_saved || actions.is_empty() {
                return Ok(());
            }
            store.bulk_insert_actions(&ctx, inspection_id, &actions).await
        };
        let save_completion = async {
            if progress.completion_saved {
                return Ok(());
            }
            store
                .update_inspection_completion(&ctx, inspection_id, Utc::now(), true)
                .await
        };

        let (components_result, actions_result, completion_result) =
            tokio::join!(save_components, save_actions, save_completion);

        let mut failed = Vec::new();
        for (part, result) in [
            (FinalizePart::Components, components_result),
            (FinalizePart::Actions, actions_result),
            (FinalizePart::Completion, completion_result),
        ] {
            match result {
                Ok(()) => match part {
                    FinalizePart::Components => self.finalize.components_saved = true,
                    FinalizePart::Actions => self.finalize.actions_saved = true,
                    FinalizePart::Completion => self.finalize.completion_saved = true,
                },
                Err(e) => {
                    let what = match part {
                        FinalizePart::Components => "Could not save the component records",
                        FinalizePart::Actions => "Could not save the required actions",
                        FinalizePart::Completion => "Could not mark the inspection as completed",
                    };
                    self.notify_failure(what, &WizardError::RemoteWrite(e.to_string()));
                    failed.push(part);
                }
            }
        }

        if self.finalize.is_done() {
            info!(
                inspection_id = %inspection_id,
                components = self.components.len(),
                actions = self.actions.len(),
                "Inspection finalized"
            );
            self.status = WizardStatus::Completed;
            self.notices.push(Notice::success("Inspection completed"));
            Ok(Transition::Completed)
        } else {
            Ok(Transition::FinalizeIncomplete { failed })
        }
    }

    /// Delete the inspection record. Dependent rows go with it; uploaded
    /// objects are removed best-effort and buffered data is discarded.
    pub async fn delete_inspection(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;
        let inspection_id = self.inspection_id.ok_or(WizardError::NoInspection)?;

        if let Err(e) = self.store.delete_inspection(&self.ctx, inspection_id).await {
            let err = WizardError::RemoteWrite(e.to_string());
            self.notify_failure("Could not delete the inspection", &err);
            return Err(err);
        }

        self.cancel.cancel();
        let keys: Vec<String> = self
            .photos
            .iter()
            .filter_map(|p| p.storage_key.clone())
            .chain(self.tests.videos.values().map(|v| v.storage_key.clone()))
            .collect();
        for key in keys {
            if let Err(e) = self.files.delete_file(&self.ctx, &key).await {
                warn!(
                    inspection_id = %inspection_id,
                    key = %key,
                    error = %e,
                    "Failed to delete stored file of deleted inspection"
                );
            }
        }

        info!(inspection_id = %inspection_id, "Inspection deleted");
        self.components.clear();
        self.actions.clear();
        self.photos.clear();
        self.tests = TestSubFlow::default();
        self.status = WizardStatus::Deleted;
        self.notices.push(Notice::success("Inspection deleted"));
        Ok(Transition::Deleted)
    }

    fn uploader(&self) -> Uploader {
        Uploader {
            ctx: self.ctx.clone(),
            store: Arc::clone(&self.store),
            files: Arc::clone(&self.files),
            cancel: self.cancel.clone(),
            max_size: self.limits.max_file_size,
        }
    }

    /// Upload a batch of photos for the current photo step.
    ///
    /// Files are stored concurrently and fail individually: the successful
    /// ones are kept and each failure gets its own notification. Returns the
    /// photos stored by this call.
    pub async fn upload_photos(
        &mut self,
        batch: Vec<IncomingFile>,
    ) -> Result<Vec<Photo>, WizardError> {
        self.ensure_active()?;
        let step = self
            .current_step()
            .photo_step()
            .ok_or(WizardError::WrongStep("photo"))?;
        let inspection_id = self.inspection_id.ok_or(WizardError::NoInspection)?;

        if batch.is_empty() {
            let err = WizardError::Validation("No files were sent".to_string());
            return Err(self.reject(err));
        }
        if batch.len() > self.limits.max_files_per_request {
            let err = WizardError::Validation(format!(
                "At most {} files per upload",
                self.limits.max_files_per_request
            ));
            return Err(self.reject(err));
        }

        // Each file gets its slot up front; failed files leave gaps
        let last_order = self
            .photos
            .iter()
            .filter(|p| p.step == step.as_str())
            .filter_map(|p| p.order)
            .max()
            .unwrap_or(0);

        let uploader = self.uploader();
        let results = join_all(batch.into_iter().zip(last_order + 1..).map(|(file, order)| {
            uploader.upload_photo(inspection_id, step, order, file)
        }))
        .await;

        let mut stored = Vec::new();
        for result in results {
            match result {
                Ok(photo) => stored.push(photo),
                Err(err) => {
                    warn!(inspection_id = %inspection_id, error = %err, "Photo upload failed");
                    self.notices.push(Notice::error(err.to_string()));
                }
            }
        }

        if !stored.is_empty() {
            self.notices
                .push(Notice::success(format!("{} photo(s) uploaded", stored.len())));
        }
        self.photos.extend(stored.iter().cloned());
        Ok(stored)
    }

    pub async fn update_photo_caption(
        &mut self,
        photo_id: Uuid,
        caption: String,
    ) -> Result<(), WizardError> {
        self.ensure_active()?;
        let index = self.photo_index(photo_id)?;

        if let Err(e) = self
            .store
            .update_photo_caption(&self.ctx, photo_id, &caption)
            .await
        {
            let err = WizardError::RemoteWrite(e.to_string());
            self.notify_failure("Could not update the caption", &err);
            return Err(err);
        }

        self.photos[index].caption = Some(caption);
        Ok(())
    }

    /// Delete the photo record, then its object. A leftover object is only
    /// reported as a warning.
    pub async fn remove_photo(&mut self, photo_id: Uuid) -> Result<(), WizardError> {
        self.ensure_active()?;
        let index = self.photo_index(photo_id)?;

        if let Err(e) = self.store.delete_photo_record(&self.ctx, photo_id).await {
            let err = WizardError::RemoteWrite(e.to_string());
            self.notify_failure("Could not remove the photo", &err);
            return Err(err);
        }

        let photo = self.photos.remove(index);
        if let Some(key) = photo.storage_key.as_deref()
            && let Err(e) = self.files.delete_file(&self.ctx, key).await
        {
            warn!(photo_id = %photo_id, key = %key, error = %e, "Failed to delete photo object");
            self.notices
                .push(Notice::warning("Photo removed, but its file could not be deleted"));
        }
        Ok(())
    }

    fn photo_index(&self, photo_id: Uuid) -> Result<usize, WizardError> {
        self.photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or_else(|| WizardError::NotFound(format!("Photo {}", photo_id)))
    }

    /// Upload the confirmation video of a selected test component.
    /// A second upload for the same component replaces the first.
    pub async fn upload_test_video(
        &mut self,
        component: TestComponent,
        file: IncomingFile,
    ) -> Result<(), WizardError> {
        self.ensure_active()?;
        if self.test_stage() != Some(TestStage::Videos) {
            return Err(WizardError::WrongStep("test_videos"));
        }
        if !self.selection.includes(component) {
            return Err(WizardError::Validation(format!(
                "{} is not part of this test run",
                component.label()
            )));
        }
        let inspection_id = self.inspection_id.ok_or(WizardError::NoInspection)?;

        let video = match self
            .uploader()
            .upload_video(inspection_id, component, file)
            .await
        {
            Ok(video) => video,
            Err(err) => {
                warn!(inspection_id = %inspection_id, error = %err, "Test video upload failed");
                self.notices.push(Notice::error(err.to_string()));
                return Err(err);
            }
        };

        if let Some(previous) = self.tests.videos.insert(component, video)
            && let Err(e) = self.files.delete_file(&self.ctx, &previous.storage_key).await
        {
            warn!(key = %previous.storage_key, error = %e, "Failed to delete replaced video");
        }
        self.notices.push(Notice::success(format!(
            "{} video uploaded",
            component.label()
        )));
        Ok(())
    }
}
