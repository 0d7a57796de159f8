//! The wizard as a synchronous state machine. No I/O: the service feeds it saved defaults
//! and generation outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::selection::{DefaultSelection, SelectionView};
use crate::defaults::{ArtifactKind, SavedDefault};
use crate::generation::GenerationInputs;
use crate::models::{
    CurrentCvPayload, GenerationResult, JobDescription, ScoreBand, TemplatePayload,
};

/// Name given to a pasted current CV when it is saved as default.
pub const PASTED_CV_NAME: &str = "Pasted Text CV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Template = 1,
    CurrentCv = 2,
    JobDescription = 3,
    Review = 4,
    Result = 5,
}

impl WizardStep {
    pub const COUNT: u8 = 5;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Self> {
        match self {
            WizardStep::Template => Some(WizardStep::CurrentCv),
            WizardStep::CurrentCv => Some(WizardStep::JobDescription),
            WizardStep::JobDescription => Some(WizardStep::Review),
            WizardStep::Review => Some(WizardStep::Result),
            WizardStep::Result => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Template => None,
            WizardStep::CurrentCv => Some(WizardStep::Template),
            WizardStep::JobDescription => Some(WizardStep::CurrentCv),
            WizardStep::Review => Some(WizardStep::JobDescription),
            WizardStep::Result => Some(WizardStep::Review),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Template => "Upload CV template",
            WizardStep::CurrentCv => "Your current CV",
            WizardStep::JobDescription => "Job description",
            WizardStep::Review => "Review and generate",
            WizardStep::Result => "Your optimized CV",
        }
    }

    /// The saved-default slot shown on this step, if any.
    pub fn artifact(self) -> Option<ArtifactKind> {
        match self {
            WizardStep::Template => Some(ArtifactKind::Template),
            WizardStep::CurrentCv => Some(ArtifactKind::CurrentCv),
            _ => None,
        }
    }
}

fn step_of(kind: ArtifactKind) -> WizardStep {
    match kind {
        ArtifactKind::Template => WizardStep::Template,
        ArtifactKind::CurrentCv => WizardStep::CurrentCv,
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("{0}")]
    Validation(String),

    #[error("Your CV is still being generated. Please wait for it to finish.")]
    Busy,

    #[error("This action is not available on step {0}.")]
    WrongStep(u8),

    #[error("There is no saved default to use.")]
    NoSavedDefault,

    #[error("No CV has been generated yet.")]
    NoResult,
}

/// Inputs snapshotted when a generation starts. Only the matching ticket may complete it.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub id: Uuid,
    pub inputs: GenerationInputs,
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    step: WizardStep,
    template_input: DefaultSelection<TemplatePayload>,
    cv_input: DefaultSelection<CurrentCvPayload>,
    job_description_draft: String,

    template: Option<TemplatePayload>,
    current_cv: Option<CurrentCvPayload>,
    job_description: Option<JobDescription>,
    result: Option<GenerationResult>,

    pending: Option<Uuid>,
    /// Step whose saved default has to be (re)loaded before the step is shown.
    mount_due: Option<ArtifactKind>,
    last_error: Option<String>,
    started_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            step: WizardStep::Template,
            template_input: DefaultSelection::default(),
            cv_input: DefaultSelection::default(),
            job_description_draft: String::new(),
            template: None,
            current_cv: None,
            job_description: None,
            result: None,
            pending: None,
            mount_due: Some(ArtifactKind::Template),
            last_error: None,
            started_at: now,
            last_seen: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    /// Untouched for longer than `ttl`. A session waiting on a generation never is.
    pub fn is_idle(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        if self.is_generating() {
            return false;
        }
        (now - self.last_seen).to_std().is_ok_and(|age| age > ttl)
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn mount_due(&self) -> Option<ArtifactKind> {
        self.mount_due
    }

    /// Shows the step with a freshly loaded saved default.
    pub fn mount(&mut self, kind: ArtifactKind, saved: Option<SavedDefault>) {
        match kind {
            ArtifactKind::Template => {
                let saved = match saved {
                    Some(SavedDefault::Template(t)) => Some(t),
                    _ => None,
                };
                self.template_input = DefaultSelection::mount(saved, self.template.as_ref());
            }
            ArtifactKind::CurrentCv => {
                let saved = match saved {
                    Some(SavedDefault::CurrentCv(cv)) => Some(cv),
                    _ => None,
                };
                self.cv_input = DefaultSelection::mount(saved, self.current_cv.as_ref());
            }
        }
        if self.mount_due == Some(kind) {
            self.mount_due = None;
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn ensure_idle(&self) -> Result<(), WizardError> {
        if self.is_generating() {
            return Err(WizardError::Busy);
        }
        Ok(())
    }

    /// Fails unless the session is idle on `expected`.
    pub fn ensure_on(&self, expected: WizardStep) -> Result<(), WizardError> {
        self.ensure_idle()?;
        if self.step != expected {
            return Err(WizardError::WrongStep(self.step.number()));
        }
        Ok(())
    }

    fn enter(&mut self, step: WizardStep) {
        self.step = step;
        self.mount_due = step.artifact();
    }

    pub fn stage_template(&mut self, payload: TemplatePayload) -> Result<(), WizardError> {
        self.ensure_on(WizardStep::Template)?;
        self.template_input.stage(payload);
        Ok(())
    }

    pub fn stage_current_cv(&mut self, payload: CurrentCvPayload) -> Result<(), WizardError> {
        self.ensure_on(WizardStep::CurrentCv)?;
        self.cv_input.stage(payload);
        Ok(())
    }

    /// Typing replaces any staged PDF.
    pub fn set_current_cv_text(&mut self, text: String) -> Result<(), WizardError> {
        self.ensure_on(WizardStep::CurrentCv)?;
        self.cv_input.stage(CurrentCvPayload::text(text, None));
        Ok(())
    }

    /// An upload of an unsupported type leaves no current CV staged.
    pub fn reject_current_cv(&mut self) -> Result<(), WizardError> {
        self.ensure_on(WizardStep::CurrentCv)?;
        self.cv_input.discard_staged();
        Ok(())
    }

    pub fn set_job_description(&mut self, text: String) -> Result<(), WizardError> {
        self.ensure_on(WizardStep::JobDescription)?;
        self.job_description_draft = text;
        Ok(())
    }

    pub fn select_saved(&mut self, kind: ArtifactKind) -> Result<(), WizardError> {
        self.ensure_on(step_of(kind))?;
        let selected = match kind {
            ArtifactKind::Template => self.template_input.select_saved(),
            ArtifactKind::CurrentCv => self.cv_input.select_saved(),
        };
        if !selected {
            return Err(WizardError::NoSavedDefault);
        }
        Ok(())
    }

    /// The current input of the step, shaped for saving as default.
    pub fn default_to_save(&self, kind: ArtifactKind) -> Result<SavedDefault, WizardError> {
        self.ensure_on(step_of(kind))?;
        match kind {
            ArtifactKind::Template => {
                let template = self
                    .template_input
                    .resolve()
                    .filter(|t| t.is_well_formed())
                    .ok_or_else(|| {
                        WizardError::Validation("Please upload a template before saving it.".into())
                    })?;
                if template.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    return Err(WizardError::Validation(
                        "The template needs a file name to be saved.".into(),
                    ));
                }
                Ok(SavedDefault::Template(template.clone()))
            }
            ArtifactKind::CurrentCv => {
                let mut cv = self
                    .cv_input
                    .resolve()
                    .filter(|cv| cv.has_content())
                    .cloned()
                    .ok_or_else(|| {
                        WizardError::Validation(
                            "Please upload or paste your current CV before saving it.".into(),
                        )
                    })?;
                if cv.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    cv.name = Some(PASTED_CV_NAME.to_string());
                }
                Ok(SavedDefault::CurrentCv(cv))
            }
        }
    }

    pub fn saved_stored(&mut self, saved: SavedDefault) {
        match saved {
            SavedDefault::Template(t) => self.template_input.saved_stored(t),
            SavedDefault::CurrentCv(cv) => self.cv_input.saved_stored(cv),
        }
    }

    pub fn saved_removed(&mut self, kind: ArtifactKind) {
        match kind {
            ArtifactKind::Template => self.template_input.saved_removed(),
            ArtifactKind::CurrentCv => self.cv_input.saved_removed(),
        }
    }

    /// Gated forward transition. Step 4 only moves on through a successful generation.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_idle()?;
        match self.step {
            WizardStep::Template => {
                let template = self
                    .template_input
                    .resolve()
                    .filter(|t| t.is_well_formed())
                    .cloned()
                    .ok_or_else(|| WizardError::Validation("Please upload a CV template.".into()))?;
                self.template = Some(template);
            }
            WizardStep::CurrentCv => {
                let cv = self
                    .cv_input
                    .resolve()
                    .filter(|cv| cv.has_content())
                    .cloned()
                    .ok_or_else(|| {
                        WizardError::Validation("Please upload or paste your current CV.".into())
                    })?;
                self.current_cv = Some(cv);
            }
            WizardStep::JobDescription => {
                let description = JobDescription::parse(&self.job_description_draft)
                    .map_err(|msg| WizardError::Validation(msg.to_string()))?;
                self.job_description = Some(description);
            }
            WizardStep::Review => {
                return Err(WizardError::Validation(
                    "Generate your optimized CV to continue.".into(),
                ));
            }
            WizardStep::Result => return Err(WizardError::WrongStep(self.step.number())),
        }
        let next = self
            .step
            .next()
            .ok_or(WizardError::WrongStep(self.step.number()))?;
        self.enter(next);
        Ok(next)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_idle()?;
        let previous = self
            .step
            .previous()
            .ok_or(WizardError::WrongStep(self.step.number()))?;
        self.enter(previous);
        Ok(previous)
    }

    /// Back to step 1 with every accumulated input and the result cleared.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Result<(), WizardError> {
        self.ensure_idle()?;
        *self = Self::new(now);
        Ok(())
    }

    pub fn begin_generation(&mut self) -> Result<GenerationTicket, WizardError> {
        self.ensure_on(WizardStep::Review)?;
        let (Some(template), Some(current_cv), Some(job_description)) = (
            self.template.clone(),
            self.current_cv.clone(),
            self.job_description.clone(),
        ) else {
            return Err(WizardError::Validation(
                "Some inputs are missing. Please go back and complete every step.".into(),
            ));
        };
        let id = Uuid::new_v4();
        self.pending = Some(id);
        self.last_error = None;
        Ok(GenerationTicket {
            id,
            inputs: GenerationInputs {
                template,
                current_cv,
                job_description,
            },
        })
    }

    /// Applies a result if `ticket` is still the pending generation. Returns whether it applied.
    pub fn complete_generation(&mut self, ticket: Uuid, result: GenerationResult) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.result = Some(result);
        self.last_error = None;
        self.enter(WizardStep::Result);
        true
    }

    /// Records a failed generation. The session stays on the review step.
    pub fn fail_generation(&mut self, ticket: Uuid, message: impl Into<String>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.last_error = Some(message.into());
        true
    }

    pub fn result(&self) -> Result<&GenerationResult, WizardError> {
        self.result.as_ref().ok_or(WizardError::NoResult)
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.step.number(),
            step_title: self.step.title(),
            total_steps: WizardStep::COUNT,
            template: self.template_input.view(),
            current_cv: self.cv_input.view(),
            job_description: self.job_description_draft.clone(),
            can_go_back: !self.is_generating() && self.step.previous().is_some(),
            generating: self.is_generating(),
            result: self.result.as_ref().map(|r| ResultSummary {
                match_score: r.match_score,
                band: r.band(),
                explanation: r.explanation.clone(),
            }),
            error: self.last_error.clone(),
            started_at: self.started_at,
        }
    }
}

/// Snapshot of a session for the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub step: u8,
    pub step_title: &'static str,
    pub total_steps: u8,
    pub template: SelectionView,
    pub current_cv: SelectionView,
    pub job_description: String,
    pub can_go_back: bool,
    pub generating: bool,
    pub result: Option<ResultSummary>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub match_score: f64,
    pub band: ScoreBand,
    pub explanation: String,
}
