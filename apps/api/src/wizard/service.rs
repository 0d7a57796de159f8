//! Per-user wizard sessions wired to the default store and the CV generator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use super::session::{WizardError, WizardSession, WizardStep, WizardView};
use crate::defaults::{ArtifactKind, DefaultStore};
use crate::errors::AppError;
use crate::generation::{build_parts, CvGenerator, GenerationError};
use crate::ingest::{ingest_current_cv, ingest_template, IngestError, UploadedFile};
use crate::models::GenerationResult;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

type SharedSession = Arc<Mutex<WizardSession>>;

/// Live sessions keyed by user id. The map lock only guards lookups; each session has its
/// own lock, held for the whole request including store I/O.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    async fn get(&self, user_id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(user_id).cloned()
    }

    /// The user's session, created on first use.
    async fn open(&self, user_id: &str) -> SharedSession {
        if let Some(session) = self.get(user_id).await {
            return session;
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id.to_string()).or_insert_with(|| {
            info!(user_id, "Wizard session started");
            Arc::new(Mutex::new(WizardSession::new(Utc::now())))
        });
        Arc::clone(session)
    }

    async fn remove(&self, user_id: &str) -> bool {
        self.sessions.write().await.remove(user_id).is_some()
    }

    /// Drops sessions idle for longer than `ttl`. Sessions some request still holds are kept.
    async fn sweep_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, shared| {
            if Arc::strong_count(shared) > 1 {
                return true;
            }
            match shared.try_lock() {
                Ok(session) => !session.is_idle(now, ttl),
                Err(_) => true,
            }
        });
        before - sessions.len()
    }

    async fn finish_generation(
        &self,
        user_id: &str,
        ticket: Uuid,
        outcome: Result<GenerationResult, GenerationError>,
    ) -> Result<WizardView, AppError> {
        let Some(shared) = self.get(user_id).await else {
            info!(user_id, "Session ended before generation finished; result discarded");
            return Err(AppError::Conflict(
                "The wizard session ended before your CV was generated.".into(),
            ));
        };
        let mut session = shared.lock().await;

        match outcome {
            Ok(result) => {
                let score = result.match_score;
                if !session.complete_generation(ticket, result) {
                    return Err(AppError::Conflict(
                        "The wizard was restarted before your CV was generated.".into(),
                    ));
                }
                info!(user_id, score, "CV generated");
                Ok(session.view())
            }
            Err(e) => {
                session.fail_generation(ticket, e.to_string());
                Err(e.into())
            }
        }
    }
}

pub struct WizardService {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn DefaultStore>,
    generator: Arc<dyn CvGenerator>,
    idle_ttl: Duration,
}

impl WizardService {
    pub fn new(store: Arc<dyn DefaultStore>, generator: Arc<dyn CvGenerator>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::default()),
            store,
            generator,
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Runs `action` on the user's session (created on first use). The step's saved default
    /// is loaded before the action sees the session, and again if the action moved to a
    /// step that shows one.
    ///
    /// A failed action is recorded on the session and leaves committed inputs untouched.
    async fn with_session<T>(
        &self,
        user_id: &str,
        action: impl FnOnce(&mut WizardSession) -> Result<T, AppError>,
    ) -> Result<(T, WizardView), AppError> {
        let shared = self.registry.open(user_id).await;
        let mut session = shared.lock().await;
        session.touch(Utc::now());
        self.mount_if_due(user_id, &mut session).await;

        let outcome = action(&mut *session);
        match &outcome {
            Ok(_) => session.clear_error(),
            Err(AppError::Validation(msg) | AppError::Ingestion(msg)) => {
                session.record_error(msg.clone())
            }
            Err(_) => {}
        }

        self.mount_if_due(user_id, &mut session).await;
        let value = outcome?;
        Ok((value, session.view()))
    }

    /// An unreachable store shows the step without a saved default rather than failing it.
    async fn mount_if_due(&self, user_id: &str, session: &mut WizardSession) {
        let Some(kind) = session.mount_due() else {
            return;
        };
        let saved = match self.store.load(user_id, kind).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(user_id, slot = kind.slot(), "Could not load saved default: {e}");
                None
            }
        };
        session.mount(kind, saved);
    }

    /// Current view. Creates and mounts the session on first use.
    pub async fn view(&self, user_id: &str) -> Result<WizardView, AppError> {
        let shared = self.registry.open(user_id).await;
        let mut session = shared.lock().await;
        session.touch(Utc::now());
        self.mount_if_due(user_id, &mut session).await;
        Ok(session.view())
    }

    pub async fn next(&self, user_id: &str) -> Result<WizardView, AppError> {
        let (step, view) = self
            .with_session(user_id, |s| s.advance().map_err(AppError::from))
            .await?;
        info!(user_id, step = step.number(), "Wizard advanced");
        Ok(view)
    }

    pub async fn back(&self, user_id: &str) -> Result<WizardView, AppError> {
        let (step, view) = self
            .with_session(user_id, |s| s.back().map_err(AppError::from))
            .await?;
        info!(user_id, step = step.number(), "Wizard went back");
        Ok(view)
    }

    pub async fn restart(&self, user_id: &str) -> Result<WizardView, AppError> {
        let ((), view) = self
            .with_session(user_id, |s| s.restart(Utc::now()).map_err(AppError::from))
            .await?;
        info!(user_id, "Wizard restarted");
        Ok(view)
    }

    /// Discards the session. Always allowed, even while a generation is in flight;
    /// a late result for a discarded session is dropped.
    pub async fn logout(&self, user_id: &str) {
        if self.registry.remove(user_id).await {
            info!(user_id, "Wizard session discarded");
        }
    }

    pub async fn upload_template(
        &self,
        user_id: &str,
        upload: Result<UploadedFile, IngestError>,
    ) -> Result<WizardView, AppError> {
        let ((), view) = self
            .with_session(user_id, |s| {
                // Wrong step or busy wins over a bad file.
                s.ensure_on(WizardStep::Template)?;
                let payload = ingest_template(&upload?)?;
                info!(
                    name = payload.name.as_deref().unwrap_or_default(),
                    binary = payload.is_binary(),
                    "Template staged"
                );
                s.stage_template(payload).map_err(AppError::from)
            })
            .await?;
        Ok(view)
    }

    pub async fn upload_current_cv(
        &self,
        user_id: &str,
        upload: Result<UploadedFile, IngestError>,
    ) -> Result<WizardView, AppError> {
        let ((), view) = self
            .with_session(user_id, |s| {
                let file = match upload {
                    Ok(file) => file,
                    Err(e) => {
                        s.ensure_on(WizardStep::CurrentCv)?;
                        return Err(e.into());
                    }
                };
                match ingest_current_cv(&file) {
                    Ok(payload) => s.stage_current_cv(payload).map_err(AppError::from),
                    Err(IngestError::UnsupportedType) => {
                        s.reject_current_cv()?;
                        Err(IngestError::UnsupportedType.into())
                    }
                    Err(e) => {
                        s.ensure_on(WizardStep::CurrentCv)?;
                        Err(e.into())
                    }
                }
            })
            .await?;
        Ok(view)
    }

    pub async fn set_current_cv_text(
        &self,
        user_id: &str,
        text: String,
    ) -> Result<WizardView, AppError> {
        let ((), view) = self
            .with_session(user_id, |s| s.set_current_cv_text(text).map_err(AppError::from))
            .await?;
        Ok(view)
    }

    pub async fn set_job_description(
        &self,
        user_id: &str,
        text: String,
    ) -> Result<WizardView, AppError> {
        let ((), view) = self
            .with_session(user_id, |s| s.set_job_description(text).map_err(AppError::from))
            .await?;
        Ok(view)
    }

    pub async fn select_saved(
        &self,
        user_id: &str,
        kind: ArtifactKind,
    ) -> Result<WizardView, AppError> {
        let ((), view) = self
            .with_session(user_id, |s| s.select_saved(kind).map_err(AppError::from))
            .await?;
        Ok(view)
    }

    /// Persists the step's current input as the user's default for `kind`.
    pub async fn save_default(
        &self,
        user_id: &str,
        kind: ArtifactKind,
    ) -> Result<WizardView, AppError> {
        let shared = self
            .registry
            .get(user_id)
            .await
            .ok_or_else(|| AppError::Conflict("Open the wizard first.".into()))?;
        let mut session = shared.lock().await;
        session.touch(Utc::now());

        let saved = session.default_to_save(kind).map_err(|e| {
            if let WizardError::Validation(msg) = &e {
                session.record_error(msg.clone());
            }
            AppError::from(e)
        })?;
        self.store.save(user_id, &saved).await?;
        session.saved_stored(saved);
        session.clear_error();
        info!(user_id, slot = kind.slot(), "Default saved");
        Ok(session.view())
    }

    /// Deletes the saved default unconditionally and clears its selection.
    pub async fn remove_default(
        &self,
        user_id: &str,
        kind: ArtifactKind,
    ) -> Result<WizardView, AppError> {
        let shared = self.registry.open(user_id).await;
        let mut session = shared.lock().await;
        session.touch(Utc::now());
        self.store.remove(user_id, kind).await?;
        self.mount_if_due(user_id, &mut session).await;
        session.saved_removed(kind);
        info!(user_id, slot = kind.slot(), "Default removed");
        Ok(session.view())
    }

    /// Step 4 → 5. The session lock is not held during the external call; the call runs
    /// in its own task so the session is settled even if the client goes away.
    pub async fn generate(&self, user_id: &str) -> Result<WizardView, AppError> {
        let (ticket, _) = self
            .with_session(user_id, |s| s.begin_generation().map_err(AppError::from))
            .await?;
        let ticket_id = ticket.id;
        info!(user_id, %ticket_id, "Generating CV");

        let registry = Arc::clone(&self.registry);
        let generator = Arc::clone(&self.generator);
        let owner = user_id.to_string();
        let task = tokio::spawn(async move {
            let outcome = generator.generate(build_parts(&ticket.inputs)).await;
            registry.finish_generation(&owner, ticket.id, outcome).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(user_id, %ticket_id, "Generation task failed: {e}");
                if let Some(shared) = self.registry.get(user_id).await {
                    shared
                        .lock()
                        .await
                        .fail_generation(ticket_id, "Generation failed. Please try again.");
                }
                Err(AppError::Internal(anyhow!("generation task failed: {e}")))
            }
        }
    }

    pub async fn result(&self, user_id: &str) -> Result<GenerationResult, AppError> {
        let shared = self
            .registry
            .get(user_id)
            .await
            .ok_or_else(|| AppError::from(WizardError::NoResult))?;
        let mut session = shared.lock().await;
        session.touch(Utc::now());
        Ok(session.result()?.clone())
    }

    /// Discards sessions nobody has touched for the idle ttl. Returns how many went.
    pub async fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Utc::now()).await
    }

    async fn sweep_idle_at(&self, now: DateTime<Utc>) -> usize {
        let swept = self.registry.sweep_idle(now, self.idle_ttl).await;
        if swept > 0 {
            info!(swept, "Idle wizard sessions discarded");
        }
        swept
    }

    /// Sweeps idle sessions every `every` until the process exits.
    pub async fn run_idle_sweeper(self: Arc<Self>, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            self.sweep_idle().await;
        }
    }
}
