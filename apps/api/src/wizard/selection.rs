//! "Use saved" versus freshly staged input for the template and current-CV steps.

use serde::Serialize;

use crate::models::{CurrentCvPayload, TemplatePayload};

/// What the step view needs to know about a payload without exposing its content.
pub trait PayloadSummary {
    fn display_name(&self) -> Option<&str>;
    fn is_binary(&self) -> bool;
    fn has_content(&self) -> bool;
}

impl PayloadSummary for TemplatePayload {
    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_binary(&self) -> bool {
        TemplatePayload::is_binary(self)
    }

    fn has_content(&self) -> bool {
        self.is_well_formed()
    }
}

impl PayloadSummary for CurrentCvPayload {
    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_binary(&self) -> bool {
        self.binary_data.is_some()
    }

    fn has_content(&self) -> bool {
        CurrentCvPayload::has_content(self)
    }
}

/// Saved default and staged input for one step. Using the saved default and editing the
/// staged input are mutually exclusive: staging always deselects the saved default.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSelection<T> {
    saved: Option<T>,
    use_saved: bool,
    staged: Option<T>,
}

impl<T> Default for DefaultSelection<T> {
    fn default() -> Self {
        Self {
            saved: None,
            use_saved: false,
            staged: None,
        }
    }
}

impl<T: Clone + PartialEq + PayloadSummary> DefaultSelection<T> {
    /// State on entering the step. The saved default is preselected when one exists,
    /// unless an already-committed payload differs from it, in which case that payload
    /// stays staged.
    pub fn mount(saved: Option<T>, committed: Option<&T>) -> Self {
        let use_saved = match (&saved, committed) {
            (Some(saved), Some(committed)) => saved == committed,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let staged = if use_saved { None } else { committed.cloned() };
        Self {
            saved,
            use_saved,
            staged,
        }
    }

    pub fn stage(&mut self, payload: T) {
        self.staged = Some(payload);
        self.use_saved = false;
    }

    /// Drops the staged input, e.g. after a rejected upload.
    pub fn discard_staged(&mut self) {
        self.staged = None;
        self.use_saved = false;
    }

    /// Returns false when there is nothing saved to select.
    pub fn select_saved(&mut self) -> bool {
        if self.saved.is_none() {
            return false;
        }
        self.use_saved = true;
        true
    }

    pub fn saved_stored(&mut self, payload: T) {
        self.saved = Some(payload);
    }

    pub fn saved_removed(&mut self) {
        self.saved = None;
        self.use_saved = false;
    }

    /// The payload the step would commit.
    pub fn resolve(&self) -> Option<&T> {
        if self.use_saved {
            self.saved.as_ref()
        } else {
            self.staged.as_ref()
        }
    }

    pub fn uses_saved(&self) -> bool {
        self.use_saved
    }

    pub fn view(&self) -> SelectionView {
        SelectionView {
            has_saved: self.saved.is_some(),
            saved_name: self
                .saved
                .as_ref()
                .and_then(|p| p.display_name())
                .map(str::to_string),
            use_saved: self.use_saved,
            staged_name: self
                .staged
                .as_ref()
                .and_then(|p| p.display_name())
                .map(str::to_string),
            staged_mode: self
                .staged
                .as_ref()
                .map(|p| if p.is_binary() { "binary" } else { "text" }),
            ready: self.resolve().is_some_and(|p| p.has_content()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub has_saved: bool,
    pub saved_name: Option<String>,
    pub use_saved: bool,
    pub staged_name: Option<String>,
    pub staged_mode: Option<&'static str>,
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str) -> TemplatePayload {
        TemplatePayload::text("<html></html>".into(), "text/html", Some(name.into()))
    }

    #[test]
    fn test_mount_preselects_saved() {
        let selection = DefaultSelection::mount(Some(template("saved.html")), None);
        assert!(selection.uses_saved());
        assert_eq!(selection.resolve(), Some(&template("saved.html")));
        assert!(selection.view().ready);
    }

    #[test]
    fn test_mount_without_saved_selects_nothing() {
        let selection = DefaultSelection::<TemplatePayload>::mount(None, None);
        assert!(!selection.uses_saved());
        assert!(selection.resolve().is_none());
        assert!(!selection.view().ready);
    }

    #[test]
    fn test_mount_keeps_committed_upload_staged() {
        let committed = template("mine.html");
        let selection = DefaultSelection::mount(Some(template("saved.html")), Some(&committed));
        assert!(!selection.uses_saved());
        assert_eq!(selection.resolve(), Some(&committed));
    }

    #[test]
    fn test_staging_deselects_saved() {
        let mut selection = DefaultSelection::mount(Some(template("saved.html")), None);
        selection.stage(template("new.html"));
        assert!(!selection.uses_saved());
        assert_eq!(selection.view().staged_name.as_deref(), Some("new.html"));
        assert_eq!(selection.resolve(), Some(&template("new.html")));

        assert!(selection.select_saved());
        assert_eq!(selection.resolve(), Some(&template("saved.html")));
    }

    #[test]
    fn test_removing_saved_clears_selection() {
        let mut selection = DefaultSelection::mount(Some(template("saved.html")), None);
        selection.saved_removed();
        assert!(!selection.view().has_saved);
        assert!(!selection.uses_saved());
        assert!(selection.resolve().is_none());
        assert!(!selection.select_saved());
    }

    #[test]
    fn test_discard_staged() {
        let mut selection = DefaultSelection::default();
        selection.stage(CurrentCvPayload::pdf("JVBERi0=".into(), Some("cv.pdf".into())));
        assert_eq!(selection.view().staged_mode, Some("binary"));
        selection.discard_staged();
        assert!(selection.resolve().is_none());
    }
}
