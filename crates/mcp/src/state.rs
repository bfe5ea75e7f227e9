//! Open presentations and the "current presentation" pointer.

use ppt_core::{Error, Presentation, Result, TemplateLibrary};
use std::collections::BTreeMap;

use crate::config::Config;

const NO_PRESENTATION: &str = "No presentation is currently loaded or the specified ID is invalid";

/// In-memory presentations keyed by id.
///
/// `current`, when set, always names an entry in `presentations`.
#[derive(Debug, Default)]
pub struct PresentationStore {
    presentations: BTreeMap<String, Presentation>,
    current: Option<String>,
}

impl PresentationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.presentations.len()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// `presentation_{n}` with `n = count + 1`, bumped until unused.
    pub fn next_id(&self) -> String {
        let mut n = self.presentations.len() + 1;
        loop {
            let id = format!("presentation_{n}");
            if !self.presentations.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Store `presentation` under `id` (or a generated id) and make it current.
    ///
    /// An explicit id replaces any presentation already stored under it.
    pub fn insert(&mut self, id: Option<String>, presentation: Presentation) -> String {
        let id = id.filter(|id| !id.is_empty()).unwrap_or_else(|| self.next_id());
        if self.presentations.insert(id.clone(), presentation).is_some() {
            log::debug!("replaced presentation '{id}'");
        }
        self.current = Some(id.clone());
        id
    }

    fn resolve(&self, id: Option<&str>) -> Result<String> {
        id.or(self.current.as_deref())
            .filter(|id| self.presentations.contains_key(*id))
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound(NO_PRESENTATION.to_string()))
    }

    /// The presentation named by `id`, or the current one.
    pub fn get(&self, id: Option<&str>) -> Result<(String, &Presentation)> {
        let id = self.resolve(id)?;
        let pres = self
            .presentations
            .get(&id)
            .ok_or_else(|| Error::NotFound(NO_PRESENTATION.to_string()))?;
        Ok((id, pres))
    }

    pub fn get_mut(&mut self, id: Option<&str>) -> Result<(String, &mut Presentation)> {
        let id = self.resolve(id)?;
        let pres = self
            .presentations
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(NO_PRESENTATION.to_string()))?;
        Ok((id, pres))
    }
}

/// Everything a tool call can read or change.
pub struct ServerState {
    pub store: PresentationStore,
    pub config: Config,
    pub library: TemplateLibrary,
}

impl ServerState {
    pub fn new(config: Config, library: TemplateLibrary) -> Self {
        Self {
            store: PresentationStore::new(),
            config,
            library,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_skip_taken_names() {
        let mut store = PresentationStore::new();
        assert_eq!(store.insert(Some("presentation_2".into()), Presentation::default()), "presentation_2");
        // count is 1, so the first candidate is presentation_2, which is taken
        assert_eq!(store.insert(None, Presentation::default()), "presentation_3");
        assert_eq!(store.insert(None, Presentation::default()), "presentation_4");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_insert_makes_presentation_current() {
        let mut store = PresentationStore::new();
        let first = store.insert(None, Presentation::default());
        let second = store.insert(Some("deck".into()), Presentation::default());
        assert_eq!(first, "presentation_1");
        assert_eq!(store.current_id(), Some(second.as_str()));

        let (id, _) = store.get(None).unwrap();
        assert_eq!(id, "deck");
        let (id, _) = store.get(Some("presentation_1")).unwrap();
        assert_eq!(id, "presentation_1");
    }

    #[test]
    fn test_unknown_or_missing_presentation() {
        let mut store = PresentationStore::new();
        let err = store.get(None).unwrap_err();
        assert_eq!(err.to_string(), NO_PRESENTATION);

        store.insert(None, Presentation::default());
        assert!(store.get_mut(Some("other")).is_err());
        assert!(store.get_mut(None).is_ok());
    }
}
