#![forbid(unsafe_code)]

//! Read-only registry of every tour the application ships.
//!
//! # Invariants
//!
//! 1. Tour ids are unique.
//! 2. Step ids are unique within a tour.
//! 3. Every tour has at least one step.
//! 4. The default tour, when set, names a registered tour.
//!
//! Violations are reported at construction time as [`CatalogError`]; once a
//! `Catalog` exists, lookups cannot fail in any way other than a miss.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::tour::TourConfig;

/// Errors raised while building a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// JSON could not be parsed.
    Parse(serde_json::Error),
    /// Two tours share an id.
    DuplicateTour(String),
    /// Two steps in one tour share an id.
    DuplicateStep { tour: String, step: String },
    /// A tour has no steps.
    EmptyTour(String),
    /// The default tour id is not registered.
    UnknownDefault(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "invalid catalog JSON: {e}"),
            CatalogError::DuplicateTour(id) => write!(f, "duplicate tour id: {id}"),
            CatalogError::DuplicateStep { tour, step } => {
                write!(f, "duplicate step id {step} in tour {tour}")
            }
            CatalogError::EmptyTour(id) => write!(f, "tour {id} has no steps"),
            CatalogError::UnknownDefault(id) => write!(f, "default tour {id} is not registered"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    default_tour: Option<String>,
    tours: Vec<TourConfig>,
}

/// Static list of tours plus lookup by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tours: Vec<Arc<TourConfig>>,
    default_tour: Option<String>,
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(tours: Vec<TourConfig>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for tour in &tours {
            if !seen.insert(tour.id.as_str()) {
                return Err(CatalogError::DuplicateTour(tour.id.clone()));
            }
            if tour.steps.is_empty() {
                return Err(CatalogError::EmptyTour(tour.id.clone()));
            }
            let mut steps = HashSet::new();
            for step in &tour.steps {
                if !steps.insert(step.id.as_str()) {
                    return Err(CatalogError::DuplicateStep {
                        tour: tour.id.clone(),
                        step: step.id.clone(),
                    });
                }
            }
        }
        Ok(Self {
            tours: tours.into_iter().map(Arc::new).collect(),
            default_tour: None,
        })
    }

    /// Designate the tour offered automatically on first mount.
    pub fn with_default(mut self, id: impl Into<String>) -> Result<Self, CatalogError> {
        let id = id.into();
        if self.get(&id).is_none() {
            return Err(CatalogError::UnknownDefault(id));
        }
        self.default_tour = Some(id);
        Ok(self)
    }

    /// Parse a catalog from JSON.
    ///
    /// ```json
    /// { "default_tour": "welcome", "tours": [ { "id": "welcome", ... } ] }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let catalog = Self::new(file.tours)?;
        let catalog = match file.default_tour {
            Some(id) => catalog.with_default(id)?,
            None => catalog,
        };
        tracing::debug!(
            tours = catalog.len(),
            default = ?catalog.default_tour,
            "loaded tour catalog"
        );
        Ok(catalog)
    }

    /// Look up a tour by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<TourConfig>> {
        self.tours.iter().find(|tour| tour.id == id)
    }

    /// The tour offered automatically on first mount, if any.
    #[must_use]
    pub fn default_tour(&self) -> Option<&Arc<TourConfig>> {
        self.default_tour.as_deref().and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TourConfig>> {
        self.tours.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tour::{Placement, TourStep};

    fn tour(id: &str, steps: &[&str]) -> TourConfig {
        steps.iter().fold(TourConfig::new(id, id), |tour, step| {
            tour.step(TourStep::new(*step, "#x", "t", "c"))
        })
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::new(vec![tour("a", &["1"]), tour("b", &["1", "2"])]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("b").map(|t| t.step_count()), Some(2));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn rejects_duplicate_tours() {
        let err = Catalog::new(vec![tour("a", &["1"]), tour("a", &["2"])]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTour(id) if id == "a"));
    }

    #[test]
    fn rejects_duplicate_steps() {
        let err = Catalog::new(vec![tour("a", &["1", "1"])]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateStep { .. }));
    }

    #[test]
    fn rejects_empty_tours() {
        let err = Catalog::new(vec![TourConfig::new("a", "A")]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyTour(_)));
    }

    #[test]
    fn default_must_exist() {
        let catalog = Catalog::new(vec![tour("a", &["1"])]).unwrap();
        assert!(matches!(
            catalog.clone().with_default("zzz"),
            Err(CatalogError::UnknownDefault(_))
        ));
        let catalog = catalog.with_default("a").unwrap();
        assert_eq!(catalog.default_tour().map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn from_json_round() {
        let json = r##"{
            "default_tour": "welcome",
            "tours": [{
                "id": "welcome",
                "name": "Welcome",
                "auto_start": true,
                "steps": [
                    {"id": "hello", "title": "Hi", "content": "...", "target": "body", "placement": "center"},
                    {"id": "nav", "title": "Nav", "content": "...", "target": "#nav", "page": "instancias"}
                ]
            }]
        }"##;
        let catalog = Catalog::from_json(json).expect("valid catalog");
        let welcome = catalog.default_tour().expect("default tour");
        assert!(welcome.auto_start);
        assert!(welcome.persistent);
        assert_eq!(welcome.steps[0].placement, Placement::Center);
        assert_eq!(welcome.steps[1].page.as_deref(), Some("instancias"));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.to_string().starts_with("invalid catalog JSON"));
    }
}
