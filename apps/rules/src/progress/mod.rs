//! Course progress — lesson catalogs and per-enrollment completion tracking.

pub mod catalog;
pub mod tracker;

pub use catalog::{resolve as resolve_catalog, CatalogSource, LessonCatalog};
pub use tracker::{recompute, EnrollmentProgress};
