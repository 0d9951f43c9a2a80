//! Lesson catalogs — which lesson ids make up 100% of a course.
//!
//! Built-in courses are recognised by keywords in their title. Everything else
//! falls back to the course's explicit lesson outline (`lesson-1 .. lesson-N`).

use std::collections::HashSet;

use serde::Serialize;

/// Ordered, de-duplicated lesson identifiers of one course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LessonCatalog {
    lessons: Vec<String>,
}

impl LessonCatalog {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let lessons = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| seen.insert(id.clone()))
            .collect();
        Self { lessons }
    }

    /// `lesson-1 .. lesson-N` for an explicit outline of `n` lessons.
    pub fn numbered(n: usize) -> Self {
        Self::new((1..=n).map(|i| format!("lesson-{i}")))
    }

    /// `{prefix}-{group}-{item}` for every `(group, items)` pair, in order.
    fn grouped(prefix: &str, groups: &[(u32, u32)]) -> Self {
        Self::new(
            groups
                .iter()
                .flat_map(|&(group, items)| (1..=items).map(move |item| (group, item)))
                .map(|(group, item)| format!("{prefix}-{group}-{item}")),
        )
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn contains(&self, lesson_id: &str) -> bool {
        self.lessons.iter().any(|l| l == lesson_id)
    }

    pub fn lessons(&self) -> &[String] {
        &self.lessons
    }
}

/// Which catalog a course resolved to. Useful in logs and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Outline,
    Cpp,
    CSharp,
    C,
    JavaScript,
    Python,
    HtmlCss,
    NodeJs,
    SpringBoot,
    ReactAdvanced,
    Empty,
}

struct KeywordRule {
    source: CatalogSource,
    matches: fn(&str) -> bool,
    build: fn() -> LessonCatalog,
}

// Evaluated top to bottom against the lowercased title. A matching rule
// replaces the outline catalog and stops the scan, so earlier rows take
// precedence over later ones.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        source: CatalogSource::Cpp,
        matches: |t| t.contains("c++"),
        build: || LessonCatalog::grouped("leccion", &[(1, 3), (2, 3), (3, 3), (4, 3)]),
    },
    KeywordRule {
        source: CatalogSource::CSharp,
        matches: |t| t.contains("c#") || t.contains("csharp"),
        build: || LessonCatalog::grouped("csharp", &EIGHT_PAIRS),
    },
    KeywordRule {
        source: CatalogSource::C,
        matches: |t| t.contains("programación en c"),
        build: || LessonCatalog::grouped("c", &EIGHT_PAIRS),
    },
    KeywordRule {
        source: CatalogSource::JavaScript,
        matches: |t| t.contains("javascript"),
        build: || LessonCatalog::grouped("js", &[(1, 3), (2, 2), (3, 2)]),
    },
    KeywordRule {
        source: CatalogSource::Python,
        matches: |t| t.contains("python"),
        build: || LessonCatalog::grouped("python", &[(1, 3), (2, 2), (3, 1)]),
    },
    KeywordRule {
        source: CatalogSource::HtmlCss,
        matches: |t| t.contains("html") && t.contains("css"),
        build: || LessonCatalog::grouped("htmlcss", &[(1, 2), (2, 2)]),
    },
    KeywordRule {
        source: CatalogSource::NodeJs,
        matches: |t| t.contains("node.js") || t.contains("nodejs") || t.contains("express"),
        build: || LessonCatalog::grouped("nodejs", &[(1, 2), (2, 2), (3, 2)]),
    },
    KeywordRule {
        source: CatalogSource::SpringBoot,
        matches: |t| t.contains("spring boot"),
        build: || LessonCatalog::grouped("springboot", &[(1, 3), (2, 2), (3, 2)]),
    },
    KeywordRule {
        source: CatalogSource::ReactAdvanced,
        matches: |t| t.contains("react avanzado"),
        build: || LessonCatalog::grouped("react", &[(1, 2), (2, 2), (3, 2)]),
    },
];

const EIGHT_PAIRS: [(u32, u32); 8] = [
    (1, 2),
    (2, 2),
    (3, 2),
    (4, 2),
    (5, 2),
    (6, 2),
    (7, 2),
    (8, 2),
];

/// Resolves the catalog for a course from its title and explicit outline.
pub fn resolve(title: &str, outline: &[String]) -> (CatalogSource, LessonCatalog) {
    let title = title.to_lowercase();

    if let Some(rule) = KEYWORD_RULES.iter().find(|rule| (rule.matches)(&title)) {
        return (rule.source, (rule.build)());
    }

    if outline.is_empty() {
        (CatalogSource::Empty, LessonCatalog::default())
    } else {
        (CatalogSource::Outline, LessonCatalog::numbered(outline.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(title: &str) -> Vec<String> {
        resolve(title, &[]).1.lessons().to_vec()
    }

    #[test]
    fn test_cpp_catalog_has_twelve_lessons() {
        let (source, catalog) = resolve("Programación en C++", &[]);
        assert_eq!(source, CatalogSource::Cpp);
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.lessons()[0], "leccion-1-1");
        assert_eq!(catalog.lessons()[11], "leccion-4-3");
    }

    #[test]
    fn test_plain_c_course() {
        let (source, catalog) = resolve("Programación en C desde cero", &[]);
        assert_eq!(source, CatalogSource::C);
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.lessons().last().unwrap(), "c-8-2");
    }

    #[test]
    fn test_csharp_variants() {
        assert_eq!(resolve("Programación en C#", &[]).0, CatalogSource::CSharp);
        assert_eq!(resolve("CSharp para todos", &[]).0, CatalogSource::CSharp);
        assert_eq!(ids("Intro a C#").len(), 16);
        assert_eq!(ids("Intro a C#")[15], "csharp-8-2");
    }

    #[test]
    fn test_javascript_wins_over_python() {
        let (source, catalog) = resolve("Curso de Python y JavaScript", &[]);
        assert_eq!(source, CatalogSource::JavaScript);
        assert_eq!(
            catalog.lessons(),
            ["js-1-1", "js-1-2", "js-1-3", "js-2-1", "js-2-2", "js-3-1", "js-3-2"]
        );
    }

    #[test]
    fn test_python_catalog() {
        assert_eq!(
            ids("Python Básico"),
            ["python-1-1", "python-1-2", "python-1-3", "python-2-1", "python-2-2", "python-3-1"]
        );
    }

    #[test]
    fn test_html_requires_css_too() {
        assert_eq!(resolve("HTML y CSS", &[]).0, CatalogSource::HtmlCss);
        assert_eq!(ids("HTML y CSS").len(), 4);
        assert_eq!(resolve("HTML semántico", &[]).0, CatalogSource::Empty);
    }

    #[test]
    fn test_node_aliases() {
        for title in ["Node.js práctico", "APIs con NodeJS", "Express en producción"] {
            let (source, catalog) = resolve(title, &[]);
            assert_eq!(source, CatalogSource::NodeJs, "{title}");
            assert_eq!(catalog.len(), 6);
        }
    }

    #[test]
    fn test_spring_and_react_catalog_sizes() {
        assert_eq!(ids("Spring Boot Microservicios").len(), 7);
        assert_eq!(ids("React Avanzado").len(), 6);
        assert_eq!(resolve("React básico", &[]).0, CatalogSource::Empty);
    }

    #[test]
    fn test_keyword_overrides_outline() {
        let outline = vec!["Intro".to_string(), "Variables".to_string()];
        let (source, catalog) = resolve("Python para datos", &outline);
        assert_eq!(source, CatalogSource::Python);
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_outline_fallback() {
        let outline: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let (source, catalog) = resolve("Liderazgo de equipos", &outline);
        assert_eq!(source, CatalogSource::Outline);
        assert_eq!(catalog.lessons(), ["lesson-1", "lesson-2", "lesson-3"]);
    }

    #[test]
    fn test_no_rule_and_no_outline_is_empty() {
        let (source, catalog) = resolve("Marketing digital", &[]);
        assert_eq!(source, CatalogSource::Empty);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_deduplicates_ids() {
        let catalog = LessonCatalog::new(["a", "b", "a"]);
        assert_eq!(catalog.lessons(), ["a", "b"]);
        assert!(catalog.contains("b"));
        assert!(!catalog.contains("c"));
    }
}
