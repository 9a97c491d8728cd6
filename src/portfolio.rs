//! Portfolio dataset and navigation allow-list
//!
//! The dataset is the static JSON the site is built from: projects with their
//! skills, keywords and links, plus grouped skills for the `skills` listing.
//! Routes the terminal may navigate to are computed once from it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level site routes (without the leading slash, `""` is home)
pub const TOP_LEVEL_ROUTES: [&str; 5] = ["", "about", "projects", "blog", "contact"];

/// A single portfolio project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier, also the detail route segment
    pub id: String,
    /// Display name
    pub name: String,
    /// Release date as `YYYY-MM` or `YYYY-MM-DD`; compared lexicographically
    #[serde(default)]
    pub date: String,
    /// One-line summary
    #[serde(default)]
    pub summary: String,
    /// Skills (technologies) used by the project
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free-form keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Live demo link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    /// Source repository link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl Project {
    /// Whether the project carries a non-empty demo link
    pub fn has_demo(&self) -> bool {
        self.demo.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// Detail route for this project
    pub fn route(&self) -> String {
        format!("/projects/{}", self.id)
    }
}

/// Named group of skills for the `skills` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// The full static dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
}

impl Portfolio {
    /// Parse the dataset from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the dataset from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Look up a project by id (case-insensitive)
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
    }

    /// Most recent project by date; ties resolve to the earliest listed
    pub fn most_recent_project(&self) -> Option<&Project> {
        let mut best: Option<&Project> = None;
        for project in &self.projects {
            match best {
                Some(current) if project.date <= current.date => {}
                _ => best = Some(project),
            }
        }
        best
    }

    /// Number of projects using each skill (each project counted once per skill)
    pub fn skill_usage(&self) -> BTreeMap<String, usize> {
        let mut usage = BTreeMap::new();
        for project in &self.projects {
            let unique: BTreeSet<&str> = project
                .skills
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            for skill in unique {
                *usage.entry(skill.to_string()).or_insert(0) += 1;
            }
        }
        usage
    }

    /// Skills sorted by usage (descending), ties by name (ascending)
    pub fn ranked_skills(&self) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self.skill_usage().into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Distinct keywords across all projects, trimmed and lowercased
    pub fn distinct_keywords(&self) -> BTreeSet<String> {
        self.projects
            .iter()
            .flat_map(|p| p.keywords.iter())
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Number of projects with a demo link
    pub fn demo_count(&self) -> usize {
        self.projects.iter().filter(|p| p.has_demo()).count()
    }

    /// Every skill named anywhere in the dataset
    pub fn all_skills(&self) -> BTreeSet<String> {
        let mut skills: BTreeSet<String> = self.skill_usage().into_keys().collect();
        for group in &self.skills {
            skills.extend(
                group
                    .items
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
        }
        skills
    }
}

/// Turn a display name into a route slug
///
/// Lowercases, keeps ASCII alphanumerics, maps `+` to `p` and `#` to `sharp`
/// (so `C++` and `C#` stay distinct), collapses everything else into single
/// dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        match c {
            c if c.is_ascii_alphanumeric() => slug.push(c.to_ascii_lowercase()),
            '+' => slug.push('p'),
            '#' => slug.push_str("sharp"),
            _ => {
                if !slug.ends_with('-') && !slug.is_empty() {
                    slug.push('-');
                }
            }
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Navigation allow-list computed once at mount
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    project_ids: Vec<String>,
    skill_slugs: Vec<String>,
}

impl RouteTable {
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let project_ids = portfolio
            .projects
            .iter()
            .map(|p| p.id.to_lowercase())
            .collect();
        let skill_slugs: BTreeSet<String> = portfolio
            .all_skills()
            .iter()
            .map(|s| slugify(s))
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            project_ids,
            skill_slugs: skill_slugs.into_iter().collect(),
        }
    }

    /// Project ids in dataset order
    pub fn project_ids(&self) -> &[String] {
        &self.project_ids
    }

    /// Skill slugs in sorted order
    pub fn skill_slugs(&self) -> &[String] {
        &self.skill_slugs
    }

    /// Resolve a top-level target only (`about`, `/blog`, `~`, ...)
    pub fn resolve_top_level(&self, target: &str) -> Option<String> {
        let t = target.trim().to_lowercase();
        let t = t.trim_start_matches('/').trim_end_matches('/');
        match t {
            "" | "~" | "home" => Some("/".to_string()),
            other if TOP_LEVEL_ROUTES.contains(&other) => Some(format!("/{other}")),
            _ => None,
        }
    }

    /// Resolve any allow-listed `cd` target to a route
    pub fn resolve(&self, target: &str) -> Option<String> {
        if let Some(route) = self.resolve_top_level(target) {
            return Some(route);
        }
        let t = target.trim().to_lowercase();
        let t = t.trim_start_matches('/').trim_end_matches('/');

        if let Some(id) = t.strip_prefix("projects/") {
            return self.project_route(id);
        }
        if let Some(slug) = t.strip_prefix("skills/") {
            return self.skill_route(slug);
        }
        self.project_route(t).or_else(|| self.skill_route(t))
    }

    fn project_route(&self, id: &str) -> Option<String> {
        self.project_ids
            .iter()
            .find(|p| p.as_str() == id)
            .map(|p| format!("/projects/{p}"))
    }

    fn skill_route(&self, slug: &str) -> Option<String> {
        self.skill_slugs
            .iter()
            .find(|s| s.as_str() == slug)
            .map(|s| format!("/skills/{s}"))
    }

    /// Every allowed route, top-level first
    pub fn all_routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = TOP_LEVEL_ROUTES.iter().map(|r| format!("/{r}")).collect();
        routes.extend(self.project_ids.iter().map(|p| format!("/projects/{p}")));
        routes.extend(self.skill_slugs.iter().map(|s| format!("/skills/{s}")));
        routes
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn project(
        id: &str,
        name: &str,
        date: &str,
        skills: &[&str],
        keywords: &[&str],
        demo: Option<&str>,
    ) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            date: date.to_string(),
            summary: format!("{name} summary"),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            demo: demo.map(str::to_string),
            repo: None,
        }
    }

    /// Three projects; most recent is `weather-app2`, top skill `Rust` (2 uses)
    pub(crate) fn sample_portfolio() -> Portfolio {
        Portfolio {
            projects: vec![
                project(
                    "ray-tracer",
                    "Tiny Ray Tracer",
                    "2023-04",
                    &["Rust", "WebAssembly"],
                    &["graphics", "wasm"],
                    Some("https://example.com/rt"),
                ),
                project(
                    "weather-app2",
                    "Weather Dashboard",
                    "2024-09",
                    &["TypeScript", "React", "Rust"],
                    &["Dashboard", "api", "WASM"],
                    None,
                ),
                project(
                    "blog-engine",
                    "Static Blog Engine",
                    "2022-01",
                    &["Go"],
                    &["markdown", "cli"],
                    Some("https://example.com/blog"),
                ),
            ],
            skills: vec![SkillGroup {
                category: "Languages".to_string(),
                items: vec!["Rust".to_string(), "C++".to_string(), "Go".to_string()],
            }],
        }
    }
}
