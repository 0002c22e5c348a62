//! Static knowledge-base index: categories, their subcategories and the
//! named links under each. Loaded once at startup and never mutated.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read knowledge base {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in knowledge base {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid TOML in knowledge base {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unsupported knowledge base format {0:?} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    pub title: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "subCategories")]
    pub sub_categories: Vec<SubCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl KnowledgeBase {
    /// Loads an index from a `.json` or `.toml` file.
    ///
    /// A JSON file may hold either `{"categories": [...]}` or a bare array of
    /// categories.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let kb = match extension.as_deref() {
            Some("json") => Self::from_json(&raw).map_err(|source| KnowledgeBaseError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Some("toml") => toml::from_str(&raw).map_err(|source| KnowledgeBaseError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            _ => return Err(KnowledgeBaseError::UnsupportedFormat(path.to_path_buf())),
        };

        if kb.categories.is_empty() {
            warn!(path = %path.display(), "Knowledge base has no categories");
        } else {
            info!(
                path = %path.display(),
                categories = kb.categories.len(),
                "Loaded knowledge base"
            );
        }
        Ok(kb)
    }

    fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Wrapped(KnowledgeBase),
            Bare(Vec<Category>),
        }

        Ok(match serde_json::from_str::<Shape>(raw)? {
            Shape::Wrapped(kb) => kb,
            Shape::Bare(categories) => KnowledgeBase { categories },
        })
    }

    /// The index bundled with the binary, used when no file is configured.
    pub fn builtin() -> Self {
        fn links(titles: &[&str]) -> Vec<Link> {
            titles
                .iter()
                .map(|t| Link {
                    title: (*t).to_string(),
                    url: String::new(),
                })
                .collect()
        }

        fn sub(title: &str, titles: &[&str]) -> SubCategory {
            SubCategory {
                title: title.to_string(),
                links: links(titles),
            }
        }

        Self {
            categories: vec![
                Category {
                    title: "Salesforce".to_string(),
                    description: Some("CRM platform administration and development notes.".to_string()),
                    sub_categories: vec![
                        sub("Administration", &["Profiles and Permission Sets", "Flows", "Validation Rules"]),
                        sub("Development", &["Apex Triggers", "Lightning Web Components", "SOQL"]),
                    ],
                },
                Category {
                    title: "Machine Learning".to_string(),
                    description: Some("Model training, evaluation and deployment.".to_string()),
                    sub_categories: vec![
                        sub("Fundamentals", &["Linear Regression", "Gradient Descent", "Bias-Variance Tradeoff"]),
                        sub("Deep Learning", &["Neural Networks", "Transformers"]),
                    ],
                },
                Category {
                    title: "SQL".to_string(),
                    description: Some("Relational querying and database design.".to_string()),
                    sub_categories: vec![
                        sub("Querying", &["Joins", "Window Functions", "Common Table Expressions"]),
                        sub("Design", &["Normalization", "Indexes"]),
                    ],
                },
            ],
        }
    }

    /// Deterministic text rendering of the index, one block per category.
    pub fn summary(&self) -> String {
        let summary = self
            .categories
            .iter()
            .map(|cat| {
                let subs = cat
                    .sub_categories
                    .iter()
                    .map(|sub| {
                        let titles = sub
                            .links
                            .iter()
                            .map(|l| l.title.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("- {}: {}", sub.title, titles)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "### {}\n{}\n{}",
                    cat.title,
                    cat.description.as_deref().unwrap_or(""),
                    subs
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        debug!(len = summary.len(), "Built knowledge summary");
        summary
    }

    pub fn link_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.sub_categories.iter())
            .map(|s| s.links.len())
            .sum()
    }
}
