//! Filesystem-based repository of site-authored posts

use async_trait::async_trait;
use postfeed_domain::{
    LocalPost, LocalPostsError, LocalPostsRepo, parse_published_at, plain_text_excerpt,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const WORDS_PER_MINUTE: usize = 200;
const EXCERPT_CHARS: usize = 150;

/// Loads `*.html` / `*.md` posts with a `---` frontmatter block
pub struct FsLocalPostsRepo {
    posts_dir: PathBuf,
    default_author: String,
}

impl FsLocalPostsRepo {
    /// Create a repo rooted at an existing directory
    pub fn new(posts_dir: impl AsRef<Path>) -> Result<Self, LocalPostsError> {
        let posts_dir = posts_dir.as_ref().to_path_buf();

        if !posts_dir.is_dir() {
            return Err(LocalPostsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Local posts directory not found: {}", posts_dir.display()),
            )));
        }

        Ok(Self {
            posts_dir,
            default_author: "Site Owner".to_string(),
        })
    }

    /// Author used when a file's frontmatter has none
    pub fn with_default_author(mut self, author: impl Into<String>) -> Self {
        self.default_author = author.into();
        self
    }

    /// Split a file into frontmatter and body
    fn parse_frontmatter(content: &str) -> (Option<Frontmatter>, String) {
        let trimmed = content.trim_start();
        if !trimmed.starts_with("---") {
            return (None, content.to_string());
        }

        let parts: Vec<&str> = trimmed.splitn(3, "---").collect();
        if parts.len() < 3 {
            return (None, content.to_string());
        }

        (
            Some(Self::parse_simple_yaml(parts[1])),
            parts[2].trim().to_string(),
        )
    }

    /// Flat `key: value` lines; inline `[a, b]` lists for tags
    fn parse_simple_yaml(yaml: &str) -> Frontmatter {
        let mut fm = Frontmatter::default();

        for line in yaml.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = unquote(value);
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "id" => fm.id = Some(value.to_string()),
                "title" => fm.title = Some(value.to_string()),
                "date" => fm.date = Some(value.to_string()),
                "author" => fm.author = Some(value.to_string()),
                "excerpt" => fm.excerpt = Some(value.to_string()),
                "category" => fm.category = Some(value.to_string()),
                "read_time" => fm.read_time = Some(value.to_string()),
                "image" => fm.image = Some(value.to_string()),
                "likes" => fm.likes = Some(value.to_string()),
                "comments" => fm.comments = Some(value.to_string()),
                "views" => fm.views = Some(value.to_string()),
                "tags" => {
                    let inner = value
                        .strip_prefix('[')
                        .and_then(|v| v.strip_suffix(']'))
                        .unwrap_or(value);
                    fm.tags = inner
                        .split(',')
                        .map(unquote)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                }
                _ => {}
            }
        }

        fm
    }

    fn build_post(&self, file: &str, fm: Frontmatter, body: String) -> Result<LocalPost, LocalPostsError> {
        let parse_error = |message: String| LocalPostsError::Parse {
            file: file.to_string(),
            message,
        };

        let raw_id = fm.id.ok_or_else(|| parse_error("missing id".to_string()))?;
        let id: u32 = raw_id
            .parse()
            .map_err(|_| parse_error(format!("id must be a non-negative integer, got '{}'", raw_id)))?;

        let raw_date = fm.date.ok_or_else(|| parse_error("missing date".to_string()))?;
        let date = parse_published_at(&raw_date)
            .ok_or_else(|| parse_error(format!("unparseable date '{}'", raw_date)))?;

        let counter = |name: &str, value: Option<String>| -> Result<u64, LocalPostsError> {
            match value {
                Some(v) => v
                    .parse()
                    .map_err(|_| parse_error(format!("{} must be an integer, got '{}'", name, v))),
                None => Ok(0),
            }
        };
        let likes = counter("likes", fm.likes)?;
        let comments = counter("comments", fm.comments)?;
        let views = counter("views", fm.views)?;

        let title = fm
            .title
            .or_else(|| extract_heading(&body))
            .ok_or_else(|| parse_error("missing title".to_string()))?;

        Ok(LocalPost {
            id,
            title,
            excerpt: fm
                .excerpt
                .unwrap_or_else(|| plain_text_excerpt(&body, EXCERPT_CHARS)),
            read_time: fm.read_time.unwrap_or_else(|| estimate_read_time(&body)),
            author: fm.author.unwrap_or_else(|| self.default_author.clone()),
            date,
            tags: fm.tags,
            category: fm.category.unwrap_or_else(|| "General".to_string()),
            likes,
            comments,
            views,
            image: fm.image,
            content: body,
        })
    }
}

#[derive(Default)]
struct Frontmatter {
    id: Option<String>,
    title: Option<String>,
    date: Option<String>,
    author: Option<String>,
    excerpt: Option<String>,
    tags: Vec<String>,
    category: Option<String>,
    read_time: Option<String>,
    likes: Option<String>,
    comments: Option<String>,
    views: Option<String>,
    image: Option<String>,
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'').trim()
}

/// Title from a leading markdown `# ` line
fn extract_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
}

fn estimate_read_time(body: &str) -> String {
    let words = plain_text_excerpt(body, usize::MAX).split_whitespace().count();
    format!("{} min read", words.div_ceil(WORDS_PER_MINUTE).max(1))
}

#[async_trait]
impl LocalPostsRepo for FsLocalPostsRepo {
    async fn load(&self) -> Result<Vec<LocalPost>, LocalPostsError> {
        let mut posts = Vec::new();
        let mut ids_seen: HashMap<u32, String> = HashMap::new();

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.posts_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();

        for path in paths {
            if !path.is_file() {
                continue;
            }

            let extension = path.extension().and_then(|e| e.to_str());
            if !matches!(extension, Some("html") | Some("md")) {
                continue;
            }

            let file = path.display().to_string();
            let content = std::fs::read_to_string(&path)?;
            let (frontmatter, body) = Self::parse_frontmatter(&content);

            let frontmatter = frontmatter.ok_or_else(|| LocalPostsError::Parse {
                file: file.clone(),
                message: "missing frontmatter block".to_string(),
            })?;

            let post = self.build_post(&file, frontmatter, body)?;

            if let Some(existing_file) = ids_seen.get(&post.id) {
                return Err(LocalPostsError::DuplicateId {
                    id: post.id,
                    files: vec![existing_file.clone(), file],
                });
            }
            ids_seen.insert(post.id, file);

            posts.push(post);
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));

        tracing::debug!(dir = %self.posts_dir.display(), count = posts.len(), "Loaded local posts");

        Ok(posts)
    }
}
