//! File-backed document store over the workspace root.
//!
//! The workspace is a plain directory: `state/projects.json` holds the
//! project list, `projects/<id>/board.json` holds one board per project,
//! and `standup-latest.md` holds the latest standup text. Absence of any
//! document is a normal outcome (fresh workspace) and yields an empty
//! default, never an error.
//!
//! Writes go to a sibling `.tmp` file and are renamed into place, so a
//! reader sees either the previous complete document or the new one.
//! There is no locking across writers: two concurrent writes to the same
//! board race and the later rename wins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::errors::StoreError;
use crate::ident::ProjectId;
use crate::models::{Board, Project};

const PROJECTS_FILE: &str = "state/projects.json";
const BOARD_FILE: &str = "board.json";
const STANDUP_FILE: &str = "standup-latest.md";

/// The project list on disk is loosely structured: either a bare array
/// or an object wrapping one under `projects`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectsDoc {
    List(Vec<Project>),
    Wrapped {
        #[serde(default)]
        projects: Vec<Project>,
    },
}

pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn projects_path(&self) -> PathBuf {
        self.root.join(PROJECTS_FILE)
    }

    fn board_path(&self, project: &ProjectId) -> PathBuf {
        self.root.join("projects").join(project.as_str()).join(BOARD_FILE)
    }

    fn standup_path(&self) -> PathBuf {
        self.root.join(STANDUP_FILE)
    }

    /// Read the project list. A missing file is a fresh workspace and
    /// returns an empty list; malformed JSON is a real error.
    pub fn read_projects(&self) -> Result<Vec<Project>, StoreError> {
        let path = self.projects_path();
        let Some(content) = read_if_exists(&path)? else {
            return Ok(Vec::new());
        };
        let doc: ProjectsDoc = serde_json::from_str(&content)
            .map_err(|source| StoreError::Parse { path, source })?;
        Ok(match doc {
            ProjectsDoc::List(projects) => projects,
            ProjectsDoc::Wrapped { projects } => projects,
        })
    }

    /// Read a project's board. A missing file yields an empty board with
    /// the project id filled in.
    pub fn read_board(&self, project: &ProjectId) -> Result<Board, StoreError> {
        let path = self.board_path(project);
        let Some(content) = read_if_exists(&path)? else {
            return Ok(Board {
                project_id: project.to_string(),
                ..Default::default()
            });
        };
        let mut board: Board = serde_json::from_str(&content)
            .map_err(|source| StoreError::Parse { path, source })?;
        if board.project_id.is_empty() {
            board.project_id = project.to_string();
        }
        Ok(board)
    }

    /// Persist a whole board document, stamping `lastUpdated` with the
    /// current time. Returns the document as written.
    ///
    /// The write is atomic (sibling tmp file + rename) so readers never
    /// observe a partial document; a crash mid-write leaves the previous
    /// document intact. Concurrent writers are not serialized: the last
    /// rename wins and the other update is lost.
    pub fn write_board(&self, project: &ProjectId, mut board: Board) -> Result<Board, StoreError> {
        let path = self.board_path(project);
        board.project_id = project.to_string();
        board.last_updated = Some(Utc::now().to_rfc3339());

        let content = serde_json::to_string_pretty(&board).map_err(|source| {
            StoreError::Serialize {
                path: path.clone(),
                source,
            }
        })?;
        atomic_write(&path, &content)?;
        debug!(project = %project, tasks = board.tasks.len(), "board written");
        Ok(board)
    }

    /// Read the latest standup text; missing file → empty string.
    pub fn read_standup(&self) -> Result<String, StoreError> {
        Ok(read_if_exists(&self.standup_path())?.unwrap_or_default())
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `content` to a sibling tmp file, then rename over `path`.
fn atomic_write(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    fs::write(&tmp_path, content).map_err(|source| StoreError::WriteFailed {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| StoreError::RenameFailed {
        path: path.to_path_buf(),
        source,
    })
}
