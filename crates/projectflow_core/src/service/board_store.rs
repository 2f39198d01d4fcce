//! Board store: the single owner of board state.
//!
//! # Responsibility
//! - Interpret user intents (create/delete/select/move) as board mutations.
//! - Derive progress and column aggregates for rendering callers.
//! - Persist a full snapshot after every mutation.
//!
//! # Invariants
//! - Mutations run on a copy of the board; the copy replaces the live board
//!   only after `save_board` succeeds, so memory and storage never diverge.
//! - The active reference is `None` or names an existing project.
//! - Selection is in-memory only and never persisted.

use crate::model::board::{
    Board, BoardValidationError, ColumnCounts, Project, ProjectId, Task, TaskId, TaskStatus,
};
use crate::model::ids::{IdGenerator, UuidIdGenerator};
use crate::repo::board_repo::{BoardRepository, RepoError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ID_ATTEMPTS: usize = 16;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from board store operations.
#[derive(Debug)]
pub enum StoreError {
    /// A required field was blank.
    Validation(BoardValidationError),
    /// Referenced project does not exist.
    ProjectNotFound(ProjectId),
    /// The id generator kept returning ids already in use.
    IdExhausted { attempts: usize },
    /// Snapshot persistence failed; in-memory state is unchanged.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::IdExhausted { attempts } => {
                write!(f, "no unused id after {attempts} attempts")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ProjectNotFound(_) | Self::IdExhausted { .. } => None,
        }
    }
}

impl From<BoardValidationError> for StoreError {
    fn from(value: BoardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Read model for one project header: name, task total, progress, counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOverview {
    pub id: ProjectId,
    pub name: String,
    pub total_tasks: usize,
    /// Percentage of `done` tasks, 0..=100.
    pub progress: u8,
    pub counts: ColumnCounts,
}

impl ProjectOverview {
    fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            total_tasks: project.tasks.len(),
            progress: project.progress(),
            counts: project.column_counts(),
        }
    }
}

/// Owner of the live board, its selection, and its persistence.
pub struct BoardStore<R: BoardRepository> {
    repo: R,
    ids: Box<dyn IdGenerator>,
    board: Board,
    active: Option<ProjectId>,
}

impl<R: BoardRepository> BoardStore<R> {
    /// Loads the persisted board and activates its first project.
    ///
    /// Corrupt or invalid snapshots are logged and replaced by an empty
    /// board. Storage transport errors are returned.
    pub fn open(repo: R) -> StoreResult<Self> {
        Self::open_with_ids(repo, Box::new(UuidIdGenerator))
    }

    /// Same as [`BoardStore::open`] with a caller-supplied id generator.
    pub fn open_with_ids(repo: R, ids: Box<dyn IdGenerator>) -> StoreResult<Self> {
        let board = match repo.load_board() {
            Ok(Some(board)) => board,
            Ok(None) => Board::default(),
            Err(RepoError::InvalidData(message)) => {
                warn!(
                    "event=board_load module=store status=recovered reason=invalid_snapshot detail={message}"
                );
                Board::default()
            }
            Err(err) => {
                error!("event=board_load module=store status=error error={err}");
                return Err(err.into());
            }
        };

        let active = board.first_project_id().cloned();
        info!(
            "event=board_load module=store status=ok projects={} active={}",
            board.projects.len(),
            active.as_deref().unwrap_or("none")
        );

        Ok(Self {
            repo,
            ids,
            board,
            active,
        })
    }

    /// Current board snapshot in display order.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn projects(&self) -> &[Project] {
        &self.board.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.board.project(project_id)
    }

    pub fn active_project_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active
            .as_deref()
            .and_then(|project_id| self.board.project(project_id))
    }

    /// Gives back the repository, e.g. to reopen the board in tests.
    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Creates a project, persists it, and makes it active.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `name` is blank; nothing changes.
    /// - `StoreError::Repo` when persisting fails; nothing changes.
    pub fn create_project(&mut self, name: &str) -> StoreResult<ProjectId> {
        // Validate before drawing an id from the generator.
        let mut project = Project::new(String::new(), name)?;
        let project_id = self.fresh_id(|board, id| board.contains_project(id))?;
        project.id = project_id.clone();

        let mut next = self.board.clone();
        next.push_project(project);
        self.commit("project_create", next)?;

        self.active = Some(project_id.clone());
        info!("event=project_create module=store status=ok project_id={project_id}");
        Ok(project_id)
    }

    /// Deletes the active project together with all of its tasks.
    ///
    /// Only the active project can be deleted; any other id is a no-op and
    /// returns `Ok(false)`. Afterwards the first remaining project becomes
    /// active, or the selection is cleared. Confirmation is the caller's job.
    pub fn delete_project(&mut self, project_id: &str) -> StoreResult<bool> {
        if self.active.as_deref() != Some(project_id) {
            debug!("event=project_delete module=store status=noop reason=not_active project_id={project_id}");
            return Ok(false);
        }

        let mut next = self.board.clone();
        let Some(removed) = next.remove_project(project_id) else {
            debug!("event=project_delete module=store status=noop reason=not_found project_id={project_id}");
            return Ok(false);
        };
        self.commit("project_delete", next)?;

        self.active = self.board.first_project_id().cloned();
        info!(
            "event=project_delete module=store status=ok project_id={project_id} tasks_removed={} active={}",
            removed.tasks.len(),
            self.active.as_deref().unwrap_or("none")
        );
        Ok(true)
    }

    /// Makes an existing project active. Unknown ids leave the selection
    /// untouched and return `false`.
    pub fn select_project(&mut self, project_id: &str) -> bool {
        if !self.board.contains_project(project_id) {
            debug!("event=project_select module=store status=noop project_id={project_id}");
            return false;
        }
        self.active = Some(project_id.to_string());
        debug!("event=project_select module=store status=ok project_id={project_id}");
        true
    }

    /// Appends a `todo` task to a project and persists it.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `title` is blank.
    /// - `StoreError::ProjectNotFound` when `project_id` does not resolve.
    /// - `StoreError::Repo` when persisting fails.
    pub fn create_task(
        &mut self,
        project_id: &str,
        title: &str,
        desc: Option<&str>,
    ) -> StoreResult<TaskId> {
        // A blank title is a validation failure even for an unknown project.
        let mut task = Task::new(String::new(), title, desc)?;
        let Some(project) = self.board.project(project_id) else {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        };

        let taken: Vec<TaskId> = project.tasks.iter().map(|other| other.id.clone()).collect();
        let task_id = self.fresh_id(|_, id| taken.iter().any(|existing| existing == id))?;
        task.id = task_id.clone();

        let mut next = self.board.clone();
        if let Some(project) = next.project_mut(project_id) {
            project.push_task(task);
        }
        self.commit("task_create", next)?;

        info!("event=task_create module=store status=ok project_id={project_id} task_id={task_id}");
        Ok(task_id)
    }

    /// Removes one task. Unknown project or task ids return `Ok(false)`.
    pub fn delete_task(&mut self, project_id: &str, task_id: &str) -> StoreResult<bool> {
        let mut next = self.board.clone();
        let removed = next
            .project_mut(project_id)
            .and_then(|project| project.remove_task(task_id));
        if removed.is_none() {
            debug!("event=task_delete module=store status=noop project_id={project_id} task_id={task_id}");
            return Ok(false);
        }
        self.commit("task_delete", next)?;

        info!("event=task_delete module=store status=ok project_id={project_id} task_id={task_id}");
        Ok(true)
    }

    /// Moves a task to `status`, at `index` within that column.
    ///
    /// `index` is clamped to the column length. Unknown ids return
    /// `Ok(false)`. Only status and position change.
    pub fn move_task(
        &mut self,
        project_id: &str,
        task_id: &str,
        status: TaskStatus,
        index: usize,
    ) -> StoreResult<bool> {
        let mut next = self.board.clone();
        let moved = next
            .project_mut(project_id)
            .is_some_and(|project| project.move_task(task_id, status, index));
        if !moved {
            debug!("event=task_move module=store status=noop project_id={project_id} task_id={task_id}");
            return Ok(false);
        }
        self.commit("task_move", next)?;

        info!(
            "event=task_move module=store status=ok project_id={project_id} task_id={task_id} to={status} index={index}"
        );
        Ok(true)
    }

    /// Percentage of `done` tasks in a project, rounded half-up.
    pub fn compute_progress(&self, project_id: &str) -> StoreResult<u8> {
        Ok(self.require_project(project_id)?.progress())
    }

    /// Task count per status column.
    pub fn compute_column_counts(&self, project_id: &str) -> StoreResult<ColumnCounts> {
        Ok(self.require_project(project_id)?.column_counts())
    }

    /// Tasks of one column in display order.
    pub fn column(&self, project_id: &str, status: TaskStatus) -> StoreResult<Vec<&Task>> {
        Ok(self.require_project(project_id)?.column(status).collect())
    }

    /// Header data for one project.
    pub fn overview(&self, project_id: &str) -> StoreResult<ProjectOverview> {
        self.require_project(project_id)
            .map(ProjectOverview::from_project)
    }

    fn require_project(&self, project_id: &str) -> StoreResult<&Project> {
        self.board
            .project(project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))
    }

    fn fresh_id(&mut self, is_taken: impl Fn(&Board, &str) -> bool) -> StoreResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !candidate.is_empty() && !is_taken(&self.board, &candidate) {
                return Ok(candidate);
            }
        }
        Err(StoreError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn commit(&mut self, event: &'static str, next: Board) -> StoreResult<()> {
        if let Err(err) = self.repo.save_board(&next) {
            error!("event={event} module=store status=error error_code=persist_failed error={err}");
            return Err(err.into());
        }
        self.board = next;
        Ok(())
    }
}
