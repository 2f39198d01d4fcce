//! Board domain model.
//!
//! # Responsibility
//! - Define the project/task records persisted as the board snapshot.
//! - Provide pure state transitions and derived aggregates.
//!
//! # Invariants
//! - Project ids are unique within the board; task ids are unique within
//!   their project.
//! - Names and titles are trimmed and never empty.
//! - Order inside `Project::tasks` is display order for every status column.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque project identifier.
pub type ProjectId = String;

/// Opaque task identifier, unique inside one project.
pub type TaskId = String;

/// Status column a task currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started yet. Every new task starts here.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished. The only status counted by progress.
    Done,
}

impl TaskStatus {
    /// Columns in board display order.
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
    ];

    /// Stable wire name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" | "in_progress" | "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!(
                "unknown task status `{other}`; expected todo|inprogress|done"
            )),
        }
    }
}

/// Validation failures for board records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    /// Project name is blank after trim.
    EmptyProjectName,
    /// Task title is blank after trim.
    EmptyTaskTitle,
    /// Two projects share one id.
    DuplicateProjectId(ProjectId),
    /// Two tasks inside one project share one id.
    DuplicateTaskId {
        project_id: ProjectId,
        task_id: TaskId,
    },
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProjectName => write!(f, "project name must not be blank"),
            Self::EmptyTaskTitle => write!(f, "task title must not be blank"),
            Self::DuplicateProjectId(id) => write!(f, "duplicate project id: {id}"),
            Self::DuplicateTaskId {
                project_id,
                task_id,
            } => write!(f, "duplicate task id {task_id} in project {project_id}"),
        }
    }
}

impl Error for BoardValidationError {}

/// Unit of work inside one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Absent when the user left the description blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub status: TaskStatus,
}

impl Task {
    /// Creates a `todo` task with trimmed title and description.
    ///
    /// A blank description is stored as `None`.
    pub fn new(
        id: impl Into<TaskId>,
        title: &str,
        desc: Option<&str>,
    ) -> Result<Self, BoardValidationError> {
        let title = normalize_required(title).ok_or(BoardValidationError::EmptyTaskTitle)?;
        Ok(Self {
            id: id.into(),
            title,
            desc: desc.and_then(normalize_required),
            status: TaskStatus::Todo,
        })
    }
}

/// Per-status task counters for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnCounts {
    pub todo: usize,
    pub inprogress: usize,
    pub done: usize,
}

impl ColumnCounts {
    /// Returns the counter for one status column.
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.inprogress,
            TaskStatus::Done => self.done,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.inprogress + self.done
    }
}

/// Named container of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    /// Creates an empty project with a trimmed name.
    pub fn new(id: impl Into<ProjectId>, name: &str) -> Result<Self, BoardValidationError> {
        let name = normalize_required(name).ok_or(BoardValidationError::EmptyProjectName)?;
        Ok(Self {
            id: id.into(),
            name,
            tasks: Vec::new(),
        })
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Appends a task; it lands last in its status column.
    pub fn push_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Removes one task by id, returning it when present.
    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id == task_id)?;
        Some(self.tasks.remove(position))
    }

    /// Moves a task into `status` at `index` within that column.
    ///
    /// `index` is clamped to the column length. Tasks of other statuses keep
    /// their relative order. Returns `false` when the task does not exist.
    pub fn move_task(&mut self, task_id: &str, status: TaskStatus, index: usize) -> bool {
        let Some(from) = self.tasks.iter().position(|task| task.id == task_id) else {
            return false;
        };

        let mut task = self.tasks.remove(from);
        task.status = status;

        let column_slots: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, other)| other.status == status)
            .map(|(position, _)| position)
            .collect();

        let insert_at = match column_slots.get(index) {
            Some(&slot) => slot,
            // Past the end (or empty column): after the last column member,
            // or back where it was when the column is empty.
            None => column_slots.last().map_or(from, |&last| last + 1),
        };
        self.tasks.insert(insert_at, task);
        true
    }

    /// Tasks of one status in display order.
    pub fn column(&self, status: TaskStatus) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |task| task.status == status)
    }

    pub fn column_counts(&self) -> ColumnCounts {
        let mut counts = ColumnCounts::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.inprogress += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Percentage of `done` tasks, rounded half-up. Zero for an empty project.
    ///
    /// `inprogress` tasks carry no partial weight.
    pub fn progress(&self) -> u8 {
        let total = self.tasks.len();
        if total == 0 {
            return 0;
        }
        let done = self.column_counts().done;
        // round(100 * done / total) == floor((200 * done + total) / (2 * total))
        let percent = (200 * done + total) / (2 * total);
        u8::try_from(percent).unwrap_or(100)
    }
}

/// Ordered sequence of projects; serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pub projects: Vec<Project>,
}

impl Board {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects
            .iter_mut()
            .find(|project| project.id == project_id)
    }

    pub fn contains_project(&self, project_id: &str) -> bool {
        self.project(project_id).is_some()
    }

    /// First project in board order, used as the default selection.
    pub fn first_project_id(&self) -> Option<&ProjectId> {
        self.projects.first().map(|project| &project.id)
    }

    pub fn push_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    /// Removes a project and, with it, all of its tasks.
    pub fn remove_project(&mut self, project_id: &str) -> Option<Project> {
        let position = self
            .projects
            .iter()
            .position(|project| project.id == project_id)?;
        Some(self.projects.remove(position))
    }

    /// Checks the record invariants of a whole board.
    ///
    /// Used on read paths so loaded snapshots cannot bypass the rules that
    /// constructors enforce.
    pub fn validate(&self) -> Result<(), BoardValidationError> {
        let mut project_ids = HashSet::new();
        for project in &self.projects {
            if project.name.trim().is_empty() {
                return Err(BoardValidationError::EmptyProjectName);
            }
            if !project_ids.insert(project.id.as_str()) {
                return Err(BoardValidationError::DuplicateProjectId(project.id.clone()));
            }

            let mut task_ids = HashSet::new();
            for task in &project.tasks {
                if task.title.trim().is_empty() {
                    return Err(BoardValidationError::EmptyTaskTitle);
                }
                if !task_ids.insert(task.id.as_str()) {
                    return Err(BoardValidationError::DuplicateTaskId {
                        project_id: project.id.clone(),
                        task_id: task.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn normalize_required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
