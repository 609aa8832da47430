// ── Command API ──
//
// All console write operations flow through a unified `Command` enum.
// `Console::execute` routes each variant to the document backend,
// uploading media first where a variant carries a file.

use campus_api::backend::CalendarImport;

use crate::model::{NewActivity, NewNotification};

/// All write operations against the console's document services.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Activities ───────────────────────────────────────────────────
    CreateActivity(NewActivity),
    DeleteActivity {
        id: String,
    },
    /// Upload an academic calendar PDF; the backend extracts activities.
    ImportCalendar {
        file_name: String,
        bytes: Vec<u8>,
    },

    // ── Gallery ──────────────────────────────────────────────────────
    /// Host the image on the media service, then register it.
    UploadImage {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
    /// Register an image that is already hosted.
    AddImageUrl {
        name: String,
        url: String,
    },
    DeleteImage {
        id: String,
    },

    // ── Notifications ────────────────────────────────────────────────
    SendNotification(NewNotification),
    DeleteNotification {
        id: String,
    },
}

impl Command {
    /// Short human-readable description for logs and progress output.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateActivity(a) => format!("create activity '{}'", a.name),
            Self::DeleteActivity { id } => format!("delete activity {id}"),
            Self::ImportCalendar { file_name, .. } => format!("import calendar {file_name}"),
            Self::UploadImage { name, .. } | Self::AddImageUrl { name, .. } => {
                format!("add image '{name}'")
            }
            Self::DeleteImage { id } => format!("delete image {id}"),
            Self::SendNotification(n) => format!("notify {}", n.receiver),
            Self::DeleteNotification { id } => format!("delete notification {id}"),
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// A document was created; `id` when the backend reported one.
    Created { id: Option<String> },
    /// Media was hosted and the document created.
    Uploaded { id: Option<String>, url: String },
    CalendarImported(CalendarImport),
}
