//! Task management commands for CLI.

use clap::Subcommand;
use geonudge_core::{Config, Priority, Task, TaskDb};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task; the keyword classifier assigns the category
    Create {
        /// Reminder text
        text: String,
        /// Priority: high, medium or low (default: medium)
        #[arg(long)]
        priority: Option<String>,
    },
    /// List tasks
    List {
        /// Only pending tasks, in trigger evaluation order
        #[arg(long)]
        pending: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;

    match action {
        TaskAction::Create { text, priority } => {
            let config = Config::load()?;
            // Unknown priority strings fall back to medium, same as a
            // missing one.
            let priority = priority
                .as_deref()
                .and_then(Priority::parse)
                .unwrap_or_default();
            let category = config.classifier.classify(&text);
            let task = Task::new(
                text,
                category,
                priority,
                config.engine.default_task_cooldown_minutes,
            );
            db.insert_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { pending } => {
            let tasks = if pending {
                db.list_pending()?
            } else {
                db.list_tasks()?
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => {
            let task = db.get_task(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
