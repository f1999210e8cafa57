//! Workspace summary command — `taskdeck status`.

use anyhow::Result;

use taskdeck::board;
use taskdeck::config::Config;
use taskdeck::ident::ProjectId;
use taskdeck::workspace::Workspace;

pub fn cmd_status(config: Config) -> Result<()> {
    let workspace = Workspace::new(&config.workspace_dir);
    let projects = workspace.read_projects()?;

    if projects.is_empty() {
        println!(
            "No projects in workspace {}",
            config.workspace_dir.display()
        );
        return Ok(());
    }

    let mut boards = Vec::new();
    println!("Projects:");
    for project in projects {
        let board = match ProjectId::parse(&project.id) {
            Ok(id) => Some(workspace.read_board(&id)?),
            Err(_) => None,
        };
        let card = board::project_card(&project, board.as_ref());
        println!(
            "  {:<24} {:<10} {} tasks ({} in progress, {} awaiting review)",
            card.id, card.status, card.task_count, card.in_progress_count, card.review_count
        );
        if let Some(board) = board {
            boards.push((project, board));
        }
    }

    let queue = board::review_queue(&boards);
    println!("\nReview queue: {} task(s)", queue.len());
    for item in queue {
        println!(
            "  [{}] {}: {}",
            item.task.priority.as_deref().unwrap_or("-"),
            item.project_id,
            item.task.title
        );
    }

    Ok(())
}
