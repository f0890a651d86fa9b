//! Example 02: Kanban Board
//!
//! Tasks are one flat collection; the board is a view grouping them by
//! column. This example moves a card across the board on a SQLite backend.
//!
//! Run with: cargo run --example 02_kanban_board

use dashstore::models::{Column, Priority, Task, TaskForm};
use dashstore::{FormOutcome, SqliteKv, Store, Table};
use eyre::Result;

fn print_board(table: &Table<Task, SqliteKv>) {
    for column in Column::ALL {
        let cards = table.board_column(column);
        println!("   {} ({})", column.title(), cards.len());
        for task in cards {
            println!("     #{} {} [{}] {}", task.id, task.title, task.priority, task.tags.join(", "));
        }
    }
}

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("board.db");

    println!("Dashstore Kanban Board Example");
    println!("==============================\n");

    let store: Store<Task, SqliteKv> = Store::open(SqliteKv::open(&db_path)?)?;
    let mut table = Table::new(store);

    println!("1. BOARD - seeded tasks");
    print_board(&table);

    println!("\n2. ADD - a new card in To Do");
    table.begin_add();
    let id = table.finish(FormOutcome::Submit(TaskForm {
        title: "Write release notes".to_string(),
        assignee: "Jane Smith".to_string(),
        priority: Priority::Low,
        tags: "Docs, Release,".to_string(),
        ..TaskForm::default()
    }))?;
    println!("   Added task {:?}", id);

    // Drag the card through every column
    if let Some(id) = id {
        for column in [Column::Progress, Column::Review, Column::Done] {
            table.move_task(id, column)?;
            println!("   Moved #{} to {}", id, column.title());
        }
    }

    println!("\n3. BOARD - after the moves");
    print_board(&table);

    // Cancelling an open form leaves the collection alone
    table.begin_edit(1);
    table.finish(FormOutcome::Cancel)?;

    let reopened: Store<Task, SqliteKv> = Store::open(SqliteKv::open(&db_path)?)?;
    println!("\n4. REOPEN - {} tasks persisted", reopened.len());

    println!("\nExample completed successfully!");
    Ok(())
}
