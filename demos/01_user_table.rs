//! Example 01: User Table
//!
//! This example walks the user management table through a typical session:
//! add a user, search, filter, sort, page, select and bulk delete, then export.
//!
//! Run with: cargo run --example 01_user_table

use dashstore::export::{self, ExportFormat};
use dashstore::models::{User, UserForm, UserStatus};
use dashstore::{FileKv, Filter, FormOutcome, Store, Table};
use eyre::Result;

fn print_page(table: &Table<User, FileKv>) {
    let view = table.view();
    for user in &view.items {
        println!("   #{} {} <{}> {} {}", user.id, user.name, user.email, user.role, user.status);
    }
    println!("   {}", view.summary());
}

fn main() -> Result<()> {
    // Create a temporary directory for this example
    let temp_dir = tempfile::tempdir()?;

    println!("Dashstore User Table Example");
    println!("============================\n");
    println!("Data dir: {}\n", temp_dir.path().display());

    // A fresh store starts from the seed users and writes them out
    let store: Store<User, FileKv> = Store::open(FileKv::open(temp_dir.path())?)?;
    let mut table = Table::new(store);
    println!("1. OPEN - {} seeded users", table.store().len());
    print_page(&table);
    println!();

    // ADD through the form bridge
    println!("2. ADD - Submitting the add form...");
    table.begin_add();
    let form = UserForm {
        name: "Ann Lee".to_string(),
        email: "ann@example.com".to_string(),
        location: "Austin, USA".to_string(),
        ..UserForm::default()
    };
    let id = table.finish(FormOutcome::Submit(form))?;
    println!("   Added user {:?}\n", id);

    // EDIT: prefill, change one field, submit
    println!("3. EDIT - Promoting user 6 to Admin...");
    if let Some(mut form) = table.begin_edit(6) {
        form.role = "Admin".to_string();
        table.finish(FormOutcome::Submit(form))?;
    }
    println!();

    // SEARCH and FILTER
    println!("4. SEARCH - \"john\"");
    table.set_search("john");
    print_page(&table);

    println!("\n5. FILTER - status=Active, search cleared");
    table.set_search("");
    table.set_filter(Filter::only("status", UserStatus::Active.as_str()));
    print_page(&table);

    // SORT: clicking a header twice flips the direction
    println!("\n6. SORT - orders, twice");
    table.sort_by("orders");
    table.sort_by("orders");
    print_page(&table);

    // SELECT the visible page and delete it
    println!("\n7. BULK DELETE - every active user on this page");
    table.toggle_page_selected();
    println!("   Selected: {:?}", table.selection().ids());
    let removed = table.bulk_delete(&|prompt: &str| {
        println!("   {} yes", prompt);
        true
    })?;
    println!("   Removed {}\n", removed);

    // The collection on disk reflects every change
    let reopened: Store<User, FileKv> = Store::open(FileKv::open(temp_dir.path())?)?;
    println!("8. REOPEN - {} users remain on disk", reopened.len());

    // EXPORT
    println!("\n9. EXPORT - {}", export::file_name::<User>(ExportFormat::Csv));
    print!("{}", export::to_csv(reopened.records()));

    println!("\nExample completed successfully!");
    Ok(())
}
