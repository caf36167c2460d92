use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use biblio::catalog::GoogleBooksClient;
use biblio::core::config;
use biblio::core::controller::{SearchController, SearchPhase, SearchSnapshot, SHORT_QUERY_MAX};
use biblio::core::format;
use biblio::core::intent::Category;

#[derive(Parser)]
#[command(name = "biblio", about = "Book catalog search")]
struct Args {
    /// Free-text search query
    query: Option<String>,

    /// Browse one of the fixed subject categories
    #[arg(short, long, value_enum, conflicts_with = "query")]
    category: Option<Category>,

    /// Show the trending feed (default when nothing else is given)
    #[arg(long, conflicts_with_all = ["query", "category"])]
    trending: bool,

    /// Fetch a single volume by its catalog id
    #[arg(long, conflicts_with_all = ["query", "category", "trending"])]
    id: Option<String>,

    /// Books per request
    #[arg(short, long)]
    limit: Option<u32>,

    /// Catalog base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to biblio.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("biblio.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("warning: {e}");
        Default::default()
    });
    let resolved = config::resolve(&file_config, args.base_url.as_deref(), args.limit);
    log::info!("Biblio starting up against {}", resolved.base_url);

    let catalog = Arc::new(GoogleBooksClient::with_limit(
        Some(resolved.base_url.clone()),
        resolved.result_limit,
    ));
    let controller = SearchController::with_debounce(
        catalog,
        Duration::from_millis(resolved.debounce_ms),
    );

    if let Some(id) = &args.id {
        match controller.get_by_id(id).await {
            Ok(book) => {
                print_detail(&book);
                return Ok(());
            }
            Err(message) => {
                eprintln!("{message}");
                std::process::exit(1);
            }
        }
    }

    let mut rx = controller.subscribe();
    match (&args.query, args.category) {
        (Some(query), _) => {
            let trimmed = query.trim();
            if !trimmed.is_empty() && trimmed.chars().count() <= SHORT_QUERY_MAX {
                eprintln!("Query too short (minimum {} characters)", SHORT_QUERY_MAX + 1);
                std::process::exit(2);
            }
            controller.submit_free_text(query);
        }
        (None, Some(category)) => controller.select_category(category),
        (None, None) => controller.load_trending(),
    }

    // One-shot run: wait for the first terminal phase and render it.
    loop {
        if rx.changed().await.is_err() {
            break;
        }
        let snapshot = rx.borrow().clone();
        match snapshot.phase {
            SearchPhase::Ready => {
                print_results(&snapshot);
                break;
            }
            SearchPhase::Errored(message) => {
                eprintln!("{message}");
                std::process::exit(1);
            }
            _ => {}
        }
    }
    Ok(())
}

fn print_results(snapshot: &SearchSnapshot) {
    if snapshot.books.is_empty() {
        println!("No books found");
        return;
    }
    if let Some(category) = snapshot.category {
        println!("{}: {} of {} results", category.label(), snapshot.books.len(), snapshot.total_count);
    } else {
        println!("{} of {} results", snapshot.books.len(), snapshot.total_count);
    }
    for book in &snapshot.books {
        println!(
            "  {:<14} {} ({}, {})",
            book.id,
            book.title,
            format::format_authors(&book.authors),
            format::format_date(book.published_date.as_deref()),
        );
    }
}

fn print_detail(book: &biblio::core::book::Book) {
    println!("{}", book.title);
    println!("by {}", format::format_authors(&book.authors));
    println!("Published: {}", format::format_date(book.published_date.as_deref()));
    if let Some(publisher) = &book.publisher {
        println!("Publisher: {publisher}");
    }
    println!("Rating: {} ({} ratings)", format::format_rating(book.average_rating), book.ratings_count.unwrap_or(0));
    println!("Length: {}", format::format_page_count(book.page_count));
    println!("ISBN: {}", format::format_isbn(book.isbn.as_deref()));
    if let Some(categories) = &book.categories {
        println!("Categories: {}", categories.join(", "));
    }
    if let Some(description) = &book.description {
        println!();
        println!("{}", format::truncate(description, 400));
    }
}
