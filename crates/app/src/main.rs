use std::path::PathBuf;

use anyhow::Context as _;
use nextread_application::Session;
use nextread_catalog::Catalog;
use nextread_core::Settings;
use nextread_ui::Ui;

const DEFAULT_CATALOG: &str = "data/books.csv";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let path = catalog_path();
    let mut settings = Settings::default();
    if std::env::args().any(|arg| arg == "--shuffle") {
        settings.shuffle_on_load = true;
    }
    settings.normalize();

    let catalog = Catalog::load(&path, &settings)
        .with_context(|| format!("load catalog from {}", path.display()))?;

    let session = Session::new(settings);
    let session = Ui::new(&catalog, session).run()?;

    if !session.bookmarks.is_empty() {
        println!("Bookmarked this session:");
        for record in session.bookmarked_records(&catalog) {
            println!("  {} — {}", record.title, record.authors);
        }
    }

    Ok(())
}

fn catalog_path() -> PathBuf {
    std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG))
}
