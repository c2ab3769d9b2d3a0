// src/main.rs
//
// filmlink command line: wires configuration, the SQLite store, the TMDb
// client and the services together, then runs one subcommand.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use filmlink::config::AppConfig;
use filmlink::db::{
    create_connection_pool, get_database_stats, initialize_database, verify_database_integrity,
};
use filmlink::events::{register_review_handlers, EventBus};
use filmlink::integrations::TmdbClient;
use filmlink::repositories::{FilmRepository, SqliteFilmRepository};
use filmlink::services::{
    unlink_film, CurationService, EnrichmentOptions, EnrichmentService, ReportService,
    ResolutionService,
};
use filmlink::{ExternalId, Film, NamedCount};

/// Command-line arguments for filmlink
#[derive(Parser, Debug)]
#[command(name = "filmlink")]
#[command(about = "Link a Letterboxd film log to TMDb and enrich it")]
#[command(version)]
struct Args {
    /// SQLite database file (defaults to the user data directory)
    #[arg(long, global = true, env = "FILMLINK_DATABASE_PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve and enrich every film still missing TMDb data
    Enrich {
        /// Process at most this many films
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show what a title would resolve to, without touching the store
    Resolve {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Bind a stored film to a TMDb id by hand
    Link {
        /// Film id or Letterboxd URI
        #[arg(long)]
        film: String,
        #[arg(long)]
        tmdb: i64,
    },
    /// Remove a film's TMDb binding and enrichment
    Unlink {
        /// Film id or Letterboxd URI
        #[arg(long)]
        film: String,
    },
    /// Create a film straight from a TMDb id
    Add {
        #[arg(long)]
        tmdb: i64,
    },
    /// List films still awaiting enrichment
    Pending {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print store statistics and film reports
    Stats {
        /// How many directors and actors to list (defaults to TOP_N_ACTORS)
        #[arg(short, long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if args.database.is_some() {
        config.database_path = args.database.clone();
    }

    // 1. INFRASTRUCTURE
    let pool = Arc::new(
        create_connection_pool(config.database_path.as_deref())
            .context("Failed to open database")?,
    );
    {
        let conn = pool.get().context("Failed to get database connection")?;
        initialize_database(&conn).context("Failed to initialize schema")?;
        verify_database_integrity(&conn).context("Database failed its integrity check")?;
    }

    let event_bus = Arc::new(EventBus::new());
    register_review_handlers(&event_bus);

    // 2. REPOSITORIES
    let film_repo: Arc<dyn FilmRepository> = Arc::new(SqliteFilmRepository::new(pool.clone()));

    // 3. SERVICES
    // The TMDb client is built only by commands that call the catalog, so
    // local commands run without an API key.
    let options = EnrichmentOptions::from_config(&config);
    let catalog = || -> Result<Arc<TmdbClient>> {
        Ok(Arc::new(
            TmdbClient::new(&config.tmdb).context("Failed to build TMDb client")?,
        ))
    };
    let resolver = |tmdb: Arc<TmdbClient>| {
        Arc::new(ResolutionService::new(
            tmdb,
            film_repo.clone(),
            event_bus.clone(),
            config.matching.clone(),
        ))
    };

    match args.command {
        Command::Enrich { limit } => {
            let tmdb = catalog()?;
            let enricher = EnrichmentService::new(
                resolver(tmdb.clone()),
                tmdb,
                film_repo.clone(),
                event_bus.clone(),
                options,
            );
            let summary = enricher.enrich_pending(limit).await?;

            println!("Processed:      {}", summary.total);
            println!("Updated:        {}", summary.updated);
            println!("Deleted:        {}", summary.deleted);
            println!("Kept unmatched: {}", summary.kept_unmatched);
            println!("Collisions:     {}", summary.collisions);
            println!("Failed:         {}", summary.failed);

            for report in &summary.collision_reports {
                println!(
                    "  collision: {} -> TMDb {} already bound to {}",
                    report.film, report.external_id, report.conflicting
                );
            }
            for (film, reason) in &summary.failures {
                println!("  failed: {}: {}", film, reason);
            }
        }
        Command::Resolve { title, year } => {
            match resolver(catalog()?).find_candidate(&title, year).await? {
                Some((selected, pass)) => {
                    println!(
                        "TMDb {} '{}' ({}) via {} search",
                        selected.external_id(),
                        selected.candidate.title.as_deref().unwrap_or("?"),
                        selected.candidate.release_date.as_deref().unwrap_or("no date"),
                        pass
                    );
                    println!(
                        "  {} year, similarity {:.3}, popularity {:.1}",
                        selected.year_category,
                        selected.similarity,
                        selected.popularity()
                    );
                    if let Some(holder) = film_repo.find_by_tmdb_id(selected.external_id())? {
                        println!("  already bound to {}", holder.film_ref());
                    }
                }
                None => println!("No match for '{}'", title),
            }
        }
        Command::Link { film, tmdb: tmdb_id } => {
            let target = find_film(film_repo.as_ref(), &film)?;
            let curation =
                CurationService::new(catalog()?, film_repo.clone(), event_bus.clone(), options);
            let linked = curation.link(target.id, ExternalId(tmdb_id)).await?;
            println!("Linked {} to TMDb {}", linked.film_ref(), tmdb_id);
        }
        Command::Unlink { film } => {
            let target = find_film(film_repo.as_ref(), &film)?;
            let previous = unlink_film(film_repo.as_ref(), &event_bus, target.id)?;
            println!("Unlinked {}", previous.film_ref());
        }
        Command::Add { tmdb: tmdb_id } => {
            let curation =
                CurationService::new(catalog()?, film_repo.clone(), event_bus.clone(), options);
            let added = curation.add(ExternalId(tmdb_id)).await?;
            println!("Added {} ({})", added.film_ref(), added.id);
        }
        Command::Pending { limit } => {
            let films = film_repo.list_pending(limit)?;
            for f in &films {
                println!(
                    "{}  {} ({})  {}",
                    f.id,
                    f.title,
                    f.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
                    f.tmdb_id
                        .map(|t| format!("TMDb {}", t))
                        .unwrap_or_else(|| "unbound".into())
                );
            }
            println!("{} film(s) pending", films.len());
        }
        Command::Stats { top } => {
            let conn = pool.get().context("Failed to get database connection")?;
            let stats = get_database_stats(&conn)?;
            println!("Films:   {}", stats.film_count);
            println!("Bound:   {}", stats.bound_count);
            println!("Pending: {}", stats.pending_count);
            println!("Size:    {} bytes", stats.size_bytes);

            let top_n = top.unwrap_or(config.matching.top_actor_count);
            let report = ReportService::new(film_repo.clone()).film_report(top_n)?;
            println!("Hours:   {:.1}", report.total_hours());

            println!("\nBy release year:");
            for entry in &report.by_year {
                println!("  {}  {}", entry.year, entry.count);
            }
            print_counts("By genre:", &report.by_genre);
            print_counts("Top directors:", &report.top_directors);
            print_counts("Top actors:", &report.top_actors);
        }
    }

    Ok(())
}

fn print_counts(heading: &str, counts: &[NamedCount]) {
    println!("\n{}", heading);
    for entry in counts {
        println!("  {:>4}  {}", entry.count, entry.name);
    }
}

/// Look a film up by id, falling back to its Letterboxd URI
fn find_film(repo: &dyn FilmRepository, key: &str) -> Result<Film> {
    let found = match Uuid::parse_str(key) {
        Ok(id) => repo.get_by_id(id)?,
        Err(_) => repo.get_by_uri(key)?,
    };

    match found {
        Some(film) => Ok(film),
        None => bail!("No film matches '{}'", key),
    }
}
