//! Subcommand handlers.

use anyhow::{Result, bail};
use chrono::Local;
use motodex_api::model::{LoginCredentials, Motorcycle, Pagination, Review};
use motodex_core::Store;
use tracing::warn;

use crate::cli::{Command, FavoritesAction};

pub async fn run(store: &mut Store, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => login(store, email, password).await,
        Command::Logout => {
            store.logout().await?;
            println!("Signed out");
            Ok(())
        }
        Command::List {
            filters,
            page,
            limit,
        } => {
            store.catalog.set_filters(filters.into_filters());
            let pagination = Pagination::new(page, limit)?;
            let client = store.client().clone();
            store.catalog.fetch(&client, Some(pagination), false).await?;

            let info = store.catalog.pagination();
            print_motorcycles(store.catalog.motorcycles());
            println!(
                "Page {} of {} ({} total)",
                info.current_page, info.total_pages, info.total_items
            );
            Ok(())
        }
        Command::Show { id } => {
            let motorcycle = store.motorcycle(&id).await?;
            println!("{}", describe_motorcycle(motorcycle));
            for feature in &motorcycle.features {
                println!("  - {feature}");
            }
            Ok(())
        }
        Command::Search { query, filters } => search(store, &query, filters).await,
        Command::History { clear } => {
            if clear {
                store.search.clear();
                store.search.persist().await?;
                println!("Search history cleared");
                return Ok(());
            }
            for entry in store.search.history() {
                let at = entry.timestamp.with_timezone(&Local);
                println!(
                    "{}  {:<30} {:>4} results",
                    at.format("%Y-%m-%d %H:%M"),
                    entry.query,
                    entry.result_count
                );
            }
            Ok(())
        }
        Command::Favorites { action } => favorites(store, action).await,
        Command::Reviews { id, page, limit } => {
            let client = store.client().clone();
            let reviews = store.reviews.fetch(&client, &id, page, limit).await?;
            for review in reviews {
                println!("{}", describe_review(review));
            }
            let stats = store.reviews.stats();
            println!(
                "{} of {} reviews, average {:.1}",
                store.reviews.reviews().len(),
                store.reviews.total(),
                stats.average
            );
            Ok(())
        }
        Command::Stats => {
            let stats = store.stats().await?;
            println!("Motorcycles: {}", stats.total_motorcycles);
            println!("Brands:      {}", stats.total_brands);
            println!("Categories:  {}", stats.total_categories);
            println!("Users:       {}", stats.total_users);
            println!("Reviews:     {}", stats.total_reviews);
            Ok(())
        }
    }
}

async fn login(store: &mut Store, email: String, password: String) -> Result<()> {
    let client = store.client().clone();
    let credentials = LoginCredentials::new(email, password);
    match store.session.login(&client, &credentials).await {
        Ok(user) => {
            println!("Signed in as {}", user.username);
            Ok(())
        }
        Err(e) => bail!(e.display_message("Login failed")),
    }
}

async fn search(
    store: &mut Store,
    query: &str,
    filters: crate::cli::FilterArgs,
) -> Result<()> {
    let filters = filters.into_filters();
    store.catalog.set_filters(filters.clone());
    let client = store.client().clone();
    store.catalog.search(&client, query).await?;

    let found = store.catalog.pagination().total_items;
    store.search.record(query, filters, found);
    if let Err(e) = store.search.persist().await {
        warn!("Failed to save search history: {e}");
    }

    print_motorcycles(store.catalog.motorcycles());
    println!("{found} results");
    Ok(())
}

async fn favorites(store: &mut Store, action: FavoritesAction) -> Result<()> {
    if !store.session.is_authenticated() {
        bail!("Sign in first with `motodex login`");
    }

    let client = store.client().clone();
    match action {
        FavoritesAction::List => {
            store.favorites.fetch(&client, true).await?;
            for favorite in store.favorites.items() {
                let name = favorite
                    .motorcycle
                    .as_ref()
                    .map_or_else(|| favorite.motorcycle_id.clone(), Motorcycle::display_name);
                match &favorite.notes {
                    Some(notes) => println!("{name}  ({notes})"),
                    None => println!("{name}"),
                }
            }
        }
        FavoritesAction::Add { id, notes } => {
            store.add_favorite(&id, notes.as_deref()).await?;
            println!("Saved {id}");
        }
        FavoritesAction::Remove { id } => {
            store.remove_favorite(&id).await?;
            println!("Removed {id}");
        }
    }
    Ok(())
}

fn print_motorcycles(motorcycles: &[Motorcycle]) {
    for motorcycle in motorcycles {
        println!("{}", describe_motorcycle(motorcycle));
    }
}

fn describe_motorcycle(motorcycle: &Motorcycle) -> String {
    let mut line = format!("[{}] {}", motorcycle.id, motorcycle.display_name());
    if let Some(msrp) = motorcycle.price.as_ref().and_then(|p| p.msrp) {
        let currency = motorcycle
            .price
            .as_ref()
            .map_or("", |p| p.currency.as_str());
        line.push_str(&format!(" - {msrp:.0} {currency}"));
    }
    if let Some(rating) = &motorcycle.rating {
        line.push_str(&format!(" - {:.1}/5 ({} reviews)", rating.overall, rating.reviews));
    }
    line
}

fn describe_review(review: &Review) -> String {
    let author = if review.user.username.is_empty() {
        "anonymous"
    } else {
        review.user.username.as_str()
    };
    format!(
        "{:.1}/5 {} by {} ({} found helpful)\n  {}",
        review.rating.overall, review.title, author, review.helpful.count, review.content
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use motodex_api::model::{Price, Rating};

    use super::*;

    fn motorcycle() -> Motorcycle {
        let mut motorcycle: Motorcycle = serde_json::from_str(
            r#"{"_id": "m1", "brand": "Triumph", "model": "Street Triple", "year": 2023, "category": "naked"}"#,
        )
        .unwrap();
        motorcycle.price = Some(Price {
            msrp: Some(11_295.0),
            currency: "USD".to_string(),
        });
        motorcycle.rating = Some(Rating {
            overall: 4.62,
            reviews: 13,
        });
        motorcycle
    }

    #[test]
    fn test_describe_motorcycle() {
        assert_eq!(
            describe_motorcycle(&motorcycle()),
            "[m1] Triumph Street Triple 2023 - 11295 USD - 4.6/5 (13 reviews)"
        );
    }

    #[test]
    fn test_describe_without_price() {
        let mut motorcycle = motorcycle();
        motorcycle.price = None;
        motorcycle.rating = None;
        assert_eq!(
            describe_motorcycle(&motorcycle),
            "[m1] Triumph Street Triple 2023"
        );
    }
}
