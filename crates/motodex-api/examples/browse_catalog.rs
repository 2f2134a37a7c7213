//! Example: browse the motorcycle catalogue
//!
//! This example demonstrates how to:
//! 1. Build a client from environment configuration
//! 2. Log in and keep the session in an in-memory credential store
//! 3. Page through a filtered list of motorcycles
//!
//! ## Prerequisites
//!
//! A running catalogue server. Point the client at it with:
//!
//! ```bash
//! export MOTODEX_API_URL="http://localhost:5000/api"
//! export MOTODEX_EMAIL="rider@example.com"
//! export MOTODEX_PASSWORD="secret"
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo run --example browse_catalog -- Honda Yamaha
//! ```

use std::env;
use std::sync::Arc;

use motodex_api::model::{LoginCredentials, MotorcycleFilters, Pagination};
use motodex_api::{ApiClient, ApiConfig, CredentialStore, MemoryCredentialStore, SessionCredential};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::new(ApiConfig::from_env()?, store.clone())?;
    println!("Motodex catalogue at {}", client.config().base_url);

    if let (Ok(email), Ok(password)) = (env::var("MOTODEX_EMAIL"), env::var("MOTODEX_PASSWORD")) {
        let auth = client
            .auth()
            .login(&LoginCredentials::new(email, password))
            .await?;
        let mut credential = SessionCredential::new(auth.token);
        if let Some(refresh) = auth.refresh_token {
            credential = credential.with_refresh_token(refresh);
        }
        store.store(&credential)?;
        println!("Logged in as {}", auth.user.username);
    }

    let brands: Vec<String> = env::args().skip(1).collect();
    let filters = MotorcycleFilters::new().with_brands(brands);

    let mut pagination = Pagination::first(10);
    loop {
        let page = client
            .motorcycles()
            .list(Some(&filters), Some(pagination))
            .await?;
        println!(
            "\nPage {}/{} ({} motorcycles)",
            page.pagination.current_page, page.pagination.total_pages, page.pagination.total_items
        );
        for bike in &page.items {
            println!("  {}", bike.display_name());
        }
        if !page.pagination.has_next {
            break;
        }
        pagination = pagination.next();
    }

    Ok(())
}
