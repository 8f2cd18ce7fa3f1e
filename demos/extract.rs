//! Example: extract and decrypt cookies from the local browser profile.
//!
//! Usage: cargo run --example extract [domain-filter]
//!
//! Note: cookie databases may be locked by a running browser; the engine
//! reads from private snapshots, so a running browser is fine.

use cookievault::ChromeVault;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let domain_filter = std::env::args().nth(1);

    let vault = match ChromeVault::new() {
        Ok(vault) => vault,
        Err(e) => {
            eprintln!("engine setup failed: {e}");
            std::process::exit(1);
        }
    };

    let stores = vault.list_cookie_stores();
    println!("Found {} cookie store(s)", stores.len());
    for store in &stores {
        println!("  {}", store.display());
    }

    let cookies = vault.read_cookies(domain_filter.as_deref());
    let decrypted = cookies.iter().filter(|c| c.is_decrypted()).count();
    println!("\nExtracted {} cookie(s), {} decrypted", cookies.len(), decrypted);

    for cookie in cookies.iter().take(10) {
        let value = match cookie.value() {
            Some(v) if v.len() > 20 => format!("{}...", &v[..20]),
            Some(v) => v.to_string(),
            None => "(encrypted)".to_string(),
        };
        println!(
            "  {} = {} (domain: {}, secure: {})",
            cookie.name(),
            value,
            cookie.domain(),
            cookie.record().secure
        );
    }
    if cookies.len() > 10 {
        println!("  ... and {} more", cookies.len() - 10);
    }
}
