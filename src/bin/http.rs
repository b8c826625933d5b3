#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use tracing_subscriber::EnvFilter;
    use unit_pricing::{TaskCatalog, http_api, load_catalog_from_csv};

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr: SocketAddr = std::env::var("UNIT_PRICING_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let catalog = match std::env::var("UNIT_PRICING_CATALOG_CSV") {
        Ok(path) => load_catalog_from_csv(path)?,
        Err(_) => TaskCatalog::default_library(),
    };

    println!("unit-pricing HTTP API listening on http://{addr}");
    http_api::serve(addr, catalog).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
