use anyhow::Result;
use stitchlog::{commands::Cli, libs::logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    Cli::menu().await
}
