use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    crumb::run().await
}
