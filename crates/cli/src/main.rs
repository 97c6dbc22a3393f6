#[tokio::main]
async fn main() -> anyhow::Result<()> {
    locview_cli::run().await
}
