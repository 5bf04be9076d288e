#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quill_server::run().await
}
