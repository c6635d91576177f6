#[tokio::main]
async fn main() {
    krl_lsp::server::run().await;
}
