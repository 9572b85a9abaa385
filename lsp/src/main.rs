#[tokio::main]
async fn main() {
    if let Err(e) = lunar_lsp::server::run().await {
        eprintln!("lunar-lsp error: {e:#}");
        std::process::exit(2);
    }
}
