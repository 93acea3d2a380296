#[tokio::main]
async fn main() {
    deploywatch::app::startup::startup().await;
}
