#[tokio::main]
async fn main() {
    org_dashboard::run().await;
}
