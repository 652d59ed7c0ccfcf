//! Health check endpoint tests.

use trade_tests::create_test_context;

#[tokio::test]
async fn test_health_check() {
    let ctx = create_test_context().await;

    let health = ctx.client.health_check().await.expect("Health check failed");

    assert_eq!(health.status, "healthy");
    assert_eq!(health.message, "Transaction Management API is running");
    assert!(!health.timestamp.is_empty());
}
