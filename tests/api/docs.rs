use crate::utils::spawn_app;
use reqwest::StatusCode;

#[tokio::test]
async fn openapi_json_describes_the_contact_endpoint() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client()
        .get(format!("{}/docs/openapi.json", app.address()))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("/api/contact"));
}

#[tokio::test]
async fn openapi_is_served_as_yaml_when_asked_for() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client()
        .get(format!("{}/docs/openapi", app.address()))
        .header("Accept", "application/yaml")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/yaml"
    );
}
