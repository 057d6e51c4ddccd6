mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::unique;

#[tokio::test]
async fn users_group_is_admin_only() -> Result<()> {
    let Some(app) = common::spawn().await? else { return Ok(()) };
    let publisher = app.register("publisher").await?;

    let res = app.client.get(app.url("/users")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.client.get(app.url("/users")).bearer_auth(&publisher.token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json::<Value>().await?["error"],
        "User role publisher is not authorized to access this route"
    );
    Ok(())
}

#[tokio::test]
async fn admin_manages_users() -> Result<()> {
    let Some(app) = common::spawn().await? else { return Ok(()) };
    let admin = app.admin().await?;
    let email = format!("{}@example.com", unique("managed").replace(' ', "-"));

    // Admins may create other admins
    let res = app
        .client
        .post(app.url("/users"))
        .bearer_auth(&admin.token)
        .json(&json!({ "name": "Managed", "email": email, "password": "123456", "role": "admin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?["data"].clone();
    assert_eq!(created["role"], "admin");
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let body = app.get_json(&format!("/users?email={}", email), Some(&admin.token)).await?;
    assert_eq!(body["count"], 1);
    assert!(body["data"][0].get("password").is_none());
    assert!(body["data"][0].get("passwordHash").is_none());

    let res = app
        .client
        .put(app.url(&format!("/users/{}", id)))
        .bearer_auth(&admin.token)
        .json(&json!({ "role": "publisher", "name": "Demoted" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["role"], "publisher");
    assert_eq!(body["data"]["name"], "Demoted");

    let body = app.get_json(&format!("/users/{}", id), Some(&admin.token)).await?;
    assert_eq!(body["data"]["email"], email.as_str());

    let res = app
        .client
        .delete(app.url(&format!("/users/{}", id)))
        .bearer_auth(&admin.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .client
        .get(app.url(&format!("/users/{}", id)))
        .bearer_auth(&admin.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleted_user_token_stops_working() -> Result<()> {
    let Some(app) = common::spawn().await? else { return Ok(()) };
    let admin = app.admin().await?;
    let user = app.register("user").await?;

    let res = app
        .client
        .delete(app.url(&format!("/users/{}", user.id)))
        .bearer_auth(&admin.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.client.get(app.url("/auth/me")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
