mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::unique;

async fn average_cost(app: &common::TestApp, bootcamp_id: &str) -> Result<Option<f64>> {
    let body = app.get_json(&format!("/bootcamps/{}", bootcamp_id), None).await?;
    Ok(body["data"]["averageCost"].as_f64())
}

#[tokio::test]
async fn average_cost_tracks_course_changes() -> Result<()> {
    let Some(app) = common::spawn().await? else { return Ok(()) };
    let owner = app.register("publisher").await?;
    let bootcamp = app.create_bootcamp(&owner.token, &unique("Camp"), "Boston MA").await?;
    let id = bootcamp["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(average_cost(&app, &id).await?, None);

    let first = app.create_course(&owner.token, &id, 9000.0).await?;
    assert_eq!(average_cost(&app, &id).await?, Some(9000.0));

    // (9000 + 12005) / 2 = 10502.5, rounded up to the next ten
    let second = app.create_course(&owner.token, &id, 12005.0).await?;
    assert_eq!(average_cost(&app, &id).await?, Some(10510.0));

    let second_id = second["id"].as_str().unwrap_or_default();
    let res = app
        .client
        .put(app.url(&format!("/courses/{}", second_id)))
        .bearer_auth(&owner.token)
        .json(&json!({ "tuition": 11000 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["tuition"].as_f64(), Some(11000.0));
    assert_eq!(average_cost(&app, &id).await?, Some(10000.0));

    let first_id = first["id"].as_str().unwrap_or_default();
    for course_id in [first_id, second_id] {
        let res = app
            .client
            .delete(app.url(&format!("/courses/{}", course_id)))
            .bearer_auth(&owner.token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert_eq!(average_cost(&app, &id).await?, None);
    Ok(())
}

#[tokio::test]
async fn course_lists_and_population() -> Result<()> {
    let Some(app) = common::spawn().await? else { return Ok(()) };
    let owner = app.register("publisher").await?;
    let name = unique("Camp");
    let bootcamp = app.create_bootcamp(&owner.token, &name, "Boston MA").await?;
    let id = bootcamp["id"].as_str().unwrap_or_default().to_string();
    let course = app.create_course(&owner.token, &id, 5000.0).await?;
    app.create_course(&owner.token, &id, 6000.0).await?;

    // Single course carries a bootcamp summary
    assert_eq!(course["bootcamp"]["id"], id.as_str());
    assert_eq!(course["bootcamp"]["name"], name.as_str());
    assert_eq!(course["minimumSkill"], "beginner");
    assert_eq!(course["user"], owner.id.as_str());

    let body = app.get_json(&format!("/bootcamps/{}/courses", id), None).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 2);
    // Nested lists keep the bare bootcamp id
    assert_eq!(body["data"][0]["bootcamp"], id.as_str());

    let body = app.get_json(&format!("/courses?bootcamp={}&sort=tuition", id), None).await?;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["tuition"].as_f64(), Some(5000.0));
    assert_eq!(body["data"][0]["bootcamp"]["name"], name.as_str());

    // The bootcamp embeds its courses
    let body = app.get_json(&format!("/bootcamps/{}", id), None).await?;
    assert_eq!(body["data"]["courses"].as_array().map(Vec::len), Some(2));

    let res = app
        .client
        .get(app.url("/bootcamps/00000000-0000-4000-8000-000000000000/courses"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn course_ownership_rules() -> Result<()> {
    let Some(app) = common::spawn().await? else { return Ok(()) };
    let owner = app.register("publisher").await?;
    let other = app.register("publisher").await?;
    let user = app.register("user").await?;
    let bootcamp = app.create_bootcamp(&owner.token, &unique("Camp"), "Boston MA").await?;
    let id = bootcamp["id"].as_str().unwrap_or_default().to_string();

    let body = json!({
        "title": "Intruder course",
        "description": "Should not exist",
        "weeks": "4",
        "tuition": 100,
        "minimumSkill": "advanced",
    });

    let res = app
        .client
        .post(app.url(&format!("/bootcamps/{}/courses", id)))
        .bearer_auth(&other.token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json::<Value>().await?["error"],
        format!("User {} is not authorized to add a course to bootcamp {}", other.id, id).as_str()
    );

    let res = app
        .client
        .post(app.url(&format!("/bootcamps/{}/courses", id)))
        .bearer_auth(&user.token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .post(app.url(&format!("/bootcamps/{}/courses", id)))
        .bearer_auth(&owner.token)
        .json(&json!({ "title": "Half a course", "minimumSkill": "expert" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let course = app.create_course(&owner.token, &id, 2500.0).await?;
    let course_id = course["id"].as_str().unwrap_or_default();
    let res = app
        .client
        .delete(app.url(&format!("/courses/{}", course_id)))
        .bearer_auth(&other.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json::<Value>().await?["error"],
        format!("User {} is not authorized to delete course {}", other.id, course_id).as_str()
    );
    Ok(())
}
