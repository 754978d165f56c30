/// Job application endpoints over the full router
///
/// The in-memory application store knows jobs 1 and 2.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_apply_records_application_in_review() {
    let ctx = TestContext::new();
    let token = ctx.sign_in("ana@x.com").await;

    let (status, body) = ctx
        .post_authed(
            "/api/jobs/1/apply",
            &token,
            json!({
                "resume_ref": " resumes/ana.pdf ",
                "cover_letter": "Hello",
                "interest_statement": "",
                "availability": ["Weekdays", " ", "Evenings"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["success"], true);

    let application = &body["application"];
    assert_eq!(application["job_id"], 1);
    assert_eq!(application["resume_ref"], "resumes/ana.pdf");
    assert_eq!(application["cover_letter"], "Hello");
    assert!(application["interest_statement"].is_null());
    assert_eq!(application["availability"], json!(["Weekdays", "Evenings"]));
    assert_eq!(application["status"], "In Review");
    assert_eq!(ctx.applications.len().await, 1);
}

#[tokio::test]
async fn test_apply_accepts_resume_path_alias() {
    let ctx = TestContext::new();
    let token = ctx.sign_in("ana@x.com").await;

    let (status, body) = ctx
        .post_authed(
            "/api/jobs/2/apply",
            &token,
            json!({ "resume_path": "uploads/cv.docx" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["application"]["resume_ref"], "uploads/cv.docx");
}

#[tokio::test]
async fn test_apply_requires_token() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post("/api/jobs/1/apply", json!({ "resume_ref": "resumes/ana.pdf" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert!(ctx.applications.is_empty().await);
}

#[tokio::test]
async fn test_apply_to_unknown_job_is_not_found() {
    let ctx = TestContext::new();
    let token = ctx.sign_in("ana@x.com").await;

    let (status, body) = ctx
        .post_authed("/api/jobs/99/apply", &token, json!({ "resume_ref": "r.pdf" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_apply_without_resume_is_validation_error() {
    let ctx = TestContext::new();
    let token = ctx.sign_in("ana@x.com").await;

    let (status, body) = ctx
        .post_authed("/api/jobs/1/apply", &token, json!({ "cover_letter": "Hi" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = ctx
        .post_authed("/api/jobs/1/apply", &token, json!({ "resume_ref": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "resume_ref");
    assert!(ctx.applications.is_empty().await);
}

#[tokio::test]
async fn test_list_shows_only_callers_applications() {
    let ctx = TestContext::new();
    let ana = ctx.sign_in("ana@x.com").await;
    let bob = ctx.sign_in("bob@x.com").await;

    ctx.post_authed("/api/jobs/1/apply", &ana, json!({ "resume_ref": "ana-1.pdf" }))
        .await;
    ctx.post_authed("/api/jobs/2/apply", &ana, json!({ "resume_ref": "ana-2.pdf" }))
        .await;
    ctx.post_authed("/api/jobs/1/apply", &bob, json!({ "resume_ref": "bob-1.pdf" }))
        .await;

    let (status, body) = ctx.get("/api/applications", Some(&ana)).await;
    assert_eq!(status, StatusCode::OK);
    let refs: Vec<&str> = body["applications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["resume_ref"].as_str().unwrap())
        .collect();
    assert_eq!(refs, vec!["ana-2.pdf", "ana-1.pdf"]);

    let (status, _) = ctx.get("/api/applications", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
