//! Questionnaire file uploads: limits, visibility and answer merging.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, post_multipart_auth, put_json_auth, signup, signup_paid, GatedObjectStore, Part,
};
use serde_json::json;
use webdash_db::DocumentStore;

fn png(name: &str, size: usize) -> Part<'_> {
    Part {
        field: "file",
        file_name: name,
        content_type: "image/png",
        bytes: vec![0x89; size],
    }
}

async fn answer_has_logo(app: &common::TestApp, token: &str) {
    let response = put_json_auth(
        app.router(),
        "/api/v1/questionnaire/answers",
        json!({ "answers": { "hasLogo": "yes" } }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn six_megabyte_logo_is_rejected_before_storage() {
    let app = common::build_test_app();
    let (token, user_id) = signup_paid(&app, "big@crumb.test", "launch").await;
    answer_has_logo(&app, &token).await;

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/logoUpload",
        &[png("logo.png", 6 * 1024 * 1024)],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["fields"][0]["field"], "logoUpload");
    assert!(json["message"].as_str().unwrap().contains("5 MB"));

    assert!(!app.upload_dir.path().join(user_id.to_string()).exists());
    let user = app.store.find_user(user_id).await.unwrap().unwrap();
    assert!(user.answers().get("logoUpload").is_none());
}

#[tokio::test]
async fn logo_upload_is_stored_and_merged_into_answers() {
    let app = common::build_test_app();
    let (token, user_id) = signup_paid(&app, "logo@crumb.test", "launch").await;
    answer_has_logo(&app, &token).await;

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/logoUpload",
        &[png("my logo.png", 1024)],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let file = &json["data"]["files"][0];
    assert_eq!(file["name"], "my logo.png");
    assert_eq!(file["mimeType"], "image/png");
    assert_eq!(file["size"], 1024);
    let url = file["url"].as_str().unwrap();
    assert!(url.starts_with(&format!("http://localhost:3000/uploads/{user_id}/logoUpload/")));
    assert!(url.ends_with("-my_logo.png"));

    let user = app.store.find_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.answers()["logoUpload"]["url"], url);
    assert_eq!(user.answers()["hasLogo"], "yes");

    let stored = app.upload_dir.path().join(user_id.to_string()).join("logoUpload");
    assert_eq!(std::fs::read_dir(stored).unwrap().count(), 1);
}

#[tokio::test]
async fn unsupported_type_is_rejected() {
    let app = common::build_test_app();
    let (token, _) = signup_paid(&app, "exe@crumb.test", "launch").await;
    answer_has_logo(&app, &token).await;

    let part = Part {
        field: "file",
        file_name: "setup.exe",
        content_type: "application/x-msdownload",
        bytes: vec![1; 64],
    };
    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/logoUpload",
        &[part],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("unsupported file type"));
}

#[tokio::test]
async fn hidden_unknown_and_non_file_questions_are_refused() {
    let app = common::build_test_app();
    let (token, _) = signup_paid(&app, "gate@crumb.test", "launch").await;

    // logoUpload stays hidden until hasLogo = yes.
    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/logoUpload",
        &[png("logo.png", 10)],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/noSuchQuestion",
        &[png("logo.png", 10)],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/businessName",
        &[png("logo.png", 10)],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gallery_skips_invalid_files_and_appends() {
    let app = common::build_test_app();
    let (token, user_id) = signup_paid(&app, "gallery@crumb.test", "business").await;

    let parts = [
        Part {
            field: "files",
            ..png("one.png", 100)
        },
        Part {
            field: "files",
            file_name: "notes.txt",
            content_type: "text/plain",
            bytes: b"hello".to_vec(),
        },
    ];
    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/photoGallery",
        &parts,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["files"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["skipped"][0]["name"], "notes.txt");

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/photoGallery",
        &[Part {
            field: "files",
            ..png("two.png", 100)
        }],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let user = app.store.find_user(user_id).await.unwrap().unwrap();
    let gallery = user.answers()["photoGallery"].as_array().unwrap();
    let names: Vec<&str> = gallery.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["one.png", "two.png"]);
}

#[tokio::test]
async fn gallery_with_only_invalid_files_fails() {
    let app = common::build_test_app();
    let (token, _) = signup_paid(&app, "allbad@crumb.test", "enterprise").await;

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/photoGallery",
        &[Part {
            field: "files",
            ..png("huge.png", 6 * 1024 * 1024)
        }],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"][0]["field"], "photoGallery");
    assert!(json["message"].as_str().unwrap().contains("5 MB"));
}

#[tokio::test]
async fn cancelling_without_an_active_upload_reports_false() {
    let app = common::build_test_app();
    let (token, _) = signup_paid(&app, "cancel@crumb.test", "launch").await;

    let response = delete_auth(app.router(), "/api/v1/questionnaire/uploads/active", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["cancelled"], false);
}

#[tokio::test]
async fn cancelling_mid_upload_removes_files_already_stored() {
    let objects = Arc::new(GatedObjectStore::default());
    let app = common::build_test_app_with_object_store(objects.clone());
    let (token, user_id) = signup_paid(&app, "midway@crumb.test", "business").await;

    let parts = vec![
        Part {
            field: "files",
            ..png("one.png", 100)
        },
        Part {
            field: "files",
            ..png("two.png", 100)
        },
    ];
    let router = app.router();
    let upload_token = token.clone();
    let upload = tokio::spawn(async move {
        post_multipart_auth(
            router,
            "/api/v1/questionnaire/uploads/photoGallery",
            &parts,
            &upload_token,
        )
        .await
    });

    // The first file is written; cancel before the second one starts.
    objects.entered.notified().await;
    let response = delete_auth(app.router(), "/api/v1/questionnaire/uploads/active", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["cancelled"], true);
    objects.release.notify_one();

    let response = upload.await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["message"]
        .as_str()
        .unwrap()
        .contains("cancelled"));

    let stored = objects.stored.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(*objects.deleted.lock().unwrap(), stored);

    let user = app.store.find_user(user_id).await.unwrap().unwrap();
    assert!(user.answers().get("photoGallery").is_none());
}

#[tokio::test]
async fn uploads_require_a_paid_account() {
    let app = common::build_test_app();
    let (token, _) = signup(app.router(), "free@crumb.test").await;

    let response = post_multipart_auth(
        app.router(),
        "/api/v1/questionnaire/uploads/logoUpload",
        &[png("logo.png", 10)],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
