//! Kick off AI site generation for a freshly submitted questionnaire.
//!
//! Runs detached from the request. Failures are logged and leave the user
//! record untouched; agency staff can still fill in the site links by hand.

use tokio::task::JoinHandle;
use webdash_core::site_generation::build_brief;
use webdash_db::models::user::{UpdateProject, User};
use webdash_services::site_builder::SiteRequest;

use crate::state::AppState;

pub fn spawn(state: AppState, user: User) -> JoinHandle<()> {
    tokio::spawn(async move { run(state, user).await })
}

pub async fn run(state: AppState, user: User) {
    let answers = user.answers();
    let request = SiteRequest {
        business_name: answers
            .get("businessName")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(user.name.as_str())
            .to_string(),
        email: user.email.clone(),
        brief: build_brief(answers),
    };

    tracing::info!(user_id = %user.id, "Site generation started");
    let site = match state.site_builder.generate(&request).await {
        Ok(site) => site,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Site generation failed");
            return;
        }
    };
    tracing::info!(user_id = %user.id, site_id = %site.site_id, "Site generation accepted");

    if site.website_url.is_none() && site.editor_url.is_none() {
        return;
    }
    let update = UpdateProject {
        website_url: site.website_url,
        editor_url: site.editor_url,
        ..Default::default()
    };
    if let Err(e) = state.store.update_project(user.id, update).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to store generated site links");
    }
}
