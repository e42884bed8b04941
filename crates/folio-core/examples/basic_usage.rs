//! Basic usage example - list a GitHub user's projects

use folio_core::{GitHubSettings, ProjectService, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Get username from args or fall back to GITHUB_USERNAME / the default
    let mut settings = GitHubSettings::from_env();
    if let Some(username) = std::env::args().nth(1) {
        settings.username = username;
    }

    println!("Listing projects for {}", settings.username);
    let service = ProjectService::from_settings(settings)?;

    let initial = service.get_initial_projects().await;
    if initial.rate_limited {
        println!("GitHub rate limit reached; results may be incomplete.");
    }

    println!("Pinned ({}):", initial.pinned.len());
    for project in &initial.pinned {
        let summary = project
            .readme_preview
            .as_ref()
            .map(|p| p.summary.as_str())
            .unwrap_or("");
        println!("  - {} ({} stars) {}", project.display_name, project.stars, summary);
    }

    let page = service.get_projects_page(1).await;
    println!(
        "Other projects, page {} of {} ({} total):",
        page.current_page, page.total_pages, page.total_projects
    );
    for project in page.projects {
        println!("  - {}", project.display_name);
    }

    Ok(())
}
