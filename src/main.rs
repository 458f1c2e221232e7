use dotenvy::dotenv;
use pledgebook::core::SystemStatistics;
use pledgebook::errors::Result;
use pledgebook::store::Store;
use pledgebook::{config, core};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!(data_dir = %app_config.data_dir.display(), "Loaded application configuration.");

    // 4. Open the record store
    let store = Store::open(&app_config.data_dir)?;

    // 5. Summarize the current state of the collections
    let pledges = store.pledges().load_all()?;
    let projects = store.projects().load_all()?;
    let users = store.users().load_all()?;
    let stats = SystemStatistics::new(&pledges, &projects, &users);

    info!(
        projects = stats.total_projects,
        users = stats.total_users,
        pledges = stats.pledges.total_pledges,
        raised = stats.pledges.total_amount_raised,
        "Store opened."
    );
    info!(
        active = stats.active_projects,
        successful = stats.successful_projects,
        failed = stats.failed_projects,
        project_success_rate = stats.project_success_rate(),
        "Project summary."
    );

    for performance in core::rank_projects(&projects, &pledges) {
        info!(
            project = %performance.project.name,
            funding_percentage = performance.funding_percentage(),
            backers = performance.unique_backers,
            "Project performance."
        );
    }

    Ok(())
}
