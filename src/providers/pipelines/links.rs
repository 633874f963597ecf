use super::projects::DEFAULT_PROJECT;

/// Builds a clickable link to a run in the pipelines web UI.
///
/// # Arguments
///
/// * `ui_base_url` - Platform base URL (e.g., <https://acme.example.com>)
/// * `project` - Project owning the pipeline; empty means the default project
/// * `pipeline_name` - Pipeline the run belongs to
/// * `run_number` - Human-facing run number
/// * `branch` - Branch the run was built from
///
/// # Returns
///
/// URL to the run (e.g., <https://acme.example.com/ui/pipelines/myPipelines/default/build/42?branch=main>)
pub fn run_url(
    ui_base_url: &str,
    project: &str,
    pipeline_name: &str,
    run_number: i64,
    branch: &str,
) -> String {
    let base = ui_base_url.trim_end_matches('/');
    let project = if project.is_empty() {
        DEFAULT_PROJECT
    } else {
        project
    };
    format!(
        "{base}/ui/pipelines/myPipelines/{project}/{pipeline_name}/{run_number}?branch={}",
        encode_branch(branch)
    )
}

fn encode_branch(branch: &str) -> String {
    url::form_urlencoded::byte_serialize(branch.as_bytes()).collect()
}
