use log::debug;

use crate::error::Result;

use super::api::PipelinesApi;

/// Project name used by sources that don't belong to a named project.
pub const DEFAULT_PROJECT: &str = "default";

/// Name of the project that owns the pipeline source `source_id`.
pub async fn project_name_for_source<A: PipelinesApi>(api: &A, source_id: i64) -> Result<String> {
    let source = api.get_pipeline_source(source_id).await?;
    if source.in_default_project() {
        return Ok(DEFAULT_PROJECT.to_string());
    }

    let project_id = source.project_id.unwrap_or_default();
    let project = api.get_project(project_id).await?;
    debug!(
        "Pipeline source {} belongs to project '{}' ({})",
        source_id, project.name, project.id
    );
    Ok(project.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;
    use crate::providers::pipelines::fake::FakePipelines;

    #[tokio::test]
    async fn test_source_without_project_uses_default() {
        let api = FakePipelines::new();

        let name = project_name_for_source(&api, 3).await.unwrap();

        assert_eq!(name, "default");
        assert_eq!(api.count("get_project:"), 0);
    }

    #[tokio::test]
    async fn test_source_in_named_project() {
        let api = FakePipelines::new().with_project(12, "payments");

        let name = project_name_for_source(&api, 3).await.unwrap();

        assert_eq!(name, "payments");
        assert_eq!(api.calls(), vec!["get_pipeline_source:3", "get_project:12"]);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_returned() {
        let api = FakePipelines::new().failing_on("get_pipeline_source");

        let err = project_name_for_source(&api, 3).await.unwrap_err();

        assert!(matches!(err, PipeError::ApiError { status: 503, .. }));
    }
}
