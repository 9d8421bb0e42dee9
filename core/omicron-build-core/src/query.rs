//! Stage filters for scan results.

use anyhow::Result;

use crate::stage::ShaderStage;

#[derive(Debug, Clone, Default)]
pub struct StageFilter {
    stages: Vec<ShaderStage>,
    unmarked_only: bool,
}

impl StageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(mut self, stages: Vec<ShaderStage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn require_unmarked(mut self, yes: bool) -> Self {
        self.unmarked_only = yes;
        self
    }

    /// Check whether a classification result passes the filter.
    pub fn matches(&self, stage: Option<ShaderStage>) -> bool {
        if self.unmarked_only {
            return stage.is_none();
        }

        if self.stages.is_empty() {
            return true;
        }

        stage.is_some_and(|s| self.stages.contains(&s))
    }
}

/// Parse comma-delimited stage tags (e.g. `vert,frag`), rejecting unknown tags.
pub fn parse_stage_list(input: &str) -> Result<Vec<ShaderStage>> {
    let mut stages: Vec<ShaderStage> = input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect::<Result<_>>()?;

    stages.sort_unstable();
    stages.dedup();
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = StageFilter::new();
        assert!(filter.matches(Some(ShaderStage::Compute)));
        assert!(filter.matches(None));
    }

    #[test]
    fn stage_filter_rejects_unmarked_and_other_stages() {
        let filter = StageFilter::new().with_stages(vec![ShaderStage::Vertex]);
        assert!(filter.matches(Some(ShaderStage::Vertex)));
        assert!(!filter.matches(Some(ShaderStage::Fragment)));
        assert!(!filter.matches(None));
    }

    #[test]
    fn unmarked_filter_only_keeps_none() {
        let filter = StageFilter::new().require_unmarked(true);
        assert!(filter.matches(None));
        assert!(!filter.matches(Some(ShaderStage::Vertex)));
    }

    #[test]
    fn parses_and_dedups_stage_lists() {
        let stages = parse_stage_list("vert, frag,vert,").expect("parse");
        assert_eq!(stages, vec![ShaderStage::Fragment, ShaderStage::Vertex]);
        assert!(parse_stage_list("vert,geom").is_err());
    }
}
