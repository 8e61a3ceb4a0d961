//! Previous/next step resolution from ordinal order.

use crate::error::FunnelError;

use super::StepRegistry;

/// Resolves neighbouring steps. Purely a function of ordinal order; the
/// validation outcome of a step never affects where the funnel goes next.
#[derive(Debug, Clone, Copy)]
pub struct Sequencer<'a> {
    registry: &'a StepRegistry,
}

impl<'a> Sequencer<'a> {
    pub fn new(registry: &'a StepRegistry) -> Self {
        Self { registry }
    }

    /// Slug of the step after `slug`, or `None` at the terminal step.
    pub fn next(&self, slug: &str) -> Result<Option<&'a str>, FunnelError> {
        let position = self.position(slug)?;
        Ok(self.registry.at(position + 1).map(|s| s.slug.as_str()))
    }

    /// Slug of the step before `slug`, or `None` at the initial step.
    pub fn previous(&self, slug: &str) -> Result<Option<&'a str>, FunnelError> {
        let position = self.position(slug)?;
        Ok(position
            .checked_sub(1)
            .and_then(|p| self.registry.at(p))
            .map(|s| s.slug.as_str()))
    }

    fn position(&self, slug: &str) -> Result<usize, FunnelError> {
        self.registry
            .position(slug)
            .ok_or_else(|| FunnelError::NotFound {
                slug: slug.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_all_steps() {
        let registry = StepRegistry::builtin();
        let seq = Sequencer::new(&registry);

        let mut current = registry.first().slug.as_str();
        let mut visited = vec![current];
        while let Some(next) = seq.next(current).unwrap() {
            visited.push(next);
            current = next;
        }
        assert_eq!(
            visited,
            ["personal_information", "birthdate", "picture", "address"]
        );
    }

    #[test]
    fn terminal_and_initial_steps_have_no_neighbour() {
        let registry = StepRegistry::builtin();
        let seq = Sequencer::new(&registry);
        assert_eq!(seq.next(&registry.last().slug).unwrap(), None);
        assert_eq!(seq.previous(&registry.first().slug).unwrap(), None);
    }

    #[test]
    fn next_of_previous_is_identity_for_inner_steps() {
        let registry = StepRegistry::builtin();
        let seq = Sequencer::new(&registry);
        let steps = registry.ordered();
        for step in &steps[1..steps.len() - 1] {
            let prev = seq.previous(&step.slug).unwrap().unwrap();
            assert_eq!(seq.next(prev).unwrap(), Some(step.slug.as_str()));
            let next = seq.next(&step.slug).unwrap().unwrap();
            assert_eq!(seq.previous(next).unwrap(), Some(step.slug.as_str()));
        }
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let registry = StepRegistry::builtin();
        let seq = Sequencer::new(&registry);
        assert!(matches!(seq.next("nope"), Err(FunnelError::NotFound { .. })));
        assert!(matches!(seq.previous("nope"), Err(FunnelError::NotFound { .. })));
    }
}
