//! Read-only document index keyed by agreement group

use std::collections::HashMap;

use crate::models::agreement::Agreement;

/// Documents of one batch grouped by `agreement_group`.
///
/// Built once and shared by reference; consumers never mutate it.
/// Documents with a blank group are not indexed, since they cannot be
/// associated with anything.
#[derive(Debug, Default)]
pub struct AgreementIndex<'a> {
    by_group: HashMap<&'a str, Vec<&'a Agreement>>,
}

impl<'a> AgreementIndex<'a> {
    pub fn build(documents: &'a [Agreement]) -> Self {
        let mut by_group: HashMap<&'a str, Vec<&'a Agreement>> = HashMap::new();
        for doc in documents {
            let group = doc.agreement_group.trim();
            if group.is_empty() {
                continue;
            }
            by_group.entry(group).or_default().push(doc);
        }
        Self { by_group }
    }

    /// Documents sharing `group`, in batch order.
    pub fn group(&self, group: &str) -> &[&'a Agreement] {
        self.by_group
            .get(group.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn num_groups(&self) -> usize {
        self.by_group.len()
    }
}
