//! Dataset partitioning by the values of a grouping variable.

use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// A dataset split into per-category sub-datasets.
///
/// Category order is first-seen order of the grouping values; the grouping
/// variable itself is consumed by the partition and appears in no
/// sub-dataset.
#[derive(Debug, Clone)]
pub struct GroupedDataset {
    categories: Vec<String>,
    groups: HashMap<String, Dataset>,
}

impl GroupedDataset {
    /// Category labels in first-seen order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn get(&self, category: &str) -> Option<&Dataset> {
        self.groups.get(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterate (category, sub-dataset) pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        self.categories
            .iter()
            .map(move |c| (c.as_str(), &self.groups[c]))
    }
}

/// Partition a dataset on the distinct values of `group_by`.
///
/// Each row lands in exactly one category bucket, row order within a
/// category follows the source, and the caller's dataset is left untouched.
pub fn partition(data: &Dataset, group_by: &str) -> Result<GroupedDataset> {
    let group_col = data.variable(group_by)?;

    // Category labels in first-seen order, with the row indices they own.
    let mut categories: Vec<String> = Vec::new();
    let mut indices: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, value) in group_col.iter().enumerate() {
        let label = value.label();
        indices
            .entry(label.clone())
            .or_insert_with(|| {
                categories.push(label);
                Vec::new()
            })
            .push(i);
    }

    let mut groups: HashMap<String, Dataset> = HashMap::new();
    for category in &categories {
        let rows = &indices[category];
        let mut sub = Dataset::new();
        for name in data.variable_names() {
            if name == group_by {
                continue;
            }
            let column = data.variable(name)?;
            let picked = rows.iter().map(|&i| column[i].clone()).collect();
            sub.add_variable(name.clone(), picked)?;
        }
        groups.insert(category.clone(), sub);
    }

    if categories.is_empty() {
        return Err(Error::EmptyData(format!(
            "grouping variable '{}' has no values to partition on",
            group_by
        )));
    }

    Ok(GroupedDataset { categories, groups })
}
