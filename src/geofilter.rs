use crate::types::BoundaryCollection;

/// Keep only the features named exactly `target_name`, in their original order.
pub fn filter_by_name(collection: &BoundaryCollection, target_name: &str) -> BoundaryCollection {
    let features = collection
        .features
        .iter()
        .filter(|f| f.name.as_deref() == Some(target_name))
        .cloned()
        .collect();
    BoundaryCollection::new(features)
}
