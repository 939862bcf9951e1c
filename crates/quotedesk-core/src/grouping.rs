//! Response grouping, activation and statistics

use serde::Serialize;

use crate::models::{ProcessedResponse, ResponseGroup};
use crate::numeric::{round2, safe_div};

/// Groups keyed by service type, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedResponses {
    groups: Vec<ResponseGroup>,
}

impl GroupedResponses {
    pub fn get(&self, service_type: &str) -> Option<&ResponseGroup> {
        self.groups.iter().find(|g| g.service_type == service_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponseGroup> {
        self.groups.iter()
    }

    pub fn service_types(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.service_type.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for GroupedResponses {
    type Item = ResponseGroup;
    type IntoIter = std::vec::IntoIter<ResponseGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group responses by service type, activating the first of each group
///
/// Activation is per group: with several service types, several responses
/// end up active at once.
pub fn group_responses_by_service_type(responses: &[ProcessedResponse]) -> GroupedResponses {
    let mut groups: Vec<ResponseGroup> = vec![];

    for response in responses {
        match groups
            .iter_mut()
            .find(|g| g.service_type == response.service_type())
        {
            Some(group) => {
                group.responses.push(response.with_active(false));
                group.count = group.responses.len();
            }
            None => {
                let first = response.with_active(true);
                groups.push(ResponseGroup {
                    service_type: response.service_type().to_string(),
                    responses: vec![first.clone()],
                    count: 1,
                    default_active: first,
                });
            }
        }
    }

    GroupedResponses { groups }
}

/// Copy of `responses` with only `target_unique_id` active
///
/// When nothing matches, every response comes back inactive.
pub fn activate_response(
    responses: &[ProcessedResponse],
    target_unique_id: &str,
) -> Vec<ProcessedResponse> {
    responses
        .iter()
        .map(|r| r.with_active(r.unique_id == target_unique_id))
        .collect()
}

pub fn find_response_by_unique_id<'a>(
    responses: &'a [ProcessedResponse],
    unique_id: &str,
) -> Option<&'a ProcessedResponse> {
    responses.iter().find(|r| r.unique_id == unique_id)
}

/// Summary statistics across a response collection
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatistics {
    pub total_responses: usize,
    pub service_types: Vec<String>,
    pub total_products: usize,
    pub total_value: f64,
    pub total_quantity: f64,
    pub average_products_per_response: f64,
    pub average_value_per_response: f64,
}

pub fn calculate_response_statistics(responses: &[ProcessedResponse]) -> ResponseStatistics {
    let mut service_types: Vec<String> = vec![];
    for response in responses {
        if !service_types.iter().any(|s| s == response.service_type()) {
            service_types.push(response.service_type().to_string());
        }
    }

    let total_responses = responses.len();
    let total_products: usize = responses
        .iter()
        .map(|r| r.display_metadata.product_count)
        .sum();
    let total_value: f64 = responses.iter().map(|r| r.display_metadata.total_value).sum();
    let total_quantity: f64 = responses
        .iter()
        .map(|r| r.display_metadata.total_quantity)
        .sum();

    ResponseStatistics {
        total_responses,
        service_types,
        total_products,
        total_value: round2(total_value),
        total_quantity,
        average_products_per_response: safe_div(total_products as f64, total_responses as f64),
        average_value_per_response: round2(safe_div(total_value, total_responses as f64)),
    }
}
