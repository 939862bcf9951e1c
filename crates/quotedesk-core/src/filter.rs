//! Response filter criteria
//!
//! Criteria are built with a small builder and combined with AND. Absent
//! criteria pass everything through, so an empty filter is the identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::parse_date;
use crate::models::ProcessedResponse;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Filter criteria for processed responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub service_type: Option<String>,
    pub response_id: Option<String>,
    pub date_range: Option<DateRange>,
    pub status: Option<String>,
}

impl FilterCriteria {
    /// Whether no criterion is set
    pub fn is_empty(&self) -> bool {
        self.service_type.is_none()
            && self.response_id.is_none()
            && self.date_range.is_none()
            && self.status.is_none()
    }

    /// AND of every criterion that is present
    pub fn matches(&self, response: &ProcessedResponse) -> bool {
        if let Some(ref service_type) = self.service_type {
            if response.service_type() != service_type {
                return false;
            }
        }

        if let Some(ref response_id) = self.response_id {
            if response.response_id.as_deref() != Some(response_id.as_str()) {
                return false;
            }
        }

        if let Some(range) = self.date_range {
            // Undated responses cannot fall inside a range
            match response.date().and_then(parse_date) {
                Some(date) if range.contains(date) => {}
                _ => return false,
            }
        }

        if let Some(ref status) = self.status {
            if response.status() != Some(status.as_str()) {
                return false;
            }
        }

        true
    }
}

/// Builder for [`FilterCriteria`]
#[derive(Debug, Default)]
pub struct ResponseFilter {
    criteria: FilterCriteria,
}

impl ResponseFilter {
    /// Create a new filter builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set service type filter
    pub fn service_type(mut self, service_type: Option<&str>) -> Self {
        self.criteria.service_type = service_type.map(String::from);
        self
    }

    /// Set response id filter
    pub fn response_id(mut self, response_id: Option<&str>) -> Self {
        self.criteria.response_id = response_id.map(String::from);
        self
    }

    /// Set date range filter
    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.criteria.date_range = range;
        self
    }

    /// Set status filter
    pub fn status(mut self, status: Option<&str>) -> Self {
        self.criteria.status = status.map(String::from);
        self
    }

    pub fn build(self) -> FilterCriteria {
        self.criteria
    }
}

pub fn filter_responses(
    responses: &[ProcessedResponse],
    filters: &FilterCriteria,
) -> Vec<ProcessedResponse> {
    if filters.is_empty() {
        return responses.to_vec();
    }
    responses
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuotationInfo, RawQuotationResponse};
    use crate::processor::{process_quotation_responses, ProcessOptions};
    use chrono::TimeZone;

    fn batch() -> Vec<ProcessedResponse> {
        let raw = |service: &str, id: &str, date: &str, status: &str| RawQuotationResponse {
            service_type: service.to_string(),
            quotation_info: QuotationInfo {
                response_id: Some(id.to_string()),
                date: Some(date.to_string()),
                status: Some(status.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let options = ProcessOptions {
            sort_by_date: false,
            validate_data: false,
        };
        process_quotation_responses(
            &[
                raw("maritime", "1", "2024-01-10", "answered"),
                raw("express", "2", "2024-02-10", "pending"),
                raw("maritime", "3", "2024-03-10T00:00:00Z", "pending"),
                raw("express", "4", "not-a-date", "answered"),
            ],
            options,
        )
    }

    fn ids(responses: &[ProcessedResponse]) -> Vec<&str> {
        responses.iter().map(|r| r.unique_id.as_str()).collect()
    }

    #[test]
    fn test_no_filters_is_identity() {
        let responses = batch();
        let filtered = filter_responses(&responses, &FilterCriteria::default());
        assert_eq!(filtered, responses);
    }

    #[test]
    fn test_service_type_and_status_combine() {
        let responses = batch();
        let criteria = ResponseFilter::new()
            .service_type(Some("maritime"))
            .status(Some("pending"))
            .build();
        assert_eq!(ids(&filter_responses(&responses, &criteria)), vec!["maritime-3"]);
    }

    #[test]
    fn test_response_id_exact() {
        let responses = batch();
        let criteria = ResponseFilter::new().response_id(Some("2")).build();
        assert_eq!(ids(&filter_responses(&responses, &criteria)), vec!["express-2"]);

        let criteria = ResponseFilter::new().response_id(Some("20")).build();
        assert!(filter_responses(&responses, &criteria).is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive_and_skips_undated() {
        let responses = batch();
        let range = DateRange::new(
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
        );
        let criteria = ResponseFilter::new().date_range(Some(range)).build();
        assert_eq!(
            ids(&filter_responses(&responses, &criteria)),
            vec!["express-2", "maritime-3"]
        );
    }
}
