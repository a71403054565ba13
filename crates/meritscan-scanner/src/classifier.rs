//! Interpretation of the page returned by a lookup submission.

use meritscan_core::{CandidateId, MeritRecord, UNAVAILABLE};
use meritscan_portal::{PageDocument, PageSelectors, SubmissionResponse};
use std::sync::Arc;

/// What a submission response means for the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Result page with at least one merit row
    Match(Vec<MeritRecord>),
    /// Result page without merit rows
    NotFound(MeritRecord),
    /// Anything that is not a result page; the answer was not accepted
    Rejected,
}

/// Classifies submission responses and extracts merit records.
///
/// Only the final URL decides whether the portal accepted the answer. Missing
/// fields on a result page degrade to [`UNAVAILABLE`] instead of failing.
#[derive(Debug, Clone)]
pub struct ResultClassifier {
    selectors: Arc<PageSelectors>,
    result_page_pattern: String,
}

impl ResultClassifier {
    /// Create a classifier that treats URLs containing `result_page_pattern`
    /// (case-insensitive) as result pages.
    #[must_use]
    pub fn new(selectors: Arc<PageSelectors>, result_page_pattern: &str) -> Self {
        Self {
            selectors,
            result_page_pattern: result_page_pattern.to_lowercase(),
        }
    }

    /// Whether `url` points at the result page.
    #[must_use]
    pub fn is_result_page(&self, url: &str) -> bool {
        url.to_lowercase().contains(&self.result_page_pattern)
    }

    /// Classify `response` for `candidate`.
    #[must_use]
    pub fn classify(&self, candidate: &CandidateId, response: &SubmissionResponse) -> Classification {
        if !self.is_result_page(&response.final_url) {
            tracing::debug!(
                candidate = %candidate,
                final_url = %response.final_url,
                status = response.status,
                "Submission did not reach the result page"
            );
            return Classification::Rejected;
        }

        let document = PageDocument::parse(&response.body);
        let selectors = &self.selectors;

        let name = field_or_unavailable(candidate, "name", document.text(&selectors.name));
        let father_name = field_or_unavailable(
            candidate,
            "father_name",
            document.text(&selectors.father_name),
        );

        if let Some(shown) = document.text(&selectors.roll_number) {
            if shown != candidate.as_str() {
                tracing::debug!(candidate = %candidate, shown = %shown, "Result page shows a different roll number");
            }
        }

        let records: Vec<MeritRecord> = document
            .table_rows(&selectors.merit_rows, &selectors.merit_cells)
            .into_iter()
            // First row is the table header
            .skip(1)
            .filter(|cells| !cells.is_empty())
            .map(|cells| {
                let cell = |index: usize, label: &str| {
                    field_or_unavailable(candidate, label, cells.get(index).cloned().flatten())
                };
                MeritRecord {
                    roll_number: candidate.to_string(),
                    name: name.clone(),
                    father_name: father_name.clone(),
                    selection_list_no: cell(0, "selection_list_no"),
                    programme: cell(1, "programme"),
                    merit_position: cell(2, "merit_position"),
                    status: cell(3, "status"),
                }
            })
            .collect();

        if records.is_empty() {
            Classification::NotFound(MeritRecord {
                name,
                father_name,
                ..MeritRecord::unavailable(candidate)
            })
        } else {
            Classification::Match(records)
        }
    }
}

fn field_or_unavailable(candidate: &CandidateId, field: &str, value: Option<String>) -> String {
    value.unwrap_or_else(|| {
        tracing::debug!(candidate = %candidate, field, "Field missing on result page");
        UNAVAILABLE.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ResultClassifier {
        ResultClassifier::new(Arc::new(PageSelectors::default()), "meritresult.aspx")
    }

    fn candidate() -> CandidateId {
        CandidateId::new(100_001, "244", 6).expect("valid candidate")
    }

    fn response(url: &str, body: &str) -> SubmissionResponse {
        SubmissionResponse {
            final_url: url.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    fn result_page(rows: &str) -> String {
        format!(
            r#"<html><body>
                <span id="Body_Body_lblRollNo">100001244</span>
                <span id="Body_Body_lblName">Ayesha Khan</span>
                <span id="Body_Body_lblFatherName">Imran Khan</span>
                <div id="Body_Body_divBBAMerit"><table>
                    <tr><th>List</th><th>Programme</th><th>Merit</th><th>Status</th></tr>
                    {rows}
                </table></div>
            </body></html>"#
        )
    }

    const RESULT_URL: &str = "https://portal.example/result/MeritResult.aspx";

    #[test]
    fn test_rows_map_positionally() {
        let body = result_page(
            "<tr><td>1</td><td>BS Computer Science</td><td>112</td><td>Selected</td></tr>
             <tr><td>2</td><td>BS Mathematics</td><td>245</td><td>Waiting</td></tr>",
        );

        let Classification::Match(records) = classifier().classify(&candidate(), &response(RESULT_URL, &body)) else {
            panic!("expected a match");
        };

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].roll_number, "100001244");
        assert_eq!(records[0].name, "Ayesha Khan");
        assert_eq!(records[0].father_name, "Imran Khan");
        assert_eq!(records[0].selection_list_no, "1");
        assert_eq!(records[0].programme, "BS Computer Science");
        assert_eq!(records[0].merit_position, "112");
        assert_eq!(records[0].status, "Selected");
        assert_eq!(records[1].programme, "BS Mathematics");
        assert_eq!(records[1].status, "Waiting");
    }

    #[test]
    fn test_no_rows_is_not_found() {
        let body = result_page("");
        let outcome = classifier().classify(&candidate(), &response(RESULT_URL, &body));

        let Classification::NotFound(record) = outcome else {
            panic!("expected not found");
        };
        assert_eq!(record.roll_number, "100001244");
        assert_eq!(record.name, "Ayesha Khan");
        assert!(record.has_no_merit_data());
    }

    #[test]
    fn test_missing_cells_degrade() {
        let body = result_page("<tr><td>3</td><td>  </td></tr>");
        let Classification::Match(records) = classifier().classify(&candidate(), &response(RESULT_URL, &body)) else {
            panic!("expected a match");
        };

        assert_eq!(records[0].selection_list_no, "3");
        assert_eq!(records[0].programme, UNAVAILABLE);
        assert_eq!(records[0].merit_position, UNAVAILABLE);
        assert_eq!(records[0].status, UNAVAILABLE);
    }

    #[test]
    fn test_missing_labels_degrade() {
        let body = r#"<div id="Body_Body_divBBAMerit"><table>
            <tr><td>h</td></tr>
            <tr><td>1</td><td>BE Mechanical</td><td>9</td><td>Selected</td></tr>
        </table></div>"#;
        let Classification::Match(records) = classifier().classify(&candidate(), &response(RESULT_URL, body)) else {
            panic!("expected a match");
        };

        assert_eq!(records[0].roll_number, "100001244");
        assert_eq!(records[0].name, UNAVAILABLE);
        assert_eq!(records[0].father_name, UNAVAILABLE);
    }

    #[test]
    fn test_other_pages_are_rejected() {
        let body = result_page("<tr><td>1</td><td>BS</td><td>1</td><td>Selected</td></tr>");
        let outcome = classifier().classify(
            &candidate(),
            &response("https://portal.example/result/meritsearch.aspx", &body),
        );
        assert_eq!(outcome, Classification::Rejected);

        let error_page = classifier().classify(
            &candidate(),
            &response("https://portal.example/error.aspx", "<html>Server Error</html>"),
        );
        assert_eq!(error_page, Classification::Rejected);
    }
}
