//! Document model, sanitization and date validation for decision ingestion.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

pub const CRATE_NAME: &str = "lexfeed-core";

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Strip NUL bytes, which Postgres rejects inside `text` columns. Extraction
/// tooling occasionally leaves them behind in OCR'd passages.
pub fn sanitize_text(value: &str) -> Cow<'_, str> {
    if value.contains('\0') {
        Cow::Owned(value.replace('\0', ""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Optional-field variant of [`sanitize_text`]; absent stays absent.
pub fn sanitize_opt(value: Option<String>) -> Option<String> {
    value.map(|v| sanitize_text(&v).into_owned())
}

// ---------------------------------------------------------------------------
// Date validation
// ---------------------------------------------------------------------------

/// Validate a raw date string as a strict `YYYY-MM-DD` calendar date.
///
/// Absent input is absent output with no diagnostic. A present value that is
/// malformed or out of range (bad month, bad day for the month, non-leap
/// February 29th) is downgraded to absent with a warning naming the value
/// and its context; the surrounding record keeps processing.
pub fn validate_date(raw: Option<&str>, context: &str) -> Option<NaiveDate> {
    let raw = raw?;
    let Some((year, month, day)) = split_strict_ymd(raw) else {
        warn!(value = raw, context, "date is not in YYYY-MM-DD form, storing as absent");
        return None;
    };
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Some(date),
        None => {
            warn!(value = raw, context, "date is out of calendar range, storing as absent");
            None
        }
    }
}

/// Accept exactly `dddd-dd-dd` and return the numeric components.
fn split_strict_ymd(raw: &str) -> Option<(i32, u32, u32)> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    let year = raw[0..4].parse().ok()?;
    let month = raw[5..7].parse().ok()?;
    let day = raw[8..10].parse().ok()?;
    Some((year, month, day))
}

// ---------------------------------------------------------------------------
// Raw document model (wire schema of the staged JSON files)
// ---------------------------------------------------------------------------
//
// Field names mirror the source documents; `serde(alias)` entries absorb the
// known naming drift between document schema revisions so that exactly one
// canonical record type flows past the parse boundary.

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionDocument {
    pub decision_id: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub citation_reference: Option<String>,
    #[serde(default, rename = "customKeywords")]
    pub custom_keywords: Vec<String>,
    #[serde(default, rename = "microSummary")]
    pub micro_summary: Option<String>,
    #[serde(default, rename = "currentInstance")]
    pub current_instance: CurrentInstance,
    #[serde(default)]
    pub parties: Vec<Party>,
    #[serde(default, rename = "citedDecisions")]
    pub cited_decisions: Vec<CitedDecision>,
    #[serde(default, rename = "citedProvisions")]
    pub cited_provisions: Vec<CitedProvision>,
    #[serde(default, rename = "extractedReferences")]
    pub extracted_references: ExtractedReferences,
    #[serde(default, rename = "relatedCitationsLegalProvisions")]
    pub related_citations_legal_provisions: RelatedCitationsLegalProvisions,
    #[serde(default, rename = "legalTeachings")]
    pub legal_teachings: Vec<LegalTeaching>,
    #[serde(default, rename = "relatedCitationsLegalTeachings")]
    pub related_citations_legal_teachings: RelatedCitationsLegalTeachings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentInstance {
    #[serde(default)]
    pub facts: Option<String>,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default, rename = "courtOrder")]
    pub court_order: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub party_type: Option<String>,
    #[serde(default, rename = "proceduralRole")]
    pub procedural_role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default, rename = "partyId", alias = "party_id")]
    pub party_id: Option<String>,
    #[serde(default)]
    pub requests: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Argument {
    #[serde(default, rename = "partyId", alias = "party_id")]
    pub party_id: Option<String>,
    #[serde(default)]
    pub argument: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitedDecision {
    #[serde(default, rename = "decisionSequence")]
    pub decision_sequence: Option<i32>,
    #[serde(default, rename = "courtJurisdictionCode")]
    pub court_jurisdiction_code: Option<String>,
    #[serde(default, rename = "courtName")]
    pub court_name: Option<String>,
    #[serde(default, alias = "cited_date")]
    pub date: Option<String>,
    #[serde(default, rename = "caseNumber")]
    pub case_number: Option<String>,
    #[serde(default)]
    pub ecli: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default, rename = "type", alias = "cited_type")]
    pub cited_type: Option<String>,
    #[serde(default, rename = "internalDecisionId")]
    pub internal_decision_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitedProvision {
    #[serde(default, rename = "provisionId")]
    pub provision_id: Option<String>,
    #[serde(default, rename = "parentActId")]
    pub parent_act_id: Option<String>,
    #[serde(default, rename = "internalProvisionId")]
    pub internal_provision_id: Option<String>,
    #[serde(default, rename = "internalParentActId")]
    pub internal_parent_act_id: Option<String>,
    #[serde(default, rename = "provisionNumber")]
    pub provision_number: Option<String>,
    #[serde(default, rename = "provisionNumberKey")]
    pub provision_number_key: Option<String>,
    #[serde(default, rename = "parentActType")]
    pub parent_act_type: Option<String>,
    #[serde(default, rename = "parentActName")]
    pub parent_act_name: Option<String>,
    #[serde(default, rename = "parentActDate")]
    pub parent_act_date: Option<String>,
    #[serde(default, rename = "parentActNumber")]
    pub parent_act_number: Option<String>,
    #[serde(default, rename = "provisionInterpretation")]
    pub provision_interpretation: Option<String>,
    #[serde(default, rename = "relevantFactualContext")]
    pub relevant_factual_context: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedReferences {
    #[serde(default)]
    pub url_eu: Vec<String>,
    #[serde(default)]
    pub url_be: Vec<String>,
    #[serde(default)]
    pub reference_eu_extracted: Vec<String>,
    #[serde(default)]
    pub reference_be_verified: Vec<String>,
    #[serde(default)]
    pub reference_be_extracted: Vec<String>,
    #[serde(default)]
    pub reference_be_verified_numac: Vec<String>,
    #[serde(default, rename = "reference_be_verified_fileNumber")]
    pub reference_be_verified_file_number: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedCitationsLegalProvisions {
    #[serde(default, rename = "citedProvisions")]
    pub cited_provisions: Vec<ProvisionCitation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionCitation {
    #[serde(default, rename = "internalProvisionId", alias = "internal_provision_id")]
    pub internal_provision_id: Option<String>,
    #[serde(default, rename = "relatedInternalProvisionsId")]
    pub related_internal_provisions_id: Vec<String>,
    #[serde(default, rename = "relatedInternalDecisionsId")]
    pub related_internal_decisions_id: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Citation {
    #[serde(default, rename = "blockId", alias = "block_id")]
    pub block_id: Option<String>,
    #[serde(default, rename = "relevantSnippet", alias = "relevant_snippet")]
    pub relevant_snippet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegalTeaching {
    #[serde(default, rename = "teachingId", alias = "teaching_id")]
    pub teaching_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "courtVerbatim")]
    pub court_verbatim: Option<String>,
    #[serde(default, rename = "courtVerbatimLanguage")]
    pub court_verbatim_language: Option<String>,
    #[serde(default, rename = "factualTrigger")]
    pub factual_trigger: Option<String>,
    #[serde(default, rename = "relevantFactualContext")]
    pub relevant_factual_context: Option<String>,
    #[serde(default, rename = "principleType")]
    pub principle_type: Option<String>,
    #[serde(default, rename = "legalArea")]
    pub legal_area: Option<String>,
    #[serde(default, rename = "hierarchicalRelationships")]
    pub hierarchical_relationships: HierarchicalRelationships,
    #[serde(default, rename = "precedentialWeight")]
    pub precedential_weight: PrecedentialWeight,
    #[serde(default, rename = "relatedLegalIssuesId")]
    pub related_legal_issues_id: Vec<String>,
    #[serde(default, rename = "relatedCitedProvisionsId")]
    pub related_cited_provisions_id: Vec<String>,
    // The mixed-convention spelling is what the documents actually carry.
    #[serde(default, rename = "related_citedDecisionsId", alias = "relatedCitedDecisionsId")]
    pub related_cited_decisions_id: Vec<String>,
    #[serde(default, rename = "sourceAuthor")]
    pub source_author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchicalRelationships {
    #[serde(default, rename = "refinesParentPrinciple")]
    pub refines_parent_principle: Option<String>,
    #[serde(default, rename = "refinedByChildPrinciples")]
    pub refined_by_child_principles: Vec<String>,
    #[serde(default, rename = "exceptionToPrinciple")]
    pub exception_to_principle: Option<String>,
    #[serde(default, rename = "exceptedByPrinciples")]
    pub excepted_by_principles: Vec<String>,
    #[serde(default, rename = "conflictsWith")]
    pub conflicts_with: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrecedentialWeight {
    #[serde(default, rename = "courtLevel")]
    pub court_level: Option<String>,
    #[serde(default)]
    pub binding: Option<bool>,
    #[serde(default)]
    pub clarity: Option<String>,
    #[serde(default, rename = "novelPrinciple")]
    pub novel_principle: Option<bool>,
    #[serde(default, rename = "confirmsExistingDoctrine")]
    pub confirms_existing_doctrine: Option<bool>,
    #[serde(default, rename = "distinguishesPriorCase")]
    pub distinguishes_prior_case: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedCitationsLegalTeachings {
    #[serde(default, rename = "legalTeachings")]
    pub legal_teachings: Vec<TeachingCitation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeachingCitation {
    #[serde(default, rename = "teachingId", alias = "teaching_id")]
    pub teaching_id: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

// ---------------------------------------------------------------------------
// Canonical record (what the persistence layer receives)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionHeader {
    pub custom_keywords: Vec<String>,
    pub micro_summary: Option<String>,
    pub citation_reference: Option<String>,
    pub facts: Option<String>,
    pub court_order: Option<String>,
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestRow {
    pub party_id: Option<String>,
    pub requests: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentRow {
    pub party_id: Option<String>,
    pub argument: Option<String>,
    pub treatment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartyRow {
    pub party_id: Option<String>,
    pub name: Option<String>,
    pub party_type: Option<String>,
    pub procedural_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitedDecisionRow {
    pub decision_sequence: Option<i32>,
    pub court_jurisdiction_code: Option<String>,
    pub court_name: Option<String>,
    pub cited_date: Option<NaiveDate>,
    pub case_number: Option<String>,
    pub ecli: Option<String>,
    pub treatment: Option<String>,
    pub cited_type: Option<String>,
    pub internal_decision_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitedProvisionRow {
    pub provision_id: Option<String>,
    pub parent_act_id: Option<String>,
    pub internal_provision_id: Option<String>,
    pub internal_parent_act_id: Option<String>,
    pub provision_number: Option<String>,
    pub provision_number_key: Option<String>,
    pub parent_act_type: Option<String>,
    pub parent_act_name: Option<String>,
    pub parent_act_date: Option<NaiveDate>,
    pub parent_act_number: Option<String>,
    pub provision_interpretation: Option<String>,
    pub relevant_factual_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedReferencesRow {
    pub url_eu: Vec<String>,
    pub url_be: Vec<String>,
    pub reference_eu_extracted: Vec<String>,
    pub reference_be_verified: Vec<String>,
    pub reference_be_extracted: Vec<String>,
    pub reference_be_verified_numac: Vec<String>,
    pub reference_be_verified_file_number: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitationRow {
    pub block_id: Option<String>,
    pub relevant_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionCitationGroup {
    pub internal_provision_id: Option<String>,
    pub related_internal_provisions_id: Vec<String>,
    pub related_internal_decisions_id: Vec<String>,
    pub citations: Vec<CitationRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeachingCitationGroup {
    pub teaching_id: Option<String>,
    pub citations: Vec<CitationRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegalTeachingRow {
    pub teaching_id: Option<String>,
    pub teaching_text: Option<String>,
    pub court_verbatim: Option<String>,
    pub court_verbatim_language: Option<String>,
    pub factual_trigger: Option<String>,
    pub relevant_factual_context: Option<String>,
    pub principle_type: Option<String>,
    pub legal_area: Option<String>,
    pub refines_parent_principle: Option<String>,
    pub refined_by_child_principles: Vec<String>,
    pub exception_to_principle: Option<String>,
    pub excepted_by_principles: Vec<String>,
    pub conflicts_with: Vec<String>,
    pub court_level: Option<String>,
    pub teaching_binding: Option<bool>,
    pub clarity: Option<String>,
    pub novel_principle: Option<bool>,
    pub confirms_existing_doctrine: Option<bool>,
    pub distinguishes_prior_case: Option<bool>,
    pub related_legal_issues_id: Vec<String>,
    pub related_cited_provisions_id: Vec<String>,
    pub related_cited_decisions_id: Vec<String>,
    pub source_author: Option<String>,
}

/// Fully normalized decision record: every free-text field sanitized, every
/// date validated, one shape regardless of which document schema revision
/// produced the file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    pub external_id: String,
    pub header: DecisionHeader,
    pub requests: Vec<RequestRow>,
    pub arguments: Vec<ArgumentRow>,
    pub parties: Vec<PartyRow>,
    pub cited_decisions: Vec<CitedDecisionRow>,
    pub cited_provisions: Vec<CitedProvisionRow>,
    pub extracted_references: ExtractedReferencesRow,
    pub provision_citation_groups: Vec<ProvisionCitationGroup>,
    pub legal_teachings: Vec<LegalTeachingRow>,
    pub teaching_citation_groups: Vec<TeachingCitationGroup>,
}

impl DecisionRecord {
    pub fn from_document(doc: DecisionDocument) -> Self {
        let external_id = doc.decision_id;
        let instance = doc.current_instance;

        let header = DecisionHeader {
            custom_keywords: doc.custom_keywords,
            micro_summary: sanitize_opt(doc.micro_summary),
            citation_reference: sanitize_opt(doc.citation_reference),
            facts: sanitize_opt(instance.facts),
            court_order: sanitize_opt(instance.court_order),
            outcome: sanitize_opt(instance.outcome),
        };

        let requests = instance
            .requests
            .into_iter()
            .map(|r| RequestRow {
                party_id: r.party_id,
                requests: sanitize_opt(r.requests),
            })
            .collect();

        let arguments = instance
            .arguments
            .into_iter()
            .map(|a| ArgumentRow {
                party_id: a.party_id,
                argument: sanitize_opt(a.argument),
                treatment: sanitize_opt(a.treatment),
            })
            .collect();

        let parties = doc
            .parties
            .into_iter()
            .map(|p| PartyRow {
                party_id: p.id,
                name: sanitize_opt(p.name),
                party_type: p.party_type,
                procedural_role: sanitize_opt(p.procedural_role),
            })
            .collect();

        let cited_decisions = doc
            .cited_decisions
            .into_iter()
            .enumerate()
            .map(|(i, c)| CitedDecisionRow {
                decision_sequence: c.decision_sequence,
                court_jurisdiction_code: sanitize_opt(c.court_jurisdiction_code),
                court_name: sanitize_opt(c.court_name),
                cited_date: validate_date(
                    c.date.as_deref(),
                    &format!("{external_id} citedDecisions[{i}].date"),
                ),
                case_number: c.case_number,
                ecli: c.ecli,
                treatment: sanitize_opt(c.treatment),
                cited_type: sanitize_opt(c.cited_type),
                internal_decision_id: c.internal_decision_id,
            })
            .collect();

        let cited_provisions = doc
            .cited_provisions
            .into_iter()
            .enumerate()
            .map(|(i, p)| CitedProvisionRow {
                provision_id: p.provision_id,
                parent_act_id: p.parent_act_id,
                internal_provision_id: p.internal_provision_id,
                internal_parent_act_id: p.internal_parent_act_id,
                provision_number: sanitize_opt(p.provision_number),
                provision_number_key: sanitize_opt(p.provision_number_key),
                parent_act_type: sanitize_opt(p.parent_act_type),
                parent_act_name: sanitize_opt(p.parent_act_name),
                parent_act_date: validate_date(
                    p.parent_act_date.as_deref(),
                    &format!("{external_id} citedProvisions[{i}].parentActDate"),
                ),
                parent_act_number: sanitize_opt(p.parent_act_number),
                provision_interpretation: sanitize_opt(p.provision_interpretation),
                relevant_factual_context: sanitize_opt(p.relevant_factual_context),
            })
            .collect();

        let refs = doc.extracted_references;
        let extracted_references = ExtractedReferencesRow {
            url_eu: refs.url_eu,
            url_be: refs.url_be,
            reference_eu_extracted: refs.reference_eu_extracted,
            reference_be_verified: refs.reference_be_verified,
            reference_be_extracted: refs.reference_be_extracted,
            reference_be_verified_numac: refs.reference_be_verified_numac,
            reference_be_verified_file_number: refs.reference_be_verified_file_number,
        };

        let provision_citation_groups = doc
            .related_citations_legal_provisions
            .cited_provisions
            .into_iter()
            .map(|g| ProvisionCitationGroup {
                internal_provision_id: g.internal_provision_id,
                related_internal_provisions_id: g.related_internal_provisions_id,
                related_internal_decisions_id: g.related_internal_decisions_id,
                citations: g.citations.into_iter().map(citation_row).collect(),
            })
            .collect();

        let legal_teachings = doc
            .legal_teachings
            .into_iter()
            .map(|t| {
                let hierarchy = t.hierarchical_relationships;
                let weight = t.precedential_weight;
                LegalTeachingRow {
                    teaching_id: t.teaching_id,
                    teaching_text: sanitize_opt(t.text),
                    court_verbatim: sanitize_opt(t.court_verbatim),
                    court_verbatim_language: t.court_verbatim_language,
                    factual_trigger: sanitize_opt(t.factual_trigger),
                    relevant_factual_context: sanitize_opt(t.relevant_factual_context),
                    principle_type: t.principle_type,
                    legal_area: t.legal_area,
                    refines_parent_principle: hierarchy.refines_parent_principle,
                    refined_by_child_principles: hierarchy.refined_by_child_principles,
                    exception_to_principle: hierarchy.exception_to_principle,
                    excepted_by_principles: hierarchy.excepted_by_principles,
                    conflicts_with: hierarchy.conflicts_with,
                    court_level: weight.court_level,
                    teaching_binding: weight.binding,
                    clarity: sanitize_opt(weight.clarity),
                    novel_principle: weight.novel_principle,
                    confirms_existing_doctrine: weight.confirms_existing_doctrine,
                    distinguishes_prior_case: weight.distinguishes_prior_case,
                    related_legal_issues_id: t.related_legal_issues_id,
                    related_cited_provisions_id: t.related_cited_provisions_id,
                    related_cited_decisions_id: t.related_cited_decisions_id,
                    source_author: sanitize_opt(t.source_author),
                }
            })
            .collect();

        let teaching_citation_groups = doc
            .related_citations_legal_teachings
            .legal_teachings
            .into_iter()
            .map(|g| TeachingCitationGroup {
                teaching_id: g.teaching_id,
                citations: g.citations.into_iter().map(citation_row).collect(),
            })
            .collect();

        Self {
            external_id,
            header,
            requests,
            arguments,
            parties,
            cited_decisions,
            cited_provisions,
            extracted_references,
            provision_citation_groups,
            legal_teachings,
            teaching_citation_groups,
        }
    }
}

fn citation_row(c: Citation) -> CitationRow {
    CitationRow {
        block_id: c.block_id,
        relevant_snippet: sanitize_opt(c.relevant_snippet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_day_is_valid_and_canonical() {
        let date = validate_date(Some("2024-02-29"), "test").expect("leap day");
        assert_eq!(date.to_string(), "2024-02-29");
    }

    #[test]
    fn non_leap_february_29th_is_absent() {
        assert_eq!(validate_date(Some("2023-02-29"), "test"), None);
    }

    #[test]
    fn century_leap_rule_is_gregorian() {
        assert_eq!(validate_date(Some("1900-02-29"), "test"), None);
        assert!(validate_date(Some("2000-02-29"), "test").is_some());
    }

    #[test]
    fn bad_month_and_bad_day_are_absent() {
        assert_eq!(validate_date(Some("2024-13-01"), "test"), None);
        assert_eq!(validate_date(Some("2024-04-31"), "test"), None);
    }

    #[test]
    fn absent_and_malformed_inputs_are_absent() {
        assert_eq!(validate_date(None, "test"), None);
        assert_eq!(validate_date(Some("20240101"), "test"), None);
        assert_eq!(validate_date(Some("2024-1-01"), "test"), None);
        assert_eq!(validate_date(Some("2024-01-0a"), "test"), None);
    }

    #[test]
    fn sanitize_strips_nul_and_is_idempotent() {
        let dirty = "fa\0cts\0";
        let once = sanitize_text(dirty).into_owned();
        assert_eq!(once, "facts");
        assert_eq!(sanitize_text(&once).into_owned(), once);
        assert!(once.len() <= dirty.len());
    }

    #[test]
    fn sanitize_borrows_clean_input() {
        assert!(matches!(sanitize_text("clean"), Cow::Borrowed(_)));
        assert_eq!(sanitize_opt(None), None);
    }

    #[test]
    fn snake_case_revision_aliases_parse() {
        let doc: DecisionDocument = serde_json::from_value(serde_json::json!({
            "decision_id": "ECLI:BE:CASS:2020:ARR.1",
            "citedDecisions": [{"cited_date": "2020-01-15", "cited_type": "precedent"}],
            "legalTeachings": [{"teaching_id": "T-1"}],
            "relatedCitationsLegalTeachings": {
                "legalTeachings": [{"teaching_id": "T-1", "citations": [{"block_id": "b1"}]}]
            }
        }))
        .expect("document parses");
        assert_eq!(doc.cited_decisions[0].date.as_deref(), Some("2020-01-15"));
        assert_eq!(doc.legal_teachings[0].teaching_id.as_deref(), Some("T-1"));
        assert_eq!(
            doc.related_citations_legal_teachings.legal_teachings[0]
                .citations[0]
                .block_id
                .as_deref(),
            Some("b1")
        );
    }

    #[test]
    fn normalization_sanitizes_and_coerces_dates() {
        let doc: DecisionDocument = serde_json::from_value(serde_json::json!({
            "decision_id": "ECLI:BE:CASS:2020:ARR.2",
            "microSummary": "sum\u{0000}mary",
            "currentInstance": {
                "facts": "the\u{0000} facts",
                "requests": [{"partyId": "P1", "requests": "annul\u{0000}ment"}],
                "arguments": [],
                "courtOrder": "order",
                "outcome": "granted"
            },
            "citedProvisions": [{"parentActDate": "2020-02-30", "parentActName": "Civil Code"}]
        }))
        .expect("document parses");
        let record = DecisionRecord::from_document(doc);
        assert_eq!(record.header.micro_summary.as_deref(), Some("summary"));
        assert_eq!(record.header.facts.as_deref(), Some("the facts"));
        assert_eq!(record.requests[0].requests.as_deref(), Some("annulment"));
        assert_eq!(record.cited_provisions[0].parent_act_date, None);
        assert_eq!(
            record.cited_provisions[0].parent_act_name.as_deref(),
            Some("Civil Code")
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let doc: DecisionDocument =
            serde_json::from_value(serde_json::json!({"decision_id": "ECLI:BE:CASS:2021:ARR.9"}))
                .expect("minimal document parses");
        let record = DecisionRecord::from_document(doc);
        assert!(record.parties.is_empty());
        assert!(record.provision_citation_groups.is_empty());
        assert!(record.teaching_citation_groups.is_empty());
        assert!(record.extracted_references.url_eu.is_empty());
    }
}
