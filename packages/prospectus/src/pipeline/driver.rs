//! Pipeline driver - sequences segmentation and the five extraction stages
//! and assembles the aggregate record.

use chrono::Utc;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::info;

use crate::pipeline::merge::{merge_outcomes, MergeBatches, SectionResult};
use crate::pipeline::orchestrate::ExtractionOrchestrator;
use crate::pipeline::prompts::{
    ADMISSIONS_INSTRUCTION, DEPARTMENTS_INSTRUCTION, FACILITIES_INSTRUCTION, FEES_INSTRUCTION,
    INSTITUTION_INFO_INSTRUCTION,
};
use crate::pipeline::select::{batch_chunks, select_relevant, SectionTarget};
use crate::segment::{snap_to_char_boundary, Segmenter};
use crate::traits::CompletionModel;
use crate::types::{
    profile::SCHEMA_VERSION, AdmissionInfo, DepartmentList, ExtractionConfig, ExtractionMetadata,
    FacilityList, FeeList, InstitutionInfo, InstitutionProfile, ParsedDocument, SegmenterConfig,
    TextChunk,
};

/// Drives the full extraction: segmentation, the institution-info window,
/// four fault-isolated section stages, and final assembly.
///
/// Owns explicit component instances with injected configuration; there is
/// no global state, and two extractors never share a concurrency gate.
pub struct ProfileExtractor<M: CompletionModel> {
    segmenter: Segmenter,
    orchestrator: ExtractionOrchestrator<M>,
}

impl<M: CompletionModel> ProfileExtractor<M> {
    pub fn new(
        model: M,
        segmenter_config: SegmenterConfig,
        extraction_config: ExtractionConfig,
    ) -> Self {
        Self {
            segmenter: Segmenter::new(segmenter_config),
            orchestrator: ExtractionOrchestrator::new(model, extraction_config),
        }
    }

    /// Extractor with default configuration.
    pub fn with_defaults(model: M) -> Self {
        Self::new(model, SegmenterConfig::default(), ExtractionConfig::default())
    }

    /// Run the whole pipeline for one document.
    ///
    /// Always produces a complete record: sections with nothing extractable
    /// come back as empty lists or absent optionals with near-zero
    /// confidence, never as errors.
    pub async fn extract(&self, doc: &ParsedDocument) -> InstitutionProfile {
        let chunks = self.segmenter.segment(doc);
        info!(
            chunks = chunks.len(),
            pages = doc.total_pages,
            "starting profile extraction"
        );

        let mut warnings = Vec::new();

        let info = self.extract_institution_info(&chunks, &mut warnings).await;

        let departments = self
            .extract_section::<DepartmentList>(&chunks, self.departments_target(), &mut warnings)
            .await;
        let facilities = self
            .extract_section::<FacilityList>(&chunks, self.facilities_target(), &mut warnings)
            .await;
        let fees = self
            .extract_section::<FeeList>(&chunks, self.fees_target(), &mut warnings)
            .await;
        let admissions = self
            .extract_section::<AdmissionInfo>(&chunks, self.admissions_target(), &mut warnings)
            .await;

        let mut confidence_scores = HashMap::new();
        confidence_scores.insert("departments".to_string(), departments.confidence);
        confidence_scores.insert("facilities".to_string(), facilities.confidence);
        confidence_scores.insert("fees".to_string(), fees.confidence);
        confidence_scores.insert("admissions".to_string(), admissions.confidence);

        let total_pages = chunks.iter().map(|c| c.page_number).max().unwrap_or(0);

        info!(
            institution = %info.name,
            departments = departments.value.items.len(),
            facilities = facilities.value.items.len(),
            fees = fees.value.items.len(),
            "profile assembled"
        );

        InstitutionProfile {
            schema_version: SCHEMA_VERSION.to_string(),
            institution_name: info.name,
            institution_short_name: info.short_name,
            location: info.location,
            departments: departments.value.items,
            facilities: facilities.value.items,
            fee_structure: fees.value.items,
            admissions: if admissions.value.has_content() {
                Some(admissions.value)
            } else {
                None
            },
            contact: None,
            metadata: ExtractionMetadata {
                extraction_timestamp: Utc::now(),
                total_chunks_processed: chunks.len(),
                total_pages,
                confidence_scores,
                warnings,
            },
        }
    }

    /// Institution name, short name and location from a small leading
    /// window of the document; a single unbatched call.
    async fn extract_institution_info(
        &self,
        chunks: &[TextChunk],
        warnings: &mut Vec<String>,
    ) -> InstitutionInfo {
        if chunks.is_empty() {
            return InstitutionInfo::default();
        }

        let config = self.orchestrator.config();
        let mut context = chunks
            .iter()
            .take(config.info_window_chunks)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        if context.len() > config.info_window_chars {
            context.truncate(snap_to_char_boundary(&context, config.info_window_chars));
        }

        let outcome = self
            .orchestrator
            .extract_once::<InstitutionInfo>(context, "institution_info", INSTITUTION_INFO_INSTRUCTION)
            .await;
        if !outcome.is_extracted() {
            warnings.push("institution_info: extraction failed; using defaults".to_string());
        }
        outcome.value
    }

    /// One section stage: select, batch, orchestrate, merge. Failures
    /// degrade this section only.
    async fn extract_section<T>(
        &self,
        chunks: &[TextChunk],
        target: SectionTarget,
        warnings: &mut Vec<String>,
    ) -> SectionResult<T>
    where
        T: MergeBatches + DeserializeOwned + Default + JsonSchema,
    {
        let selected = select_relevant(chunks, &target);
        if selected.is_empty() {
            return SectionResult::empty();
        }

        let batches = batch_chunks(&selected, self.orchestrator.config().batch_size);
        info!(
            section = %target.name,
            chunks = selected.len(),
            batches = batches.len(),
            "extracting section"
        );

        let outcomes = self
            .orchestrator
            .extract_batches::<T>(&batches, &target.name, &target.instruction)
            .await;
        let result = merge_outcomes(outcomes);

        if result.is_degraded() {
            warnings.push(format!(
                "{}: {} of {} batches failed",
                target.name, result.batches_failed, result.batches_total
            ));
        }
        result
    }

    fn departments_target(&self) -> SectionTarget {
        SectionTarget::new("departments", DEPARTMENTS_INSTRUCTION)
            .with_primary_tags(["departments", "programs", "general"])
            .with_keywords(["department", "faculty", "degree", "program"])
            .with_max_chunks(self.orchestrator.config().max_chunks_per_section)
    }

    fn facilities_target(&self) -> SectionTarget {
        SectionTarget::new("facilities", FACILITIES_INSTRUCTION)
            .with_primary_tags(["facilities"])
            .with_fallback_tags(["general"])
            .with_keywords(["library", "hostel", "laboratory", "sports", "cafeteria", "campus"])
            .with_max_chunks(self.orchestrator.config().max_chunks_per_section)
    }

    fn fees_target(&self) -> SectionTarget {
        SectionTarget::new("fees", FEES_INSTRUCTION)
            .with_primary_tags(["fees"])
            .with_fallback_tags(["general"])
            .with_keywords(["fee", "tuition", "scholarship", "payment"])
            .with_max_chunks(self.orchestrator.config().max_chunks_per_section)
    }

    fn admissions_target(&self) -> SectionTarget {
        SectionTarget::new("admissions", ADMISSIONS_INSTRUCTION)
            .with_primary_tags(["admissions"])
            .with_fallback_tags(["requirements", "general"])
            .with_keywords(["admission", "eligibility", "apply", "deadline", "merit"])
            .with_max_chunks(self.orchestrator.config().max_chunks_per_section)
    }
}
