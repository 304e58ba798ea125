use chrono::Utc;
use clap::Subcommand;
use impact_core::readiness::DimensionInput;
use impact_core::{AssessmentInput, AssessmentTypeId, Config, CoreError};

use super::{open_service, parse_enum, parse_pair, print_json, CliResult, Identity};

#[derive(Subcommand)]
pub enum AssessmentAction {
    /// Score a new assessment
    Create {
        /// Assessment type (e.g. "general_readiness")
        #[arg(long = "type", value_parser = parse_enum::<AssessmentTypeId>)]
        assessment_type: AssessmentTypeId,
        /// Project the assessment is for
        #[arg(long)]
        project: String,
        /// Dimension score as dim=N, repeatable
        #[arg(long = "score", value_parser = parse_pair)]
        scores: Vec<(String, String)>,
        /// Dimension note as dim=text, repeatable
        #[arg(long = "note", value_parser = parse_pair)]
        notes: Vec<(String, String)>,
    },
    /// Show an assessment
    Show {
        /// Assessment id
        id: String,
    },
    /// List assessments of the caller's organization
    List,
}

fn build_input(
    assessment_type: AssessmentTypeId,
    project: String,
    scores: Vec<(String, String)>,
    notes: Vec<(String, String)>,
) -> Result<AssessmentInput, CoreError> {
    let mut input = AssessmentInput::new(assessment_type, project);
    for (dimension, raw) in scores {
        let score = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::invalid(dimension.as_str(), format!("score must be an integer, got '{raw}'")))?;
        input.scores.insert(dimension, DimensionInput::new(score));
    }
    for (dimension, note) in notes {
        match input.scores.get_mut(&dimension) {
            Some(entry) => entry.notes = Some(note),
            None => return Err(CoreError::invalid(dimension.as_str(), "note given for an unscored dimension")),
        }
    }
    Ok(input)
}

pub fn run(action: AssessmentAction, identity: &Identity, config: &Config) -> CliResult {
    let caller = identity.caller()?;
    let service = open_service(config)?;

    match action {
        AssessmentAction::Create {
            assessment_type,
            project,
            scores,
            notes,
        } => {
            let input = build_input(assessment_type, project, scores, notes)?;
            let assessment = service.create_assessment(&caller, &input, Utc::now())?;
            print_json(&assessment)
        }
        AssessmentAction::Show { id } => print_json(&service.get_assessment(&caller, &id)?),
        AssessmentAction::List => print_json(&service.list_assessments(&caller)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_attach_to_scored_dimensions() {
        let input = build_input(
            AssessmentTypeId::GeneralReadiness,
            "Atlas".into(),
            vec![("leadership_commitment".into(), "4".into())],
            vec![("leadership_commitment".into(), "CEO sponsor".into())],
        )
        .unwrap();
        let entry = &input.scores["leadership_commitment"];
        assert_eq!(entry.score, 4);
        assert_eq!(entry.notes.as_deref(), Some("CEO sponsor"));
    }

    #[test]
    fn bad_scores_and_orphan_notes_fail() {
        assert!(build_input(
            AssessmentTypeId::GeneralReadiness,
            "Atlas".into(),
            vec![("leadership_commitment".into(), "high".into())],
            vec![],
        )
        .is_err());
        assert!(build_input(
            AssessmentTypeId::GeneralReadiness,
            "Atlas".into(),
            vec![],
            vec![("leadership_commitment".into(), "x".into())],
        )
        .is_err());
    }
}
