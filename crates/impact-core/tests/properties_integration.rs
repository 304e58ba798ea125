//! Property tests over the scorer, planner, budget tracker and workflow.

use std::collections::BTreeMap;

use chrono::Utc;
use impact_core::budget::{self, BudgetLedger, TaskActuals};
use impact_core::planner::{self, WEEK_TEMPLATES};
use impact_core::readiness::{self, phase_recommendations, AssessmentInput, ReadinessBand, BASE_RECOMMENDATIONS};
use impact_core::workflow::{PhaseContext, PhaseProgressUpdate, PhaseStatus, TaskStatus, TaskUpdate, TransitionRequest};
use impact_core::{AssessmentTypeId, DimensionScores, PhaseId, Project, ProjectDraft};
use proptest::prelude::*;

fn any_type() -> impl Strategy<Value = AssessmentTypeId> {
    prop::sample::select(AssessmentTypeId::ALL.to_vec())
}

fn any_phase() -> impl Strategy<Value = PhaseId> {
    prop::sample::select(PhaseId::ALL.to_vec())
}

/// A type with a random 1..=5 score for each of its dimensions.
fn scored_input() -> impl Strategy<Value = AssessmentInput> {
    any_type().prop_flat_map(|kind| {
        let n = kind.dimensions().len();
        prop::collection::vec(1i64..=5, n).prop_map(move |values| {
            kind.dimensions()
                .iter()
                .zip(values)
                .fold(AssessmentInput::new(kind, "Prop"), |input, (d, v)| input.with_score(d.id, v))
        })
    })
}

#[derive(Debug, Clone)]
enum Op {
    Progress(PhaseId, f64),
    Transition(PhaseId),
    Fail(PhaseId),
    Complete(PhaseId),
    StartTask(usize),
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any_phase(), 0.0f64..=100.0).prop_map(|(p, pct)| Op::Progress(p, pct)),
        any_phase().prop_map(Op::Transition),
        any_phase().prop_map(Op::Fail),
        any_phase().prop_map(Op::Complete),
        (0usize..64).prop_map(Op::StartTask),
    ]
}

proptest! {
    #[test]
    fn perfect_scores_are_excellent(kind in any_type()) {
        let report = readiness::score(&AssessmentInput::uniform(kind, "Prop", 5)).unwrap();
        prop_assert_eq!(report.overall_score, 5.0);
        prop_assert_eq!(report.readiness_band, ReadinessBand::Excellent);
        prop_assert!((90.0..=95.0).contains(&report.success_probability));
        prop_assert_eq!(report.analysis.inertia.value, 0.0);
    }

    #[test]
    fn lowest_scores_are_critical(kind in any_type()) {
        let report = readiness::score(&AssessmentInput::uniform(kind, "Prop", 1)).unwrap();
        prop_assert_eq!(report.readiness_band, ReadinessBand::Critical);
        prop_assert_eq!(report.success_probability, 18.0);
        let expected = (80.0 * kind.type_multiplier() * 10.0).round() / 10.0;
        prop_assert_eq!(report.analysis.inertia.value, expected);
    }

    #[test]
    fn recommendations_include_the_base_list(input in scored_input()) {
        let report = readiness::score(&input).unwrap();
        for base in BASE_RECOMMENDATIONS {
            prop_assert!(report.recommendations.iter().any(|r| r == base));
        }
    }

    #[test]
    fn plan_totals_match_weeks(input in scored_input()) {
        let scores = input.validate().unwrap();
        let overall = readiness::overall_score(&scores);
        let plan = planner::build_plan(input.assessment_type, &scores, overall);

        let keys: Vec<u8> = plan.weeks.keys().copied().collect();
        prop_assert_eq!(keys, (1..=10).collect::<Vec<u8>>());
        let sum: u64 = plan.weeks.values().map(|w| w.final_budget).sum();
        prop_assert_eq!(sum, plan.summary.total_budget);
        for template in WEEK_TEMPLATES.iter() {
            prop_assert_eq!(plan.weeks[&template.week].impact_phase, template.impact_phase);
        }
    }

    #[test]
    fn budget_health_degrades_with_spend(
        completion in 0.0f64..=100.0,
        spent in 1.0f64..50_000.0,
        extra in 0.0f64..50_000.0,
    ) {
        let plan = planner::build_plan(AssessmentTypeId::GeneralReadiness, &DimensionScores::new(), 3.0);
        let health = |spent: f64| {
            let mut ledger = BudgetLedger::new();
            ledger.insert("task_3".into(), TaskActuals { spent, completion_percentage: completion, elapsed_weeks: 2.0 });
            budget::track(&plan, &ledger, None).overall_metrics.budget_health
        };
        prop_assert!(health(spent + extra) <= health(spent));
    }

    #[test]
    fn workflow_invariants_hold_under_any_operations(ops in prop::collection::vec(any_op(), 1..40)) {
        let now = Utc::now();
        let plan = planner::build_plan(AssessmentTypeId::GeneralReadiness, &DimensionScores::new(), 3.0);
        let recs: BTreeMap<PhaseId, String> = phase_recommendations(AssessmentTypeId::GeneralReadiness);
        let ctx = PhaseContext { plan: &plan, phase_recommendations: &recs };
        let draft = ProjectDraft { name: "Prop".into(), ..Default::default() };
        let mut project = Project::blank(draft, "u1", "acme", now);

        for op in ops {
            let before = project.current_phase.order();
            let mut candidate = project.clone();
            let applied = match op {
                Op::Progress(phase, pct) => candidate
                    .update_phase_progress(phase, &PhaseProgressUpdate { completion_percentage: Some(pct), ..Default::default() }, now)
                    .is_ok(),
                Op::Transition(from) => match from.next() {
                    Some(to) => {
                        let request = TransitionRequest {
                            from_phase: from,
                            to_phase: to,
                            transition_date: now,
                            completion_notes: String::new(),
                            lessons_learned: None,
                            gate_review_id: None,
                        };
                        candidate.transition(&request, ctx, "u1", now).is_ok()
                    }
                    None => false,
                },
                Op::Fail(phase) => candidate.mark_phase_failed(phase, "prop", now).is_ok(),
                Op::Complete(phase) => candidate.complete_phase(phase, Default::default(), ctx, now).is_ok(),
                Op::StartTask(i) => {
                    let Some(id) = candidate.tasks.get(i % candidate.tasks.len().max(1)).map(|t| t.id.clone()) else {
                        continue;
                    };
                    let update = TaskUpdate { status: Some(TaskStatus::InProgress), ..Default::default() };
                    candidate.update_task(&id, &update, now).is_ok()
                }
            };
            if applied {
                project = candidate;
            }

            prop_assert!(project.current_phase.order() >= before);
            let running = project.phases.iter().filter(|p| p.status == PhaseStatus::InProgress).count();
            prop_assert!(running <= 1);
            let mean = project.phase_progress.values().sum::<f64>() / project.phase_progress.len() as f64;
            prop_assert!((project.progress_percentage - mean).abs() <= 0.1);
            prop_assert!(project.check_invariants().is_ok());
        }
    }
}
