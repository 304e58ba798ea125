use super::{AssessmentType, AssessmentTypeId, Dimension, DimensionCategory, PhaseId};

const fn core_dim(id: &'static str, name: &'static str, description: &'static str) -> Dimension {
    Dimension {
        id,
        name,
        description,
        category: DimensionCategory::Core,
    }
}

const fn specialized_dim(id: &'static str, name: &'static str, description: &'static str) -> Dimension {
    Dimension {
        id,
        name,
        description,
        category: DimensionCategory::Specialized,
    }
}

const LEADERSHIP: &str = "Leadership Commitment & Sponsorship";
const CULTURE: &str = "Organizational Culture & Change History";
const RESOURCES: &str = "Resource Availability & Capability";
const STAKEHOLDERS: &str = "Stakeholder Engagement & Communication";
const TRAINING: &str = "Training & Development Capability";

const GENERAL_DIMENSIONS: [Dimension; 5] = [
    core_dim("leadership_commitment", LEADERSHIP, "How committed is senior leadership to this change initiative?"),
    core_dim("organizational_culture", CULTURE, "How well does the organization typically adapt to change?"),
    core_dim("resource_availability", RESOURCES, "Are adequate financial, human, and technical resources available?"),
    core_dim("stakeholder_engagement", STAKEHOLDERS, "How effective are existing stakeholder engagement capabilities?"),
    core_dim("training_capability", TRAINING, "What training capabilities and infrastructure exist?"),
];

const SOFTWARE_DIMENSIONS: [Dimension; 8] = [
    core_dim("leadership_commitment", LEADERSHIP, "How committed is senior leadership to this software implementation?"),
    core_dim("organizational_culture", CULTURE, "How well does the organization adapt to new technology?"),
    core_dim("resource_availability", RESOURCES, "Are adequate resources available for software implementation?"),
    core_dim("stakeholder_engagement", STAKEHOLDERS, "How effective are communication channels for technology changes?"),
    core_dim("training_capability", TRAINING, "What technical training capabilities exist?"),
    specialized_dim(
        "technical_infrastructure",
        "Technical Infrastructure Readiness",
        "How ready is the technical infrastructure for new software?",
    ),
    specialized_dim(
        "user_adoption_readiness",
        "User Adoption Readiness",
        "How ready are end users to adopt new software systems?",
    ),
    specialized_dim(
        "data_migration_readiness",
        "Data Migration & Integration Readiness",
        "How prepared is the organization for data migration and system integration?",
    ),
];

const BUSINESS_DIMENSIONS: [Dimension; 8] = [
    core_dim("leadership_commitment", LEADERSHIP, "How committed is leadership to business process improvement?"),
    core_dim("organizational_culture", CULTURE, "How well does the organization adapt to process changes?"),
    core_dim("resource_availability", RESOURCES, "Are adequate resources available for process transformation?"),
    core_dim("stakeholder_engagement", STAKEHOLDERS, "How effective are stakeholder engagement strategies?"),
    core_dim("training_capability", TRAINING, "What process training capabilities exist?"),
    specialized_dim(
        "process_maturity",
        "Current Process Maturity",
        "How mature and documented are current business processes?",
    ),
    specialized_dim(
        "cross_functional_collaboration",
        "Cross-Functional Collaboration",
        "How effectively do departments collaborate on process improvements?",
    ),
    specialized_dim(
        "performance_measurement",
        "Performance Measurement Capability",
        "How well can the organization measure and track process performance?",
    ),
];

const MANUFACTURING_DIMENSIONS: [Dimension; 9] = [
    core_dim("leadership_commitment", LEADERSHIP, "How committed is leadership to operational improvements?"),
    core_dim("organizational_culture", CULTURE, "How well does the organization adapt to operational changes?"),
    core_dim("resource_availability", RESOURCES, "Are adequate resources available for operational transformation?"),
    core_dim(
        "stakeholder_engagement",
        STAKEHOLDERS,
        "How effective are communication channels in the manufacturing environment?",
    ),
    core_dim("training_capability", TRAINING, "What operational training capabilities exist?"),
    specialized_dim(
        "operational_constraints",
        "Operational Constraints Management",
        "How manageable are operational constraints during improvements?",
    ),
    specialized_dim(
        "maintenance_operations_alignment",
        "Maintenance-Operations Alignment",
        "How well aligned are maintenance and operations teams?",
    ),
    specialized_dim(
        "shift_coordination",
        "Shift Work & Coordination",
        "How well can shift patterns accommodate improvement activities?",
    ),
    specialized_dim(
        "safety_compliance",
        "Safety & Compliance Integration",
        "How well can safety and regulatory requirements be integrated?",
    ),
];

pub static ASSESSMENT_TYPES: [AssessmentType; 4] = [
    AssessmentType {
        id: AssessmentTypeId::GeneralReadiness,
        name: "General Change Readiness Assessment",
        description: "Comprehensive organizational change readiness evaluation for any type of transformation project",
        dimensions: &GENERAL_DIMENSIONS,
    },
    AssessmentType {
        id: AssessmentTypeId::SoftwareImplementation,
        name: "Software Implementation Readiness Assessment",
        description: "Specialized assessment for software implementation projects and technology adoption",
        dimensions: &SOFTWARE_DIMENSIONS,
    },
    AssessmentType {
        id: AssessmentTypeId::BusinessProcess,
        name: "Business Process Evaluation Assessment",
        description: "Assessment for business process improvement and operational transformation projects",
        dimensions: &BUSINESS_DIMENSIONS,
    },
    AssessmentType {
        id: AssessmentTypeId::ManufacturingOperations,
        name: "Manufacturing Operations Assessment",
        description: "Assessment for manufacturing line evaluations and operational improvements",
        dimensions: &MANUFACTURING_DIMENSIONS,
    },
];

pub(super) fn specific_risks(id: AssessmentTypeId) -> &'static [&'static str] {
    match id {
        AssessmentTypeId::GeneralReadiness => &[],
        AssessmentTypeId::SoftwareImplementation => &[
            "Technical infrastructure limitations",
            "User adoption challenges",
            "Data migration complexity",
            "System integration issues",
        ],
        AssessmentTypeId::BusinessProcess => &[
            "Process complexity and dependencies",
            "Cross-functional coordination challenges",
            "Performance measurement gaps",
            "Change fatigue from process modifications",
        ],
        AssessmentTypeId::ManufacturingOperations => &[
            "Operational constraint management",
            "Shift work coordination challenges",
            "Safety and compliance requirements",
            "Maintenance-operations alignment issues",
        ],
    }
}

pub(super) fn specific_recommendations(id: AssessmentTypeId) -> &'static [&'static str] {
    match id {
        AssessmentTypeId::GeneralReadiness => &[],
        AssessmentTypeId::SoftwareImplementation => &[
            "Ensure technical infrastructure readiness",
            "Plan comprehensive user training and support",
            "Develop data migration and integration strategy",
            "Create system performance monitoring protocols",
        ],
        AssessmentTypeId::BusinessProcess => &[
            "Document current process workflows and dependencies",
            "Establish process performance baselines",
            "Design cross-functional collaboration frameworks",
            "Create process improvement measurement systems",
        ],
        AssessmentTypeId::ManufacturingOperations => &[
            "Address shift work coordination challenges",
            "Leverage safety culture for change adoption",
            "Ensure maintenance-operations alignment",
            "Plan for operational constraint management",
        ],
    }
}

// Indexed by phase ordinal - 1.
static BASE_PHASE_RECOMMENDATIONS: [&str; 6] = [
    "Comprehensive current state analysis and stakeholder mapping",
    "Build strong foundation and prepare all resources",
    "Test approach with representative group",
    "Execute with comprehensive support and monitoring",
    "Institutionalize changes and transfer ownership",
    "Monitor success and drive continuous improvement",
];

static SOFTWARE_PHASE_RECOMMENDATIONS: [&str; 6] = [
    "Assess technical infrastructure and user readiness",
    "Prepare training programs and technical environment",
    "Test system functionality and user experience",
    "Deploy with technical support and user training",
    "Establish ongoing support and maintenance procedures",
    "Monitor system performance and user adoption",
];

static BUSINESS_PHASE_RECOMMENDATIONS: [&str; 6] = [
    "Map current processes and identify improvement opportunities",
    "Design new processes and prepare training materials",
    "Test new processes with key stakeholder groups",
    "Implement across all affected departments",
    "Standardize processes and embed in operations",
    "Monitor process performance and continuous improvement",
];

static MANUFACTURING_PHASE_RECOMMENDATIONS: [&str; 6] = [
    "Assess operational constraints and stakeholder alignment",
    "Build cross-shift communication and training programs",
    "Test improvements in controlled operational environment",
    "Implement with minimal operational disruption",
    "Embed in operational procedures and culture",
    "Monitor operational performance improvements",
];

pub(super) fn phase_recommendation(id: AssessmentTypeId, phase: PhaseId) -> &'static str {
    let table = match id {
        AssessmentTypeId::GeneralReadiness => &BASE_PHASE_RECOMMENDATIONS,
        AssessmentTypeId::SoftwareImplementation => &SOFTWARE_PHASE_RECOMMENDATIONS,
        AssessmentTypeId::BusinessProcess => &BUSINESS_PHASE_RECOMMENDATIONS,
        AssessmentTypeId::ManufacturingOperations => &MANUFACTURING_PHASE_RECOMMENDATIONS,
    };
    table[usize::from(phase.order() - 1)]
}

static MANUFACTURING_WEEKLY: [[&str; 2]; 10] = [
    ["Maintenance-operations alignment assessment", "Shift work coordination planning"],
    ["Manufacturing excellence training", "Operational impact education"],
    ["Maintenance process optimization", "Operations integration planning"],
    ["Manufacturing-specific configuration", "Operational workflow integration"],
    ["Production impact validation", "Operational efficiency testing"],
    ["Shift-based pilot testing", "Operations team validation"],
    ["Manufacturing optimization", "Operational workflow refinement"],
    ["Shift-based training delivery", "Operations team empowerment"],
    ["Manufacturing performance monitoring", "Operational excellence tracking"],
    ["Maintenance excellence validation", "Manufacturing performance optimization"],
];

pub(super) fn weekly_activities(id: AssessmentTypeId, week: u8) -> &'static [&'static str] {
    match id {
        AssessmentTypeId::ManufacturingOperations => {
            match usize::from(week).checked_sub(1).and_then(|i| MANUFACTURING_WEEKLY.get(i)) {
                Some(activities) => activities.as_slice(),
                None => &[],
            }
        }
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_manufacturing_has_weekly_activities() {
        assert_eq!(
            weekly_activities(AssessmentTypeId::ManufacturingOperations, 6),
            &["Shift-based pilot testing", "Operations team validation"]
        );
        assert!(weekly_activities(AssessmentTypeId::ManufacturingOperations, 11).is_empty());
        assert!(weekly_activities(AssessmentTypeId::SoftwareImplementation, 6).is_empty());
    }

    #[test]
    fn general_readiness_uses_base_phase_recommendations() {
        assert_eq!(
            phase_recommendation(AssessmentTypeId::GeneralReadiness, PhaseId::Track),
            "Monitor success and drive continuous improvement"
        );
    }
}
