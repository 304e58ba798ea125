//! Static catalog: assessment types with their dimensions, and the six
//! IMPACT phases.
//!
//! The catalog is pure data. Everything here is `'static` and safe to read
//! from any thread without synchronization.

mod assessment_types;
mod phases;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub use assessment_types::ASSESSMENT_TYPES;
pub use phases::PHASES;

/// Category of an assessment dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DimensionCategory {
    Core,
    Specialized,
}

/// A single scored facet of readiness.
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: DimensionCategory,
}

/// An assessment type and its ordered dimension list.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentType {
    pub id: AssessmentTypeId,
    pub name: &'static str,
    pub description: &'static str,
    pub dimensions: &'static [Dimension],
}

impl AssessmentType {
    pub fn dimension(&self, id: &str) -> Option<&'static Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    pub fn core_dimensions(&self) -> impl Iterator<Item = &'static Dimension> {
        self.dimensions
            .iter()
            .filter(|d| d.category == DimensionCategory::Core)
    }
}

/// Canonical messages attached to the five core dimensions.
#[derive(Debug, Clone, Copy)]
pub struct CoreDimension {
    pub id: &'static str,
    /// Emitted when the dimension scores below 3.
    pub risk: &'static str,
    /// Emitted when the dimension scores 4 or more.
    pub strength: &'static str,
}

pub const CORE_DIMENSIONS: [CoreDimension; 5] = [
    CoreDimension {
        id: "leadership_commitment",
        risk: "Limited leadership engagement and support",
        strength: "Strong leadership commitment",
    },
    CoreDimension {
        id: "organizational_culture",
        risk: "Low organizational change maturity",
        strength: "High organizational change maturity",
    },
    CoreDimension {
        id: "resource_availability",
        risk: "Insufficient resource allocation",
        strength: "Adequate resource allocation",
    },
    CoreDimension {
        id: "stakeholder_engagement",
        risk: "Inadequate communication infrastructure",
        strength: "Effective communication capabilities",
    },
    CoreDimension {
        id: "training_capability",
        risk: "Workforce resistance to change",
        strength: "Adaptable workforce",
    },
];

/// Assessment type identifier. The engine is polymorphic over the
/// capability methods on this enum only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentTypeId {
    GeneralReadiness,
    SoftwareImplementation,
    BusinessProcess,
    ManufacturingOperations,
}

impl AssessmentTypeId {
    pub const ALL: [AssessmentTypeId; 4] = [
        AssessmentTypeId::GeneralReadiness,
        AssessmentTypeId::SoftwareImplementation,
        AssessmentTypeId::BusinessProcess,
        AssessmentTypeId::ManufacturingOperations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentTypeId::GeneralReadiness => "general_readiness",
            AssessmentTypeId::SoftwareImplementation => "software_implementation",
            AssessmentTypeId::BusinessProcess => "business_process",
            AssessmentTypeId::ManufacturingOperations => "manufacturing_operations",
        }
    }

    /// Name used in narrative headings.
    pub fn display_name(self) -> &'static str {
        match self {
            AssessmentTypeId::GeneralReadiness => "Change Management",
            AssessmentTypeId::SoftwareImplementation => "Software Implementation",
            AssessmentTypeId::BusinessProcess => "Business Process Improvement",
            AssessmentTypeId::ManufacturingOperations => "Manufacturing Operations",
        }
    }

    /// Catalog entry for this type.
    pub fn spec(self) -> &'static AssessmentType {
        match self {
            AssessmentTypeId::GeneralReadiness => &ASSESSMENT_TYPES[0],
            AssessmentTypeId::SoftwareImplementation => &ASSESSMENT_TYPES[1],
            AssessmentTypeId::BusinessProcess => &ASSESSMENT_TYPES[2],
            AssessmentTypeId::ManufacturingOperations => &ASSESSMENT_TYPES[3],
        }
    }

    pub fn dimensions(self) -> &'static [Dimension] {
        self.spec().dimensions
    }

    pub fn type_multiplier(self) -> f64 {
        match self {
            AssessmentTypeId::SoftwareImplementation => 1.1,
            AssessmentTypeId::ManufacturingOperations => 1.2,
            AssessmentTypeId::GeneralReadiness | AssessmentTypeId::BusinessProcess => 1.0,
        }
    }

    /// Project-duration adjustment in percent.
    pub fn duration_pct(self) -> u32 {
        match self {
            AssessmentTypeId::SoftwareImplementation => 120,
            AssessmentTypeId::ManufacturingOperations => 130,
            AssessmentTypeId::GeneralReadiness | AssessmentTypeId::BusinessProcess => 100,
        }
    }

    /// Specialized dimensions worth +5 success probability each at 4 or more.
    pub fn bonus_dimensions(self) -> &'static [&'static str] {
        match self {
            AssessmentTypeId::GeneralReadiness => &[],
            AssessmentTypeId::SoftwareImplementation => {
                &["technical_infrastructure", "user_adoption_readiness"]
            }
            AssessmentTypeId::BusinessProcess => &["process_maturity", "cross_functional_collaboration"],
            AssessmentTypeId::ManufacturingOperations => {
                &["maintenance_operations_alignment", "safety_compliance"]
            }
        }
    }

    pub fn specific_risks(self) -> &'static [&'static str] {
        assessment_types::specific_risks(self)
    }

    pub fn specific_recommendations(self) -> &'static [&'static str] {
        assessment_types::specific_recommendations(self)
    }

    pub fn phase_recommendation(self, phase: PhaseId) -> &'static str {
        assessment_types::phase_recommendation(self, phase)
    }

    /// Extra plan activities for `week` (1..=10).
    pub fn weekly_activities(self, week: u8) -> &'static [&'static str] {
        assessment_types::weekly_activities(self, week)
    }
}

impl fmt::Display for AssessmentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentTypeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        AssessmentTypeId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::not_found("assessment type", s))
    }
}

/// IMPACT phase identifier, in lifecycle order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Investigate,
    Mobilize,
    Pilot,
    Activate,
    Cement,
    Track,
}

impl PhaseId {
    pub const ALL: [PhaseId; 6] = [
        PhaseId::Investigate,
        PhaseId::Mobilize,
        PhaseId::Pilot,
        PhaseId::Activate,
        PhaseId::Cement,
        PhaseId::Track,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseId::Investigate => "investigate",
            PhaseId::Mobilize => "mobilize",
            PhaseId::Pilot => "pilot",
            PhaseId::Activate => "activate",
            PhaseId::Cement => "cement",
            PhaseId::Track => "track",
        }
    }

    /// Ordinal, 1..=6.
    pub fn order(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_order(order: u8) -> Option<PhaseId> {
        PhaseId::ALL.get(usize::from(order).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<PhaseId> {
        PhaseId::from_order(self.order() + 1)
    }

    pub fn spec(self) -> &'static Phase {
        &PHASES[usize::from(self.order() - 1)]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        PhaseId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::not_found("phase", s))
    }
}

/// Deliverable template declared by a phase.
#[derive(Debug, Clone, Serialize)]
pub struct DeliverableSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
}

/// Static description of an IMPACT phase.
#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub id: PhaseId,
    pub order: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub law: &'static str,
    pub focus: &'static str,
    pub objectives: &'static [&'static str],
    pub key_activities: &'static [&'static str],
    pub deliverables: &'static [DeliverableSpec],
    pub tools: &'static [&'static str],
    pub completion_criteria: &'static [&'static str],
}

pub fn list_assessment_types() -> &'static [AssessmentType] {
    &ASSESSMENT_TYPES
}

/// Look up an assessment type by identifier.
///
/// # Errors
/// Returns `NotFound` for an unknown identifier.
pub fn get_type(id: &str) -> Result<&'static AssessmentType> {
    Ok(id.parse::<AssessmentTypeId>()?.spec())
}

/// All phases, ordered by ordinal.
pub fn list_phases() -> &'static [Phase] {
    &PHASES
}

/// Look up a phase by identifier.
///
/// # Errors
/// Returns `NotFound` for an unknown identifier.
pub fn get_phase(id: &str) -> Result<&'static Phase> {
    Ok(id.parse::<PhaseId>()?.spec())
}
