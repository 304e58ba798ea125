use crate::catalog::PhaseId;

/// One row of the fixed 10-week plan.
pub struct WeekTemplate {
    pub week: u8,
    pub label: &'static str,
    pub impact_phase: PhaseId,
    pub title: &'static str,
    pub description: &'static str,
    pub activities: [&'static str; 4],
    pub deliverables: [&'static str; 3],
    pub hours: u32,
    pub budget: u64,
}

const PLAN: &str = "Plan";
const CONFIGURE: &str = "Configure/Develop/Implement";
const UAT: &str = "User Acceptance Testing";
const DEPLOY: &str = "Production Deployment";

pub static WEEKS: [WeekTemplate; 10] = [
    WeekTemplate {
        week: 1,
        label: PLAN,
        impact_phase: PhaseId::Investigate,
        title: "Kick-off Week",
        description: "Create Project Charter, detailed project plan, and establish core team members",
        activities: [
            "Project Charter creation",
            "Detailed project planning",
            "Core team establishment",
            "Stakeholder identification",
        ],
        deliverables: ["Project Charter", "Project Plan", "Team Charter"],
        hours: 40,
        budget: 8000,
    },
    WeekTemplate {
        week: 2,
        label: PLAN,
        impact_phase: PhaseId::Investigate,
        title: "Core Team Training",
        description: "Hands-on training where participants experience full capabilities and limitations",
        activities: [
            "Core team training delivery",
            "Hands-on system exploration",
            "Capability assessment",
            "Limitation identification",
        ],
        deliverables: ["Training Materials", "Capability Assessment", "Team Readiness Report"],
        hours: 40,
        budget: 6000,
    },
    WeekTemplate {
        week: 3,
        label: PLAN,
        impact_phase: PhaseId::Mobilize,
        title: "Business Process Review",
        description: "Determine configuration regarding user groups, menus, permissions, and authorizations",
        activities: [
            "Business process analysis",
            "User group definition",
            "Permission mapping",
            "Authorization framework",
        ],
        deliverables: ["Business Process Document", "User Group Matrix", "Permission Framework"],
        hours: 40,
        budget: 7000,
    },
    WeekTemplate {
        week: 4,
        label: CONFIGURE,
        impact_phase: PhaseId::Mobilize,
        title: "Configuration & Data Preparation",
        description: "Set installation parameters, build user groups, prepare data migration",
        activities: [
            "System configuration",
            "User group creation",
            "Data extraction and mapping",
            "Migration preparation",
        ],
        deliverables: ["Configuration Document", "Data Mapping", "Migration Plan"],
        hours: 45,
        budget: 9000,
    },
    WeekTemplate {
        week: 5,
        label: CONFIGURE,
        impact_phase: PhaseId::Pilot,
        title: "Configuration Completion & Data Loading",
        description: "Complete configuration and load data into training environment",
        activities: [
            "Configuration finalization",
            "Data validation",
            "Training environment setup",
            "Data loading execution",
        ],
        deliverables: ["Final Configuration", "Data Validation Report", "Training Environment"],
        hours: 45,
        budget: 8500,
    },
    WeekTemplate {
        week: 6,
        label: UAT,
        impact_phase: PhaseId::Pilot,
        title: "Pilot Testing",
        description: "Pilot testing of functions in training environment by user groups",
        activities: [
            "Pilot user selection",
            "Testing execution",
            "Issue identification",
            "Feedback collection",
        ],
        deliverables: ["Pilot Test Results", "Issue Log", "User Feedback Report"],
        hours: 40,
        budget: 6000,
    },
    WeekTemplate {
        week: 7,
        label: UAT,
        impact_phase: PhaseId::Activate,
        title: "Configuration Modifications",
        description: "Modify configuration based on pilot testing and prepare production",
        activities: [
            "Configuration adjustments",
            "User experience optimization",
            "Production preparation",
            "Environment copying",
        ],
        deliverables: ["Modified Configuration", "Production Environment", "Deployment Plan"],
        hours: 45,
        budget: 7500,
    },
    WeekTemplate {
        week: 8,
        label: UAT,
        impact_phase: PhaseId::Activate,
        title: "Production Setup & Training",
        description: "Configure production environment and deliver end-user training",
        activities: [
            "Production configuration",
            "Data loading production",
            "End-user training",
            "Role-based instruction",
        ],
        deliverables: ["Production System", "Training Records", "User Competency Matrix"],
        hours: 50,
        budget: 10000,
    },
    WeekTemplate {
        week: 9,
        label: DEPLOY,
        impact_phase: PhaseId::Cement,
        title: "Go Live - Week 1",
        description: "Initial go-live with intensive support and monitoring",
        activities: [
            "Go-live execution",
            "Intensive support",
            "Issue resolution",
            "Performance monitoring",
        ],
        deliverables: ["Go-Live Report", "Issue Resolution Log", "Performance Metrics"],
        hours: 60,
        budget: 12000,
    },
    WeekTemplate {
        week: 10,
        label: DEPLOY,
        impact_phase: PhaseId::Track,
        title: "Go Live - Week 2",
        description: "Continued go-live support and stabilization",
        activities: [
            "Ongoing support",
            "System stabilization",
            "User assistance",
            "Success validation",
        ],
        deliverables: ["Stabilization Report", "User Success Metrics", "Project Closure"],
        hours: 50,
        budget: 8000,
    },
];

pub static LOW_READINESS: [[&str; 3]; 10] = [
    [
        "Additional stakeholder alignment sessions",
        "Change resistance assessment",
        "Communication strategy enhancement",
    ],
    [
        "Extended training sessions",
        "Change champion identification",
        "Readiness gap analysis",
    ],
    [
        "Cultural assessment integration",
        "Additional process documentation",
        "Resistance point mapping",
    ],
    [
        "Enhanced testing protocols",
        "Additional quality checks",
        "Risk mitigation planning",
    ],
    [
        "Extended validation cycles",
        "Additional user feedback sessions",
        "Performance optimization",
    ],
    [
        "Expanded pilot group",
        "Additional testing scenarios",
        "Enhanced support protocols",
    ],
    [
        "Extended modification cycles",
        "Additional validation steps",
        "Risk assessment updates",
    ],
    [
        "Enhanced training delivery",
        "Additional practice sessions",
        "Confidence building activities",
    ],
    [
        "Intensive support protocols",
        "Additional monitoring systems",
        "Rapid response procedures",
    ],
    [
        "Extended support period",
        "Additional stabilization activities",
        "Success reinforcement",
    ],
];

pub static MEDIUM_READINESS: [[&str; 2]; 10] = [
    ["Stakeholder engagement optimization", "Communication plan refinement"],
    ["Training effectiveness measurement", "Change champion training"],
    ["Process optimization workshops", "Best practice integration"],
    ["Quality assurance protocols", "Performance baseline establishment"],
    ["User experience optimization", "Efficiency improvements"],
    ["Pilot success validation", "Feedback integration"],
    ["Configuration optimization", "User experience refinement"],
    ["Training reinforcement", "Competency validation"],
    ["Performance monitoring enhancement", "Success metric tracking"],
    ["Best practice documentation", "Continuous improvement planning"],
];

pub static HIGH_READINESS: [[&str; 2]; 10] = [
    ["Accelerated planning protocols", "Innovation opportunities identification"],
    ["Advanced capability exploration", "Best practice development"],
    ["Process excellence initiatives", "Innovation integration"],
    ["Advanced configuration options", "Optimization opportunities"],
    ["Performance enhancement features", "Advanced functionality"],
    ["Innovation pilot testing", "Advanced use case validation"],
    ["Advanced feature implementation", "Innovation integration"],
    ["Leadership development", "Advanced user empowerment"],
    ["Excellence achievement validation", "Success amplification"],
    ["Innovation showcase", "Excellence model development"],
];
