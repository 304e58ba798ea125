use super::{DeliverableSpec, Phase, PhaseId};

const fn required(name: &'static str, kind: &'static str) -> DeliverableSpec {
    DeliverableSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: &'static str) -> DeliverableSpec {
    DeliverableSpec {
        name,
        kind,
        required: false,
    }
}

pub static PHASES: [Phase; 6] = [
    Phase {
        id: PhaseId::Investigate,
        order: 1,
        name: "Investigate & Assess",
        description: "Understanding current state and establishing transformation foundation",
        law: "First Law - Overcoming Organizational Inertia",
        focus: "Understand the current organizational state and identify the specific factors that will impact transformation success for any type of change initiative.",
        objectives: &[
            "Comprehensively evaluate current state and organizational readiness",
            "Assess stakeholder landscape and change capacity",
            "Identify risks, opportunities, and critical success factors",
            "Establish baseline measurements and performance metrics",
            "Map cultural factors and organizational dynamics",
        ],
        key_activities: &[
            "Conduct comprehensive stakeholder analysis",
            "Execute multi-dimensional change readiness assessment",
            "Perform current state analysis and gap identification",
            "Assess organizational culture and change history",
            "Identify risks and develop mitigation strategies",
            "Map informal networks and influence patterns",
            "Evaluate technical and operational capabilities",
        ],
        deliverables: &[
            required("Stakeholder Analysis Report", "analysis"),
            required("Change Readiness Assessment", "assessment"),
            required("Current State Analysis", "baseline"),
            required("Risk Assessment Matrix", "assessment"),
            required("Cultural Assessment Report", "analysis"),
            optional("Technical Readiness Evaluation", "assessment"),
        ],
        tools: &[
            "Stakeholder Analysis Template",
            "Change Readiness Assessment Survey",
            "Risk Assessment Matrix",
            "Cultural Assessment Framework",
            "Current State Analysis Tool",
        ],
        completion_criteria: &[
            "All stakeholders identified and analyzed",
            "Change readiness score of 3.5+ achieved or improvement plan established",
            "Current state baseline documented with improvement opportunities",
            "Critical risks identified with mitigation strategies",
            "Cultural factors mapped with engagement strategies",
        ],
    },
    Phase {
        id: PhaseId::Mobilize,
        order: 2,
        name: "Mobilize & Prepare",
        description: "Building infrastructure and preparing for transformation success",
        law: "Second Law - Measuring Forces and Preparing for Acceleration",
        focus: "Ensure all stakeholders understand the transformation objectives and benefits, and are prepared to support the change initiative with appropriate resources and capabilities.",
        objectives: &[
            "Develop comprehensive change management strategy",
            "Establish governance structures and communication frameworks",
            "Create training and development programs for all stakeholders",
            "Build change champion networks across the organization",
            "Prepare measurement systems and success criteria",
        ],
        key_activities: &[
            "Develop detailed change management plan and strategy",
            "Create multi-channel communication strategy and materials",
            "Design role-based training programs for diverse audiences",
            "Establish change champion network covering all areas",
            "Develop success metrics and measurement frameworks",
            "Create resource allocation plans and timelines",
            "Establish issue escalation and support procedures",
        ],
        deliverables: &[
            required("Change Management Plan", "plan"),
            required("Communication Strategy and Plan", "plan"),
            required("Training Program Design", "plan"),
            required("Change Champion Network Plan", "plan"),
            required("Success Metrics Framework", "framework"),
            optional("Resource Allocation Plan", "plan"),
        ],
        tools: &[
            "Change Management Plan Template",
            "Communication Plan Template",
            "Training Strategy Framework",
            "Champion Network Development Guide",
            "Success Metrics Template",
        ],
        completion_criteria: &[
            "Comprehensive change plan approved by leadership",
            "Champion network established covering all key areas",
            "Communication strategy tested and validated with audiences",
            "Training materials developed and tested for effectiveness",
            "Success metrics defined and measurement systems prepared",
        ],
    },
    Phase {
        id: PhaseId::Pilot,
        order: 3,
        name: "Pilot & Adapt",
        description: "Testing approach with limited group and refining strategies",
        law: "Third Law - Testing Action-Reaction in Controlled Environment",
        focus: "Prove that maintenance improvements directly drive operational benefits in your specific manufacturing environment.",
        objectives: &[
            "Validate change strategies in real manufacturing environment",
            "Test maintenance-operations integration in controlled setting",
            "Identify and resolve issues before full-scale deployment",
            "Build confidence through demonstrated maintenance excellence results",
            "Refine approaches based on manufacturing-specific feedback",
        ],
        key_activities: &[
            "Select representative pilot group from maintenance and operations",
            "Execute pilot implementation with intensive support",
            "Monitor pilot performance and gather comprehensive feedback",
            "Demonstrate connection between maintenance improvements and operational results",
            "Capture lessons learned and refine strategies",
            "Develop success stories proving maintenance-manufacturing excellence connection",
            "Prepare scaling plan based on pilot learnings",
        ],
        deliverables: &[
            required("Pilot Implementation Plan", "plan"),
            required("Pilot Results Analysis", "analysis"),
            required("Lessons Learned Report", "report"),
            required("Success Stories Documentation", "documentation"),
            required("Refined Implementation Strategy", "strategy"),
            optional("Scaling Preparation Plan", "plan"),
        ],
        tools: &[
            "Pilot Implementation Guide",
            "Pilot Feedback Collection Tools",
            "Performance Measurement Dashboard",
            "Success Story Template",
            "Strategy Refinement Framework",
        ],
        completion_criteria: &[
            "Pilot success metrics achieved demonstrating maintenance-operations benefits",
            "Key learnings captured and strategies refined",
            "Pilot participants serve as advocates for full deployment",
            "Success stories document clear maintenance-manufacturing performance connection",
            "Scaling plan validated and approved",
        ],
    },
    Phase {
        id: PhaseId::Activate,
        order: 4,
        name: "Activate & Deploy",
        description: "Full-scale implementation with comprehensive support",
        law: "Applied Force - Implementation in Motion",
        focus: "Ensure that maintenance excellence becomes embedded throughout the organization and drives measurable manufacturing performance improvements.",
        objectives: &[
            "Execute full-scale deployment across entire manufacturing organization",
            "Maintain momentum while managing resistance effectively",
            "Ensure maintenance excellence becomes embedded in operations",
            "Track performance improvements and demonstrate manufacturing impact",
            "Provide intensive support during transition period",
        ],
        key_activities: &[
            "Launch full deployment with manufacturing-appropriate sequencing",
            "Execute comprehensive training across all shifts and departments",
            "Monitor adoption rates and performance metrics continuously",
            "Manage resistance with manufacturing-specific strategies",
            "Support maintenance and operations teams through transition",
            "Collect and communicate success stories regularly",
            "Maintain focus on maintenance-manufacturing excellence connection",
        ],
        deliverables: &[
            required("Deployment Execution Plan", "plan"),
            required("Training Delivery Records", "records"),
            required("Performance Monitoring Reports", "reports"),
            required("Resistance Management Log", "log"),
            required("Success Communication Materials", "materials"),
            optional("Manufacturing Impact Analysis", "analysis"),
        ],
        tools: &[
            "Deployment Management Dashboard",
            "Resistance Management Toolkit",
            "Performance Tracking System",
            "Communication Campaign Tools",
            "Manufacturing Metrics Monitor",
        ],
        completion_criteria: &[
            "90%+ user adoption achieved across maintenance and operations",
            "Manufacturing performance improvements documented and validated",
            "Resistance successfully managed with minimal operational disruption",
            "Training completion rates above 95% across all shifts",
            "Maintenance-operations collaboration demonstrably improved",
        ],
    },
    Phase {
        id: PhaseId::Cement,
        order: 5,
        name: "Cement & Transfer",
        description: "Institutionalizing change and transferring ownership",
        law: "Continuous Force Application for Sustainable Motion",
        focus: "Ensure that the connection between maintenance excellence and operational performance becomes part of your organizational culture.",
        objectives: &[
            "Institutionalize maintenance excellence as part of organizational culture",
            "Transfer ownership from implementation team to operational management",
            "Embed new practices in organizational systems and processes",
            "Establish sustainable maintenance-operations collaboration",
            "Create self-reinforcing systems for continuous improvement",
        ],
        key_activities: &[
            "Document and standardize new maintenance excellence practices",
            "Transfer knowledge and ownership to internal teams",
            "Integrate new practices into performance management systems",
            "Establish ongoing governance and oversight structures",
            "Create sustainability plans for maintenance excellence culture",
            "Implement internal capability development programs",
            "Establish mechanisms for continuous improvement",
        ],
        deliverables: &[
            required("Process Documentation and Standards", "documentation"),
            required("Knowledge Transfer Plan", "plan"),
            required("Sustainability Framework", "framework"),
            required("Internal Capability Development Plan", "plan"),
            required("Governance Structure Documentation", "documentation"),
            optional("Continuous Improvement Procedures", "procedures"),
        ],
        tools: &[
            "Process Documentation Templates",
            "Knowledge Transfer Checklist",
            "Sustainability Planning Guide",
            "Governance Framework Template",
            "Continuous Improvement Toolkit",
        ],
        completion_criteria: &[
            "New practices fully documented and embedded in organizational systems",
            "Internal teams capable of sustaining maintenance excellence independently",
            "Performance management systems reflect maintenance-manufacturing connection",
            "Governance structures functioning effectively",
            "Continuous improvement culture established and functioning",
        ],
    },
    Phase {
        id: PhaseId::Track,
        order: 6,
        name: "Track & Optimize",
        description: "Long-term monitoring and continuous improvement",
        law: "New Equilibrium State with Continuous Optimization",
        focus: "Demonstrate that maintenance excellence continues to drive manufacturing performance improvements and creates sustainable competitive advantage.",
        objectives: &[
            "Monitor long-term performance and sustain improvements",
            "Validate implementation guarantee commitments",
            "Identify opportunities for additional manufacturing performance gains",
            "Share best practices and lessons learned",
            "Plan for future manufacturing excellence initiatives",
        ],
        key_activities: &[
            "Monitor KPIs and manufacturing performance metrics continuously",
            "Conduct regular assessment of maintenance excellence sustainability",
            "Identify and implement additional improvement opportunities",
            "Validate guarantee commitments and document achievement",
            "Share success stories and best practices across organization",
            "Plan for advanced maintenance excellence capabilities",
            "Establish long-term strategic planning for manufacturing excellence",
        ],
        deliverables: &[
            required("Performance Monitoring Dashboard", "dashboard"),
            required("Guarantee Validation Report", "report"),
            required("Optimization Opportunities Analysis", "analysis"),
            required("Best Practices Documentation", "documentation"),
            required("Strategic Planning Report", "report"),
            optional("ROI and Benefits Realization Report", "report"),
        ],
        tools: &[
            "Performance Dashboard System",
            "Guarantee Validation Framework",
            "Optimization Analysis Tools",
            "Best Practice Capture Templates",
            "Strategic Planning Framework",
        ],
        completion_criteria: &[
            "All guarantee commitments met and validated",
            "Manufacturing performance improvements sustained over 12+ months",
            "Continuous improvement processes functioning effectively",
            "Organization recognized as maintenance excellence leader",
            "Strategic plan developed for future manufacturing excellence initiatives",
        ],
    },
];
