use super::TaskTemplate;
use crate::rates::TierHours;

const DISCOVERY: &str = "Discovery & Design";
const RESEARCH: &str = "User & Stakeholder Research";
const PROTOTYPING: &str = "Prototyping & Pilot Testing";
const GUIDANCE: &str = "Ongoing Strategic Guidance";
const FEASIBILITY: &str = "Implementation Feasibility & Real-World Value";
const REGULATORY: &str = "Regulatory & Compliance";

// (domain, name, description, director, leadership, coordinator, keywords, prerequisites)
type Row = (
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    f64,
    &'static [&'static str],
    &'static [&'static str],
);

#[rustfmt::skip]
const ROWS: &[Row] = &[
    (DISCOVERY, "Landscape Scan", "Brief lit or market scan with synthesis", 1.0, 2.0, 4.0,
        &["landscape", "literature", "market", "scan", "evidence"], &[]),
    (DISCOVERY, "Discovery Workshop", "Collaborative session to identify goals, needs, and framing", 1.0, 2.0, 2.0,
        &["discovery", "workshop", "goals", "kickoff"], &[]),
    (DISCOVERY, "Journey Mapping", "Document user experience over time to find friction points", 1.0, 3.0, 4.0,
        &["journey", "experience", "friction", "map"], &[]),
    (DISCOVERY, "Persona Development", "Create evidence-informed user personas", 1.0, 2.0, 3.0,
        &["persona", "user", "segment"], &[]),
    (DISCOVERY, "Sprint Design", "Scope and frame a targeted research sprint or pilot", 1.0, 1.0, 2.0,
        &["sprint", "scope", "design", "plan"], &[]),
    (RESEARCH, "Focus Group (1x)", "Recruit, moderate, and analyze 1 focus group", 1.0, 2.0, 8.0,
        &["focus group", "qualitative", "recruit", "moderate"], &[]),
    (RESEARCH, "Stakeholder Interviews", "Conduct up to 5 interviews and synthesize insights", 1.0, 3.0, 6.0,
        &["interview", "stakeholder", "qualitative", "insight"], &[]),
    (RESEARCH, "Survey Design + Launch", "Build, launch, and summarize a short survey", 1.0, 3.0, 5.0,
        &["survey", "questionnaire", "quantitative", "poll"], &[]),
    (RESEARCH, "Co-Design Session", "Work session with users/stakeholders to test ideas", 1.0, 2.0, 4.0,
        &["co-design", "codesign", "participatory", "ideas"], &[]),
    (RESEARCH, "Usability Walkthrough", "Moderated session with real users exploring product flow", 1.0, 2.0, 4.0,
        &["usability", "product", "ux", "walkthrough"], &[]),
    (PROTOTYPING, "Rapid Pilot (1-month)", "Deploy and monitor a product/test in the real world", 2.0, 4.0, 10.0,
        &["pilot", "deploy", "real world", "monitor"], &["Field Test Setup"]),
    (PROTOTYPING, "Concept Testing", "Structured feedback on early ideas via survey or interviews", 1.0, 3.0, 4.0,
        &["concept", "feedback", "prototype", "test"], &[]),
    (PROTOTYPING, "Field Test Setup", "Define measures, prep team/tools, secure approvals", 2.0, 4.0, 6.0,
        &["field", "measures", "setup", "approval"], &[]),
    (PROTOTYPING, "Pilot Debrief & Learnings", "Rapid synthesis after pilot wrap-up", 1.0, 2.0, 2.0,
        &["debrief", "pilot", "learnings", "synthesis"], &["Rapid Pilot (1-month)"]),
    (PROTOTYPING, "Iteration Workshop", "Translate findings into next build or change", 1.0, 2.0, 2.0,
        &["iteration", "iterate", "build", "workshop"], &[]),
    (GUIDANCE, "Advisory Session", "1-hour strategic check-in + notes", 1.0, 1.0, 1.0,
        &["advisory", "check-in", "strategy", "advice"], &[]),
    (GUIDANCE, "Deep Dive Workshop", "Half-day session to align or synthesize", 1.0, 2.0, 2.0,
        &["deep dive", "align", "workshop"], &[]),
    (GUIDANCE, "Internal Synthesis Memo", "Written summary of findings", 1.0, 1.0, 2.0,
        &["memo", "summary", "synthesis", "report"], &[]),
    (GUIDANCE, "End-of-Phase Briefing", "Visual presentation of findings and implications", 1.0, 2.0, 3.0,
        &["briefing", "presentation", "findings"], &[]),
    (GUIDANCE, "Quarterly Strategy Review", "Planning session for next 90 days", 1.0, 2.0, 2.0,
        &["quarterly", "strategy", "review", "planning"], &[]),
    (FEASIBILITY, "ROI Modeling", "Estimate costs and benefits", 2.0, 4.0, 4.0,
        &["roi", "cost", "benefit", "economic", "value"], &[]),
    (FEASIBILITY, "Adoption Barriers Mapping", "Understand logistical/behavioral blockers", 1.0, 3.0, 4.0,
        &["adoption", "barrier", "behavior", "implementation"], &[]),
    (FEASIBILITY, "Community Pilot (N=10–20)", "Small test in real setting", 2.0, 4.0, 8.0,
        &["community", "pilot", "real setting"], &[]),
    (FEASIBILITY, "Trusted Messenger Testing", "See which voices drive change", 1.0, 2.0, 3.0,
        &["messenger", "trust", "messaging", "community"], &[]),
    (FEASIBILITY, "Local Ecosystem Scan", "Document local needs, gaps, or assets", 1.0, 2.0, 3.0,
        &["ecosystem", "local", "assets", "needs"], &[]),
    (REGULATORY, "IRB Protocol Development", "Full IRB submission and support docs", 2.0, 3.0, 3.0,
        &["irb", "protocol", "ethics", "human subjects"], &[]),
    (REGULATORY, "IRB Amendment", "Change to existing protocol", 1.0, 1.0, 1.0,
        &["irb", "amendment", "protocol"], &["IRB Protocol Development"]),
    (REGULATORY, "Data Governance Setup", "Review workflows for consent/privacy", 1.0, 2.0, 2.0,
        &["data", "governance", "privacy", "consent"], &[]),
    (REGULATORY, "Institutional Agreements", "Assist with DUAs, BAAs, or site onboarding", 1.0, 2.0, 2.0,
        &["agreement", "dua", "baa", "onboarding", "contract"], &[]),
    (REGULATORY, "Regulatory Strategy Advising", "Strategic input on risk and IRB feasibility", 1.0, 1.0, 1.0,
        &["regulatory", "risk", "compliance", "irb"], &[]),
];

pub(super) fn default_tasks() -> Vec<TaskTemplate> {
    ROWS.iter()
        .map(
            |&(domain, name, description, director, leadership, coordinator, keywords, prerequisites)| {
                TaskTemplate::new(
                    domain,
                    name,
                    description,
                    TierHours::new(director, leadership, coordinator),
                )
                .with_keywords(keywords.iter().copied())
                .with_prerequisites(prerequisites.iter().copied())
            },
        )
        .collect()
}
