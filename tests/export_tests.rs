use std::fs;

use unit_pricing::{
    Complexity, Overhead, PersistenceError, PlanningSession, PricingMode, RateConfig, ScopeInfo,
    SprintLog, TaskCatalog, TaskModifiers, load_log_from_csv, load_rates_from_json,
    load_session_from_json, read_log_csv, render_proposal_markdown, render_sprint_summary,
    save_log_to_csv, save_rates_to_json, save_session_to_json, write_log_csv,
    write_proposal_markdown,
};
use tempfile::NamedTempFile;

fn build_sample_session() -> PlanningSession {
    let mut scope = ScopeInfo::default();
    scope.project_name = "Community Health Sprint".into();
    scope.partner_name = "Riverside Clinic".into();
    scope.total_units = Some(6.0);
    scope.theme = Some("survey".into());

    let rates = RateConfig::default().with_pricing_mode(PricingMode::Partner);
    let mut session = PlanningSession::new(scope, rates);
    let catalog = TaskCatalog::default_library();

    let picks = [
        ("Discovery Workshop", Complexity::Low, Some("Phase 1: Discovery")),
        ("Survey Design + Launch", Complexity::Medium, Some("Phase 2: Research")),
        ("Advisory Session", Complexity::High, None),
    ];
    for (name, complexity, phase) in picks {
        let mut modifiers = TaskModifiers::default().with_complexity(complexity);
        modifiers.phase = phase.map(Into::into);
        let quote = session.quote(&catalog, name, &modifiers).unwrap();
        session.add_to_log(&quote);
    }
    session
}

#[test]
fn session_json_round_trip() {
    let session = build_sample_session();
    let tmp = NamedTempFile::new().unwrap();

    save_session_to_json(&session, tmp.path()).unwrap();
    let loaded = load_session_from_json(tmp.path()).unwrap();

    assert_eq!(loaded, session);
}

#[test]
fn sprint_log_csv_round_trip() {
    let session = build_sample_session();
    let tmp = NamedTempFile::new().unwrap();

    save_log_to_csv(&session.log, tmp.path()).unwrap();
    let contents = fs::read_to_string(tmp.path()).unwrap();
    assert!(contents.starts_with("domain,task,units,exact_units,cost,complexity,phase,notes"));

    let loaded = load_log_from_csv(tmp.path()).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.entries()[0].phase.as_deref(), Some("Phase 1: Discovery"));
    assert_eq!(loaded.entries()[2].phase, None);
    assert_eq!(loaded.entries()[2].complexity, Some(Complexity::High));
    assert!((loaded.total_cost() - session.log.total_cost()).abs() < 1e-9);
}

#[test]
fn empty_log_exports_header_only() {
    let mut buffer = Vec::new();
    write_log_csv(&SprintLog::new(), &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.trim(), "domain,task,units,exact_units,cost,complexity,phase,notes");

    let loaded = read_log_csv(text.as_bytes()).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn negative_costs_in_imported_log_are_rejected() {
    let csv = "domain,task,units,exact_units,cost,complexity,phase,notes\nD,T,1.0,,-5,,,\n";
    let err = read_log_csv(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn invalid_session_file_is_rejected() {
    let tmp = NamedTempFile::new().unwrap();
    let mut session = build_sample_session();
    session.rates.unit_price = 0.0;
    fs::write(tmp.path(), serde_json::to_string(&session).unwrap()).unwrap();

    assert!(matches!(
        load_session_from_json(tmp.path()),
        Err(PersistenceError::Pricing(_))
    ));

    let mut session = build_sample_session();
    session.scope.periods = u32::MAX;
    fs::write(tmp.path(), serde_json::to_string(&session).unwrap()).unwrap();
    assert!(matches!(
        load_session_from_json(tmp.path()),
        Err(PersistenceError::InvalidData(_))
    ));

    fs::write(tmp.path(), "{ not json").unwrap();
    assert!(matches!(
        load_session_from_json(tmp.path()),
        Err(PersistenceError::Serialization(_))
    ));
}

#[test]
fn rates_json_round_trip() {
    let mut rates = RateConfig::default().with_pricing_mode(PricingMode::Partner);
    rates.overhead = Overhead::Percent(39.0);
    let tmp = NamedTempFile::new().unwrap();

    save_rates_to_json(&rates, tmp.path()).unwrap();
    assert_eq!(load_rates_from_json(tmp.path()).unwrap(), rates);
}

#[test]
fn proposal_markdown_has_every_section() {
    let session = build_sample_session();
    let markdown = render_proposal_markdown(&session);

    assert!(markdown.starts_with("# Community Health Sprint\n"));
    for heading in ["## Overview", "## Phases", "## Task Breakdown", "## Cost Summary"] {
        assert!(markdown.contains(heading), "missing {heading}");
    }
    assert!(markdown.contains("Riverside Clinic"));
    assert!(markdown.contains("### Phase 1: Discovery (0.50 units)"));
    assert!(markdown.contains("### Unphased (1.50 units)"));
    assert!(markdown.contains("| 2 | User & Stakeholder Research | Survey Design + Launch | Medium |"));
    assert!(markdown.contains("- **Total units:** 3.00"));

    let phases_at = markdown.find("### Phase 2").unwrap();
    let unphased_at = markdown.find("### Unphased").unwrap();
    assert!(phases_at < unphased_at);
}

#[test]
fn empty_proposal_keeps_section_layout() {
    let session = PlanningSession::default();
    let markdown = render_proposal_markdown(&session);

    assert!(markdown.contains(
        "## Phases\n\n_No tasks have been added to the sprint log._\n\n## Task Breakdown\n"
    ));
    assert!(markdown.ends_with("- **Total units:** 0.00\n- **Total cost:** $0.00\n"));

    let mut streamed = String::new();
    write_proposal_markdown(&mut streamed, &session).unwrap();
    assert_eq!(streamed, markdown);
}

#[test]
fn sprint_summary_lists_hours_costs_and_units() {
    let catalog = TaskCatalog::default_library();
    let session = PlanningSession::default();
    let quote = session
        .quote(&catalog, "Landscape Scan", &TaskModifiers::default())
        .unwrap();

    let summary = render_sprint_summary(&quote, None);

    assert!(summary.starts_with("#### Sprint Summary\n"));
    for line in [
        "- **Sprint Name:** Landscape Scan Sprint",
        "- **Domain:** Discovery & Design",
        "- **Task:** Landscape Scan",
        "- **Description:** Brief lit or market scan with synthesis",
        "- **Tier 1 (Director) Hours:** 1",
        "- **Tier 2 (Leadership) Hours:** 2",
        "- **Tier 3 (Coordinator) Hours:** 4",
        "- **Additional Costs:** $0.00",
        "- **Overhead Multiplier:** x2.00",
        "- **Total Cost:** $2,200.00",
        "- **Total Units:** 0.44",
    ] {
        assert!(summary.contains(line), "missing {line:?} in {summary}");
    }
    assert!(!summary.contains("Fixed Fees"));
    assert!(!summary.contains("Partner Units"));
}

#[test]
fn sprint_summary_uses_given_name_and_shows_fees() {
    let catalog = TaskCatalog::default_library();
    let session = PlanningSession::new(
        ScopeInfo::default(),
        RateConfig::default().with_pricing_mode(PricingMode::Partner),
    );
    let modifiers = TaskModifiers::default().with_fixed_fee(1000.0);
    let quote = session.quote(&catalog, "Landscape Scan", &modifiers).unwrap();

    let summary = render_sprint_summary(&quote, Some("  Spring Evidence Sprint "));

    assert!(summary.contains("- **Sprint Name:** Spring Evidence Sprint\n"));
    assert!(summary.contains("- **Fixed Fees:** $1,000.00"));
    assert!(summary.contains("- **Total Cost:** $4,200.00"));
    assert!(summary.contains("- **Total Units:** 0.84"));
    assert!(summary.contains("- **Partner Units:** 1.00"));

    let blank = render_sprint_summary(&quote, Some("   "));
    assert!(blank.contains("- **Sprint Name:** Landscape Scan Sprint"));
}
